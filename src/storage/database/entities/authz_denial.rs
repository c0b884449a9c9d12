use crate::auth::audit::{ClientMetadata, DenialEvent};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Denial audit database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "authz_denials")]
pub struct Model {
    /// Event ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Denied user, absent for anonymous requests
    pub user_id: Option<Uuid>,

    /// Requirement or route that was denied
    pub requested_resource: String,

    /// Machine-readable reason code
    pub reason_code: String,

    /// Human readable reason
    pub reason: String,

    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub request_id: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,

    /// Event timestamp
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert database model to domain event
    pub fn to_domain_event(self) -> DenialEvent {
        DenialEvent {
            id: self.id,
            timestamp: self.created_at.with_timezone(&chrono::Utc),
            user_id: self.user_id,
            requested_resource: self.requested_resource,
            reason_code: self.reason_code,
            reason: self.reason,
            client: ClientMetadata {
                ip_address: self.ip_address,
                user_agent: self.user_agent,
                request_id: self.request_id,
                method: self.method,
                path: self.path,
            },
        }
    }

    /// Convert domain event to an insertable model
    pub fn from_domain_event(event: &DenialEvent) -> ActiveModel {
        ActiveModel {
            id: Set(event.id),
            user_id: Set(event.user_id),
            requested_resource: Set(event.requested_resource.clone()),
            reason_code: Set(event.reason_code.clone()),
            reason: Set(event.reason.clone()),
            ip_address: Set(event.client.ip_address.clone()),
            user_agent: Set(event.client.user_agent.clone()),
            request_id: Set(event.client.request_id.clone()),
            method: Set(event.client.method.clone()),
            path: Set(event.client.path.clone()),
            created_at: Set(event.timestamp.into()),
        }
    }
}
