use crate::auth::audit::DenialEvent;
use crate::storage::AuditStore;
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use sea_orm::*;

use super::super::entities::{self, authz_denial};
use super::types::SeaOrmDatabase;

#[async_trait]
impl AuditStore for SeaOrmDatabase {
    async fn record_denial(&self, event: &DenialEvent) -> Result<()> {
        entities::AuthzDenial::insert(authz_denial::Model::from_domain_event(event))
            .exec_without_returning(&self.db)
            .await
            .map_err(GatewayError::Database)?;
        Ok(())
    }

    async fn recent_denials(&self, limit: u64) -> Result<Vec<DenialEvent>> {
        let models = entities::AuthzDenial::find()
            .order_by_desc(authz_denial::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(models
            .into_iter()
            .map(authz_denial::Model::to_domain_event)
            .collect())
    }
}
