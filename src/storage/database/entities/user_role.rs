use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role assignment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "user_roles")]
pub struct Model {
    /// User holding the role
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,

    /// Role identifier, e.g. `supervisor`
    #[sea_orm(primary_key, auto_increment = false)]
    pub role: String,

    /// Assignment timestamp
    pub assigned_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
