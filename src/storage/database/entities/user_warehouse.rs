use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Warehouse assignment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "user_warehouses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,

    /// Warehouse code, e.g. `UBB`
    #[sea_orm(primary_key, auto_increment = false)]
    pub warehouse_code: String,

    pub assigned_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
