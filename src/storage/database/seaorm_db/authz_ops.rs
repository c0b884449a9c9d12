use crate::auth::rbac::{PermissionSnapshot, Role, Warehouse};
use crate::storage::{AuthorizationStore, parse_roles, parse_snapshot, parse_warehouses};
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use sea_orm::*;
use tracing::debug;
use uuid::Uuid;

use super::super::entities::{self, permission_snapshot, user_role, user_warehouse};
use super::types::SeaOrmDatabase;

#[async_trait]
impl AuthorizationStore for SeaOrmDatabase {
    async fn user_roles(&self, user_id: Uuid) -> Result<Vec<Role>> {
        debug!("Loading roles for user: {}", user_id);

        let names: Vec<String> = entities::UserRole::find()
            .select_only()
            .column(user_role::Column::Role)
            .filter(user_role::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(parse_roles(user_id, names))
    }

    async fn user_warehouses(&self, user_id: Uuid) -> Result<Vec<Warehouse>> {
        debug!("Loading warehouse assignments for user: {}", user_id);

        let codes: Vec<String> = entities::UserWarehouse::find()
            .select_only()
            .column(user_warehouse::Column::WarehouseCode)
            .filter(user_warehouse::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(parse_warehouses(user_id, codes))
    }

    async fn permission_snapshot(&self, user_id: Uuid) -> Result<Option<PermissionSnapshot>> {
        let model: Option<permission_snapshot::Model> =
            entities::PermissionSnapshot::find_by_id(user_id)
                .one(&self.db)
                .await
                .map_err(GatewayError::Database)?;

        model
            .map(|model| parse_snapshot(user_id, model.permissions))
            .transpose()
    }
}
