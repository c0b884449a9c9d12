use crate::auth::rbac::{PermissionSnapshot, Role, Warehouse};
use crate::storage::AssignmentStore;
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::debug;
use uuid::Uuid;

use super::super::entities::{self, permission_snapshot, user_role, user_warehouse};
use super::types::SeaOrmDatabase;

/// A role change makes any stored snapshot stale
async fn clear_snapshot<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<()> {
    entities::PermissionSnapshot::delete_by_id(user_id)
        .exec(conn)
        .await
        .map_err(GatewayError::Database)?;
    Ok(())
}

#[async_trait]
impl AssignmentStore for SeaOrmDatabase {
    async fn assign_role(&self, user_id: Uuid, role: Role) -> Result<bool> {
        debug!("Assigning role {} to user {}", role, user_id);

        let model = user_role::ActiveModel {
            user_id: Set(user_id),
            role: Set(role.as_str().to_string()),
            assigned_at: Set(chrono::Utc::now().into()),
        };

        let txn = self.db.begin().await.map_err(GatewayError::Database)?;
        let inserted = entities::UserRole::insert(model)
            .on_conflict(
                OnConflict::columns([user_role::Column::UserId, user_role::Column::Role])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(GatewayError::Database)?;
        if inserted > 0 {
            clear_snapshot(&txn, user_id).await?;
        }
        txn.commit().await.map_err(GatewayError::Database)?;

        Ok(inserted > 0)
    }

    async fn unassign_role(&self, user_id: Uuid, role: Role) -> Result<bool> {
        debug!("Removing role {} from user {}", role, user_id);

        let txn = self.db.begin().await.map_err(GatewayError::Database)?;
        let result = entities::UserRole::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::Role.eq(role.as_str()))
            .exec(&txn)
            .await
            .map_err(GatewayError::Database)?;
        if result.rows_affected > 0 {
            clear_snapshot(&txn, user_id).await?;
        }
        txn.commit().await.map_err(GatewayError::Database)?;

        Ok(result.rows_affected > 0)
    }

    async fn assign_warehouse(&self, user_id: Uuid, warehouse: Warehouse) -> Result<bool> {
        debug!("Assigning warehouse {} to user {}", warehouse, user_id);

        let model = user_warehouse::ActiveModel {
            user_id: Set(user_id),
            warehouse_code: Set(warehouse.code().to_string()),
            assigned_at: Set(chrono::Utc::now().into()),
        };

        let inserted = entities::UserWarehouse::insert(model)
            .on_conflict(
                OnConflict::columns([
                    user_warehouse::Column::UserId,
                    user_warehouse::Column::WarehouseCode,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(inserted > 0)
    }

    async fn unassign_warehouse(&self, user_id: Uuid, warehouse: Warehouse) -> Result<bool> {
        debug!("Removing warehouse {} from user {}", warehouse, user_id);

        let result = entities::UserWarehouse::delete_many()
            .filter(user_warehouse::Column::UserId.eq(user_id))
            .filter(user_warehouse::Column::WarehouseCode.eq(warehouse.code()))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(result.rows_affected > 0)
    }

    async fn set_permission_snapshot(
        &self,
        user_id: Uuid,
        snapshot: Option<PermissionSnapshot>,
    ) -> Result<()> {
        let Some(snapshot) = snapshot else {
            entities::PermissionSnapshot::delete_by_id(user_id)
                .exec(&self.db)
                .await
                .map_err(GatewayError::Database)?;
            return Ok(());
        };

        let model = permission_snapshot::ActiveModel {
            user_id: Set(user_id),
            permissions: Set(serde_json::to_value(&snapshot)?),
            computed_at: Set(chrono::Utc::now().into()),
        };

        entities::PermissionSnapshot::insert(model)
            .on_conflict(
                OnConflict::column(permission_snapshot::Column::UserId)
                    .update_columns([
                        permission_snapshot::Column::Permissions,
                        permission_snapshot::Column::ComputedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(())
    }

    async fn remove_user(&self, user_id: Uuid) -> Result<()> {
        debug!("Removing all assignments of user {}", user_id);

        let txn = self.db.begin().await.map_err(GatewayError::Database)?;

        entities::UserRole::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        entities::UserWarehouse::delete_many()
            .filter(user_warehouse::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        entities::PermissionSnapshot::delete_by_id(user_id)
            .exec(&txn)
            .await?;

        txn.commit().await.map_err(GatewayError::Database)?;
        Ok(())
    }
}
