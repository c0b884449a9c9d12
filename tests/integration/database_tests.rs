//! Database integration tests
//!
//! Exercises the SeaORM stores against a real in-memory SQLite database.

#[cfg(test)]
mod tests {
    use crate::common::TestDatabase;
    use crate::common::database::test_db_config;
    use sea_orm::{EntityTrait, QueryFilter, Set};
    use uuid::Uuid;
    use warehouse_gate::auth::rbac::{
        AccessLevel, Capability, DenyReason, PermissionMatrix, PermissionSnapshot,
        PermissionSource, RbacSystem, Role, Warehouse, merge_roles, warehouse_condition,
    };
    use warehouse_gate::auth::{ClientMetadata, DenialEvent, Identity};
    use warehouse_gate::config::RbacConfig;
    use warehouse_gate::storage::database::entities::{self, user_role, user_warehouse};
    use warehouse_gate::storage::database::{Database, DatabaseBackendType};
    use warehouse_gate::storage::{AssignmentStore, AuditStore, AuthorizationStore};

    #[tokio::test]
    async fn test_database_health_check() {
        let db = TestDatabase::new().await;
        assert_eq!(db.db().backend_type(), DatabaseBackendType::SQLite);

        let health = db.db().health_check().await;
        assert!(health.is_ok(), "Health check failed: {:?}", health.err());
    }

    #[tokio::test]
    async fn test_health_check_fails_before_migration() {
        let db = Database::new(&test_db_config())
            .await
            .expect("Failed to create database");
        assert!(db.health_check().await.is_err());

        db.migrate().await.expect("Migration failed");
        assert!(db.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_migrations_are_rerunnable() {
        let db = TestDatabase::new().await;
        let result = db.db().migrate().await;
        assert!(result.is_ok(), "Migration failed: {:?}", result.err());
    }

    #[tokio::test]
    async fn test_role_assignment_round_trip() {
        let db = TestDatabase::new().await;
        let store = db.db();
        let user = Uuid::new_v4();

        assert!(store.assign_role(user, Role::Supervisor).await.unwrap());
        assert!(!store.assign_role(user, Role::Supervisor).await.unwrap());
        assert!(store.assign_role(user, Role::Staff).await.unwrap());

        let mut roles = store.user_roles(user).await.unwrap();
        roles.sort();
        assert_eq!(roles, vec![Role::Supervisor, Role::Staff]);

        assert!(store.unassign_role(user, Role::Staff).await.unwrap());
        assert!(!store.unassign_role(user, Role::Staff).await.unwrap());
        assert_eq!(store.user_roles(user).await.unwrap(), vec![Role::Supervisor]);

        // Other users are unaffected
        assert!(store.user_roles(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_warehouse_assignment_round_trip() {
        let db = TestDatabase::new().await;
        let store = db.db();
        let user = Uuid::new_v4();

        assert!(store.assign_warehouse(user, Warehouse::Kkb).await.unwrap());
        assert!(!store.assign_warehouse(user, Warehouse::Kkb).await.unwrap());
        assert!(store.assign_warehouse(user, Warehouse::Ubb).await.unwrap());

        let mut warehouses = store.user_warehouses(user).await.unwrap();
        warehouses.sort();
        assert_eq!(warehouses, vec![Warehouse::Ubb, Warehouse::Kkb]);

        assert!(store.unassign_warehouse(user, Warehouse::Ubb).await.unwrap());
        assert_eq!(store.user_warehouses(user).await.unwrap(), vec![Warehouse::Kkb]);
    }

    #[tokio::test]
    async fn test_unknown_stored_role_is_ignored() {
        let db = TestDatabase::new().await;
        let user = Uuid::new_v4();

        let stray = user_role::ActiveModel {
            user_id: Set(user),
            role: Set("owner".to_string()),
            assigned_at: Set(chrono::Utc::now().into()),
        };
        entities::UserRole::insert(stray)
            .exec_without_returning(db.db().connection())
            .await
            .unwrap();
        db.db().assign_role(user, Role::Staff).await.unwrap();

        assert_eq!(db.db().user_roles(user).await.unwrap(), vec![Role::Staff]);
    }

    #[tokio::test]
    async fn test_snapshot_upsert_and_clear() {
        let db = TestDatabase::new().await;
        let store = db.db();
        let user = Uuid::new_v4();

        assert!(store.permission_snapshot(user).await.unwrap().is_none());

        let first: PermissionSnapshot =
            [(Capability::ViewStock, AccessLevel::Granted)].into_iter().collect();
        store
            .set_permission_snapshot(user, Some(first))
            .await
            .unwrap();

        let second: PermissionSnapshot = [
            (Capability::ViewStock, AccessLevel::Granted),
            (Capability::ViewReports, AccessLevel::Granted),
        ]
        .into_iter()
        .collect();
        store
            .set_permission_snapshot(user, Some(second.clone()))
            .await
            .unwrap();
        assert_eq!(store.permission_snapshot(user).await.unwrap(), Some(second));

        store.set_permission_snapshot(user, None).await.unwrap();
        assert!(store.permission_snapshot(user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_role_change_clears_snapshot() {
        let db = TestDatabase::new().await;
        let store = db.db();
        let user = Uuid::new_v4();

        store.assign_role(user, Role::Admin).await.unwrap();
        let snapshot: PermissionSnapshot =
            merge_roles(&PermissionMatrix::standard(), &[Role::Admin]).iter().collect();
        store
            .set_permission_snapshot(user, Some(snapshot.clone()))
            .await
            .unwrap();

        // Nothing changed, the snapshot stays
        assert!(!store.assign_role(user, Role::Admin).await.unwrap());
        assert_eq!(store.permission_snapshot(user).await.unwrap(), Some(snapshot));

        assert!(store.unassign_role(user, Role::Admin).await.unwrap());
        assert!(store.permission_snapshot(user).await.unwrap().is_none());

        let rbac = RbacSystem::new(&RbacConfig::default(), db.db_arc()).unwrap();
        let ctx = rbac
            .builder()
            .resolve(&Identity::new(user))
            .await
            .into_result()
            .unwrap();
        assert_eq!(ctx.source, PermissionSource::Merged);
        assert!(ctx.roles.is_empty());
        assert!(!ctx.can(Capability::ManageUsers));
        assert!(!ctx.can(Capability::SystemSettings));
    }

    #[tokio::test]
    async fn test_remove_user_clears_all_tables() {
        let db = TestDatabase::new().await;
        let store = db.db();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        store.assign_role(user, Role::Admin).await.unwrap();
        store.assign_role(other, Role::Admin).await.unwrap();
        store.assign_warehouse(user, Warehouse::Srg).await.unwrap();
        store
            .set_permission_snapshot(
                user,
                Some([(Capability::ViewDashboard, AccessLevel::Granted)].into_iter().collect()),
            )
            .await
            .unwrap();

        store.remove_user(user).await.unwrap();

        assert!(store.user_roles(user).await.unwrap().is_empty());
        assert!(store.user_warehouses(user).await.unwrap().is_empty());
        assert!(store.permission_snapshot(user).await.unwrap().is_none());
        assert_eq!(store.user_roles(other).await.unwrap(), vec![Role::Admin]);
    }

    #[tokio::test]
    async fn test_denials_listed_newest_first() {
        let db = TestDatabase::new().await;
        let store = db.db();
        let user = Uuid::new_v4();

        for (offset, resource) in ["GET /a", "GET /b", "GET /c"].into_iter().enumerate() {
            let mut event = DenialEvent::new(
                Some(user),
                resource,
                &DenyReason::WarehouseAccessDenied {
                    warehouse: Warehouse::Mma,
                },
                ClientMetadata {
                    ip_address: Some("10.0.0.7".to_string()),
                    request_id: Some(format!("req-{}", offset)),
                    ..Default::default()
                },
            );
            event.timestamp += chrono::Duration::seconds(offset as i64);
            store.record_denial(&event).await.unwrap();
        }

        let recent = store.recent_denials(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].requested_resource, "GET /c");
        assert_eq!(recent[1].requested_resource, "GET /b");
        assert_eq!(recent[0].reason_code, "WAREHOUSE_ACCESS_DENIED");
        assert_eq!(recent[0].client.ip_address.as_deref(), Some("10.0.0.7"));
        assert_eq!(recent[0].user_id, Some(user));

        let count = entities::AuthzDenial::find().all(db.db().connection()).await.unwrap().len();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_warehouse_condition_filters_rows() {
        let db = TestDatabase::new().await;
        let conn = db.db().connection();
        for warehouse in Warehouse::ALL {
            db.db().assign_warehouse(Uuid::new_v4(), warehouse).await.unwrap();
        }

        let rbac = RbacSystem::new(&RbacConfig::default(), db.db_arc()).unwrap();
        let visible = |roles: Vec<Role>, assigned: &[Warehouse]| {
            let access = rbac
                .builder()
                .assemble(Uuid::new_v4(), roles, assigned, None)
                .warehouses;
            entities::UserWarehouse::find().filter(warehouse_condition(
                &access,
                user_warehouse::Column::WarehouseCode,
            ))
        };

        let rows = visible(vec![Role::Staff], &[Warehouse::Mma, Warehouse::Srg])
            .all(conn)
            .await
            .unwrap();
        let mut codes: Vec<String> = rows.into_iter().map(|row| row.warehouse_code).collect();
        codes.sort();
        assert_eq!(codes, vec!["MMA", "SRG"]);

        let rows = visible(vec![Role::Staff], &[]).all(conn).await.unwrap();
        assert!(rows.is_empty());

        let rows = visible(vec![Role::OpsManager], &[]).all(conn).await.unwrap();
        assert_eq!(rows.len(), Warehouse::ALL.len());
    }
}
