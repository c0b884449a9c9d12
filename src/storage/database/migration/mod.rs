use sea_orm_migration::prelude::*;

mod m20240301_000001_create_user_roles_table;
mod m20240301_000002_create_user_warehouses_table;
mod m20240301_000003_create_user_permission_snapshots_table;
mod m20240301_000004_create_authz_denials_table;

/// Database migrator for SeaORM
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_user_roles_table::Migration),
            Box::new(m20240301_000002_create_user_warehouses_table::Migration),
            Box::new(m20240301_000003_create_user_permission_snapshots_table::Migration),
            Box::new(m20240301_000004_create_authz_denials_table::Migration),
        ]
    }
}
