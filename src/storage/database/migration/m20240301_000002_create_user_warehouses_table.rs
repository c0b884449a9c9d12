use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserWarehouses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserWarehouses::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserWarehouses::WarehouseCode)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserWarehouses::AssignedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_user_warehouses")
                            .col(UserWarehouses::UserId)
                            .col(UserWarehouses::WarehouseCode),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_warehouses_user_id")
                    .table(UserWarehouses::Table)
                    .col(UserWarehouses::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserWarehouses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserWarehouses {
    Table,
    UserId,
    WarehouseCode,
    AssignedAt,
}
