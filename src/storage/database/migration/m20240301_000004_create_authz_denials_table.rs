use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuthzDenials::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthzDenials::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuthzDenials::UserId).uuid().null())
                    .col(
                        ColumnDef::new(AuthzDenials::RequestedResource)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuthzDenials::ReasonCode)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AuthzDenials::Reason).text().not_null())
                    .col(ColumnDef::new(AuthzDenials::IpAddress).string().null())
                    .col(ColumnDef::new(AuthzDenials::UserAgent).text().null())
                    .col(ColumnDef::new(AuthzDenials::RequestId).string().null())
                    .col(ColumnDef::new(AuthzDenials::Method).string_len(16).null())
                    .col(ColumnDef::new(AuthzDenials::Path).text().null())
                    .col(
                        ColumnDef::new(AuthzDenials::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_authz_denials_created_at")
                    .table(AuthzDenials::Table)
                    .col(AuthzDenials::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_authz_denials_user_id")
                    .table(AuthzDenials::Table)
                    .col(AuthzDenials::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuthzDenials::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AuthzDenials {
    Table,
    Id,
    UserId,
    RequestedResource,
    ReasonCode,
    Reason,
    IpAddress,
    UserAgent,
    RequestId,
    Method,
    Path,
    CreatedAt,
}
