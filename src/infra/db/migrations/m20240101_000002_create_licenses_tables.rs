//! Migration: Create licenses and license_keys tables.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Licenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Licenses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Licenses::Name).string().not_null())
                    .col(ColumnDef::new(Licenses::Vendor).string().not_null())
                    .col(ColumnDef::new(Licenses::Owner).string().not_null())
                    .col(
                        ColumnDef::new(Licenses::TotalSeats)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Licenses::TotalSeats).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Licenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Licenses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LicenseKeys::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LicenseKeys::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(LicenseKeys::LicenseId).uuid().not_null())
                    .col(ColumnDef::new(LicenseKeys::Key).string().not_null())
                    .col(ColumnDef::new(LicenseKeys::Status).string_len(32).not_null())
                    .col(ColumnDef::new(LicenseKeys::AssignedTo).uuid().null())
                    .col(
                        ColumnDef::new(LicenseKeys::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(LicenseKeys::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_license_keys_license")
                            .from(LicenseKeys::Table, LicenseKeys::LicenseId)
                            .to(Licenses::Table, Licenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_license_keys_assignee")
                            .from(LicenseKeys::Table, LicenseKeys::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_license_keys_license_status")
                    .table(LicenseKeys::Table)
                    .col(LicenseKeys::LicenseId)
                    .col(LicenseKeys::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_license_keys_license_key")
                    .table(LicenseKeys::Table)
                    .col(LicenseKeys::LicenseId)
                    .col(LicenseKeys::Key)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LicenseKeys::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Licenses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Licenses {
    Table,
    Id,
    Name,
    Vendor,
    Owner,
    TotalSeats,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum LicenseKeys {
    Table,
    Id,
    LicenseId,
    Key,
    Status,
    AssignedTo,
    CreatedAt,
    UpdatedAt,
}
