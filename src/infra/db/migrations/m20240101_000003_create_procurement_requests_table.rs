//! Migration: Create procurement_requests table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;
use super::m20240101_000002_create_licenses_tables::Licenses;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProcurementRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProcurementRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProcurementRequests::Title).string().not_null())
                    .col(ColumnDef::new(ProcurementRequests::Justification).text().null())
                    .col(
                        ColumnDef::new(ProcurementRequests::Status)
                            .string_len(32)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(ProcurementRequests::LicenseId).uuid().null())
                    .col(
                        ColumnDef::new(ProcurementRequests::SeatsRequested)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(ProcurementRequests::RequestedBy).uuid().not_null())
                    .col(ColumnDef::new(ProcurementRequests::ApprovedBy).uuid().null())
                    .col(
                        ColumnDef::new(ProcurementRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ProcurementRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_procurement_license")
                            .from(ProcurementRequests::Table, ProcurementRequests::LicenseId)
                            .to(Licenses::Table, Licenses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_procurement_requested_by")
                            .from(ProcurementRequests::Table, ProcurementRequests::RequestedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_procurement_approved_by")
                            .from(ProcurementRequests::Table, ProcurementRequests::ApprovedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_procurement_status")
                    .table(ProcurementRequests::Table)
                    .col(ProcurementRequests::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProcurementRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ProcurementRequests {
    Table,
    Id,
    Title,
    Justification,
    Status,
    LicenseId,
    SeatsRequested,
    RequestedBy,
    ApprovedBy,
    CreatedAt,
    UpdatedAt,
}
