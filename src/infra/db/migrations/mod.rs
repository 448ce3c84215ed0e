//! Schema history, applied in order by `license-admin migrate up` and on
//! every `serve` start.

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_licenses_tables;
mod m20240101_000003_create_procurement_requests_table;
mod m20240101_000004_create_notifications_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_licenses_tables::Migration),
            Box::new(m20240101_000003_create_procurement_requests_table::Migration),
            Box::new(m20240101_000004_create_notifications_table::Migration),
        ]
    }
}
