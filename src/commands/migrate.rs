//! `migrate`: schema management without starting the server.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::db::MigrationState;
use crate::infra::Database;

pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        MigrateAction::Up => db.run_migrations().await?,
        MigrateAction::Down => {
            db.rollback_migration().await?;
            tracing::info!("rolled back the most recent migration");
        }
        MigrateAction::Status => print_status(&db.migration_status().await?),
        MigrateAction::Fresh => {
            tracing::warn!("dropping every table before re-applying the schema");
            db.fresh_migrations().await?;
        }
    }

    Ok(())
}

fn print_status(states: &[MigrationState]) {
    println!("{:<60} STATE", "MIGRATION");
    for state in states {
        let label = if state.applied { "applied" } else { "pending" };
        println!("{:<60} {}", state.name, label);
    }

    let pending = states.iter().filter(|s| !s.applied).count();
    tracing::info!(total = states.len(), pending, "migration status");
}
