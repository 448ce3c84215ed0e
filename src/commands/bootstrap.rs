//! Bootstrap command - create the first account without a session.
//!
//! Only ITSG may create users through the API, so the very first ITSG
//! account has to be written straight to the database.

use crate::cli::args::BootstrapArgs;
use crate::config::Config;
use crate::domain::{NewUser, Password};
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, UserRepository, UserStore};

/// Execute the bootstrap command
pub async fn execute(args: BootstrapArgs, config: Config) -> AppResult<()> {
    let name = args.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::validation("--name must not be blank"));
    }

    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    let users = UserStore::new(db.get_connection());

    let email = args.email.trim().to_lowercase();
    if users.find_by_email(&email).await?.is_some() {
        return Err(AppError::conflict(format!("User {} already exists", email)));
    }

    let password_hash = Password::new(&args.password)?.into_string();
    let user = users
        .create(NewUser {
            name,
            email,
            department: args.department,
            role: args.role,
            manager_id: None,
            added_by: None,
            password_hash,
        })
        .await?;

    tracing::info!(
        user_id = %user.id,
        department = %user.department,
        role = %user.role,
        "bootstrap account created"
    );
    println!("Created {} ({} / {})", user.email, user.department, user.role);
    Ok(())
}
