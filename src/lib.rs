//! License Admin - internal administration API for software licenses.
//!
//! # Architecture Layers
//!
//! - **cli** / **commands**: `serve`, `migrate` and `bootstrap`
//! - **config**: environment settings and constants
//! - **domain**: users, licenses, keys, procurement, notifications, activity entries
//! - **policy**: the role/department authorization table
//! - **services**: use cases, each taking the caller's session
//! - **infra**: database, Redis views, the activity log file, repositories
//! - **api**: handlers, middleware and routes
//! - **types**: pagination and response envelopes
//! - **errors**: `AppError` and its HTTP mapping
//!
//! # CLI Usage
//!
//! ```bash
//! license-admin migrate up
//! license-admin bootstrap --email root@example.com --name Root --password '...'
//! license-admin serve --port 3000
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod policy;
pub mod services;
pub mod types;

pub use api::AppState;
pub use config::Config;
pub use domain::{Password, Session, User};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
