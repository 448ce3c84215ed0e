//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod license;
pub mod license_key;
pub mod notification;
pub mod procurement_request;
pub mod user;
