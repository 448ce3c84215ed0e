//! HTTP request handlers.

pub mod auth_handler;
pub mod license_handler;
pub mod notification_handler;
pub mod procurement_handler;
pub mod user_handler;

pub use auth_handler::{auth_routes, session_routes};
pub use license_handler::{license_log_routes, license_routes};
pub use notification_handler::notification_routes;
pub use procurement_handler::procurement_routes;
pub use user_handler::user_routes;
