//! Request layers: session resolution for protected routes and login throttling.

mod auth;
mod rate_limit;

pub use auth::auth_middleware;
pub use rate_limit::rate_limit_login_middleware;
