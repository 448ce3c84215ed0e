//! Application services layer - Use cases and business logic.
//!
//! Every service call takes the caller's [`Session`](crate::domain::Session)
//! explicitly, checks it against the policy table, then reaches the
//! repositories through the Unit of Work.

mod auth_service;
pub mod container;
mod license_service;
mod notification_service;
mod procurement_service;
mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use container::Services;

pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse, UserMetadata};
pub use license_service::{AddKeyInput, LicenseManager, LicenseService, UpdateKeyStatusInput};
pub use notification_service::{NotificationManager, NotificationService};
pub use procurement_service::{ProcurementManager, ProcurementService};
pub use user_service::{CreateUserInput, UserManager, UserService};
