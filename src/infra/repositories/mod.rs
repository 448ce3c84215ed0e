//! Repository layer: one trait per entity over SeaORM, with a `*Store`
//! implementation and a mockall mock for service tests.

pub(crate) mod entities;
mod license_repository;
mod notification_repository;
mod procurement_repository;
mod search;
mod user_repository;

pub use license_repository::{LicenseRepository, LicenseStore};
pub use notification_repository::{NotificationRepository, NotificationStore};
pub use procurement_repository::{ProcurementRepository, ProcurementStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use license_repository::MockLicenseRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use notification_repository::MockNotificationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use procurement_repository::MockProcurementRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
