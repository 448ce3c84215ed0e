//! Infrastructure layer - External systems integration
//!
//! - Database connections, migrations and repositories
//! - Redis view cache and rate-limit counters
//! - Append-only license activity log
//! - Unit of Work for repository access and transactions

pub mod activity_log;
pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use activity_log::ActivityLog;
pub use cache::{notifications_tag, Cache};
pub use db::Database;
pub use repositories::{
    LicenseRepository, LicenseStore, NotificationRepository, NotificationStore,
    ProcurementRepository, ProcurementStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockLicenseRepository, MockNotificationRepository, MockProcurementRepository,
    MockUserRepository,
};
