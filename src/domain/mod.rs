//! Domain layer - Core business entities and logic
//!
//! Entities, value objects and seat arithmetic, independent of
//! the database and HTTP layers.

pub mod activity;
pub mod license;
pub mod notification;
pub mod password;
pub mod procurement;
pub mod session;
pub mod user;

pub use activity::{ActivityAction, ActivityEntry};
pub use license::{
    available_seats, KeyStatus, License, LicenseDetail, LicenseKey, LicenseSeats, NewLicenseKey,
};
pub use notification::{NewNotification, Notification, NotificationFeed, NotificationType};
pub use password::Password;
pub use procurement::{LicenseRef, ProcurementRequest, ProcurementStatus, ProcurementView};
pub use session::Session;
pub use user::{
    Department, DirectoryEntry, NewUser, Role, UnknownVariant, User, UserResponse, UserSummary,
};
