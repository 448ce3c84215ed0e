//! Unit of Work over mockall repositories for service tests.

use std::sync::Arc;

use crate::infra::{
    LicenseRepository, MockLicenseRepository, MockNotificationRepository,
    MockProcurementRepository, MockUserRepository, NotificationRepository, ProcurementRepository,
    UnitOfWork, UserRepository,
};

/// Repositories without expectations panic when called.
pub struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    licenses: Arc<MockLicenseRepository>,
    procurement: Arc<MockProcurementRepository>,
    notifications: Arc<MockNotificationRepository>,
}

impl TestUnitOfWork {
    pub fn new() -> Self {
        Self {
            users: Arc::new(MockUserRepository::new()),
            licenses: Arc::new(MockLicenseRepository::new()),
            procurement: Arc::new(MockProcurementRepository::new()),
            notifications: Arc::new(MockNotificationRepository::new()),
        }
    }

    pub fn with_users(mut self, repo: MockUserRepository) -> Self {
        self.users = Arc::new(repo);
        self
    }

    pub fn with_licenses(mut self, repo: MockLicenseRepository) -> Self {
        self.licenses = Arc::new(repo);
        self
    }

    pub fn with_procurement(mut self, repo: MockProcurementRepository) -> Self {
        self.procurement = Arc::new(repo);
        self
    }

    pub fn with_notifications(mut self, repo: MockNotificationRepository) -> Self {
        self.notifications = Arc::new(repo);
        self
    }
}

impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn licenses(&self) -> Arc<dyn LicenseRepository> {
        self.licenses.clone()
    }

    fn procurement(&self) -> Arc<dyn ProcurementRepository> {
        self.procurement.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationRepository> {
        self.notifications.clone()
    }
}

pub mod fixtures {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::domain::{Department, Role, Session, User};

    pub fn session(role: Role, department: Department) -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "caller@example.com".to_string(),
            role: Some(role),
            department: Some(department),
        }
    }

    pub fn user(name: &str, department: Department, role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            department,
            role,
            manager_id: None,
            added_by: None,
            password_hash: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
