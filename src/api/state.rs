//! Shared handler state.
//!
//! Handlers see services only through their traits, so router tests can
//! build a state from fakes with no database or Redis behind it.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database};
use crate::services::{
    AuthService, LicenseService, NotificationService, ProcurementService, Services, UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub license_service: Arc<dyn LicenseService>,
    pub procurement_service: Arc<dyn ProcurementService>,
    pub notification_service: Arc<dyn NotificationService>,
    /// `None` when Redis is not reachable; caching and rate limiting are skipped
    pub cache: Option<Arc<Cache>>,
    /// `None` only in tests
    pub database: Option<Arc<Database>>,
    /// Whether the login throttle may key on forwarding headers
    pub trust_proxy_headers: bool,
}

impl AppState {
    /// Wire every service over the real database, cache and activity log.
    pub fn from_config(database: Arc<Database>, cache: Option<Arc<Cache>>, config: Config) -> Self {
        let trust_proxy_headers = config.trust_proxy_headers;
        let services = Services::wire(database.get_connection(), config, cache.clone());

        Self {
            auth_service: services.auth,
            user_service: services.users,
            license_service: services.licenses,
            procurement_service: services.procurement,
            notification_service: services.notifications,
            cache,
            database: Some(database),
            trust_proxy_headers,
        }
    }

    /// Create state from manually injected services, without infrastructure.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        license_service: Arc<dyn LicenseService>,
        procurement_service: Arc<dyn ProcurementService>,
        notification_service: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            license_service,
            procurement_service,
            notification_service,
            cache: None,
            database: None,
            trust_proxy_headers: false,
        }
    }
}
