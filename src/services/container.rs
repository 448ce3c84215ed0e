//! Wiring of the production service graph.
//!
//! One unit of work, one activity log and the optional view cache are shared
//! by every manager.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, LicenseManager, LicenseService, NotificationManager,
    NotificationService, ProcurementManager, ProcurementService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::{ActivityLog, Cache, Persistence};

pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub licenses: Arc<dyn LicenseService>,
    pub procurement: Arc<dyn ProcurementService>,
    pub notifications: Arc<dyn NotificationService>,
}

impl Services {
    pub fn wire(
        db: sea_orm::DatabaseConnection,
        config: Config,
        cache: Option<Arc<Cache>>,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let activity = Arc::new(ActivityLog::new(config.audit_log_path()));
        tracing::debug!(path = %config.audit_log_path().display(), "activity log target");

        Self {
            licenses: Arc::new(LicenseManager::new(Arc::clone(&uow), activity, cache.clone())),
            users: Arc::new(UserManager::new(Arc::clone(&uow), cache.clone())),
            procurement: Arc::new(ProcurementManager::new(Arc::clone(&uow))),
            notifications: Arc::new(NotificationManager::new(Arc::clone(&uow), cache)),
            auth: Arc::new(Authenticator::new(uow, config)),
        }
    }
}
