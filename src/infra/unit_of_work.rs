//! Unit of Work: one place to reach every repository, plus the transaction
//! runner used by writes that must check-then-write atomically.

use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::repositories::{
    LicenseRepository, LicenseStore, NotificationRepository, NotificationStore,
    ProcurementRepository, ProcurementStore, UserRepository, UserStore,
};
use crate::errors::{AppError, AppResult};

/// Boxed future borrowing an open transaction.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Repository registry injected into services.
///
/// Tests implement this over mockall repositories.
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn licenses(&self) -> Arc<dyn LicenseRepository>;

    fn procurement(&self) -> Arc<dyn ProcurementRepository>;

    fn notifications(&self) -> Arc<dyn NotificationRepository>;
}

/// Concrete implementation of UnitOfWork backed by one connection pool
pub struct Persistence {
    user_repo: Arc<UserStore>,
    license_repo: Arc<LicenseStore>,
    procurement_repo: Arc<ProcurementStore>,
    notification_repo: Arc<NotificationStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            license_repo: Arc::new(LicenseStore::new(db.clone())),
            procurement_repo: Arc::new(ProcurementStore::new(db.clone())),
            notification_repo: Arc::new(NotificationStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn licenses(&self) -> Arc<dyn LicenseRepository> {
        self.license_repo.clone()
    }

    fn procurement(&self) -> Arc<dyn ProcurementRepository> {
        self.procurement_repo.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationRepository> {
        self.notification_repo.clone()
    }
}

/// Isolation for check-then-write sequences that begin by row-locking their
/// parent. The lock orders writers; a stricter level would only add
/// serialization failures.
pub const LOCKED_WRITE_ISOLATION: IsolationLevel = IsolationLevel::ReadCommitted;

/// Run `f` inside a read-write transaction at [`LOCKED_WRITE_ISOLATION`].
///
/// `f` must take its row lock before reading what it checks. Commits when
/// `f` succeeds, rolls back when it fails.
pub async fn locked_write<F, T>(db: &DatabaseConnection, f: F) -> AppResult<T>
where
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> TxFuture<'a, T> + Send,
    T: Send,
{
    let txn = db
        .begin_with_config(Some(LOCKED_WRITE_ISOLATION), Some(AccessMode::ReadWrite))
        .await
        .map_err(AppError::from)?;

    match f(&txn).await {
        Ok(result) => {
            txn.commit().await.map_err(AppError::from)?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Transaction rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}
