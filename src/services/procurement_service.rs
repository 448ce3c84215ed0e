//! Procurement service - read-only procurement listing.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{ProcurementView, Session};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;
use crate::policy::{self, Operation};

#[async_trait]
pub trait ProcurementService: Send + Sync {
    /// Active requests, or COMPLETED ones when `archived`
    async fn list(&self, session: &Session, archived: bool) -> AppResult<Vec<ProcurementView>>;
}

pub struct ProcurementManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ProcurementManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ProcurementService for ProcurementManager<U> {
    async fn list(&self, session: &Session, archived: bool) -> AppResult<Vec<ProcurementView>> {
        policy::authorize(session, Operation::ViewProcurement)?;
        self.uow.procurement().list(archived).await
    }
}
