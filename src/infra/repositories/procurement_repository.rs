//! Procurement request repository.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;
use uuid::Uuid;

use super::entities::license::Entity as LicenseEntity;
use super::entities::procurement_request::{self, Entity as ProcurementEntity};
use super::entities::user::{self, Entity as UserEntity};
use crate::domain::{LicenseRef, ProcurementRequest, ProcurementStatus, ProcurementView, UserSummary};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProcurementRepository: Send + Sync {
    /// Requests newest first, with license and requester/approver resolved.
    ///
    /// `archived` selects COMPLETED requests; otherwise every other status.
    async fn list(&self, archived: bool) -> AppResult<Vec<ProcurementView>>;
}

pub struct ProcurementStore {
    db: DatabaseConnection,
}

impl ProcurementStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn summaries(&self, ids: Vec<Uuid>) -> AppResult<HashMap<Uuid, UserSummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = UserEntity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;

        Ok(users
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    UserSummary {
                        id: u.id,
                        name: u.name,
                        email: u.email,
                    },
                )
            })
            .collect())
    }
}

#[async_trait]
impl ProcurementRepository for ProcurementStore {
    async fn list(&self, archived: bool) -> AppResult<Vec<ProcurementView>> {
        let archived_status = ProcurementStatus::Completed.as_str();
        let status_filter = if archived {
            procurement_request::Column::Status.eq(archived_status)
        } else {
            procurement_request::Column::Status.ne(archived_status)
        };

        let rows = ProcurementEntity::find()
            .filter(status_filter)
            .order_by_desc(procurement_request::Column::CreatedAt)
            .find_also_related(LicenseEntity)
            .all(&self.db)
            .await?;

        let mut user_ids: Vec<Uuid> = rows
            .iter()
            .flat_map(|(r, _)| std::iter::once(r.requested_by).chain(r.approved_by))
            .collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        let people = self.summaries(user_ids).await?;

        rows.into_iter()
            .map(|(model, license)| -> AppResult<ProcurementView> {
                let request = ProcurementRequest::try_from(model)?;
                Ok(ProcurementView {
                    id: request.id,
                    title: request.title,
                    justification: request.justification,
                    status: request.status,
                    seats_requested: request.seats_requested,
                    license: license.map(|l| LicenseRef {
                        id: l.id,
                        name: l.name,
                        vendor: l.vendor,
                    }),
                    requested_by: people.get(&request.requested_by).cloned(),
                    approved_by: request.approved_by.and_then(|id| people.get(&id).cloned()),
                    created_at: request.created_at,
                    updated_at: request.updated_at,
                })
            })
            .collect()
    }
}
