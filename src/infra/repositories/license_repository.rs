//! License and license key repository.
//!
//! Key writes that can consume a seat lock the owning license row and
//! recount ASSIGNED keys after taking the lock, in one read-committed
//! transaction.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use std::collections::HashMap;
use uuid::Uuid;

use super::entities::license::{self, Entity as LicenseEntity};
use super::entities::license_key::{self, Entity as LicenseKeyEntity};
use super::search;
use crate::domain::{available_seats, KeyStatus, License, LicenseKey, NewLicenseKey};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::unit_of_work::locked_write;
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait LicenseRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<License>>;

    /// One page of licenses ordered by name, plus the total match count.
    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<License>, u64)>;

    /// Every license ordered by name.
    async fn list_all(&self) -> AppResult<Vec<License>>;

    /// ASSIGNED key count per license. Licenses without assignments are absent.
    async fn assigned_counts(&self, license_ids: Vec<Uuid>) -> AppResult<HashMap<Uuid, u64>>;

    async fn keys_for_license(&self, license_id: Uuid) -> AppResult<Vec<LicenseKey>>;

    /// Insert a key. An ASSIGNED key needs a free seat, otherwise `Conflict`.
    async fn add_key(&self, key: NewLicenseKey) -> AppResult<LicenseKey>;

    /// Delete a key of `license_id`, returning the removed row.
    async fn delete_key(&self, license_id: Uuid, key_id: Uuid) -> AppResult<LicenseKey>;

    /// Move a key to `status`, returning the previous status and the updated row.
    ///
    /// Entering ASSIGNED needs a free seat; leaving it clears `assigned_to`.
    async fn update_key_status(
        &self,
        license_id: Uuid,
        key_id: Uuid,
        status: KeyStatus,
        assigned_to: Option<Uuid>,
    ) -> AppResult<(KeyStatus, LicenseKey)>;
}

pub struct LicenseStore {
    db: DatabaseConnection,
}

impl LicenseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn name_or_vendor_matches(term: &str) -> Condition {
    Condition::any()
        .add(Expr::expr(Func::lower(Expr::col(license::Column::Name))).like(search::contains(term)))
        .add(Expr::expr(Func::lower(Expr::col(license::Column::Vendor))).like(search::contains(term)))
}

fn map_key_write_error(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::conflict("This key already exists for the license")
        }
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::validation("assigned_to does not reference an existing user")
        }
        _ => AppError::from(e),
    }
}

/// Fail with `Conflict` when every seat of `license` is taken.
async fn ensure_seat_free<C: ConnectionTrait>(conn: &C, license: &license::Model) -> AppResult<()> {
    let assigned = LicenseKeyEntity::find()
        .filter(license_key::Column::LicenseId.eq(license.id))
        .filter(license_key::Column::Status.eq(KeyStatus::Assigned.as_str()))
        .count(conn)
        .await?;

    if available_seats(license.total_seats, assigned) == 0 {
        tracing::info!(
            license_id = %license.id,
            total_seats = license.total_seats,
            assigned,
            "seat assignment rejected"
        );
        return Err(AppError::conflict(format!(
            "License '{}' has no available seats",
            license.name
        )));
    }
    Ok(())
}

async fn lock_license<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<license::Model> {
    LicenseEntity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_not_found()
}

#[async_trait]
impl LicenseRepository for LicenseStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<License>> {
        let model = LicenseEntity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(License::from))
    }

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<License>, u64)> {
        let mut query = LicenseEntity::find();
        if let Some(term) = params.search_term() {
            query = query.filter(name_or_vendor_matches(term));
        }

        let total = query.clone().count(&self.db).await?;
        let models = query
            .order_by_asc(license::Column::Name)
            .offset(params.offset())
            .limit(params.limit())
            .all(&self.db)
            .await?;

        Ok((models.into_iter().map(License::from).collect(), total))
    }

    async fn list_all(&self) -> AppResult<Vec<License>> {
        let models = LicenseEntity::find()
            .order_by_asc(license::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(License::from).collect())
    }

    async fn assigned_counts(&self, license_ids: Vec<Uuid>) -> AppResult<HashMap<Uuid, u64>> {
        if license_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let owners: Vec<Uuid> = LicenseKeyEntity::find()
            .select_only()
            .column(license_key::Column::LicenseId)
            .filter(license_key::Column::LicenseId.is_in(license_ids))
            .filter(license_key::Column::Status.eq(KeyStatus::Assigned.as_str()))
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut counts = HashMap::new();
        for license_id in owners {
            *counts.entry(license_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn keys_for_license(&self, license_id: Uuid) -> AppResult<Vec<LicenseKey>> {
        LicenseKeyEntity::find()
            .filter(license_key::Column::LicenseId.eq(license_id))
            .order_by_asc(license_key::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(LicenseKey::try_from)
            .collect()
    }

    async fn add_key(&self, new_key: NewLicenseKey) -> AppResult<LicenseKey> {
        locked_write(&self.db, move |txn| {
            Box::pin(async move {
                let license = lock_license(txn, new_key.license_id).await?;
                if new_key.status.occupies_seat() {
                    ensure_seat_free(txn, &license).await?;
                }

                let now = chrono::Utc::now();
                let assigned_to = if new_key.status.occupies_seat() {
                    new_key.assigned_to
                } else {
                    None
                };
                let model = license_key::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    license_id: Set(license.id),
                    key: Set(new_key.key),
                    status: Set(new_key.status.as_str().to_string()),
                    assigned_to: Set(assigned_to),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(txn)
                .await
                .map_err(map_key_write_error)?;

                LicenseKey::try_from(model)
            })
        })
        .await
    }

    async fn delete_key(&self, license_id: Uuid, key_id: Uuid) -> AppResult<LicenseKey> {
        let model = LicenseKeyEntity::find_by_id(key_id)
            .filter(license_key::Column::LicenseId.eq(license_id))
            .one(&self.db)
            .await?
            .ok_or_not_found()?;

        let result = LicenseKeyEntity::delete_by_id(model.id)
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        LicenseKey::try_from(model)
    }

    async fn update_key_status(
        &self,
        license_id: Uuid,
        key_id: Uuid,
        status: KeyStatus,
        assigned_to: Option<Uuid>,
    ) -> AppResult<(KeyStatus, LicenseKey)> {
        locked_write(&self.db, move |txn| {
            Box::pin(async move {
                let license = lock_license(txn, license_id).await?;
                let existing = LicenseKeyEntity::find_by_id(key_id)
                    .filter(license_key::Column::LicenseId.eq(license_id))
                    .one(txn)
                    .await?
                    .ok_or_not_found()?;
                let previous = LicenseKey::try_from(existing.clone())?.status;

                if status.occupies_seat() && !previous.occupies_seat() {
                    ensure_seat_free(txn, &license).await?;
                }

                let assignee = if status.occupies_seat() {
                    assigned_to.or(existing.assigned_to)
                } else {
                    None
                };

                let mut active: license_key::ActiveModel = existing.into();
                active.status = Set(status.as_str().to_string());
                active.assigned_to = Set(assignee);
                active.updated_at = Set(chrono::Utc::now());

                let model = active.update(txn).await.map_err(map_key_write_error)?;
                Ok((previous, LicenseKey::try_from(model)?))
            })
        })
        .await
    }
}
