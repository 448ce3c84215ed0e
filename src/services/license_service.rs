//! License service - seat views, key management and the activity trail.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::VIEW_TAG_LICENSES;
use crate::domain::{
    ActivityAction, ActivityEntry, KeyStatus, License, LicenseDetail, LicenseKey, LicenseSeats,
    NewLicenseKey, Session,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{ActivityLog, Cache, UnitOfWork};
use crate::policy::{self, Operation};
use crate::types::{Paginated, PaginationParams};

const DROPDOWNS_KEY: &str = "dropdowns";

#[derive(Debug, Clone)]
pub struct AddKeyInput {
    pub key: String,
    /// Defaults to AVAILABLE
    pub status: Option<KeyStatus>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct UpdateKeyStatusInput {
    pub status: KeyStatus,
    pub assigned_to: Option<Uuid>,
}

#[async_trait]
pub trait LicenseService: Send + Sync {
    async fn list_licenses(
        &self,
        session: &Session,
        params: PaginationParams,
    ) -> AppResult<Paginated<LicenseSeats>>;

    /// Every license with its available seat count
    async fn dropdowns(&self, session: &Session) -> AppResult<Vec<LicenseSeats>>;

    async fn get_license(&self, session: &Session, id: Uuid) -> AppResult<LicenseDetail>;

    async fn add_key(
        &self,
        session: &Session,
        license_id: Uuid,
        input: AddKeyInput,
    ) -> AppResult<LicenseKey>;

    async fn remove_key(&self, session: &Session, license_id: Uuid, key_id: Uuid) -> AppResult<()>;

    async fn update_key_status(
        &self,
        session: &Session,
        license_id: Uuid,
        key_id: Uuid,
        input: UpdateKeyStatusInput,
    ) -> AppResult<LicenseKey>;

    /// Activity for one license, newest first
    async fn read_logs(&self, session: &Session, license_id: Uuid) -> AppResult<Vec<ActivityEntry>>;
}

pub struct LicenseManager<U: UnitOfWork> {
    uow: Arc<U>,
    activity: Arc<ActivityLog>,
    cache: Option<Arc<Cache>>,
}

impl<U: UnitOfWork> LicenseManager<U> {
    pub fn new(uow: Arc<U>, activity: Arc<ActivityLog>, cache: Option<Arc<Cache>>) -> Self {
        Self {
            uow,
            activity,
            cache,
        }
    }

    async fn with_seats(&self, licenses: Vec<License>) -> AppResult<Vec<LicenseSeats>> {
        let ids = licenses.iter().map(|l| l.id).collect();
        let counts = self.uow.licenses().assigned_counts(ids).await?;

        Ok(licenses
            .into_iter()
            .map(|l| {
                let assigned = counts.get(&l.id).copied().unwrap_or(0);
                LicenseSeats::new(l, assigned)
            })
            .collect())
    }

    /// Post-mutation side effects. Neither may fail the request.
    async fn record(&self, entry: ActivityEntry) {
        if let Err(e) = self.activity.append(&entry).await {
            tracing::error!(
                license_id = %entry.license_id,
                action = ?entry.action,
                "activity entry lost: {}",
                e
            );
        }
        if let Some(cache) = &self.cache {
            cache.invalidate_tag(VIEW_TAG_LICENSES).await;
        }
    }
}

fn list_cache_key(params: &PaginationParams) -> String {
    format!(
        "list:{}:{}:{}",
        params.page.max(1),
        params.limit(),
        params.search_term().unwrap_or_default().to_lowercase()
    )
}

#[async_trait]
impl<U: UnitOfWork> LicenseService for LicenseManager<U> {
    async fn list_licenses(
        &self,
        session: &Session,
        params: PaginationParams,
    ) -> AppResult<Paginated<LicenseSeats>> {
        policy::authorize(session, Operation::ViewLicenses)?;

        let key = list_cache_key(&params);
        if let Some(cache) = &self.cache {
            if let Some(page) = cache.get_view(VIEW_TAG_LICENSES, &key).await {
                return Ok(page);
            }
        }

        let (licenses, total) = self.uow.licenses().list(params.clone()).await?;
        let page = Paginated::new(self.with_seats(licenses).await?, &params, total);

        if let Some(cache) = &self.cache {
            cache.set_view(VIEW_TAG_LICENSES, &key, &page).await;
        }
        Ok(page)
    }

    async fn dropdowns(&self, session: &Session) -> AppResult<Vec<LicenseSeats>> {
        policy::authorize(session, Operation::ViewLicenseDropdowns)?;

        if let Some(cache) = &self.cache {
            if let Some(options) = cache.get_view(VIEW_TAG_LICENSES, DROPDOWNS_KEY).await {
                return Ok(options);
            }
        }

        let licenses = self.uow.licenses().list_all().await?;
        let options = self.with_seats(licenses).await?;

        if let Some(cache) = &self.cache {
            cache.set_view(VIEW_TAG_LICENSES, DROPDOWNS_KEY, &options).await;
        }
        Ok(options)
    }

    async fn get_license(&self, session: &Session, id: Uuid) -> AppResult<LicenseDetail> {
        policy::authorize(session, Operation::ViewLicenses)?;

        let repo = self.uow.licenses();
        let license = repo.find_by_id(id).await?.ok_or_not_found()?;
        let keys = repo.keys_for_license(id).await?;
        Ok(LicenseDetail::new(license, keys))
    }

    async fn add_key(
        &self,
        session: &Session,
        license_id: Uuid,
        input: AddKeyInput,
    ) -> AppResult<LicenseKey> {
        policy::authorize(session, Operation::ManageLicenseKeys)?;

        let key = input.key.trim();
        if key.is_empty() {
            return Err(AppError::validation("key must not be empty"));
        }

        let created = self
            .uow
            .licenses()
            .add_key(NewLicenseKey {
                license_id,
                key: key.to_string(),
                status: input.status.unwrap_or(KeyStatus::Available),
                assigned_to: input.assigned_to,
            })
            .await?;

        tracing::info!(
            license_id = %license_id,
            key_id = %created.id,
            status = %created.status,
            actor = %session.user_id,
            "license key added"
        );
        self.record(
            ActivityEntry::new(license_id, ActivityAction::KeyAdded, session.user_id, &session.email)
                .key(created.id)
                .details(format!("status {}", created.status)),
        )
        .await;

        Ok(created)
    }

    async fn remove_key(&self, session: &Session, license_id: Uuid, key_id: Uuid) -> AppResult<()> {
        policy::authorize(session, Operation::ManageLicenseKeys)?;

        let removed = self.uow.licenses().delete_key(license_id, key_id).await?;

        tracing::info!(license_id = %license_id, key_id = %key_id, actor = %session.user_id, "license key removed");
        self.record(
            ActivityEntry::new(license_id, ActivityAction::KeyRemoved, session.user_id, &session.email)
                .key(key_id)
                .details(format!("removed while {}", removed.status)),
        )
        .await;

        Ok(())
    }

    async fn update_key_status(
        &self,
        session: &Session,
        license_id: Uuid,
        key_id: Uuid,
        input: UpdateKeyStatusInput,
    ) -> AppResult<LicenseKey> {
        policy::authorize(session, Operation::ManageLicenseKeys)?;

        let (previous, updated) = self
            .uow
            .licenses()
            .update_key_status(license_id, key_id, input.status, input.assigned_to)
            .await?;

        tracing::info!(
            license_id = %license_id,
            key_id = %key_id,
            from = %previous,
            to = %updated.status,
            actor = %session.user_id,
            "license key status changed"
        );
        self.record(
            ActivityEntry::new(
                license_id,
                ActivityAction::KeyStatusChanged,
                session.user_id,
                &session.email,
            )
            .key(key_id)
            .details(format!("{} -> {}", previous, updated.status)),
        )
        .await;

        Ok(updated)
    }

    async fn read_logs(&self, session: &Session, license_id: Uuid) -> AppResult<Vec<ActivityEntry>> {
        policy::authorize(session, Operation::ViewLicenseLogs)?;
        self.activity.read_for_license(license_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Department, Role};
    use crate::infra::MockLicenseRepository;
    use crate::services::test_support::{fixtures, TestUnitOfWork};
    use chrono::Utc;
    use mockall::predicate::eq;
    use std::collections::HashMap;

    fn temp_activity() -> Arc<ActivityLog> {
        let dir = std::env::temp_dir().join(format!("license-service-{}", Uuid::new_v4()));
        Arc::new(ActivityLog::new(dir.join("license-activity.log")))
    }

    fn service(repo: MockLicenseRepository, activity: Arc<ActivityLog>) -> LicenseManager<TestUnitOfWork> {
        LicenseManager::new(Arc::new(TestUnitOfWork::new().with_licenses(repo)), activity, None)
    }

    fn staff() -> Session {
        fixtures::session(Role::Employee, Department::Itsg)
    }

    fn license(total_seats: i32) -> License {
        License {
            id: Uuid::new_v4(),
            name: "IDE".to_string(),
            vendor: "JetBrains".to_string(),
            owner: "ITSG".to_string(),
            total_seats,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn stored_key(license_id: Uuid, status: KeyStatus) -> LicenseKey {
        LicenseKey {
            id: Uuid::new_v4(),
            license_id,
            key: "ABCD-1234".to_string(),
            status,
            assigned_to: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_dropdowns_compute_available_seats() {
        let full = license(2);
        let spare = license(5);
        let (full_id, spare_id) = (full.id, spare.id);

        let mut repo = MockLicenseRepository::new();
        repo.expect_list_all()
            .returning(move || Ok(vec![full.clone(), spare.clone()]));
        repo.expect_assigned_counts().returning(move |_| {
            // Over-assigned licenses floor at zero
            Ok(HashMap::from([(full_id, 3)]))
        });

        let caller = fixtures::session(Role::Employee, Department::Hr);
        let options = service(repo, temp_activity()).dropdowns(&caller).await.unwrap();

        let seats: HashMap<Uuid, u64> = options.iter().map(|o| (o.id, o.available_seats)).collect();
        assert_eq!(seats[&full_id], 0);
        assert_eq!(seats[&spare_id], 5);
    }

    #[tokio::test]
    async fn test_list_licenses_requires_license_staff() {
        let caller = fixtures::session(Role::Manager, Department::Sre);
        let err = service(MockLicenseRepository::new(), temp_activity())
            .list_licenses(&caller, PaginationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_get_license_not_found() {
        let mut repo = MockLicenseRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let err = service(repo, temp_activity())
            .get_license(&staff(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_add_key_defaults_to_available_and_logs() {
        let license_id = Uuid::new_v4();
        let mut repo = MockLicenseRepository::new();
        repo.expect_add_key()
            .withf(move |k| k.license_id == license_id && k.status == KeyStatus::Available && k.key == "ABCD-1234")
            .returning(|k| Ok(stored_key(k.license_id, k.status)));

        let activity = temp_activity();
        let svc = service(repo, activity.clone());
        let caller = staff();
        let key = svc
            .add_key(
                &caller,
                license_id,
                AddKeyInput {
                    key: "  ABCD-1234 ".to_string(),
                    status: None,
                    assigned_to: None,
                },
            )
            .await
            .unwrap();

        let entries = activity.read_for_license(license_id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, ActivityAction::KeyAdded);
        assert_eq!(entries[0].key_id, Some(key.id));
        assert_eq!(entries[0].actor_id, caller.user_id);
    }

    #[tokio::test]
    async fn test_add_key_without_seats_conflicts() {
        let mut repo = MockLicenseRepository::new();
        repo.expect_add_key()
            .returning(|_| Err(AppError::conflict("License 'IDE' has no available seats")));

        let activity = temp_activity();
        let license_id = Uuid::new_v4();
        let err = service(repo, activity.clone())
            .add_key(
                &staff(),
                license_id,
                AddKeyInput {
                    key: "ABCD-1234".to_string(),
                    status: Some(KeyStatus::Assigned),
                    assigned_to: Some(Uuid::new_v4()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert!(activity.read_for_license(license_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_key_rejected() {
        let err = service(MockLicenseRepository::new(), temp_activity())
            .add_key(
                &staff(),
                Uuid::new_v4(),
                AddKeyInput {
                    key: "   ".to_string(),
                    status: None,
                    assigned_to: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_remove_key_guarded_like_add() {
        let caller = fixtures::session(Role::Finance, Department::Finance);
        let err = service(MockLicenseRepository::new(), temp_activity())
            .remove_key(&caller, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_update_status_logs_transition() {
        let license_id = Uuid::new_v4();
        let key_id = Uuid::new_v4();
        let mut repo = MockLicenseRepository::new();
        repo.expect_update_key_status()
            .with(eq(license_id), eq(key_id), eq(KeyStatus::Revoked), eq(None::<Uuid>))
            .returning(|license_id, key_id, status, _| {
                let mut key = stored_key(license_id, status);
                key.id = key_id;
                Ok((KeyStatus::Assigned, key))
            });

        let activity = temp_activity();
        let caller = fixtures::session(Role::AccountOwner, Department::Hr);
        let updated = service(repo, activity.clone())
            .update_key_status(
                &caller,
                license_id,
                key_id,
                UpdateKeyStatusInput {
                    status: KeyStatus::Revoked,
                    assigned_to: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, KeyStatus::Revoked);

        let entries = activity.read_for_license(license_id).await.unwrap();
        assert_eq!(entries[0].details.as_deref(), Some("ASSIGNED -> REVOKED"));
    }

    #[tokio::test]
    async fn test_read_logs_requires_license_staff() {
        let caller = fixtures::session(Role::Manager, Department::Finance);
        let err = service(MockLicenseRepository::new(), temp_activity())
            .read_logs(&caller, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
