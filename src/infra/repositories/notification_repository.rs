//! Notification repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::notification::{self, ActiveModel, Entity as NotificationEntity};
use crate::domain::{NewNotification, Notification};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// A user's notifications, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Notification>>;

    async fn count_unread(&self, user_id: Uuid) -> AppResult<u64>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>>;

    /// Set `read = true`. Marking an already-read notification is a no-op.
    async fn mark_read(&self, id: Uuid) -> AppResult<Notification>;

    async fn create(&self, notification: NewNotification) -> AppResult<Notification>;
}

pub struct NotificationStore {
    db: DatabaseConnection,
}

impl NotificationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn map_insert_error(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::validation("user_id does not reference an existing user")
        }
        _ => AppError::from(e),
    }
}

#[async_trait]
impl NotificationRepository for NotificationStore {
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Notification::try_from)
            .collect()
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<u64> {
        let count = NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::Read.eq(false))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        NotificationEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Notification::try_from)
            .transpose()
    }

    async fn mark_read(&self, id: Uuid) -> AppResult<Notification> {
        let model = NotificationEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?;

        if model.read {
            return Notification::try_from(model);
        }

        let mut active: ActiveModel = model.into();
        active.read = Set(true);
        let model = active.update(&self.db).await?;
        Notification::try_from(model)
    }

    async fn create(&self, new: NewNotification) -> AppResult<Notification> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new.user_id),
            title: Set(new.title),
            message: Set(new.message),
            kind: Set(new.kind.as_str().to_string()),
            url: Set(new.url),
            read: Set(false),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(map_insert_error)?;

        Notification::try_from(model)
    }
}
