//! Notification service - the caller's feed, mark-read and sending.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{NewNotification, Notification, NotificationFeed, Session};
use crate::errors::{AppResult, OptionExt};
use crate::infra::{notifications_tag, Cache, UnitOfWork};
use crate::policy::{self, Operation};

const FEED_KEY: &str = "feed";

#[async_trait]
pub trait NotificationService: Send + Sync {
    /// The caller's notifications and unread count
    async fn feed(&self, session: &Session) -> AppResult<NotificationFeed>;

    /// Mark one of the caller's notifications as read
    async fn mark_read(&self, session: &Session, id: Uuid) -> AppResult<Notification>;

    /// Send a notification to any user
    async fn create(&self, session: &Session, notification: NewNotification) -> AppResult<Notification>;
}

pub struct NotificationManager<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Option<Arc<Cache>>,
}

impl<U: UnitOfWork> NotificationManager<U> {
    pub fn new(uow: Arc<U>, cache: Option<Arc<Cache>>) -> Self {
        Self { uow, cache }
    }

    async fn invalidate_feed(&self, user_id: Uuid) {
        if let Some(cache) = &self.cache {
            cache.invalidate_tag(&notifications_tag(user_id)).await;
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> NotificationService for NotificationManager<U> {
    async fn feed(&self, session: &Session) -> AppResult<NotificationFeed> {
        policy::authorize(session, Operation::ReadOwnNotifications)?;

        let tag = notifications_tag(session.user_id);
        if let Some(cache) = &self.cache {
            if let Some(feed) = cache.get_view(&tag, FEED_KEY).await {
                return Ok(feed);
            }
        }

        let repo = self.uow.notifications();
        let notifications = repo.list_for_user(session.user_id).await?;
        let unread_count = repo.count_unread(session.user_id).await?;
        let feed = NotificationFeed {
            notifications,
            unread_count,
        };

        if let Some(cache) = &self.cache {
            cache.set_view(&tag, FEED_KEY, &feed).await;
        }
        Ok(feed)
    }

    async fn mark_read(&self, session: &Session, id: Uuid) -> AppResult<Notification> {
        policy::authorize(session, Operation::MarkNotificationRead)?;

        let repo = self.uow.notifications();
        let notification = repo.find_by_id(id).await?.ok_or_not_found()?;
        policy::ensure_owner(session, notification.user_id, "notification")?;

        if notification.read {
            return Ok(notification);
        }

        let updated = repo.mark_read(id).await?;
        self.invalidate_feed(session.user_id).await;
        Ok(updated)
    }

    async fn create(&self, session: &Session, notification: NewNotification) -> AppResult<Notification> {
        policy::authorize(session, Operation::CreateNotification)?;

        let recipient = notification.user_id;
        let created = self.uow.notifications().create(notification).await?;

        tracing::info!(
            notification_id = %created.id,
            recipient = %recipient,
            kind = created.kind.as_str(),
            sender = %session.user_id,
            "notification sent"
        );
        self.invalidate_feed(recipient).await;
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Department, NotificationType, Role};
    use crate::errors::AppError;
    use crate::infra::MockNotificationRepository;
    use crate::services::test_support::{fixtures, TestUnitOfWork};
    use chrono::Utc;

    fn service(repo: MockNotificationRepository) -> NotificationManager<TestUnitOfWork> {
        NotificationManager::new(Arc::new(TestUnitOfWork::new().with_notifications(repo)), None)
    }

    fn notification(user_id: Uuid, read: bool) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id,
            title: "Seat assigned".to_string(),
            message: "You now have an IDE seat".to_string(),
            kind: NotificationType::LicenseAssigned,
            url: None,
            read,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_feed_counts_unread() {
        let caller = fixtures::session(Role::Employee, Department::Sre);
        let owner = caller.user_id;

        let mut repo = MockNotificationRepository::new();
        repo.expect_list_for_user()
            .returning(move |_| Ok(vec![notification(owner, false), notification(owner, true)]));
        repo.expect_count_unread().returning(|_| Ok(1));

        let feed = service(repo).feed(&caller).await.unwrap();
        assert_eq!(feed.notifications.len(), 2);
        assert_eq!(feed.unread_count, 1);
    }

    #[tokio::test]
    async fn test_mark_read_foreign_notification_forbidden() {
        let caller = fixtures::session(Role::Employee, Department::Sre);
        let foreign = notification(Uuid::new_v4(), false);

        let mut repo = MockNotificationRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(foreign.clone())));
        repo.expect_mark_read().never();

        let err = service(repo).mark_read(&caller, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.to_string(), "Forbidden: notification belongs to another user");
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        let caller = fixtures::session(Role::Employee, Department::Sre);
        let already_read = notification(caller.user_id, true);

        let mut repo = MockNotificationRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(already_read.clone())));
        repo.expect_mark_read().never();

        let result = service(repo).mark_read(&caller, Uuid::new_v4()).await.unwrap();
        assert!(result.read);
    }

    #[tokio::test]
    async fn test_mark_read_unknown_is_not_found() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let caller = fixtures::session(Role::Employee, Department::Sre);
        let err = service(repo).mark_read(&caller, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_create_requires_itsg_or_admin() {
        let new = NewNotification {
            user_id: Uuid::new_v4(),
            title: "Heads up".to_string(),
            message: "Renewal due".to_string(),
            kind: NotificationType::LicenseExpiring,
            url: None,
        };

        let caller = fixtures::session(Role::Manager, Department::Hr);
        let err = service(MockNotificationRepository::new())
            .create(&caller, new.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let mut repo = MockNotificationRepository::new();
        repo.expect_create()
            .withf(|n| n.kind == NotificationType::LicenseExpiring)
            .returning(|n| {
                let mut created = notification(n.user_id, false);
                created.kind = n.kind;
                Ok(created)
            });
        let admin = fixtures::session(Role::Admin, Department::Hr);
        let created = service(repo).create(&admin, new).await.unwrap();
        assert!(!created.read);
    }
}
