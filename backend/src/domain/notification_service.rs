//! Notification delivery and inbox domain service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::warn;

use super::service_errors::map_notification_error;
use crate::domain::ports::{NotificationInbox, NotificationRepository, Notifier};
use crate::domain::{
    Error, NewNotification, Notification, NotificationId, Page, PageRequest, UserId,
};

/// Stores notifications raised by other services and serves the inbox.
#[derive(Clone)]
pub struct NotificationService<N> {
    repo: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<N> NotificationService<N> {
    /// Create the service over the notification store.
    pub fn new(repo: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

#[async_trait]
impl<N> Notifier for NotificationService<N>
where
    N: NotificationRepository,
{
    async fn notify(&self, notification: NewNotification) {
        let user_id = notification.user_id;
        let kind = notification.kind;
        let stored = notification.into_notification(self.clock.utc());
        if let Err(error) = self.repo.insert(&stored).await {
            warn!(%user_id, %kind, error = %error, "failed to store notification");
        }
    }
}

#[async_trait]
impl<N> NotificationInbox for NotificationService<N>
where
    N: NotificationRepository,
{
    async fn list(
        &self,
        user: &UserId,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<Notification>, Error> {
        let items = self
            .repo
            .list(user, unread_only, page)
            .await
            .map_err(map_notification_error)?;
        Ok(Page::new(items, page))
    }

    async fn unread_count(&self, user: &UserId) -> Result<u64, Error> {
        self.repo
            .unread_count(user)
            .await
            .map_err(map_notification_error)
    }

    async fn mark_read(&self, user: &UserId, ids: Vec<NotificationId>) -> Result<u64, Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.repo
            .mark_read(user, &ids, self.clock.utc())
            .await
            .map_err(map_notification_error)
    }

    async fn mark_all_read(&self, user: &UserId) -> Result<u64, Error> {
        self.repo
            .mark_all_read(user, self.clock.utc())
            .await
            .map_err(map_notification_error)
    }
}
