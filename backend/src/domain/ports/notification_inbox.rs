//! Driving port for a user's notification inbox.

use async_trait::async_trait;

use crate::domain::{Error, Notification, NotificationId, Page, PageRequest, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationInbox: Send + Sync {
    async fn list(
        &self,
        user: &UserId,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<Notification>, Error>;

    async fn unread_count(&self, user: &UserId) -> Result<u64, Error>;

    /// Mark the given notifications read; ids owned by others are ignored.
    async fn mark_read(&self, user: &UserId, ids: Vec<NotificationId>) -> Result<u64, Error>;

    async fn mark_all_read(&self, user: &UserId) -> Result<u64, Error>;
}
