//! Port for raising in-app notifications from other use cases.
use async_trait::async_trait;

use crate::domain::NewNotification;

/// Fire-and-forget notification delivery.
///
/// Implementations must not fail the caller: delivery problems are logged
/// and swallowed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: NewNotification);
}

/// Notifier that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(&self, _notification: NewNotification) {}
}
