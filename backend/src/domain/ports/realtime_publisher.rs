//! Port for pushing live events to connected users.

use crate::domain::{RealtimeEvent, UserId};

/// Best-effort live delivery.
///
/// Recipients without an open connection miss the event; the stored
/// conversation remains the source of truth.
#[cfg_attr(test, mockall::automock)]
pub trait RealtimePublisher: Send + Sync {
    fn publish(&self, recipients: &[UserId], event: &RealtimeEvent);
}

/// Publisher that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRealtimePublisher;

impl RealtimePublisher for NoOpRealtimePublisher {
    fn publish(&self, _recipients: &[UserId], _event: &RealtimeEvent) {}
}
