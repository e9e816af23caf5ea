//! In-memory implementation of every repository port.
//!
//! Used when no database URL is configured and by the HTTP integration
//! tests. All state sits behind one mutex, so each port call is serialised.
//! Lifecycle mutations are applied to a cloned snapshot that replaces the
//! live state only when every step succeeds.
//!
//! Outage and mid-transaction failure hooks exist only in test builds and
//! behind the `test-support` feature.
//!
//! ```
//! use std::sync::Arc;
//! use khedma::domain::ports::JobRepository;
//! use khedma::outbound::memory::MemoryStore;
//!
//! let jobs: Arc<dyn JobRepository> = Arc::new(MemoryStore::new());
//! # let _ = jobs;
//! ```

mod accounts;
mod conversations;
mod feedback;
mod jobs;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Address, Application, Conversation, HelperProfile, Job, Message, Notification, OtpCode,
    Review, StoredCredentials,
};

/// Conversation plus each participant's last read time, by position.
#[derive(Debug, Clone)]
pub(crate) struct StoredConversation {
    pub conversation: Conversation,
    pub last_read_at: [Option<DateTime<Utc>>; 2],
}

/// Everything the store holds. Vectors keep insertion order.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryState {
    pub users: HashMap<Uuid, StoredCredentials>,
    pub helper_profiles: HashMap<Uuid, HelperProfile>,
    pub otp_codes: Vec<OtpCode>,
    pub addresses: Vec<Address>,
    pub jobs: Vec<Job>,
    pub applications: Vec<Application>,
    pub conversations: Vec<StoredConversation>,
    pub messages: Vec<Message>,
    pub reviews: Vec<Review>,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Default)]
struct FailurePlan {
    unavailable: bool,
    lifecycle_step: Option<usize>,
}

/// Shared in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    failures: Mutex<FailurePlan>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a connection error until
    /// cleared.
    #[cfg(any(test, feature = "test-support"))]
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut plan) = self.failures.lock() {
            plan.unavailable = unavailable;
        }
    }

    /// Fail the next lifecycle apply at mutation index `step`, after the
    /// earlier steps have been applied to the snapshot.
    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_lifecycle_step(&self, step: usize) {
        if let Ok(mut plan) = self.failures.lock() {
            plan.lifecycle_step = Some(step);
        }
    }

    fn take_lifecycle_failure(&self) -> Option<usize> {
        self.failures
            .lock()
            .ok()
            .and_then(|mut plan| plan.lifecycle_step.take())
    }

    /// Lock the state, mapping poisoning and injected outages through
    /// `connection`.
    fn lock<E>(
        &self,
        connection: impl FnOnce(String) -> E,
    ) -> Result<MutexGuard<'_, MemoryState>, E> {
        let unavailable = self
            .failures
            .lock()
            .map(|plan| plan.unavailable)
            .unwrap_or(false);
        if unavailable {
            return Err(connection("memory store unavailable".to_owned()));
        }
        self.state
            .lock()
            .map_err(|err| connection(format!("memory store lock poisoned: {err}")))
    }
}

/// Indices of `items` newest first; later insertions win ties.
fn newest_first<T>(items: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).rev().collect();
    order.sort_by_key(|&index| std::cmp::Reverse(created_at(&items[index])));
    order
}

/// Slice a page out of already ordered results.
fn page_of<T>(items: Vec<T>, offset: u64, limit: u32) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    items
        .into_iter()
        .skip(offset)
        .take(limit as usize)
        .collect()
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
