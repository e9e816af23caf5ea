//! Port for applying lifecycle intents atomically.
use async_trait::async_trait;

use crate::domain::LifecycleMutation;

use super::define_repository_error;

define_repository_error! {
    /// Errors raised while applying lifecycle mutations.
    pub enum JobLifecyclePersistenceError("lifecycle repository") {
        /// A compare-and-swap guard did not match; nothing was applied.
        StaleState { message: String } => "lifecycle state changed concurrently: {message}",
    }
}

/// Applies a list of [`LifecycleMutation`]s as one unit of work.
///
/// Either every mutation takes effect or none does.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobLifecycleRepository: Send + Sync {
    async fn apply(&self, mutations: &[LifecycleMutation])
    -> Result<(), JobLifecyclePersistenceError>;
}
