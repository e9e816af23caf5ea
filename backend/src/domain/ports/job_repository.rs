//! Port abstraction for job persistence.
use async_trait::async_trait;

use crate::domain::{Job, JobId, JobListing, JobSearch, JobStatus, StatusChange, UserId};

use super::define_repository_error;

define_repository_error! {
    /// Persistence errors raised by job repository adapters.
    pub enum JobPersistenceError("job repository") {}
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert(&self, job: &Job) -> Result<(), JobPersistenceError>;

    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>, JobPersistenceError>;

    /// Jobs matching the filters, newest first, with application counts.
    /// Distances are left unset.
    async fn search(&self, search: &JobSearch) -> Result<Vec<JobListing>, JobPersistenceError>;

    /// Jobs posted by `client`, newest first.
    async fn list_for_client(
        &self,
        client: &UserId,
        status: Option<JobStatus>,
    ) -> Result<Vec<JobListing>, JobPersistenceError>;

    /// Apply `change` only while the job is still in `change.from`.
    ///
    /// A change to `COMPLETED` also increments the assigned helper's
    /// completed-jobs counter in the same unit of work. Returns `false` when
    /// the job was no longer in the expected state.
    async fn apply_status_change(&self, change: &StatusChange)
    -> Result<bool, JobPersistenceError>;
}
