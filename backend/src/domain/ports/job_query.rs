//! Driving port for job reads.

use async_trait::async_trait;

use crate::domain::{Error, Job, JobId, JobListing, JobSearch, JobStatus, Page, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobQuery: Send + Sync {
    /// Public search with optional distance from an origin.
    async fn search(&self, search: JobSearch) -> Result<Page<JobListing>, Error>;

    async fn find_by_id(&self, job: &JobId) -> Result<Job, Error>;

    /// Jobs posted by the caller.
    async fn client_jobs(
        &self,
        client: &UserId,
        status: Option<JobStatus>,
    ) -> Result<Vec<JobListing>, Error>;
}
