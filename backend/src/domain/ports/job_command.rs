//! Driving port for job creation and status changes.

use async_trait::async_trait;

use crate::domain::{CancellationReason, Error, Job, JobDraft, JobId, JobTransition, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobCommand: Send + Sync {
    /// Post a new job on behalf of a client.
    async fn create(&self, client: &UserId, draft: JobDraft) -> Result<Job, Error>;

    /// Start, complete or confirm a job.
    async fn transition(
        &self,
        job: &JobId,
        actor: &UserId,
        transition: JobTransition,
    ) -> Result<Job, Error>;

    /// Cancel a job on behalf of its client.
    async fn cancel(
        &self,
        job: &JobId,
        actor: &UserId,
        reason: Option<CancellationReason>,
    ) -> Result<Job, Error>;
}
