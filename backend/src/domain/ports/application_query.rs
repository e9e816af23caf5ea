//! Driving port for application reads.

use async_trait::async_trait;

use crate::domain::{Application, ApplicationStatus, Error, HelperApplication, JobId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationQuery: Send + Sync {
    /// Applications to a job, visible to its client only.
    async fn job_applications(&self, job: &JobId, client: &UserId)
    -> Result<Vec<Application>, Error>;

    /// The caller's own applications.
    async fn helper_applications(
        &self,
        helper: &UserId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<HelperApplication>, Error>;
}
