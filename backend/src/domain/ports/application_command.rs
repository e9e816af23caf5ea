//! Driving port for applying to jobs and deciding on applications.

use async_trait::async_trait;

use crate::domain::{Application, ApplicationDraft, ApplicationId, Error, JobId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationCommand: Send + Sync {
    /// Apply to an open job as a helper.
    async fn apply(
        &self,
        helper: &UserId,
        job: &JobId,
        draft: ApplicationDraft,
    ) -> Result<Application, Error>;

    /// Accept an application, assigning the job atomically.
    async fn accept(&self, application: &ApplicationId, client: &UserId)
    -> Result<Application, Error>;

    /// Decline a pending application.
    async fn decline(
        &self,
        application: &ApplicationId,
        client: &UserId,
    ) -> Result<Application, Error>;
}
