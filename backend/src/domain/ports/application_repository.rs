//! Port abstraction for job application persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Application, ApplicationId, ApplicationStatus, HelperApplication, JobId, UserId,
};

use super::define_repository_error;

define_repository_error! {
    /// Persistence errors raised by application repository adapters.
    pub enum ApplicationPersistenceError("application repository") {
        /// The helper already applied to this job.
        DuplicateApplication => "helper already applied to this job",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn insert(&self, application: &Application) -> Result<(), ApplicationPersistenceError>;

    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, ApplicationPersistenceError>;

    async fn exists_for(
        &self,
        job: &JobId,
        helper: &UserId,
    ) -> Result<bool, ApplicationPersistenceError>;

    /// Applications to `job`, oldest first.
    async fn list_for_job(&self, job: &JobId)
    -> Result<Vec<Application>, ApplicationPersistenceError>;

    /// Applications by `helper` with their jobs, newest first.
    async fn list_for_helper(
        &self,
        helper: &UserId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<HelperApplication>, ApplicationPersistenceError>;

    /// Decline the application while it is still pending. Returns `false`
    /// when it was already decided.
    async fn decline(
        &self,
        id: &ApplicationId,
        at: DateTime<Utc>,
    ) -> Result<bool, ApplicationPersistenceError>;
}
