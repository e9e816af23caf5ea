//! Application submission and the client's accept/decline decisions.
//!
//! Accepting is the one multi-aggregate change in the marketplace: the
//! chosen application, its siblings, the job and a new conversation all
//! change together. The service plans the change with
//! [`plan_acceptance`](crate::domain::plan_acceptance) and hands the intents
//! to the [`JobLifecycleRepository`] which applies them atomically.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::service_errors::{
    map_application_error, map_job_error, map_lifecycle_error, map_user_error,
};
use crate::domain::ports::{
    ApplicationCommand, ApplicationQuery, ApplicationRepository, JobLifecycleRepository,
    JobRepository, Notifier, UserRepository,
};
use crate::domain::{
    Application, ApplicationDraft, ApplicationId, ApplicationStatus, DecisionRejection, Error,
    HelperApplication, Job, JobId, JobStatus, NewNotification, NotificationKind, UserId, UserRole,
    check_decline, plan_acceptance,
};

/// Repositories used by [`ApplicationService`].
pub struct ApplicationRepositories<A, J, L, U> {
    pub applications: Arc<A>,
    pub jobs: Arc<J>,
    pub lifecycle: Arc<L>,
    pub users: Arc<U>,
}

impl<A, J, L, U> Clone for ApplicationRepositories<A, J, L, U> {
    fn clone(&self) -> Self {
        Self {
            applications: Arc::clone(&self.applications),
            jobs: Arc::clone(&self.jobs),
            lifecycle: Arc::clone(&self.lifecycle),
            users: Arc::clone(&self.users),
        }
    }
}

/// Application service implementing [`ApplicationCommand`] and
/// [`ApplicationQuery`].
#[derive(Clone)]
pub struct ApplicationService<A, J, L, U> {
    repos: ApplicationRepositories<A, J, L, U>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl<A, J, L, U> ApplicationService<A, J, L, U> {
    /// Create the service over the application, job, lifecycle and user stores.
    pub fn new(
        repos: ApplicationRepositories<A, J, L, U>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repos,
            notifier,
            clock,
        }
    }
}

fn map_decision(rejection: DecisionRejection) -> Error {
    match rejection {
        DecisionRejection::NotJobOwner => Error::forbidden(rejection.to_string()),
        DecisionRejection::ApplicationNotPending { .. } | DecisionRejection::JobNotOpen { .. } => {
            Error::conflict(rejection.to_string())
        }
    }
}

impl<A, J, L, U> ApplicationService<A, J, L, U>
where
    A: ApplicationRepository,
    J: JobRepository,
    L: JobLifecycleRepository,
    U: UserRepository,
{
    async fn load_job(&self, id: &JobId) -> Result<Job, Error> {
        self.repos
            .jobs
            .find_by_id(id)
            .await
            .map_err(map_job_error)?
            .ok_or_else(|| Error::not_found("job not found"))
    }

    /// Load an application together with the job it targets.
    async fn load_decision(&self, id: &ApplicationId) -> Result<(Application, Job), Error> {
        let application = self
            .repos
            .applications
            .find_by_id(id)
            .await
            .map_err(map_application_error)?
            .ok_or_else(|| Error::not_found("application not found"))?;
        let job = self.load_job(&application.job_id).await?;
        Ok((application, job))
    }

    async fn ensure_helper(&self, user: &UserId) -> Result<(), Error> {
        let account = self
            .repos
            .users
            .find_account(user)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        if account.user.role != UserRole::Helper {
            return Err(Error::forbidden("only HELPER users may apply to jobs"));
        }
        Ok(())
    }
}

#[async_trait]
impl<A, J, L, U> ApplicationCommand for ApplicationService<A, J, L, U>
where
    A: ApplicationRepository,
    J: JobRepository,
    L: JobLifecycleRepository,
    U: UserRepository,
{
    async fn apply(
        &self,
        helper: &UserId,
        job_id: &JobId,
        draft: ApplicationDraft,
    ) -> Result<Application, Error> {
        self.ensure_helper(helper).await?;
        let job = self.load_job(job_id).await?;
        if job.is_owned_by(helper) {
            return Err(Error::forbidden("you cannot apply to your own job"));
        }
        if job.status != JobStatus::Open {
            return Err(Error::conflict(format!(
                "job is {}; only OPEN jobs accept applications",
                job.status
            )));
        }
        let already_applied = self
            .repos
            .applications
            .exists_for(job_id, helper)
            .await
            .map_err(map_application_error)?;
        if already_applied {
            return Err(Error::conflict("you have already applied to this job"));
        }

        let application = draft.into_application(job.id, *helper, self.clock.utc());
        self.repos
            .applications
            .insert(&application)
            .await
            .map_err(map_application_error)?;
        info!(application_id = %application.id, job_id = %job.id, helper_id = %helper, "application submitted");

        self.notifier
            .notify(NewNotification::about_job(
                job.client_id,
                NotificationKind::NewApplication,
                &job,
            ))
            .await;
        Ok(application)
    }

    async fn accept(
        &self,
        application_id: &ApplicationId,
        client: &UserId,
    ) -> Result<Application, Error> {
        let (mut application, job) = self.load_decision(application_id).await?;
        let now = self.clock.utc();
        let mutations = plan_acceptance(&job, &application, client, now).map_err(map_decision)?;
        self.repos
            .lifecycle
            .apply(&mutations)
            .await
            .map_err(map_lifecycle_error)?;

        application.status = ApplicationStatus::Accepted;
        application.updated_at = now;
        info!(application_id = %application.id, job_id = %job.id, helper_id = %application.helper_id, "application accepted; job assigned");

        self.notifier
            .notify(NewNotification::about_job(
                application.helper_id,
                NotificationKind::ApplicationAccepted,
                &job,
            ))
            .await;
        Ok(application)
    }

    async fn decline(
        &self,
        application_id: &ApplicationId,
        client: &UserId,
    ) -> Result<Application, Error> {
        let (mut application, job) = self.load_decision(application_id).await?;
        check_decline(&job, &application, client).map_err(map_decision)?;

        let now = self.clock.utc();
        let declined = self
            .repos
            .applications
            .decline(application_id, now)
            .await
            .map_err(map_application_error)?;
        if !declined {
            return Err(Error::conflict("application was decided concurrently"));
        }
        application.status = ApplicationStatus::Declined;
        application.updated_at = now;

        self.notifier
            .notify(NewNotification::about_job(
                application.helper_id,
                NotificationKind::ApplicationDeclined,
                &job,
            ))
            .await;
        Ok(application)
    }
}

#[async_trait]
impl<A, J, L, U> ApplicationQuery for ApplicationService<A, J, L, U>
where
    A: ApplicationRepository,
    J: JobRepository,
    L: JobLifecycleRepository,
    U: UserRepository,
{
    async fn job_applications(
        &self,
        job_id: &JobId,
        client: &UserId,
    ) -> Result<Vec<Application>, Error> {
        let job = self.load_job(job_id).await?;
        if !job.is_owned_by(client) {
            return Err(Error::forbidden(
                "only the job's client may view its applications",
            ));
        }
        self.repos
            .applications
            .list_for_job(job_id)
            .await
            .map_err(map_application_error)
    }

    async fn helper_applications(
        &self,
        helper: &UserId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<HelperApplication>, Error> {
        self.repos
            .applications
            .list_for_helper(helper, status)
            .await
            .map_err(map_application_error)
    }
}

#[cfg(test)]
#[path = "application_service_tests.rs"]
mod tests;
