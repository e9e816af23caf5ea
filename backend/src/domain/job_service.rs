//! Job posting, search and status transition domain service.
//!
//! Status writes are compare-and-swap operations on the expected source
//! state; a lost race surfaces as a conflict rather than overwriting the
//! concurrent change.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::service_errors::{map_address_error, map_job_error, map_user_error};
use crate::domain::ports::{
    AddressRepository, JobCommand, JobQuery, JobRepository, Notifier, UserRepository,
};
use crate::domain::{
    CancellationReason, Error, Job, JobDraft, JobId, JobListing, JobSearch, JobStatus,
    JobTransition, NewNotification, NotificationKind, Page, StatusChange, TransitionRejection,
    UserId, UserRole,
};

/// Job service implementing [`JobCommand`] and [`JobQuery`].
#[derive(Clone)]
pub struct JobService<J, A, U> {
    jobs: Arc<J>,
    addresses: Arc<A>,
    users: Arc<U>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl<J, A, U> JobService<J, A, U> {
    /// Create the service over the job, address and user stores.
    pub fn new(
        jobs: Arc<J>,
        addresses: Arc<A>,
        users: Arc<U>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            jobs,
            addresses,
            users,
            notifier,
            clock,
        }
    }
}

pub(crate) fn map_rejection(rejection: TransitionRejection, expected: &str) -> Error {
    match rejection {
        TransitionRejection::NotPermitted => {
            Error::forbidden("you are not allowed to change this job")
        }
        TransitionRejection::InvalidState { current } => {
            Error::conflict(format!("job is {current}; expected {expected}"))
        }
    }
}

impl<J, A, U> JobService<J, A, U>
where
    J: JobRepository,
    A: AddressRepository,
    U: UserRepository,
{
    async fn load(&self, id: &JobId) -> Result<Job, Error> {
        self.jobs
            .find_by_id(id)
            .await
            .map_err(map_job_error)?
            .ok_or_else(|| Error::not_found("job not found"))
    }

    async fn require_role(&self, user: &UserId, role: UserRole) -> Result<(), Error> {
        let account = self
            .users
            .find_account(user)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        if account.user.role != role {
            return Err(Error::forbidden(format!("only {role} users may do this")));
        }
        Ok(())
    }

    async fn write(&self, mut job: Job, change: StatusChange) -> Result<Job, Error> {
        let applied = self
            .jobs
            .apply_status_change(&change)
            .await
            .map_err(map_job_error)?;
        if !applied {
            return Err(Error::conflict("job status changed concurrently"));
        }
        job.apply_change(&change);
        info!(job_id = %job.id, from = %change.from, to = %change.to, "job status changed");
        Ok(job)
    }
}

#[async_trait]
impl<J, A, U> JobCommand for JobService<J, A, U>
where
    J: JobRepository,
    A: AddressRepository,
    U: UserRepository,
{
    async fn create(&self, client: &UserId, draft: JobDraft) -> Result<Job, Error> {
        self.require_role(client, UserRole::Client).await?;

        let address = self
            .addresses
            .find_by_id(&draft.address_id)
            .await
            .map_err(map_address_error)?
            .ok_or_else(|| Error::not_found("address not found"))?;
        if &address.user_id != client {
            return Err(Error::forbidden("address belongs to another user"));
        }

        let job = draft.into_job(*client, &address, self.clock.utc());
        self.jobs.insert(&job).await.map_err(map_job_error)?;
        info!(job_id = %job.id, client_id = %client, "job posted");
        Ok(job)
    }

    async fn transition(
        &self,
        job_id: &JobId,
        actor: &UserId,
        transition: JobTransition,
    ) -> Result<Job, Error> {
        let job = self.load(job_id).await?;
        let change = job
            .plan_transition(actor, transition, self.clock.utc())
            .map_err(|rejection| map_rejection(rejection, transition.source().as_str()))?;
        let job = self.write(job, change).await?;

        let (recipient, kind) = match transition {
            JobTransition::Start => (Some(job.client_id), NotificationKind::JobStarted),
            JobTransition::Complete => (Some(job.client_id), NotificationKind::JobCompleted),
            JobTransition::Confirm => (job.assigned_helper_id, NotificationKind::JobCompleted),
        };
        if let Some(recipient) = recipient {
            self.notifier
                .notify(NewNotification::about_job(recipient, kind, &job))
                .await;
        }
        Ok(job)
    }

    async fn cancel(
        &self,
        job_id: &JobId,
        actor: &UserId,
        reason: Option<CancellationReason>,
    ) -> Result<Job, Error> {
        let job = self.load(job_id).await?;
        let change = job
            .plan_cancellation(actor, reason, self.clock.utc())
            .map_err(|rejection| map_rejection(rejection, "OPEN, ASSIGNED or IN_PROGRESS"))?;
        let job = self.write(job, change).await?;

        if let Some(helper) = job.assigned_helper_id {
            self.notifier
                .notify(NewNotification::about_job(
                    helper,
                    NotificationKind::JobCancelled,
                    &job,
                ))
                .await;
        }
        Ok(job)
    }
}

#[async_trait]
impl<J, A, U> JobQuery for JobService<J, A, U>
where
    J: JobRepository,
    A: AddressRepository,
    U: UserRepository,
{
    async fn search(&self, search: JobSearch) -> Result<Page<JobListing>, Error> {
        let listings = self.jobs.search(&search).await.map_err(map_job_error)?;
        let items = listings
            .into_iter()
            .map(|listing| listing.measured_from(search.origin.as_ref()))
            .collect();
        Ok(Page::new(items, search.page))
    }

    async fn find_by_id(&self, job: &JobId) -> Result<Job, Error> {
        self.load(job).await
    }

    async fn client_jobs(
        &self,
        client: &UserId,
        status: Option<JobStatus>,
    ) -> Result<Vec<JobListing>, Error> {
        self.jobs
            .list_for_client(client, status)
            .await
            .map_err(map_job_error)
    }
}

#[cfg(test)]
#[path = "job_service_tests.rs"]
mod tests;
