//! Jobs, applications and the atomic lifecycle apply.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use super::{MemoryState, MemoryStore, StoredConversation, newest_first, page_of};
use crate::domain::ports::{
    ApplicationPersistenceError, ApplicationRepository, JobLifecyclePersistenceError,
    JobLifecycleRepository, JobPersistenceError, JobRepository,
};
use crate::domain::{
    Application, ApplicationId, ApplicationStatus, HelperApplication, Job, JobId, JobListing,
    JobSearch, JobStatus, LifecycleMutation, StatusChange, UserId,
};

fn listing(state: &MemoryState, job: &Job) -> JobListing {
    let applications_count = state
        .applications
        .iter()
        .filter(|application| application.job_id == job.id)
        .count();
    JobListing {
        job: job.clone(),
        applications_count: i64::try_from(applications_count).unwrap_or(i64::MAX),
        distance_km: None,
    }
}

fn listings(state: &MemoryState, matches: impl Fn(&Job) -> bool) -> Vec<JobListing> {
    newest_first(&state.jobs, |job| job.created_at)
        .into_iter()
        .map(|index| &state.jobs[index])
        .filter(|job| matches(job))
        .map(|job| listing(state, job))
        .collect()
}

#[async_trait]
impl JobRepository for MemoryStore {
    async fn insert(&self, job: &Job) -> Result<(), JobPersistenceError> {
        let mut state = self.lock(JobPersistenceError::connection)?;
        state.jobs.push(job.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>, JobPersistenceError> {
        let state = self.lock(JobPersistenceError::connection)?;
        Ok(state.jobs.iter().find(|job| &job.id == id).cloned())
    }

    async fn search(&self, search: &JobSearch) -> Result<Vec<JobListing>, JobPersistenceError> {
        let state = self.lock(JobPersistenceError::connection)?;
        let found = listings(&state, |job| {
            job.status == search.status
                && search
                    .category_id
                    .as_ref()
                    .is_none_or(|category| &job.category_id == category)
                && search
                    .city
                    .as_deref()
                    .is_none_or(|city| job.city.as_str() == city)
        });
        Ok(page_of(found, search.page.offset(), search.page.limit()))
    }

    async fn list_for_client(
        &self,
        client: &UserId,
        status: Option<JobStatus>,
    ) -> Result<Vec<JobListing>, JobPersistenceError> {
        let state = self.lock(JobPersistenceError::connection)?;
        Ok(listings(&state, |job| {
            &job.client_id == client && status.is_none_or(|status| job.status == status)
        }))
    }

    async fn apply_status_change(
        &self,
        change: &StatusChange,
    ) -> Result<bool, JobPersistenceError> {
        let mut state = self.lock(JobPersistenceError::connection)?;
        let Some(job) = state
            .jobs
            .iter_mut()
            .find(|job| job.id == change.job_id && job.status == change.from)
        else {
            return Ok(false);
        };
        job.apply_change(change);
        let helper = job.assigned_helper_id;

        if change.to == JobStatus::Completed {
            if let Some(profile) = helper.and_then(|id| state.helper_profiles.get_mut(id.as_uuid()))
            {
                profile.total_jobs_completed += 1;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl ApplicationRepository for MemoryStore {
    async fn insert(&self, application: &Application) -> Result<(), ApplicationPersistenceError> {
        let mut state = self.lock(ApplicationPersistenceError::connection)?;
        if state.applications.iter().any(|existing| {
            existing.job_id == application.job_id && existing.helper_id == application.helper_id
        }) {
            return Err(ApplicationPersistenceError::duplicate_application());
        }
        state.applications.push(application.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, ApplicationPersistenceError> {
        let state = self.lock(ApplicationPersistenceError::connection)?;
        Ok(state
            .applications
            .iter()
            .find(|application| &application.id == id)
            .cloned())
    }

    async fn exists_for(
        &self,
        job: &JobId,
        helper: &UserId,
    ) -> Result<bool, ApplicationPersistenceError> {
        let state = self.lock(ApplicationPersistenceError::connection)?;
        Ok(state
            .applications
            .iter()
            .any(|application| &application.job_id == job && &application.helper_id == helper))
    }

    async fn list_for_job(
        &self,
        job: &JobId,
    ) -> Result<Vec<Application>, ApplicationPersistenceError> {
        let state = self.lock(ApplicationPersistenceError::connection)?;
        let mut found: Vec<Application> = state
            .applications
            .iter()
            .filter(|application| &application.job_id == job)
            .cloned()
            .collect();
        found.sort_by_key(|application| application.created_at);
        Ok(found)
    }

    async fn list_for_helper(
        &self,
        helper: &UserId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<HelperApplication>, ApplicationPersistenceError> {
        let state = self.lock(ApplicationPersistenceError::connection)?;
        newest_first(&state.applications, |application| application.created_at)
            .into_iter()
            .map(|index| &state.applications[index])
            .filter(|application| {
                &application.helper_id == helper
                    && status.is_none_or(|status| application.status == status)
            })
            .map(|application| {
                let job = state
                    .jobs
                    .iter()
                    .find(|job| job.id == application.job_id)
                    .cloned()
                    .ok_or_else(|| {
                        ApplicationPersistenceError::query(format!(
                            "application {} references missing job",
                            application.id
                        ))
                    })?;
                Ok(HelperApplication {
                    application: application.clone(),
                    job,
                })
            })
            .collect()
    }

    async fn decline(
        &self,
        id: &ApplicationId,
        at: DateTime<Utc>,
    ) -> Result<bool, ApplicationPersistenceError> {
        let mut state = self.lock(ApplicationPersistenceError::connection)?;
        let Some(application) = state
            .applications
            .iter_mut()
            .find(|application| &application.id == id && application.is_pending())
        else {
            return Ok(false);
        };
        application.status = ApplicationStatus::Declined;
        application.updated_at = at;
        Ok(true)
    }
}

fn apply_mutation(
    state: &mut MemoryState,
    mutation: &LifecycleMutation,
) -> Result<(), JobLifecyclePersistenceError> {
    match mutation {
        LifecycleMutation::AcceptApplication { application_id, at } => {
            let application = state
                .applications
                .iter_mut()
                .find(|application| &application.id == application_id && application.is_pending())
                .ok_or_else(|| {
                    JobLifecyclePersistenceError::stale_state("application is no longer pending")
                })?;
            application.status = ApplicationStatus::Accepted;
            application.updated_at = *at;
        }
        LifecycleMutation::DeclineSiblings {
            job_id,
            accepted,
            at,
        } => {
            for application in state.applications.iter_mut().filter(|application| {
                &application.job_id == job_id
                    && &application.id != accepted
                    && application.is_pending()
            }) {
                application.status = ApplicationStatus::Declined;
                application.updated_at = *at;
            }
        }
        LifecycleMutation::AssignJob {
            job_id,
            helper_id,
            at,
        } => {
            let job = state
                .jobs
                .iter_mut()
                .find(|job| &job.id == job_id && job.status == JobStatus::Open)
                .ok_or_else(|| JobLifecyclePersistenceError::stale_state("job is no longer open"))?;
            job.status = JobStatus::Assigned;
            job.assigned_helper_id = Some(*helper_id);
            job.updated_at = *at;
        }
        LifecycleMutation::OpenConversation(conversation) => {
            if state
                .conversations
                .iter()
                .any(|stored| stored.conversation.job_id == conversation.job_id)
            {
                return Err(JobLifecyclePersistenceError::stale_state(
                    "job already has a conversation",
                ));
            }
            state.conversations.push(StoredConversation {
                conversation: conversation.clone(),
                last_read_at: [None, None],
            });
        }
    }
    Ok(())
}

#[async_trait]
impl JobLifecycleRepository for MemoryStore {
    async fn apply(
        &self,
        mutations: &[LifecycleMutation],
    ) -> Result<(), JobLifecyclePersistenceError> {
        let failing_step = self.take_lifecycle_failure();
        let mut state = self.lock(JobLifecyclePersistenceError::connection)?;
        let mut snapshot = state.clone();
        for (step, mutation) in mutations.iter().enumerate() {
            if failing_step == Some(step) {
                warn!(step, "injected lifecycle failure");
                return Err(JobLifecyclePersistenceError::query(format!(
                    "injected failure at step {step}"
                )));
            }
            apply_mutation(&mut snapshot, mutation)?;
        }
        *state = snapshot;
        Ok(())
    }
}
