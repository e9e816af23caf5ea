//! Mutation intents applied atomically when a client decides on an
//! application.
//!
//! Accepting an application touches three aggregates at once. The domain
//! expresses the change as an ordered list of [`LifecycleMutation`]s and the
//! `JobLifecycleRepository` port applies the whole list in one unit of work,
//! or none of it.

use chrono::{DateTime, Utc};

use super::{
    Application, ApplicationId, ApplicationStatus, Conversation, Job, JobId, JobStatus, UserId,
};

/// One step of an atomic lifecycle change.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleMutation {
    /// Mark the chosen application `ACCEPTED`.
    AcceptApplication {
        application_id: ApplicationId,
        at: DateTime<Utc>,
    },
    /// Mark every other application of the job `DECLINED`.
    DeclineSiblings {
        job_id: JobId,
        accepted: ApplicationId,
        at: DateTime<Utc>,
    },
    /// Move the job from `OPEN` to `ASSIGNED`; fails if it is no longer open.
    AssignJob {
        job_id: JobId,
        helper_id: UserId,
        at: DateTime<Utc>,
    },
    /// Create the job conversation between client and helper.
    OpenConversation(Conversation),
}

/// Why a client's decision on an application was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecisionRejection {
    #[error("only the job's client may decide on its applications")]
    NotJobOwner,
    #[error("application is {status}")]
    ApplicationNotPending { status: ApplicationStatus },
    #[error("job is {status}")]
    JobNotOpen { status: JobStatus },
}

fn ensure_pending(
    job: &Job,
    application: &Application,
    actor: &UserId,
) -> Result<(), DecisionRejection> {
    if !job.is_owned_by(actor) {
        return Err(DecisionRejection::NotJobOwner);
    }
    if !application.is_pending() {
        return Err(DecisionRejection::ApplicationNotPending {
            status: application.status,
        });
    }
    Ok(())
}

/// Plan the four intents that accept `application` for `job`.
///
/// # Examples
/// ```
/// # use khedma::domain::*;
/// # fn demo(job: &Job, application: &Application) {
/// let plan = plan_acceptance(job, application, &job.client_id, chrono::Utc::now());
/// if let Ok(mutations) = plan {
///     assert_eq!(mutations.len(), 4);
/// }
/// # }
/// ```
pub fn plan_acceptance(
    job: &Job,
    application: &Application,
    actor: &UserId,
    now: DateTime<Utc>,
) -> Result<Vec<LifecycleMutation>, DecisionRejection> {
    ensure_pending(job, application, actor)?;
    if job.status != JobStatus::Open {
        return Err(DecisionRejection::JobNotOpen { status: job.status });
    }
    Ok(vec![
        LifecycleMutation::AcceptApplication {
            application_id: application.id,
            at: now,
        },
        LifecycleMutation::DeclineSiblings {
            job_id: job.id,
            accepted: application.id,
            at: now,
        },
        LifecycleMutation::AssignJob {
            job_id: job.id,
            helper_id: application.helper_id,
            at: now,
        },
        LifecycleMutation::OpenConversation(Conversation::open(
            job.id,
            job.client_id,
            application.helper_id,
            now,
        )),
    ])
}

/// Check that `actor` may decline `application`.
pub fn check_decline(
    job: &Job,
    application: &Application,
    actor: &UserId,
) -> Result<(), DecisionRejection> {
    ensure_pending(job, application, actor)
}
