//! Helper applications to open jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::text_enum::define_text_enum;
use super::{Amount, ApplicationId, Job, JobId, JobValidationError, UserId};

/// Maximum number of characters in an application message.
pub const APPLICATION_MESSAGE_MAX: usize = 1000;

/// Validation errors for application input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApplicationValidationError {
    #[error("message must be at most {max} characters")]
    MessageTooLong { max: usize },
    #[error(transparent)]
    Rate(#[from] JobValidationError),
}

impl ApplicationValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::MessageTooLong { .. } => "message",
            Self::Rate(inner) => inner.field(),
        }
    }
}

define_text_enum! {
    /// Outcome of an application.
    pub enum ApplicationStatus {
        Pending => "PENDING",
        Accepted => "ACCEPTED",
        Declined => "DECLINED",
        Withdrawn => "WITHDRAWN",
    }
}

/// A helper's offer to take a job.
///
/// ## Invariants
/// - At most one application per `(job_id, helper_id)`.
/// - At most one application per job reaches `ACCEPTED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub helper_id: UserId,
    pub message: Option<String>,
    pub proposed_rate: Option<Amount>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn is_pending(&self) -> bool {
        self.status == ApplicationStatus::Pending
    }
}

/// Validated application input.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationDraft {
    pub message: Option<String>,
    pub proposed_rate: Option<Amount>,
}

impl ApplicationDraft {
    /// Validate an optional cover message and proposed rate.
    pub fn new(
        message: Option<&str>,
        proposed_rate: Option<f64>,
    ) -> Result<Self, ApplicationValidationError> {
        let message = message
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                if value.chars().count() > APPLICATION_MESSAGE_MAX {
                    Err(ApplicationValidationError::MessageTooLong {
                        max: APPLICATION_MESSAGE_MAX,
                    })
                } else {
                    Ok(value.to_owned())
                }
            })
            .transpose()?;
        let proposed_rate = proposed_rate
            .map(|value| Amount::new(value, "proposedRate"))
            .transpose()?;
        Ok(Self {
            message,
            proposed_rate,
        })
    }

    /// Materialise a pending application.
    pub fn into_application(
        self,
        job_id: JobId,
        helper_id: UserId,
        now: DateTime<Utc>,
    ) -> Application {
        Application {
            id: ApplicationId::random(),
            job_id,
            helper_id,
            message: self.message,
            proposed_rate: self.proposed_rate,
            status: ApplicationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Application together with the job it targets, as listed for helpers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelperApplication {
    #[serde(flatten)]
    pub application: Application,
    pub job: Job,
}
