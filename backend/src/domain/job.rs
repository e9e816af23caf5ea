//! Jobs and their lifecycle state machine.
//!
//! ```text
//! OPEN --accept--> ASSIGNED --start--> IN_PROGRESS --complete--> PENDING_REVIEW
//!   --confirm--> COMPLETED
//! OPEN | ASSIGNED | IN_PROGRESS --cancel--> CANCELLED
//! ```
//!
//! The domain only plans transitions. Adapters apply a [`StatusChange`] as a
//! compare-and-swap on its `from` status so concurrent writers cannot both
//! win.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::text_enum::define_text_enum;
use super::{Address, AddressId, CategoryId, City, Coordinates, JobId, PageRequest, UserId};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 120;
pub const DESCRIPTION_MIN: usize = 10;
pub const DESCRIPTION_MAX: usize = 2000;
pub const AMOUNT_MAX: f64 = 100_000.0;
pub const CANCELLATION_REASON_MAX: usize = 500;

/// Validation errors for job input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JobValidationError {
    #[error("title must be between {min} and {max} characters")]
    TitleLength { min: usize, max: usize },
    #[error("description must be between {min} and {max} characters")]
    DescriptionLength { min: usize, max: usize },
    #[error("{field} must be greater than 0 and at most {max}")]
    AmountOutOfRange { field: &'static str, max: f64 },
    #[error("cancellation reason must be at most {max} characters")]
    ReasonTooLong { max: usize },
}

impl JobValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::TitleLength { .. } => "title",
            Self::DescriptionLength { .. } => "description",
            Self::AmountOutOfRange { field, .. } => field,
            Self::ReasonTooLong { .. } => "reason",
        }
    }
}

define_text_enum! {
    /// Position of a job in its lifecycle.
    pub enum JobStatus {
        Open => "OPEN",
        Assigned => "ASSIGNED",
        InProgress => "IN_PROGRESS",
        PendingReview => "PENDING_REVIEW",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

impl JobStatus {
    /// Whether the owning client may still cancel.
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Open | Self::Assigned | Self::InProgress)
    }
}

define_text_enum! {
    /// Part of the day the client prefers.
    pub enum TimePreference {
        Morning => "MORNING",
        Afternoon => "AFTERNOON",
        Evening => "EVENING",
        Flexible => "FLEXIBLE",
    }
}

define_text_enum! {
    /// How the budget amount is interpreted.
    pub enum BudgetType {
        Fixed => "FIXED",
        Hourly => "HOURLY",
    }
}

/// Monetary amount in dirhams, `0 < amount <= 100000`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Amount(f64);

impl Amount {
    /// Validate an amount for the named input field.
    pub fn new(value: f64, field: &'static str) -> Result<Self, JobValidationError> {
        if value.is_finite() && value > 0.0 && value <= AMOUNT_MAX {
            Ok(Self(value))
        } else {
            Err(JobValidationError::AmountOutOfRange {
                field,
                max: AMOUNT_MAX,
            })
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<Amount> for f64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl TryFrom<f64> for Amount {
    type Error = JobValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value, "amount")
    }
}

fn length_between(value: &str, min: usize, max: usize) -> Option<String> {
    let trimmed = value.trim();
    let length = trimmed.chars().count();
    (min..=max).contains(&length).then(|| trimmed.to_owned())
}

/// A job posted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub client_id: UserId,
    pub category_id: CategoryId,
    pub address_id: AddressId,
    pub title: String,
    pub description: String,
    pub preferred_date: Option<NaiveDate>,
    pub time_preference: TimePreference,
    pub budget_type: BudgetType,
    pub budget_amount: Option<Amount>,
    pub city: City,
    #[serde(flatten)]
    pub location: Coordinates,
    pub status: JobStatus,
    pub assigned_helper_id: Option<UserId>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDraft {
    pub category_id: CategoryId,
    pub address_id: AddressId,
    pub title: String,
    pub description: String,
    pub preferred_date: Option<NaiveDate>,
    pub time_preference: TimePreference,
    pub budget_type: BudgetType,
    pub budget_amount: Option<Amount>,
}

/// Raw job fields before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDraftInput<'a> {
    pub category_id: CategoryId,
    pub address_id: AddressId,
    pub title: &'a str,
    pub description: &'a str,
    pub preferred_date: Option<NaiveDate>,
    pub time_preference: Option<TimePreference>,
    pub budget_type: Option<BudgetType>,
    pub budget_amount: Option<f64>,
}

impl JobDraft {
    /// Validate raw input; missing preferences default to flexible/fixed.
    pub fn new(input: JobDraftInput<'_>) -> Result<Self, JobValidationError> {
        let title = length_between(input.title, TITLE_MIN, TITLE_MAX).ok_or(
            JobValidationError::TitleLength {
                min: TITLE_MIN,
                max: TITLE_MAX,
            },
        )?;
        let description = length_between(input.description, DESCRIPTION_MIN, DESCRIPTION_MAX)
            .ok_or(JobValidationError::DescriptionLength {
                min: DESCRIPTION_MIN,
                max: DESCRIPTION_MAX,
            })?;
        let budget_amount = input
            .budget_amount
            .map(|value| Amount::new(value, "budgetAmount"))
            .transpose()?;
        Ok(Self {
            category_id: input.category_id,
            address_id: input.address_id,
            title,
            description,
            preferred_date: input.preferred_date,
            time_preference: input.time_preference.unwrap_or(TimePreference::Flexible),
            budget_type: input.budget_type.unwrap_or(BudgetType::Fixed),
            budget_amount,
        })
    }

    /// Open a job at `address`, copying its city and coordinates.
    pub fn into_job(self, client_id: UserId, address: &Address, now: DateTime<Utc>) -> Job {
        Job {
            id: JobId::random(),
            client_id,
            category_id: self.category_id,
            address_id: self.address_id,
            title: self.title,
            description: self.description,
            preferred_date: self.preferred_date,
            time_preference: self.time_preference,
            budget_type: self.budget_type,
            budget_amount: self.budget_amount,
            city: address.city.clone(),
            location: address.location,
            status: JobStatus::Open,
            assigned_helper_id: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Optional free-text reason given when cancelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationReason(String);

impl CancellationReason {
    /// Validate a reason; blank text yields `None`.
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, JobValidationError> {
        let Some(trimmed) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(None);
        };
        if trimmed.chars().count() > CANCELLATION_REASON_MAX {
            return Err(JobValidationError::ReasonTooLong {
                max: CANCELLATION_REASON_MAX,
            });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Status transitions driven by the job's parties after assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobTransition {
    /// Assigned helper begins work.
    Start,
    /// Assigned helper reports the work done.
    Complete,
    /// Client confirms completion.
    Confirm,
}

impl JobTransition {
    pub const fn source(self) -> JobStatus {
        match self {
            Self::Start => JobStatus::Assigned,
            Self::Complete => JobStatus::InProgress,
            Self::Confirm => JobStatus::PendingReview,
        }
    }

    pub const fn target(self) -> JobStatus {
        match self {
            Self::Start => JobStatus::InProgress,
            Self::Complete => JobStatus::PendingReview,
            Self::Confirm => JobStatus::Completed,
        }
    }

    const fn client_driven(self) -> bool {
        matches!(self, Self::Confirm)
    }
}

/// Why a planned transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionRejection {
    #[error("user is not allowed to change this job")]
    NotPermitted,
    #[error("job is {current}")]
    InvalidState { current: JobStatus },
}

/// A compare-and-swap status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub job_id: JobId,
    pub from: JobStatus,
    pub to: JobStatus,
    pub at: DateTime<Utc>,
    pub cancellation_reason: Option<String>,
}

impl Job {
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.client_id == user
    }

    pub fn is_assigned_to(&self, user: &UserId) -> bool {
        self.assigned_helper_id.as_ref() == Some(user)
    }

    /// The other party of the job from `user`'s point of view.
    pub fn counterpart_of(&self, user: &UserId) -> Option<UserId> {
        if self.is_owned_by(user) {
            self.assigned_helper_id
        } else if self.is_assigned_to(user) {
            Some(self.client_id)
        } else {
            None
        }
    }

    /// Plan a start, complete or confirm transition for `actor`.
    pub fn plan_transition(
        &self,
        actor: &UserId,
        transition: JobTransition,
        now: DateTime<Utc>,
    ) -> Result<StatusChange, TransitionRejection> {
        let permitted = if transition.client_driven() {
            self.is_owned_by(actor)
        } else {
            self.is_assigned_to(actor)
        };
        if !permitted {
            return Err(TransitionRejection::NotPermitted);
        }
        if self.status != transition.source() {
            return Err(TransitionRejection::InvalidState {
                current: self.status,
            });
        }
        Ok(StatusChange {
            job_id: self.id,
            from: self.status,
            to: transition.target(),
            at: now,
            cancellation_reason: None,
        })
    }

    /// Plan a cancellation by the owning client.
    pub fn plan_cancellation(
        &self,
        actor: &UserId,
        reason: Option<CancellationReason>,
        now: DateTime<Utc>,
    ) -> Result<StatusChange, TransitionRejection> {
        if !self.is_owned_by(actor) {
            return Err(TransitionRejection::NotPermitted);
        }
        if !self.status.is_cancellable() {
            return Err(TransitionRejection::InvalidState {
                current: self.status,
            });
        }
        Ok(StatusChange {
            job_id: self.id,
            from: self.status,
            to: JobStatus::Cancelled,
            at: now,
            cancellation_reason: reason.map(|reason| reason.0),
        })
    }

    /// Apply a status change, stamping the matching timestamp.
    pub fn apply_change(&mut self, change: &StatusChange) {
        self.status = change.to;
        self.updated_at = change.at;
        match change.to {
            JobStatus::InProgress => self.started_at = Some(change.at),
            JobStatus::Completed => self.completed_at = Some(change.at),
            JobStatus::Cancelled => {
                self.cancelled_at = Some(change.at);
                self.cancellation_reason = change.cancellation_reason.clone();
            }
            JobStatus::Open | JobStatus::Assigned | JobStatus::PendingReview => {}
        }
    }
}

/// Filters for the public job search.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSearch {
    pub status: JobStatus,
    pub category_id: Option<CategoryId>,
    pub city: Option<String>,
    pub origin: Option<Coordinates>,
    pub page: PageRequest,
}

impl JobSearch {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 50;
}

/// Job with its application count and optional distance from the searcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    #[serde(flatten)]
    pub job: Job,
    pub applications_count: i64,
    #[serde(rename = "distance", skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl JobListing {
    /// Attach the distance from `origin`, when given.
    pub fn measured_from(mut self, origin: Option<&Coordinates>) -> Self {
        self.distance_km = origin.map(|origin| origin.distance_km(&self.job.location));
        self
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
