//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed marketplace entities used by the API and
//! persistence layers, the job lifecycle state machine, and the services that
//! implement the driving ports. Keep types free of transport concerns and
//! document invariants and serialisation contracts (serde) in each type's
//! Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic failure payload.
//! - User, Job, Application, Review: core marketplace aggregates.
//! - LifecycleMutation: intents applied atomically on acceptance.
//! - *Service types: implementations of the driving ports.

pub mod address;
pub mod application;
pub mod auth;
pub mod conversation;
pub mod error;
pub mod identifiers;
pub mod job;
pub mod lifecycle;
pub mod notification;
pub mod pagination;
pub mod phone;
pub mod ports;
pub mod realtime;
pub mod review;
pub(crate) mod text_enum;
pub mod trace_id;
pub mod user;

mod application_service;
mod auth_service;
mod job_service;
mod messaging_service;
mod notification_service;
mod profile_service;
mod review_service;
mod service_errors;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::address::{Address, AddressDraft, AddressValidationError, Coordinates};
pub use self::application::{
    Application, ApplicationDraft, ApplicationStatus, ApplicationValidationError,
    HelperApplication,
};
pub use self::application_service::{ApplicationRepositories, ApplicationService};
pub use self::auth::{
    AuthSession, AuthValidationError, LoginCredentials, OtpCode, OtpCodeValue, OtpDispatch,
    OtpPolicy, OtpPurpose, OtpVerified, Password, PhoneVerification, RegistrationDraft, TokenPair,
};
pub use self::auth_service::{AuthAdapters, AuthService};
pub use self::conversation::{
    Conversation, ConversationSummary, Message, MessageContent, MessageQuery,
    MessageValidationError, ParticipantSummary,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::identifiers::{
    AddressId, ApplicationId, CategoryId, ConversationId, InvalidIdentifier, JobId, MessageId,
    NotificationId, ReviewId,
};
pub use self::job::{
    Amount, BudgetType, CancellationReason, Job, JobDraft, JobDraftInput, JobListing, JobSearch,
    JobStatus, JobTransition, JobValidationError, StatusChange, TimePreference,
    TransitionRejection,
};
pub use self::job_service::JobService;
pub use self::lifecycle::{DecisionRejection, LifecycleMutation, check_decline, plan_acceptance};
pub use self::messaging_service::MessagingService;
pub use self::notification::{NewNotification, Notification, NotificationKind};
pub use self::notification_service::NotificationService;
pub use self::pagination::{Page, PageRequest};
pub use self::phone::{PhoneNumber, PhoneValidationError};
pub use self::profile_service::ProfileService;
pub use self::realtime::RealtimeEvent;
pub use self::review::{
    Rating, RatingSummary, RatingsInput, Review, ReviewDraft, ReviewListing, ReviewValidationError,
};
pub use self::review_service::ReviewService;
pub use self::text_enum::UnknownVariant;
pub use self::trace_id::TraceId;
pub use self::user::{
    City, HelperProfile, NewUser, PersonName, ProfileUpdate, PublicProfile, StoredCredentials,
    User, UserAccount, UserId, UserRole, UserStatus, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use khedma::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
