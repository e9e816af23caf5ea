//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers below mirror their JSON shape so handlers can return domain
//! values directly while the document still describes every payload.
#![expect(
    dead_code,
    reason = "Mirror types exist only for OpenAPI schema generation via utoipa"
)]

use serde_json::Value;
use utoipa::ToSchema;

/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    #[schema(rename = "conflict")]
    Conflict,
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// API error response payload.
#[derive(ToSchema)]
#[schema(as = Error, rename_all = "camelCase")]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    #[schema(example = "phone number must be a Moroccan mobile number in +212 format")]
    message: String,
    /// Correlation identifier, also sent in the `trace-id` header.
    #[schema(format = "uuid")]
    trace_id: Option<String>,
    /// `{ field, code, value? }` for validation failures.
    details: Option<Value>,
}

#[derive(ToSchema)]
#[schema(as = UserRole)]
pub enum UserRoleSchema {
    #[schema(rename = "CLIENT")]
    Client,
    #[schema(rename = "HELPER")]
    Helper,
    #[schema(rename = "ADMIN")]
    Admin,
}

#[derive(ToSchema)]
#[schema(as = UserStatus)]
pub enum UserStatusSchema {
    #[schema(rename = "PENDING_VERIFICATION")]
    PendingVerification,
    #[schema(rename = "ACTIVE")]
    Active,
    #[schema(rename = "SUSPENDED")]
    Suspended,
    #[schema(rename = "DELETED")]
    Deleted,
}

/// Registered marketplace user.
#[derive(ToSchema)]
#[schema(as = User, rename_all = "camelCase")]
pub struct UserSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(example = "+212612345678")]
    phone: String,
    first_name: String,
    last_name: String,
    role: UserRoleSchema,
    status: UserStatusSchema,
    #[schema(example = "Casablanca")]
    city: String,
    avatar_url: Option<String>,
    phone_verified: bool,
    #[schema(format = "date-time")]
    last_login_at: Option<String>,
    #[schema(format = "date-time")]
    created_at: String,
}

/// Statistics attached to helper accounts.
#[derive(ToSchema)]
#[schema(as = HelperProfile, rename_all = "camelCase")]
pub struct HelperProfileSchema {
    #[schema(format = "uuid")]
    user_id: String,
    bio: Option<String>,
    #[schema(example = 4.5)]
    average_rating: f64,
    total_reviews: i32,
    total_jobs_completed: i32,
    is_verified: bool,
}

/// The caller's own account.
#[derive(ToSchema)]
#[schema(as = UserAccount, rename_all = "camelCase")]
pub struct UserAccountSchema {
    user: UserSchema,
    helper_profile: Option<HelperProfileSchema>,
}

/// Profile visible to other users.
#[derive(ToSchema)]
#[schema(as = PublicProfile, rename_all = "camelCase")]
pub struct PublicProfileSchema {
    #[schema(format = "uuid")]
    id: String,
    first_name: String,
    /// Initial only, e.g. `B.`.
    last_name: String,
    avatar_url: Option<String>,
    city: String,
    role: UserRoleSchema,
    #[schema(format = "date-time")]
    member_since: String,
    helper_profile: Option<HelperProfileSchema>,
}

/// Saved address.
#[derive(ToSchema)]
#[schema(as = Address, rename_all = "camelCase")]
pub struct AddressSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    user_id: String,
    #[schema(example = "Home")]
    label: String,
    street: String,
    city: String,
    neighbourhood: Option<String>,
    #[schema(example = 33.5731)]
    latitude: f64,
    #[schema(example = -7.5898)]
    longitude: f64,
    is_default: bool,
    #[schema(format = "date-time")]
    created_at: String,
}

#[derive(ToSchema)]
#[schema(as = JobStatus)]
pub enum JobStatusSchema {
    #[schema(rename = "OPEN")]
    Open,
    #[schema(rename = "ASSIGNED")]
    Assigned,
    #[schema(rename = "IN_PROGRESS")]
    InProgress,
    #[schema(rename = "PENDING_REVIEW")]
    PendingReview,
    #[schema(rename = "COMPLETED")]
    Completed,
    #[schema(rename = "CANCELLED")]
    Cancelled,
}

#[derive(ToSchema)]
#[schema(as = TimePreference)]
pub enum TimePreferenceSchema {
    #[schema(rename = "MORNING")]
    Morning,
    #[schema(rename = "AFTERNOON")]
    Afternoon,
    #[schema(rename = "EVENING")]
    Evening,
    #[schema(rename = "FLEXIBLE")]
    Flexible,
}

#[derive(ToSchema)]
#[schema(as = BudgetType)]
pub enum BudgetTypeSchema {
    #[schema(rename = "FIXED")]
    Fixed,
    #[schema(rename = "HOURLY")]
    Hourly,
}

/// Job posted by a client.
#[derive(ToSchema)]
#[schema(as = Job, rename_all = "camelCase")]
pub struct JobSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    client_id: String,
    #[schema(format = "uuid")]
    category_id: String,
    #[schema(format = "uuid")]
    address_id: String,
    title: String,
    description: String,
    #[schema(format = "date")]
    preferred_date: Option<String>,
    time_preference: TimePreferenceSchema,
    budget_type: BudgetTypeSchema,
    budget_amount: Option<f64>,
    city: String,
    latitude: f64,
    longitude: f64,
    status: JobStatusSchema,
    #[schema(format = "uuid")]
    assigned_helper_id: Option<String>,
    #[schema(format = "date-time")]
    started_at: Option<String>,
    #[schema(format = "date-time")]
    completed_at: Option<String>,
    #[schema(format = "date-time")]
    cancelled_at: Option<String>,
    cancellation_reason: Option<String>,
    #[schema(format = "date-time")]
    created_at: String,
    #[schema(format = "date-time")]
    updated_at: String,
}

/// Job fields plus its application count and optional search distance.
#[derive(ToSchema)]
#[schema(as = JobListing, rename_all = "camelCase")]
pub struct JobListingSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    client_id: String,
    #[schema(format = "uuid")]
    category_id: String,
    title: String,
    description: String,
    time_preference: TimePreferenceSchema,
    budget_type: BudgetTypeSchema,
    budget_amount: Option<f64>,
    city: String,
    latitude: f64,
    longitude: f64,
    status: JobStatusSchema,
    #[schema(format = "date-time")]
    created_at: String,
    applications_count: i64,
    /// Kilometres from the search origin, when one was given.
    distance: Option<f64>,
}

#[derive(ToSchema)]
#[schema(as = JobPage)]
pub struct JobPageSchema {
    items: Vec<JobListingSchema>,
    page: u32,
    limit: u32,
}

#[derive(ToSchema)]
#[schema(as = ApplicationStatus)]
pub enum ApplicationStatusSchema {
    #[schema(rename = "PENDING")]
    Pending,
    #[schema(rename = "ACCEPTED")]
    Accepted,
    #[schema(rename = "DECLINED")]
    Declined,
    #[schema(rename = "WITHDRAWN")]
    Withdrawn,
}

/// A helper's application to a job.
#[derive(ToSchema)]
#[schema(as = Application, rename_all = "camelCase")]
pub struct ApplicationSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    job_id: String,
    #[schema(format = "uuid")]
    helper_id: String,
    message: Option<String>,
    proposed_rate: Option<f64>,
    status: ApplicationStatusSchema,
    #[schema(format = "date-time")]
    created_at: String,
    #[schema(format = "date-time")]
    updated_at: String,
}

/// Application fields plus the job applied to.
#[derive(ToSchema)]
#[schema(as = HelperApplication, rename_all = "camelCase")]
pub struct HelperApplicationSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    job_id: String,
    message: Option<String>,
    proposed_rate: Option<f64>,
    status: ApplicationStatusSchema,
    #[schema(format = "date-time")]
    created_at: String,
    job: JobSchema,
}

/// Minimal participant card.
#[derive(ToSchema)]
#[schema(as = ParticipantSummary, rename_all = "camelCase")]
pub struct ParticipantSummarySchema {
    #[schema(format = "uuid")]
    id: String,
    first_name: String,
    avatar_url: Option<String>,
}

/// Review of one party of a completed job.
#[derive(ToSchema)]
#[schema(as = Review, rename_all = "camelCase")]
pub struct ReviewSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    job_id: String,
    #[schema(format = "uuid")]
    reviewer_id: String,
    #[schema(format = "uuid")]
    reviewee_id: String,
    #[schema(minimum = 1, maximum = 5)]
    overall_rating: u8,
    punctuality_rating: Option<u8>,
    quality_rating: Option<u8>,
    communication_rating: Option<u8>,
    value_rating: Option<u8>,
    comment: Option<String>,
    /// `true` when the client wrote the review about the helper.
    is_client_review: bool,
    #[schema(format = "date-time")]
    created_at: String,
}

/// Review fields plus reviewer card and job title.
#[derive(ToSchema)]
#[schema(as = ReviewListing, rename_all = "camelCase")]
pub struct ReviewListingSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    job_id: String,
    overall_rating: u8,
    comment: Option<String>,
    is_client_review: bool,
    #[schema(format = "date-time")]
    created_at: String,
    reviewer: ParticipantSummarySchema,
    job_title: String,
}

#[derive(ToSchema)]
#[schema(as = ReviewPage)]
pub struct ReviewPageSchema {
    items: Vec<ReviewListingSchema>,
    page: u32,
    limit: u32,
}

/// Chat message.
#[derive(ToSchema)]
#[schema(as = Message, rename_all = "camelCase")]
pub struct MessageSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    conversation_id: String,
    #[schema(format = "uuid")]
    sender_id: String,
    content: String,
    is_read: bool,
    #[schema(format = "date-time")]
    read_at: Option<String>,
    #[schema(format = "date-time")]
    created_at: String,
}

/// Conversation list entry.
#[derive(ToSchema)]
#[schema(as = ConversationSummary, rename_all = "camelCase")]
pub struct ConversationSummarySchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    job_id: String,
    job_title: String,
    other_participant: Option<ParticipantSummarySchema>,
    last_message: Option<MessageSchema>,
    #[schema(format = "date-time")]
    last_message_at: Option<String>,
}

#[derive(ToSchema)]
#[schema(as = NotificationKind)]
pub enum NotificationKindSchema {
    #[schema(rename = "NEW_APPLICATION")]
    NewApplication,
    #[schema(rename = "APPLICATION_ACCEPTED")]
    ApplicationAccepted,
    #[schema(rename = "APPLICATION_DECLINED")]
    ApplicationDeclined,
    #[schema(rename = "NEW_MESSAGE")]
    NewMessage,
    #[schema(rename = "JOB_STARTED")]
    JobStarted,
    #[schema(rename = "JOB_COMPLETED")]
    JobCompleted,
    #[schema(rename = "NEW_REVIEW")]
    NewReview,
    #[schema(rename = "JOB_CANCELLED")]
    JobCancelled,
}

/// In-app notification.
#[derive(ToSchema)]
#[schema(as = Notification, rename_all = "camelCase")]
pub struct NotificationSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    user_id: String,
    #[schema(rename = "type")]
    kind: NotificationKindSchema,
    title: String,
    body: String,
    /// Ids of the related job and, for messages, conversation.
    data: Value,
    is_read: bool,
    #[schema(format = "date-time")]
    read_at: Option<String>,
    #[schema(format = "date-time")]
    created_at: String,
}

#[derive(ToSchema)]
#[schema(as = NotificationPage)]
pub struct NotificationPageSchema {
    items: Vec<NotificationSchema>,
    page: u32,
    limit: u32,
}

/// Access and refresh tokens.
#[derive(ToSchema)]
#[schema(as = TokenPair, rename_all = "camelCase")]
pub struct TokenPairSchema {
    access_token: String,
    refresh_token: String,
    /// Access token lifetime in seconds.
    #[schema(example = 900)]
    expires_in: i64,
}

/// Authenticated user with fresh tokens.
#[derive(ToSchema)]
#[schema(as = AuthSession)]
pub struct AuthSessionSchema {
    user: UserSchema,
    tokens: TokenPairSchema,
}

/// Acknowledgement of an issued code.
#[derive(ToSchema)]
#[schema(as = OtpDispatch, rename_all = "camelCase")]
pub struct OtpDispatchSchema {
    #[schema(example = "OTP sent successfully")]
    message: String,
    /// Seconds until the code expires.
    #[schema(example = 300)]
    expires_in: i64,
}

/// Phone verification assertion.
#[derive(ToSchema)]
#[schema(as = OtpVerified, rename_all = "camelCase")]
pub struct OtpVerifiedSchema {
    verified: bool,
    verification_token: String,
}

#[cfg(test)]
mod tests {
    use utoipa::PartialSchema;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    fn properties(schema: RefOr<Schema>) -> Vec<String> {
        match schema {
            RefOr::T(Schema::Object(object)) => object.properties.keys().cloned().collect(),
            _ => panic!("expected an object schema"),
        }
    }

    #[test]
    fn error_schema_uses_camel_case_keys() {
        let keys = properties(ErrorSchema::schema());
        assert!(keys.contains(&"traceId".to_owned()));
        assert!(keys.contains(&"details".to_owned()));
    }

    #[test]
    fn notification_kind_field_is_named_type() {
        let keys = properties(NotificationSchema::schema());
        assert!(keys.contains(&"type".to_owned()));
        assert!(!keys.contains(&"kind".to_owned()));
    }
}
