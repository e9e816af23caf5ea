//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer, the mirror
//! schemas describing domain payloads, the request bodies, and the bearer
//! token security scheme. The document is served by Swagger UI in debug
//! builds and exported via `cargo run --bin openapi-dump` for tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::applications::ApplyRequestBody;
use crate::inbound::http::auth::{
    LoginRequestBody, RefreshRequestBody, RegisterRequestBody, SendOtpRequestBody,
    VerifyOtpRequestBody,
};
use crate::inbound::http::conversations::SendMessageRequestBody;
use crate::inbound::http::health::StatusResponseBody;
use crate::inbound::http::jobs::{CancelJobRequestBody, CreateJobRequestBody};
use crate::inbound::http::notifications::{
    MarkReadRequestBody, MarkedReadResponseBody, UnreadCountResponseBody,
};
use crate::inbound::http::reviews::CreateReviewRequestBody;
use crate::inbound::http::schemas::{
    AddressSchema, ApplicationSchema, ApplicationStatusSchema, AuthSessionSchema,
    BudgetTypeSchema, ConversationSummarySchema, ErrorCodeSchema, ErrorSchema,
    HelperApplicationSchema, HelperProfileSchema, JobListingSchema, JobPageSchema, JobSchema,
    JobStatusSchema, MessageSchema, NotificationKindSchema, NotificationPageSchema,
    NotificationSchema, OtpDispatchSchema, OtpVerifiedSchema, ParticipantSummarySchema,
    PublicProfileSchema, ReviewListingSchema, ReviewPageSchema, ReviewSchema,
    TimePreferenceSchema, TokenPairSchema, UserAccountSchema, UserRoleSchema, UserSchema,
    UserStatusSchema,
};
use crate::inbound::http::users::{CreateAddressRequestBody, UpdateProfileRequestBody};

/// Name of the bearer security scheme referenced by protected paths.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the JWT bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token issued by POST /api/v1/auth/login or /auth/register.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Khedma API",
        description = "Local services marketplace: clients post jobs, helpers apply, and both sides review each other.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::health::status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::auth::send_otp,
        crate::inbound::http::auth::verify_otp,
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::refresh,
        crate::inbound::http::jobs::create_job,
        crate::inbound::http::jobs::search_jobs,
        crate::inbound::http::jobs::my_jobs,
        crate::inbound::http::jobs::get_job,
        crate::inbound::http::jobs::start_job,
        crate::inbound::http::jobs::complete_job,
        crate::inbound::http::jobs::confirm_job,
        crate::inbound::http::jobs::cancel_job,
        crate::inbound::http::applications::apply,
        crate::inbound::http::applications::job_applications,
        crate::inbound::http::applications::my_applications,
        crate::inbound::http::applications::accept,
        crate::inbound::http::applications::decline,
        crate::inbound::http::reviews::create_review,
        crate::inbound::http::reviews::user_reviews,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::users::list_addresses,
        crate::inbound::http::users::add_address,
        crate::inbound::http::users::public_profile,
        crate::inbound::http::conversations::list_conversations,
        crate::inbound::http::conversations::list_messages,
        crate::inbound::http::conversations::send_message,
        crate::inbound::http::conversations::mark_read,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::unread_count,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::notifications::mark_all_read,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserRoleSchema,
        UserStatusSchema,
        UserSchema,
        HelperProfileSchema,
        UserAccountSchema,
        PublicProfileSchema,
        AddressSchema,
        JobStatusSchema,
        TimePreferenceSchema,
        BudgetTypeSchema,
        JobSchema,
        JobListingSchema,
        JobPageSchema,
        ApplicationStatusSchema,
        ApplicationSchema,
        HelperApplicationSchema,
        ParticipantSummarySchema,
        ReviewSchema,
        ReviewListingSchema,
        ReviewPageSchema,
        MessageSchema,
        ConversationSummarySchema,
        NotificationKindSchema,
        NotificationSchema,
        NotificationPageSchema,
        TokenPairSchema,
        AuthSessionSchema,
        OtpDispatchSchema,
        OtpVerifiedSchema,
        SendOtpRequestBody,
        VerifyOtpRequestBody,
        RegisterRequestBody,
        LoginRequestBody,
        RefreshRequestBody,
        CreateJobRequestBody,
        CancelJobRequestBody,
        ApplyRequestBody,
        CreateReviewRequestBody,
        UpdateProfileRequestBody,
        CreateAddressRequestBody,
        SendMessageRequestBody,
        MarkReadRequestBody,
        UnreadCountResponseBody,
        MarkedReadResponseBody,
        StatusResponseBody,
    )),
    tags(
        (name = "health", description = "Service status and health checks"),
        (name = "auth", description = "Phone verification, registration and tokens"),
        (name = "jobs", description = "Job posting, search and lifecycle"),
        (name = "applications", description = "Helper applications and client decisions"),
        (name = "reviews", description = "Post-completion reviews"),
        (name = "users", description = "Profiles and addresses"),
        (name = "conversations", description = "Job-scoped messaging"),
        (name = "notifications", description = "In-app notification inbox")
    )
)]
pub struct ApiDoc;
