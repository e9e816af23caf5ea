//! Job application HTTP handlers.
//!
//! ```text
//! POST /api/v1/jobs/{jobId}/applications
//! GET  /api/v1/jobs/{jobId}/applications
//! GET  /api/v1/applications/my
//! POST /api/v1/applications/{id}/accept
//! POST /api/v1/applications/{id}/decline
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Application, ApplicationDraft, ApplicationId, ApplicationStatus, Error, HelperApplication,
    JobId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthContext;
use crate::inbound::http::jobs::StatusFilterQuery;
use crate::inbound::http::schemas::{ApplicationSchema, ErrorSchema, HelperApplicationSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid, parse_id, parse_optional_text_enum};

/// Request body for `POST /jobs/{jobId}/applications`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequestBody {
    #[schema(example = "I can come tomorrow morning.")]
    pub message: Option<String>,
    #[schema(example = 200.0)]
    pub proposed_rate: Option<f64>,
}

fn parse_job_id(raw: &str) -> Result<JobId, Error> {
    parse_id(raw, FieldName::new("jobId"), JobId::new)
}

fn parse_application_id(raw: &str) -> Result<ApplicationId, Error> {
    parse_id(raw, FieldName::new("id"), ApplicationId::new)
}

/// Apply to an open job as a helper.
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{jobId}/applications",
    params(("jobId" = String, Path, description = "Job identifier")),
    request_body = ApplyRequestBody,
    responses(
        (status = 200, description = "Application created", body = ApplicationSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a helper or owns the job", body = ErrorSchema),
        (status = 404, description = "Job not found", body = ErrorSchema),
        (status = 409, description = "Job not open or already applied", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "applyToJob",
    security(("BearerAuth" = []))
)]
#[post("/jobs/{jobId}/applications")]
pub async fn apply(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
    payload: Option<web::Json<ApplyRequestBody>>,
) -> ApiResult<web::Json<Application>> {
    let job_id = parse_job_id(&path.into_inner())?;
    let body = payload.map(web::Json::into_inner).unwrap_or_default();
    let draft =
        ApplicationDraft::new(body.message.as_deref(), body.proposed_rate).map_err(invalid)?;
    state
        .applications
        .apply(auth.user_id(), &job_id, draft)
        .await
        .map(web::Json)
}

/// Applications to one of the caller's jobs.
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{jobId}/applications",
    params(("jobId" = String, Path, description = "Job identifier")),
    responses(
        (status = 200, description = "Applications", body = [ApplicationSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller does not own the job", body = ErrorSchema),
        (status = 404, description = "Job not found", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "jobApplications",
    security(("BearerAuth" = []))
)]
#[get("/jobs/{jobId}/applications")]
pub async fn job_applications(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Application>>> {
    let job_id = parse_job_id(&path.into_inner())?;
    state
        .applications_query
        .job_applications(&job_id, auth.user_id())
        .await
        .map(web::Json)
}

/// The caller's own applications, with their jobs.
#[utoipa::path(
    get,
    path = "/api/v1/applications/my",
    params(("status" = Option<String>, Query, description = "Only applications in this status")),
    responses(
        (status = 200, description = "Caller's applications", body = [HelperApplicationSchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "myApplications",
    security(("BearerAuth" = []))
)]
#[get("/applications/my")]
pub async fn my_applications(
    state: web::Data<HttpState>,
    auth: AuthContext,
    query: web::Query<StatusFilterQuery>,
) -> ApiResult<web::Json<Vec<HelperApplication>>> {
    let status = parse_optional_text_enum::<ApplicationStatus>(
        query.into_inner().status.as_deref(),
        FieldName::new("status"),
    )?;
    state
        .applications_query
        .helper_applications(auth.user_id(), status)
        .await
        .map(web::Json)
}

/// Accept an application, assigning its job.
#[utoipa::path(
    post,
    path = "/api/v1/applications/{id}/accept",
    params(("id" = String, Path, description = "Application identifier")),
    responses(
        (status = 200, description = "Application accepted", body = ApplicationSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller does not own the job", body = ErrorSchema),
        (status = 404, description = "Application not found", body = ErrorSchema),
        (status = 409, description = "Application or job no longer open", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "acceptApplication",
    security(("BearerAuth" = []))
)]
#[post("/applications/{id}/accept")]
pub async fn accept(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Application>> {
    let id = parse_application_id(&path.into_inner())?;
    state
        .applications
        .accept(&id, auth.user_id())
        .await
        .map(web::Json)
}

/// Decline a pending application.
#[utoipa::path(
    post,
    path = "/api/v1/applications/{id}/decline",
    params(("id" = String, Path, description = "Application identifier")),
    responses(
        (status = 200, description = "Application declined", body = ApplicationSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller does not own the job", body = ErrorSchema),
        (status = 404, description = "Application not found", body = ErrorSchema),
        (status = 409, description = "Application is not pending", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "declineApplication",
    security(("BearerAuth" = []))
)]
#[post("/applications/{id}/decline")]
pub async fn decline(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Application>> {
    let id = parse_application_id(&path.into_inner())?;
    state
        .applications
        .decline(&id, auth.user_id())
        .await
        .map(web::Json)
}

#[cfg(test)]
#[path = "applications_tests.rs"]
mod tests;
