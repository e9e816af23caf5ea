//! Job HTTP handlers.
//!
//! ```text
//! POST /api/v1/jobs
//! GET  /api/v1/jobs
//! GET  /api/v1/jobs/my
//! GET  /api/v1/jobs/{id}
//! POST /api/v1/jobs/{id}/start
//! POST /api/v1/jobs/{id}/complete
//! POST /api/v1/jobs/{id}/confirm
//! POST /api/v1/jobs/{id}/cancel
//! ```
//!
//! Every route needs a bearer token.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AddressId, CancellationReason, CategoryId, Coordinates, Error, Job, JobDraft, JobDraftInput,
    JobId, JobListing, JobSearch, JobStatus, JobTransition, Page, PageRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthContext;
use crate::inbound::http::schemas::{ErrorSchema, JobListingSchema, JobPageSchema, JobSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid, parse_id, parse_optional_date, parse_optional_id,
    parse_optional_text_enum,
};

/// Request body for `POST /jobs`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequestBody {
    #[schema(format = "uuid")]
    pub category_id: String,
    /// One of the caller's saved addresses.
    #[schema(format = "uuid")]
    pub address_id: String,
    #[schema(example = "Fix kitchen sink")]
    pub title: String,
    pub description: String,
    #[schema(format = "date", example = "2026-05-01")]
    pub preferred_date: Option<String>,
    /// `MORNING`, `AFTERNOON`, `EVENING` or `FLEXIBLE` (default).
    pub time_preference: Option<String>,
    /// `FIXED` (default) or `HOURLY`.
    pub budget_type: Option<String>,
    #[schema(example = 250.0)]
    pub budget_amount: Option<f64>,
}

/// Request body for `POST /jobs/{id}/cancel`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelJobRequestBody {
    pub reason: Option<String>,
}

/// Query string for `GET /jobs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchQuery {
    pub status: Option<String>,
    pub category_id: Option<String>,
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Query string for `GET /jobs/my`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusFilterQuery {
    pub status: Option<String>,
}

fn parse_job_id(raw: &str) -> Result<JobId, Error> {
    parse_id(raw, FieldName::new("id"), JobId::new)
}

fn parse_draft(body: CreateJobRequestBody) -> Result<JobDraft, Error> {
    let input = JobDraftInput {
        category_id: parse_id(&body.category_id, FieldName::new("categoryId"), CategoryId::new)?,
        address_id: parse_id(&body.address_id, FieldName::new("addressId"), AddressId::new)?,
        title: &body.title,
        description: &body.description,
        preferred_date: parse_optional_date(
            body.preferred_date.as_deref(),
            FieldName::new("preferredDate"),
        )?,
        time_preference: parse_optional_text_enum(
            body.time_preference.as_deref(),
            FieldName::new("timePreference"),
        )?,
        budget_type: parse_optional_text_enum(
            body.budget_type.as_deref(),
            FieldName::new("budgetType"),
        )?,
        budget_amount: body.budget_amount,
    };
    JobDraft::new(input).map_err(invalid)
}

fn parse_search(query: JobSearchQuery) -> Result<JobSearch, Error> {
    let status = parse_optional_text_enum(query.status.as_deref(), FieldName::new("status"))?
        .unwrap_or(JobStatus::Open);
    let category_id = parse_optional_id(
        query.category_id.as_deref(),
        FieldName::new("categoryId"),
        CategoryId::new,
    )?;
    let origin = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng).map_err(invalid)?),
        _ => None,
    };
    let city = query
        .city
        .map(|city| city.trim().to_owned())
        .filter(|city| !city.is_empty());
    Ok(JobSearch {
        status,
        category_id,
        city,
        origin,
        page: PageRequest::new(
            query.page,
            query.limit,
            JobSearch::DEFAULT_LIMIT,
            JobSearch::MAX_LIMIT,
        ),
    })
}

/// Post a job at one of the caller's addresses.
#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    request_body = CreateJobRequestBody,
    responses(
        (status = 200, description = "Job created", body = JobSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a client or does not own the address", body = ErrorSchema),
        (status = 404, description = "Address not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "createJob",
    security(("BearerAuth" = []))
)]
#[post("/jobs")]
pub async fn create_job(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<CreateJobRequestBody>,
) -> ApiResult<web::Json<Job>> {
    let draft = parse_draft(payload.into_inner())?;
    state.jobs.create(auth.user_id(), draft).await.map(web::Json)
}

/// Search jobs, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    params(
        ("status" = Option<String>, Query, description = "Job status, default OPEN"),
        ("categoryId" = Option<String>, Query, description = "Category identifier"),
        ("city" = Option<String>, Query, description = "Exact city name"),
        ("lat" = Option<f64>, Query, description = "Search origin latitude"),
        ("lng" = Option<f64>, Query, description = "Search origin longitude"),
        ("page" = Option<u32>, Query, description = "One-based page, default 1"),
        ("limit" = Option<u32>, Query, description = "Page size, default 20, max 50")
    ),
    responses(
        (status = 200, description = "Matching jobs", body = JobPageSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "searchJobs",
    security(("BearerAuth" = []))
)]
#[get("/jobs")]
pub async fn search_jobs(
    state: web::Data<HttpState>,
    _auth: AuthContext,
    query: web::Query<JobSearchQuery>,
) -> ApiResult<web::Json<Page<JobListing>>> {
    let search = parse_search(query.into_inner())?;
    state.jobs_query.search(search).await.map(web::Json)
}

/// Jobs posted by the caller.
#[utoipa::path(
    get,
    path = "/api/v1/jobs/my",
    params(
        ("status" = Option<String>, Query, description = "Only jobs in this status")
    ),
    responses(
        (status = 200, description = "Caller's jobs", body = [JobListingSchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "myJobs",
    security(("BearerAuth" = []))
)]
#[get("/jobs/my")]
pub async fn my_jobs(
    state: web::Data<HttpState>,
    auth: AuthContext,
    query: web::Query<StatusFilterQuery>,
) -> ApiResult<web::Json<Vec<JobListing>>> {
    let status = parse_optional_text_enum::<JobStatus>(
        query.into_inner().status.as_deref(),
        FieldName::new("status"),
    )?;
    state
        .jobs_query
        .client_jobs(auth.user_id(), status)
        .await
        .map(web::Json)
}

/// Fetch one job.
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    params(("id" = String, Path, description = "Job identifier")),
    responses(
        (status = 200, description = "Job", body = JobSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Job not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "getJob",
    security(("BearerAuth" = []))
)]
#[get("/jobs/{id}")]
pub async fn get_job(
    state: web::Data<HttpState>,
    _auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Job>> {
    let id = parse_job_id(&path.into_inner())?;
    state.jobs_query.find_by_id(&id).await.map(web::Json)
}

async fn transition_job(
    state: &HttpState,
    auth: &AuthContext,
    raw_id: &str,
    transition: JobTransition,
) -> ApiResult<web::Json<Job>> {
    let id = parse_job_id(raw_id)?;
    state
        .jobs
        .transition(&id, auth.user_id(), transition)
        .await
        .map(web::Json)
}

/// Assigned helper starts work.
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/start",
    params(("id" = String, Path, description = "Job identifier")),
    responses(
        (status = 200, description = "Job in progress", body = JobSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not the assigned helper", body = ErrorSchema),
        (status = 404, description = "Job not found", body = ErrorSchema),
        (status = 409, description = "Job is not assigned", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "startJob",
    security(("BearerAuth" = []))
)]
#[post("/jobs/{id}/start")]
pub async fn start_job(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Job>> {
    transition_job(&state, &auth, &path.into_inner(), JobTransition::Start).await
}

/// Assigned helper marks the work done.
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/complete",
    params(("id" = String, Path, description = "Job identifier")),
    responses(
        (status = 200, description = "Job awaiting confirmation", body = JobSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not the assigned helper", body = ErrorSchema),
        (status = 404, description = "Job not found", body = ErrorSchema),
        (status = 409, description = "Job is not in progress", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "completeJob",
    security(("BearerAuth" = []))
)]
#[post("/jobs/{id}/complete")]
pub async fn complete_job(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Job>> {
    transition_job(&state, &auth, &path.into_inner(), JobTransition::Complete).await
}

/// Client confirms the completed work.
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/confirm",
    params(("id" = String, Path, description = "Job identifier")),
    responses(
        (status = 200, description = "Job completed", body = JobSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller does not own the job", body = ErrorSchema),
        (status = 404, description = "Job not found", body = ErrorSchema),
        (status = 409, description = "Job is not pending review", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "confirmJob",
    security(("BearerAuth" = []))
)]
#[post("/jobs/{id}/confirm")]
pub async fn confirm_job(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Job>> {
    transition_job(&state, &auth, &path.into_inner(), JobTransition::Confirm).await
}

/// Client cancels an unfinished job.
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/cancel",
    params(("id" = String, Path, description = "Job identifier")),
    request_body(content = CancelJobRequestBody, description = "Optional reason"),
    responses(
        (status = 200, description = "Job cancelled", body = JobSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller does not own the job", body = ErrorSchema),
        (status = 404, description = "Job not found", body = ErrorSchema),
        (status = 409, description = "Job can no longer be cancelled", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "cancelJob",
    security(("BearerAuth" = []))
)]
#[post("/jobs/{id}/cancel")]
pub async fn cancel_job(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
    payload: Option<web::Json<CancelJobRequestBody>>,
) -> ApiResult<web::Json<Job>> {
    let id = parse_job_id(&path.into_inner())?;
    let body = payload.map(web::Json::into_inner).unwrap_or_default();
    let reason = CancellationReason::parse(body.reason.as_deref()).map_err(invalid)?;
    state
        .jobs
        .cancel(&id, auth.user_id(), reason)
        .await
        .map(web::Json)
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
