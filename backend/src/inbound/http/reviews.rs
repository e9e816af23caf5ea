//! Review HTTP handlers.
//!
//! ```text
//! POST /api/v1/jobs/{jobId}/reviews
//! GET  /api/v1/users/{userId}/reviews
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::review::{REVIEWS_DEFAULT_LIMIT, REVIEWS_MAX_LIMIT};
use crate::domain::{
    JobId, Page, PageRequest, RatingsInput, Review, ReviewDraft, ReviewListing, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthContext;
use crate::inbound::http::schemas::{ErrorSchema, ReviewPageSchema, ReviewSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid, parse_id, require};

/// Request body for `POST /jobs/{jobId}/reviews`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequestBody {
    #[schema(minimum = 1, maximum = 5, example = 5)]
    pub overall_rating: Option<i16>,
    #[schema(minimum = 1, maximum = 5)]
    pub punctuality_rating: Option<i16>,
    #[schema(minimum = 1, maximum = 5)]
    pub quality_rating: Option<i16>,
    #[schema(minimum = 1, maximum = 5)]
    pub communication_rating: Option<i16>,
    #[schema(minimum = 1, maximum = 5)]
    pub value_rating: Option<i16>,
    pub comment: Option<String>,
}

/// Query string for review listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Review the other party of a completed job.
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{jobId}/reviews",
    params(("jobId" = String, Path, description = "Job identifier")),
    request_body = CreateReviewRequestBody,
    responses(
        (status = 200, description = "Review created", body = ReviewSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller took no part in the job or it is not completed", body = ErrorSchema),
        (status = 404, description = "Job not found", body = ErrorSchema),
        (status = 409, description = "Job already reviewed", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "createReview",
    security(("BearerAuth" = []))
)]
#[post("/jobs/{jobId}/reviews")]
pub async fn create_review(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
    payload: web::Json<CreateReviewRequestBody>,
) -> ApiResult<web::Json<Review>> {
    let job_id = parse_id(&path.into_inner(), FieldName::new("jobId"), JobId::new)?;
    let body = payload.into_inner();
    let ratings = RatingsInput {
        overall: require(body.overall_rating, FieldName::new("overallRating"))?,
        punctuality: body.punctuality_rating,
        quality: body.quality_rating,
        communication: body.communication_rating,
        value: body.value_rating,
    };
    let draft = ReviewDraft::new(ratings, body.comment.as_deref()).map_err(invalid)?;
    state
        .reviews
        .create_review(auth.user_id(), &job_id, draft)
        .await
        .map(web::Json)
}

/// Reviews written about a user, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{userId}/reviews",
    params(
        ("userId" = String, Path, description = "Reviewed user"),
        ("page" = Option<u32>, Query, description = "One-based page, default 1"),
        ("limit" = Option<u32>, Query, description = "Page size, default 10, max 50")
    ),
    responses(
        (status = 200, description = "Reviews", body = ReviewPageSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "userReviews"
)]
#[get("/users/{userId}/reviews")]
pub async fn user_reviews(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<ReviewPageQuery>,
) -> ApiResult<web::Json<Page<ReviewListing>>> {
    let user_id = parse_id(&path.into_inner(), FieldName::new("userId"), UserId::new)?;
    let query = query.into_inner();
    let page = PageRequest::new(
        query.page,
        query.limit,
        REVIEWS_DEFAULT_LIMIT,
        REVIEWS_MAX_LIMIT,
    );
    state
        .reviews_query
        .user_reviews(&user_id, page)
        .await
        .map(web::Json)
}

#[cfg(test)]
#[path = "reviews_tests.rs"]
mod tests;
