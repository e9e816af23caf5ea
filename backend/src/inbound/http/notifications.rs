//! Notification inbox HTTP handlers.
//!
//! ```text
//! GET  /api/v1/notifications
//! GET  /api/v1/notifications/unread-count
//! POST /api/v1/notifications/read
//! POST /api/v1/notifications/read-all
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::notification::{NOTIFICATIONS_DEFAULT_LIMIT, NOTIFICATIONS_MAX_LIMIT};
use crate::domain::{Error, Notification, NotificationId, Page, PageRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthContext;
use crate::inbound::http::schemas::{ErrorSchema, NotificationPageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Query string for `GET /notifications`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPageQuery {
    pub unread_only: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Request body for `POST /notifications/read`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequestBody {
    #[schema(value_type = Vec<uuid::Uuid>)]
    pub ids: Vec<String>,
}

/// Number of unread notifications.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponseBody {
    pub count: u64,
}

/// Number of notifications changed by a mark-read request.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkedReadResponseBody {
    pub updated: u64,
}

fn parse_ids(raw: &[String]) -> Result<Vec<NotificationId>, Error> {
    raw.iter()
        .map(|id| parse_id(id, FieldName::new("ids"), NotificationId::new))
        .collect()
}

/// The caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(
        ("unreadOnly" = Option<bool>, Query, description = "Only unread notifications"),
        ("page" = Option<u32>, Query, description = "One-based page, default 1"),
        ("limit" = Option<u32>, Query, description = "Page size, default 20, max 100")
    ),
    responses(
        (status = 200, description = "Notifications", body = NotificationPageSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications",
    security(("BearerAuth" = []))
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    auth: AuthContext,
    query: web::Query<NotificationPageQuery>,
) -> ApiResult<web::Json<Page<Notification>>> {
    let query = query.into_inner();
    let page = PageRequest::new(
        query.page,
        query.limit,
        NOTIFICATIONS_DEFAULT_LIMIT,
        NOTIFICATIONS_MAX_LIMIT,
    );
    state
        .notifications
        .list(auth.user_id(), query.unread_only.unwrap_or(false), page)
        .await
        .map(web::Json)
}

/// Count the caller's unread notifications.
#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponseBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "unreadNotificationCount",
    security(("BearerAuth" = []))
)]
#[get("/notifications/unread-count")]
pub async fn unread_count(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<UnreadCountResponseBody>> {
    let count = state.notifications.unread_count(auth.user_id()).await?;
    Ok(web::Json(UnreadCountResponseBody { count }))
}

/// Mark the given notifications read.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/read",
    request_body = MarkReadRequestBody,
    responses(
        (status = 200, description = "Notifications marked read", body = MarkedReadResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationsRead",
    security(("BearerAuth" = []))
)]
#[post("/notifications/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<MarkReadRequestBody>,
) -> ApiResult<web::Json<MarkedReadResponseBody>> {
    let ids = parse_ids(&payload.ids)?;
    let updated = state.notifications.mark_read(auth.user_id(), ids).await?;
    Ok(web::Json(MarkedReadResponseBody { updated }))
}

/// Mark every notification of the caller read.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "Notifications marked read", body = MarkedReadResponseBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead",
    security(("BearerAuth" = []))
)]
#[post("/notifications/read-all")]
pub async fn mark_all_read(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<MarkedReadResponseBody>> {
    let updated = state.notifications.mark_all_read(auth.user_id()).await?;
    Ok(web::Json(MarkedReadResponseBody { updated }))
}

#[cfg(test)]
#[path = "notifications_tests.rs"]
mod tests;
