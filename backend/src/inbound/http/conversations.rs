//! Conversation HTTP handlers.
//!
//! ```text
//! GET  /api/v1/conversations
//! GET  /api/v1/conversations/{id}/messages
//! POST /api/v1/conversations/{id}/messages
//! POST /api/v1/conversations/{id}/read
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ConversationId, ConversationSummary, Error, Message, MessageContent, MessageId, MessageQuery,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthContext;
use crate::inbound::http::schemas::{ConversationSummarySchema, ErrorSchema, MessageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid, parse_id, parse_optional_id};

/// Request body for `POST /conversations/{id}/messages`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequestBody {
    #[schema(example = "I will be there at 9.")]
    pub content: String,
}

/// Query string for `GET /conversations/{id}/messages`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagePageQuery {
    pub before: Option<String>,
    pub limit: Option<u32>,
}

fn parse_conversation_id(raw: &str) -> Result<ConversationId, Error> {
    parse_id(raw, FieldName::new("id"), ConversationId::new)
}

/// The caller's conversations, most recent activity first.
#[utoipa::path(
    get,
    path = "/api/v1/conversations",
    responses(
        (status = 200, description = "Conversations", body = [ConversationSummarySchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["conversations"],
    operation_id = "listConversations",
    security(("BearerAuth" = []))
)]
#[get("/conversations")]
pub async fn list_conversations(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<Vec<ConversationSummary>>> {
    state
        .messaging
        .conversations(auth.user_id())
        .await
        .map(web::Json)
}

/// Messages of a conversation, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/conversations/{id}/messages",
    params(
        ("id" = String, Path, description = "Conversation identifier"),
        ("before" = Option<String>, Query, description = "Only messages older than this message id"),
        ("limit" = Option<u32>, Query, description = "Page size, default 50, max 100")
    ),
    responses(
        (status = 200, description = "Messages", body = [MessageSchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a participant", body = ErrorSchema),
        (status = 404, description = "Conversation not found", body = ErrorSchema)
    ),
    tags = ["conversations"],
    operation_id = "listMessages",
    security(("BearerAuth" = []))
)]
#[get("/conversations/{id}/messages")]
pub async fn list_messages(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
    query: web::Query<MessagePageQuery>,
) -> ApiResult<web::Json<Vec<Message>>> {
    let id = parse_conversation_id(&path.into_inner())?;
    let query = query.into_inner();
    let before = parse_optional_id(query.before.as_deref(), FieldName::new("before"), MessageId::new)?;
    state
        .messaging
        .messages(&id, auth.user_id(), MessageQuery::new(before, query.limit))
        .await
        .map(web::Json)
}

/// Post a message to a conversation.
#[utoipa::path(
    post,
    path = "/api/v1/conversations/{id}/messages",
    params(("id" = String, Path, description = "Conversation identifier")),
    request_body = SendMessageRequestBody,
    responses(
        (status = 200, description = "Message sent", body = MessageSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a participant", body = ErrorSchema),
        (status = 404, description = "Conversation not found", body = ErrorSchema)
    ),
    tags = ["conversations"],
    operation_id = "sendMessage",
    security(("BearerAuth" = []))
)]
#[post("/conversations/{id}/messages")]
pub async fn send_message(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
    payload: web::Json<SendMessageRequestBody>,
) -> ApiResult<web::Json<Message>> {
    let id = parse_conversation_id(&path.into_inner())?;
    let content = MessageContent::new(&payload.content).map_err(invalid)?;
    state
        .messaging
        .send(&id, auth.user_id(), content)
        .await
        .map(web::Json)
}

/// Mark the other participant's messages read.
#[utoipa::path(
    post,
    path = "/api/v1/conversations/{id}/read",
    params(("id" = String, Path, description = "Conversation identifier")),
    responses(
        (status = 204, description = "Conversation marked read"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a participant", body = ErrorSchema),
        (status = 404, description = "Conversation not found", body = ErrorSchema)
    ),
    tags = ["conversations"],
    operation_id = "markConversationRead",
    security(("BearerAuth" = []))
)]
#[post("/conversations/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_conversation_id(&path.into_inner())?;
    state.messaging.mark_read(&id, auth.user_id()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "conversations_tests.rs"]
mod tests;
