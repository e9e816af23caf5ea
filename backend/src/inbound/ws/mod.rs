//! WebSocket inbound adapter pushing conversation events to participants.
//!
//! Responsibilities:
//! - authenticate the upgrade with the caller's access token
//! - register the connection with the [`hub::ConnectionHub`]
//! - run one session per connection, acting as the authenticated user only
//!
//! Browsers cannot set headers on a WebSocket upgrade, so the token may also
//! travel as the `token` query parameter. The `Authorization` header wins
//! when both are present.

use actix_web::http::header::AUTHORIZATION;
use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get};
use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Error;
use crate::inbound::http::bearer::bearer_token;

mod session;

pub mod hub;
pub mod messages;
pub mod state;

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Access token from the `Authorization` header or the `token` query parameter.
fn upgrade_token(req: &HttpRequest) -> Result<String, Error> {
    if req.headers().contains_key(AUTHORIZATION) {
        return bearer_token(req);
    }
    web::Query::<TokenQuery>::from_query(req.query_string())
        .ok()
        .and_then(|query| query.into_inner().token)
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| Error::unauthorized("missing bearer token"))
}

/// Handle WebSocket upgrade for the `/ws` endpoint.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let token = upgrade_token(&req)?;
    let user = state.auth.authenticate(&token).await?;

    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        error
    })?;
    let subscription = state.hub.subscribe(user);
    info!(user_id = %user, "websocket connected");
    actix_web::rt::spawn(session::handle_ws_session(
        state.messaging.clone(),
        subscription,
        session,
        messages,
    ));
    Ok(response)
}
