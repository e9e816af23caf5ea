//! Bearer token extraction so handlers only see an authenticated user id.
//!
//! The extractor reads `Authorization: Bearer <token>` and resolves it via
//! [`AuthCommand::authenticate`](crate::domain::ports::AuthCommand), so token
//! verification stays behind the domain port.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, UserId};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Authenticated caller of a protected endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    user_id: UserId,
}

impl AuthContext {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

/// Pull the raw token out of an `Authorization` header value.
pub(crate) fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token?;
            let state =
                state.ok_or_else(|| Error::internal("HTTP state is not registered on the app"))?;
            let user_id = state.auth.authenticate(&token).await?;
            Ok(Self { user_id })
        })
    }
}
