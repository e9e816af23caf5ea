//! Phone authentication HTTP handlers.
//!
//! ```text
//! POST /api/v1/auth/send-otp
//! POST /api/v1/auth/verify-otp
//! POST /api/v1/auth/register
//! POST /api/v1/auth/login
//! POST /api/v1/auth/refresh
//! ```
//!
//! Every payload is validated here, so malformed phones or codes are
//! rejected before any port is called.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{SendOtpRequest, VerifyOtpRequest};
use crate::domain::{
    AuthSession, City, Error, LoginCredentials, OtpCodeValue, OtpDispatch, OtpPurpose,
    OtpVerified, Password, PersonName, RegistrationDraft, TokenPair, UserRole,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    AuthSessionSchema, ErrorSchema, OtpDispatchSchema, OtpVerifiedSchema, TokenPairSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid, parse_phone, parse_text_enum, require,
};

/// Request body for `POST /auth/send-otp`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequestBody {
    #[schema(example = "+212612345678")]
    pub phone: String,
    /// `registration`, `login` or `password_reset`.
    #[schema(example = "registration")]
    pub purpose: String,
}

/// Request body for `POST /auth/verify-otp`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequestBody {
    #[schema(example = "+212612345678")]
    pub phone: String,
    #[schema(example = "482913")]
    pub code: String,
    #[schema(example = "registration")]
    pub purpose: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestBody {
    pub verification_token: String,
    #[schema(example = "+212612345678")]
    pub phone: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// `CLIENT` or `HELPER`.
    pub role: Option<String>,
    #[schema(example = "Casablanca")]
    pub city: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestBody {
    #[schema(example = "+212612345678")]
    pub phone: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequestBody {
    pub refresh_token: String,
}

fn parse_purpose(raw: &str) -> Result<OtpPurpose, Error> {
    parse_text_enum(raw, FieldName::new("purpose"))
}

fn parse_registration(body: RegisterRequestBody) -> Result<RegistrationDraft, Error> {
    let phone = parse_phone(&body.phone, FieldName::new("phone"))?;
    let password = Password::new(&body.password).map_err(invalid)?;
    let first_name = PersonName::new(&body.first_name, "firstName").map_err(invalid)?;
    let last_name = PersonName::new(&body.last_name, "lastName").map_err(invalid)?;
    let role_raw = require(body.role, FieldName::new("role"))?;
    let role = parse_text_enum::<UserRole>(&role_raw, FieldName::new("role"))?
        .self_assignable()
        .map_err(invalid)?;
    let city = City::new(&body.city).map_err(invalid)?;
    Ok(RegistrationDraft {
        verification_token: body.verification_token,
        phone,
        password,
        first_name,
        last_name,
        role,
        city,
    })
}

/// Issue a one-time code by SMS.
#[utoipa::path(
    post,
    path = "/api/v1/auth/send-otp",
    request_body = SendOtpRequestBody,
    responses(
        (status = 200, description = "Code issued", body = OtpDispatchSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Phone already registered", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "sendOtp"
)]
#[post("/auth/send-otp")]
pub async fn send_otp(
    state: web::Data<HttpState>,
    payload: web::Json<SendOtpRequestBody>,
) -> ApiResult<web::Json<OtpDispatch>> {
    let body = payload.into_inner();
    let request = SendOtpRequest {
        phone: parse_phone(&body.phone, FieldName::new("phone"))?,
        purpose: parse_purpose(&body.purpose)?,
    };
    state.auth.send_otp(request).await.map(web::Json)
}

/// Check a one-time code and obtain a phone verification token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-otp",
    request_body = VerifyOtpRequestBody,
    responses(
        (status = 200, description = "Phone verified", body = OtpVerifiedSchema),
        (status = 400, description = "Invalid, expired or exhausted code", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "verifyOtp"
)]
#[post("/auth/verify-otp")]
pub async fn verify_otp(
    state: web::Data<HttpState>,
    payload: web::Json<VerifyOtpRequestBody>,
) -> ApiResult<web::Json<OtpVerified>> {
    let body = payload.into_inner();
    let request = VerifyOtpRequest {
        phone: parse_phone(&body.phone, FieldName::new("phone"))?,
        code: OtpCodeValue::new(body.code).map_err(invalid)?,
        purpose: parse_purpose(&body.purpose)?,
    };
    state.auth.verify_otp(request).await.map(web::Json)
}

/// Create an account for a verified phone.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequestBody,
    responses(
        (status = 200, description = "Account created", body = AuthSessionSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid verification token", body = ErrorSchema),
        (status = 409, description = "Phone already registered", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register"
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequestBody>,
) -> ApiResult<web::Json<AuthSession>> {
    let draft = parse_registration(payload.into_inner())?;
    state.auth.register(draft).await.map(web::Json)
}

/// Exchange phone and password for tokens.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequestBody,
    responses(
        (status = 200, description = "Signed in", body = AuthSessionSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 403, description = "Account not active", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login"
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequestBody>,
) -> ApiResult<web::Json<AuthSession>> {
    let body = payload.into_inner();
    let credentials = LoginCredentials {
        phone: parse_phone(&body.phone, FieldName::new("phone"))?,
        password: Password::presented(&body.password).map_err(invalid)?,
    };
    state.auth.login(credentials).await.map(web::Json)
}

/// Rotate a refresh token into a new token pair.
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshRequestBody,
    responses(
        (status = 200, description = "Tokens refreshed", body = TokenPairSchema),
        (status = 401, description = "Invalid refresh token", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "refreshTokens"
)]
#[post("/auth/refresh")]
pub async fn refresh(
    state: web::Data<HttpState>,
    payload: web::Json<RefreshRequestBody>,
) -> ApiResult<web::Json<TokenPair>> {
    let body = payload.into_inner();
    state.auth.refresh(&body.refresh_token).await.map(web::Json)
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
