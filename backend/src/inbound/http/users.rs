//! Profile and address HTTP handlers.
//!
//! ```text
//! GET   /api/v1/users/me
//! PATCH /api/v1/users/me
//! GET   /api/v1/users/me/addresses
//! POST  /api/v1/users/me/addresses
//! GET   /api/v1/users/{id}/public
//! ```

use actix_web::{get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Address, AddressDraft, City, Error, PersonName, ProfileUpdate, PublicProfile, UserAccount,
    UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthContext;
use crate::inbound::http::schemas::{
    AddressSchema, ErrorSchema, PublicProfileSchema, UserAccountSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid, parse_id, parse_optional_url, require,
};

/// Request body for `PATCH /users/me`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequestBody {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub city: Option<String>,
    #[schema(format = "uri")]
    pub avatar_url: Option<String>,
    /// Helpers only.
    pub bio: Option<String>,
}

/// Request body for `POST /users/me/addresses`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressRequestBody {
    #[schema(example = "Home")]
    pub label: String,
    #[schema(example = "12 Rue Atlas")]
    pub street: String,
    #[schema(example = "Casablanca")]
    pub city: String,
    #[schema(example = "Maarif")]
    pub neighbourhood: Option<String>,
    #[schema(example = 33.5731)]
    pub latitude: Option<f64>,
    #[schema(example = -7.5898)]
    pub longitude: Option<f64>,
}

fn parse_update(body: UpdateProfileRequestBody) -> Result<ProfileUpdate, Error> {
    let first_name = body
        .first_name
        .as_deref()
        .map(|value| PersonName::new(value, "firstName"))
        .transpose()
        .map_err(invalid)?;
    let last_name = body
        .last_name
        .as_deref()
        .map(|value| PersonName::new(value, "lastName"))
        .transpose()
        .map_err(invalid)?;
    let city = body
        .city
        .as_deref()
        .map(City::new)
        .transpose()
        .map_err(invalid)?;
    let avatar_url = parse_optional_url(body.avatar_url.as_deref(), FieldName::new("avatarUrl"))?;
    let bio = body
        .bio
        .as_deref()
        .map(ProfileUpdate::parse_bio)
        .transpose()
        .map_err(invalid)?;
    Ok(ProfileUpdate {
        first_name,
        last_name,
        city,
        avatar_url,
        bio,
    })
}

fn parse_address(body: CreateAddressRequestBody) -> Result<AddressDraft, Error> {
    let latitude = require(body.latitude, FieldName::new("latitude"))?;
    let longitude = require(body.longitude, FieldName::new("longitude"))?;
    AddressDraft::new(
        &body.label,
        &body.street,
        &body.city,
        body.neighbourhood.as_deref(),
        latitude,
        longitude,
    )
    .map_err(invalid)
}

/// The caller's account and helper statistics.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Caller's account", body = UserAccountSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser",
    security(("BearerAuth" = []))
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<UserAccount>> {
    state.profile_query.me(auth.user_id()).await.map(web::Json)
}

/// Update the caller's profile.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequestBody,
    responses(
        (status = 200, description = "Updated account", body = UserAccountSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser",
    security(("BearerAuth" = []))
)]
#[patch("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<UpdateProfileRequestBody>,
) -> ApiResult<web::Json<UserAccount>> {
    let update = parse_update(payload.into_inner())?;
    state
        .profile
        .update_me(auth.user_id(), update)
        .await
        .map(web::Json)
}

/// The caller's saved addresses, default first.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/addresses",
    responses(
        (status = 200, description = "Saved addresses", body = [AddressSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listAddresses",
    security(("BearerAuth" = []))
)]
#[get("/users/me/addresses")]
pub async fn list_addresses(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<Vec<Address>>> {
    state
        .profile_query
        .addresses(auth.user_id())
        .await
        .map(web::Json)
}

/// Save a new address; the first one becomes the default.
#[utoipa::path(
    post,
    path = "/api/v1/users/me/addresses",
    request_body = CreateAddressRequestBody,
    responses(
        (status = 200, description = "Address saved", body = AddressSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "addAddress",
    security(("BearerAuth" = []))
)]
#[post("/users/me/addresses")]
pub async fn add_address(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<CreateAddressRequestBody>,
) -> ApiResult<web::Json<Address>> {
    let draft = parse_address(payload.into_inner())?;
    state
        .profile
        .add_address(auth.user_id(), draft)
        .await
        .map(web::Json)
}

/// Another user's public profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/public",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Public profile", body = PublicProfileSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "publicProfile"
)]
#[get("/users/{id}/public")]
pub async fn public_profile(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PublicProfile>> {
    let id = parse_id(&path.into_inner(), FieldName::new("id"), UserId::new)?;
    state
        .profile_query
        .public_profile(&id)
        .await
        .map(web::Json)
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
