//! Marketplace users, helper profiles and public projections.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PhoneNumber;
use super::text_enum::define_text_enum;

/// Maximum number of characters in a first or last name.
pub const NAME_MAX: usize = 50;
/// Maximum number of characters in a city name.
pub const CITY_MAX: usize = 80;
/// Maximum number of characters in a helper bio.
pub const BIO_MAX: usize = 1000;

/// Validation errors for user-supplied profile values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("role must be CLIENT or HELPER")]
    RoleNotSelfAssignable,
}

impl UserValidationError {
    /// Name of the offending input field, in request casing.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::TooLong { field, .. } => field,
            Self::InvalidId => "id",
            Self::RoleNotSelfAssignable => "role",
        }
    }
}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a user id from text.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

define_text_enum! {
    /// What a user does on the marketplace.
    pub enum UserRole {
        /// Posts jobs and hires helpers.
        Client => "CLIENT",
        /// Applies to and performs jobs.
        Helper => "HELPER",
        /// Back-office operator.
        Admin => "ADMIN",
    }
}

impl UserRole {
    /// Roles a user may pick for themselves at registration.
    pub fn self_assignable(self) -> Result<Self, UserValidationError> {
        match self {
            Self::Client | Self::Helper => Ok(self),
            Self::Admin => Err(UserValidationError::RoleNotSelfAssignable),
        }
    }
}

define_text_enum! {
    /// Account lifecycle status.
    pub enum UserStatus {
        PendingVerification => "PENDING_VERIFICATION",
        Active => "ACTIVE",
        Suspended => "SUSPENDED",
        Deleted => "DELETED",
    }
}

fn bounded_text(
    value: &str,
    field: &'static str,
    max: usize,
) -> Result<String, UserValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(UserValidationError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(UserValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Trimmed, non-empty person name of at most [`NAME_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// Validate a name for the given request field.
    pub fn new(value: &str, field: &'static str) -> Result<Self, UserValidationError> {
        bounded_text(value, field, NAME_MAX).map(Self)
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// First character followed by a full stop, e.g. `B.`.
    pub fn initial(&self) -> String {
        self.0
            .chars()
            .next()
            .map(|c| format!("{c}."))
            .unwrap_or_default()
    }
}

/// Trimmed, non-empty city name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct City(String);

impl City {
    /// Validate a city name.
    pub fn new(value: &str) -> Result<Self, UserValidationError> {
        bounded_text(value, "city", CITY_MAX).map(Self)
    }

    /// Borrow the city name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Registered marketplace user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub phone: PhoneNumber,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub role: UserRole,
    pub status: UserStatus,
    pub city: City,
    pub avatar_url: Option<String>,
    pub phone_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the account may authenticate.
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// User record together with its stored password hash.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Insert payload for a freshly registered user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user: User,
    pub password_hash: String,
}

/// Statistics and presentation fields attached to helper accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelperProfile {
    pub user_id: UserId,
    pub bio: Option<String>,
    pub average_rating: f64,
    pub total_reviews: i32,
    pub total_jobs_completed: i32,
    pub is_verified: bool,
}

impl HelperProfile {
    /// Empty profile created alongside a new helper account.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            bio: None,
            average_rating: 0.0,
            total_reviews: 0,
            total_jobs_completed: 0,
            is_verified: false,
        }
    }
}

/// Partial update of the caller's own profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
    pub city: Option<City>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

impl ProfileUpdate {
    /// Validate a helper bio.
    pub fn parse_bio(value: &str) -> Result<String, UserValidationError> {
        bounded_text(value, "bio", BIO_MAX)
    }
}

/// Account plus helper profile, as returned to the account owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub user: User,
    pub helper_profile: Option<HelperProfile>,
}

/// Profile visible to other users; the last name is reduced to an initial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub city: String,
    pub role: UserRole,
    pub member_since: DateTime<Utc>,
    pub helper_profile: Option<HelperProfile>,
}

impl From<UserAccount> for PublicProfile {
    fn from(value: UserAccount) -> Self {
        let UserAccount {
            user,
            helper_profile,
        } = value;
        Self {
            id: user.id,
            first_name: user.first_name.as_str().to_owned(),
            last_name: user.last_name.initial(),
            avatar_url: user.avatar_url,
            city: user.city.as_str().to_owned(),
            role: user.role,
            member_since: user.created_at,
            helper_profile,
        }
    }
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;
