//! Authentication primitives: one-time codes, passwords and token pairs.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate raw strings before a handler talks to a port or service.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::text_enum::define_text_enum;
use super::{City, PersonName, PhoneNumber, User, UserRole};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length accepted anywhere.
pub const PASSWORD_MAX: usize = 128;
/// Number of digits in a one-time code.
pub const OTP_DIGITS: usize = 6;

/// Validation errors for authentication inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthValidationError {
    #[error("code must be exactly 6 digits")]
    MalformedCode,
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("password must be at most {max} characters")]
    PasswordTooLong { max: usize },
    #[error("password must not be empty")]
    EmptyPassword,
}

define_text_enum! {
    /// Why a one-time code was requested.
    pub enum OtpPurpose {
        Registration => "registration",
        Login => "login",
        PasswordReset => "password_reset",
    }
}

/// Six-digit one-time code.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OtpCodeValue(String);

impl OtpCodeValue {
    /// Validate a six-digit code.
    ///
    /// # Examples
    /// ```
    /// use khedma::domain::OtpCodeValue;
    ///
    /// assert!(OtpCodeValue::new("042195").is_ok());
    /// assert!(OtpCodeValue::new("42195").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, AuthValidationError> {
        let raw = raw.into();
        if raw.len() != OTP_DIGITS || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AuthValidationError::MalformedCode);
        }
        Ok(Self(raw))
    }

    /// Zero-padded code from a number below one million.
    ///
    /// ```
    /// use khedma::domain::OtpCodeValue;
    ///
    /// assert_eq!(OtpCodeValue::from_digits(42).as_str(), "000042");
    /// ```
    pub fn from_digits(value: u32) -> Self {
        Self(format!("{:0width$}", value % 1_000_000, width = OTP_DIGITS))
    }

    /// Borrow the digits.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Compare without short-circuiting on the first differing digit.
    pub fn matches(&self, other: &Self) -> bool {
        self.0
            .bytes()
            .zip(other.0.bytes())
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl fmt::Debug for OtpCodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCodeValue(******)")
    }
}

impl From<OtpCodeValue> for String {
    fn from(value: OtpCodeValue) -> Self {
        value.0
    }
}

impl TryFrom<String> for OtpCodeValue {
    type Error = AuthValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Issuance policy for one-time codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpPolicy {
    pub ttl: TimeDelta,
    pub max_attempts: i32,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            ttl: TimeDelta::minutes(5),
            max_attempts: 5,
        }
    }
}

/// Persisted one-time code.
///
/// ## Invariants
/// - A code is usable only while `used_at` is `None`, `expires_at` is in the
///   future and `attempts < max_attempts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCode {
    pub id: Uuid,
    pub phone: PhoneNumber,
    pub code: OtpCodeValue,
    pub purpose: OtpPurpose,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: DateTime<Utc>,
}

impl OtpCode {
    /// Build a fresh, unused code issued at `now`.
    pub fn issue(
        phone: PhoneNumber,
        purpose: OtpPurpose,
        code: OtpCodeValue,
        now: DateTime<Utc>,
        policy: OtpPolicy,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            phone,
            code,
            purpose,
            expires_at: now + policy.ttl,
            used_at: None,
            attempts: 0,
            max_attempts: policy.max_attempts,
            created_at: now,
        }
    }

    /// Unused and not yet expired at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && self.expires_at > now
    }

    /// Whether the attempt budget is spent.
    pub fn attempts_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

/// Password supplied by a caller, wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a new password for registration.
    pub fn new(raw: &str) -> Result<Self, AuthValidationError> {
        let length = raw.chars().count();
        if length < PASSWORD_MIN {
            return Err(AuthValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Self::bounded(raw, length)
    }

    /// Accept any non-empty password presented at login.
    pub fn presented(raw: &str) -> Result<Self, AuthValidationError> {
        if raw.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Self::bounded(raw, raw.chars().count())
    }

    fn bounded(raw: &str, length: usize) -> Result<Self, AuthValidationError> {
        if length > PASSWORD_MAX {
            return Err(AuthValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Borrow the secret.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Validated login credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub phone: PhoneNumber,
    pub password: Password,
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationDraft {
    pub verification_token: String,
    pub phone: PhoneNumber,
    pub password: Password,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub role: UserRole,
    pub city: City,
}

/// Assertion issued after a successful OTP verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneVerification {
    pub phone: PhoneNumber,
    pub purpose: OtpPurpose,
}

/// Access and refresh credentials returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Authenticated user plus freshly issued tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: User,
    pub tokens: TokenPair,
}

/// Acknowledgement returned after an OTP was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpDispatch {
    pub message: String,
    /// Seconds until the code expires.
    pub expires_in: i64,
}

/// Verification assertion returned after a correct OTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerified {
    pub verified: bool,
    pub verification_token: String,
}
