//! Driving port for OTP issuance, registration and token use-cases.
//!
//! Inbound adapters call this port with validated domain values; the port
//! hides code storage, SMS delivery, hashing and token signing.

use async_trait::async_trait;

use crate::domain::{
    AuthSession, Error, LoginCredentials, OtpCodeValue, OtpDispatch, OtpPurpose, OtpVerified,
    PhoneNumber, RegistrationDraft, TokenPair, UserId,
};

/// Request to send a one-time code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOtpRequest {
    pub phone: PhoneNumber,
    pub purpose: OtpPurpose,
}

/// Request to check a one-time code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOtpRequest {
    pub phone: PhoneNumber,
    pub code: OtpCodeValue,
    pub purpose: OtpPurpose,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthCommand: Send + Sync {
    /// Issue and deliver a one-time code.
    async fn send_otp(&self, request: SendOtpRequest) -> Result<OtpDispatch, Error>;

    /// Check a code and return a phone-verification token.
    async fn verify_otp(&self, request: VerifyOtpRequest) -> Result<OtpVerified, Error>;

    /// Create an account for a verified phone number.
    async fn register(&self, draft: RegistrationDraft) -> Result<AuthSession, Error>;

    /// Authenticate with phone and password.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error>;

    /// Exchange a refresh token for a new pair.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, Error>;

    /// Resolve a bearer access token to its user.
    async fn authenticate(&self, access_token: &str) -> Result<UserId, Error>;
}
