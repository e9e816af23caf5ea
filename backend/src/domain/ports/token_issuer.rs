//! Port for issuing and verifying signed bearer tokens.
use crate::domain::{PhoneVerification, TokenPair, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// Token failed signature, audience or format checks.
        Invalid { message: String } => "token is invalid: {message}",
        /// Token was well formed but has expired.
        Expired => "token has expired",
        /// Token could not be produced.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Signs access, refresh and phone-verification tokens.
///
/// Each token kind is bound to its own secret and audience so one kind can
/// never be presented as another.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Issue a fresh access/refresh pair for `user`.
    fn issue_pair(&self, user: &UserId) -> Result<TokenPair, TokenError>;

    /// Verify an access token and return its subject.
    fn verify_access(&self, token: &str) -> Result<UserId, TokenError>;

    /// Verify a refresh token and return its subject.
    fn verify_refresh(&self, token: &str) -> Result<UserId, TokenError>;

    /// Issue a short-lived proof that a phone number passed OTP
    /// verification.
    fn issue_verification(&self, verification: &PhoneVerification) -> Result<String, TokenError>;

    /// Verify a phone-verification token.
    fn verify_verification(&self, token: &str) -> Result<PhoneVerification, TokenError>;
}
