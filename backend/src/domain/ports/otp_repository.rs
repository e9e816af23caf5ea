//! Port abstraction for one-time code storage.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{OtpCode, OtpPurpose, PhoneNumber};

use super::define_repository_error;

define_repository_error! {
    /// Persistence errors raised by OTP repository adapters.
    pub enum OtpPersistenceError("otp repository") {}
}

/// Storage for issued one-time codes. Codes are never deleted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpRepository: Send + Sync {
    async fn insert(&self, code: &OtpCode) -> Result<(), OtpPersistenceError>;

    /// Newest unused code for `(phone, purpose)` that has not expired at
    /// `now`.
    async fn find_active(
        &self,
        phone: &PhoneNumber,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpCode>, OtpPersistenceError>;

    async fn increment_attempts(&self, id: Uuid) -> Result<(), OtpPersistenceError>;

    /// Mark the code used only while it is unused and under its attempt
    /// limit. Returns `false` when no row matched.
    async fn mark_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, OtpPersistenceError>;
}
