//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    HelperProfile, NewUser, PhoneNumber, ProfileUpdate, StoredCredentials, UserAccount, UserId,
};

use super::define_repository_error;

define_repository_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError("user repository") {
        /// Another account already uses the phone number.
        DuplicatePhone => "phone number already registered",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and, for helpers, the accompanying profile.
    async fn insert(
        &self,
        user: &NewUser,
        helper_profile: Option<HelperProfile>,
    ) -> Result<(), UserPersistenceError>;

    /// Fetch a user with its password hash by phone number.
    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Fetch a user and helper profile by identifier.
    async fn find_account(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Stamp the last successful login.
    async fn record_login(&self, id: &UserId, at: DateTime<Utc>)
    -> Result<(), UserPersistenceError>;

    /// Apply a partial profile update, returning the updated account.
    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;
}
