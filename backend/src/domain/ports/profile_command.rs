//! Driving port for profile and address changes.

use async_trait::async_trait;

use crate::domain::{Address, AddressDraft, Error, ProfileUpdate, UserAccount, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    async fn update_me(&self, user: &UserId, update: ProfileUpdate) -> Result<UserAccount, Error>;

    /// Save an address; the first one becomes the default.
    async fn add_address(&self, user: &UserId, draft: AddressDraft) -> Result<Address, Error>;
}
