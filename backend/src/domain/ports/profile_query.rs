//! Driving port for reading profiles and addresses.

use async_trait::async_trait;

use crate::domain::{Address, Error, PublicProfile, UserAccount, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// The caller's own account.
    async fn me(&self, user: &UserId) -> Result<UserAccount, Error>;

    async fn addresses(&self, user: &UserId) -> Result<Vec<Address>, Error>;

    /// Profile of any user as shown to others.
    async fn public_profile(&self, user: &UserId) -> Result<PublicProfile, Error>;
}
