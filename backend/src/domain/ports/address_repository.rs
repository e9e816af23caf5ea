//! Port abstraction for saved addresses.
use async_trait::async_trait;

use crate::domain::{Address, AddressId, UserId};

use super::define_repository_error;

define_repository_error! {
    /// Persistence errors raised by address repository adapters.
    pub enum AddressPersistenceError("address repository") {}
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn insert(&self, address: &Address) -> Result<(), AddressPersistenceError>;

    async fn find_by_id(&self, id: &AddressId) -> Result<Option<Address>, AddressPersistenceError>;

    /// Addresses of `owner`, default first.
    async fn list_for_user(&self, owner: &UserId) -> Result<Vec<Address>, AddressPersistenceError>;
}
