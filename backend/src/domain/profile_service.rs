//! Account profile and saved address service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::service_errors::{map_address_error, map_user_error};
use crate::domain::ports::{AddressRepository, ProfileCommand, ProfileQuery, UserRepository};
use crate::domain::{
    Address, AddressDraft, Error, ProfileUpdate, PublicProfile, UserAccount, UserId, UserRole,
};

/// Profile service implementing [`ProfileQuery`] and [`ProfileCommand`].
#[derive(Clone)]
pub struct ProfileService<U, A> {
    users: Arc<U>,
    addresses: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<U, A> ProfileService<U, A> {
    /// Create the service over the user and address stores.
    pub fn new(users: Arc<U>, addresses: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            addresses,
            clock,
        }
    }
}

impl<U, A> ProfileService<U, A>
where
    U: UserRepository,
    A: AddressRepository,
{
    async fn account(&self, user: &UserId) -> Result<UserAccount, Error> {
        self.users
            .find_account(user)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

#[async_trait]
impl<U, A> ProfileQuery for ProfileService<U, A>
where
    U: UserRepository,
    A: AddressRepository,
{
    async fn me(&self, user: &UserId) -> Result<UserAccount, Error> {
        self.account(user).await
    }

    async fn addresses(&self, user: &UserId) -> Result<Vec<Address>, Error> {
        self.addresses
            .list_for_user(user)
            .await
            .map_err(map_address_error)
    }

    async fn public_profile(&self, user: &UserId) -> Result<PublicProfile, Error> {
        self.account(user).await.map(PublicProfile::from)
    }
}

#[async_trait]
impl<U, A> ProfileCommand for ProfileService<U, A>
where
    U: UserRepository,
    A: AddressRepository,
{
    async fn update_me(&self, user: &UserId, update: ProfileUpdate) -> Result<UserAccount, Error> {
        let account = self.account(user).await?;
        if update.bio.is_some() && account.user.role != UserRole::Helper {
            return Err(Error::invalid_field(
                "bio",
                "not_a_helper",
                "only helpers have a bio",
            ));
        }
        let updated = self
            .users
            .update_profile(user, &update, self.clock.utc())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        info!(user_id = %user, "profile updated");
        Ok(updated)
    }

    async fn add_address(&self, user: &UserId, draft: AddressDraft) -> Result<Address, Error> {
        let existing = self
            .addresses
            .list_for_user(user)
            .await
            .map_err(map_address_error)?;
        let address = draft.into_address(*user, existing.is_empty(), self.clock.utc());
        self.addresses
            .insert(&address)
            .await
            .map_err(map_address_error)?;
        info!(user_id = %user, address_id = %address.id, is_default = address.is_default, "address saved");
        Ok(address)
    }
}
