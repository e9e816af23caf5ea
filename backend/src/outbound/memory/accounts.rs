//! Users, one-time codes and addresses.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{MemoryState, MemoryStore};
use crate::domain::ports::{
    AddressPersistenceError, AddressRepository, OtpPersistenceError, OtpRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Address, AddressId, HelperProfile, NewUser, OtpCode, OtpPurpose, PhoneNumber, ProfileUpdate,
    StoredCredentials, UserAccount, UserId,
};

fn account(state: &MemoryState, id: &Uuid) -> Option<UserAccount> {
    state.users.get(id).map(|stored| UserAccount {
        user: stored.user.clone(),
        helper_profile: state.helper_profiles.get(id).cloned(),
    })
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(
        &self,
        user: &NewUser,
        helper_profile: Option<HelperProfile>,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::connection)?;
        if state
            .users
            .values()
            .any(|stored| stored.user.phone == user.user.phone)
        {
            return Err(UserPersistenceError::duplicate_phone());
        }
        let id = *user.user.id.as_uuid();
        state.users.insert(
            id,
            StoredCredentials {
                user: user.user.clone(),
                password_hash: user.password_hash.clone(),
            },
        );
        if let Some(profile) = helper_profile {
            state.helper_profiles.insert(id, profile);
        }
        Ok(())
    }

    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::connection)?;
        Ok(state
            .users
            .values()
            .find(|stored| &stored.user.phone == phone)
            .cloned())
    }

    async fn find_account(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::connection)?;
        Ok(account(&state, id.as_uuid()))
    }

    async fn record_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::connection)?;
        if let Some(stored) = state.users.get_mut(id.as_uuid()) {
            stored.user.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
        _at: DateTime<Utc>,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::connection)?;
        let Some(stored) = state.users.get_mut(id.as_uuid()) else {
            return Ok(None);
        };
        let user = &mut stored.user;
        if let Some(first_name) = &update.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(city) = &update.city {
            user.city = city.clone();
        }
        if let Some(avatar_url) = &update.avatar_url {
            user.avatar_url = Some(avatar_url.clone());
        }
        if let Some(bio) = &update.bio {
            if let Some(profile) = state.helper_profiles.get_mut(id.as_uuid()) {
                profile.bio = Some(bio.clone());
            }
        }
        Ok(account(&state, id.as_uuid()))
    }
}

#[async_trait]
impl OtpRepository for MemoryStore {
    async fn insert(&self, code: &OtpCode) -> Result<(), OtpPersistenceError> {
        let mut state = self.lock(OtpPersistenceError::connection)?;
        state.otp_codes.push(code.clone());
        Ok(())
    }

    async fn find_active(
        &self,
        phone: &PhoneNumber,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpCode>, OtpPersistenceError> {
        let state = self.lock(OtpPersistenceError::connection)?;
        let newest = super::newest_first(&state.otp_codes, |code| code.created_at)
            .into_iter()
            .map(|index| &state.otp_codes[index])
            .find(|code| &code.phone == phone && code.purpose == purpose && code.is_active_at(now))
            .cloned();
        Ok(newest)
    }

    async fn increment_attempts(&self, id: Uuid) -> Result<(), OtpPersistenceError> {
        let mut state = self.lock(OtpPersistenceError::connection)?;
        if let Some(code) = state.otp_codes.iter_mut().find(|code| code.id == id) {
            code.attempts += 1;
        }
        Ok(())
    }

    async fn mark_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, OtpPersistenceError> {
        let mut state = self.lock(OtpPersistenceError::connection)?;
        let Some(code) = state
            .otp_codes
            .iter_mut()
            .find(|code| code.id == id && code.used_at.is_none() && !code.attempts_exhausted())
        else {
            return Ok(false);
        };
        code.used_at = Some(at);
        Ok(true)
    }
}

#[async_trait]
impl AddressRepository for MemoryStore {
    async fn insert(&self, address: &Address) -> Result<(), AddressPersistenceError> {
        let mut state = self.lock(AddressPersistenceError::connection)?;
        state.addresses.push(address.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AddressId) -> Result<Option<Address>, AddressPersistenceError> {
        let state = self.lock(AddressPersistenceError::connection)?;
        Ok(state
            .addresses
            .iter()
            .find(|address| &address.id == id)
            .cloned())
    }

    async fn list_for_user(&self, owner: &UserId) -> Result<Vec<Address>, AddressPersistenceError> {
        let state = self.lock(AddressPersistenceError::connection)?;
        let mut owned: Vec<Address> = state
            .addresses
            .iter()
            .filter(|address| &address.user_id == owner)
            .cloned()
            .collect();
        owned.sort_by_key(|address| (!address.is_default, address.created_at));
        Ok(owned)
    }
}
