//! PostgreSQL-backed `AddressRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AddressPersistenceError, AddressRepository};
use crate::domain::{Address, AddressId, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::AddressRow;
use super::pool::{DbPool, PoolError};
use super::row_mapping::{address_from_row, address_to_row};
use super::schema::addresses;

/// Diesel-backed implementation of the address repository port.
#[derive(Clone)]
pub struct DieselAddressRepository {
    pool: DbPool,
}

impl DieselAddressRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AddressPersistenceError {
    map_basic_pool_error(error, AddressPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AddressPersistenceError {
    map_basic_diesel_error(
        error,
        AddressPersistenceError::query,
        AddressPersistenceError::connection,
    )
}

#[async_trait]
impl AddressRepository for DieselAddressRepository {
    async fn insert(&self, address: &Address) -> Result<(), AddressPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(addresses::table)
            .values(&address_to_row(address))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &AddressId) -> Result<Option<Address>, AddressPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = addresses::table
            .find(id.as_uuid())
            .select(AddressRow::as_select())
            .first::<AddressRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| address_from_row(row).map_err(AddressPersistenceError::query))
            .transpose()
    }

    async fn list_for_user(&self, owner: &UserId) -> Result<Vec<Address>, AddressPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        addresses::table
            .filter(addresses::user_id.eq(owner.as_uuid()))
            .order((addresses::is_default.desc(), addresses::created_at.asc()))
            .select(AddressRow::as_select())
            .load::<AddressRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| address_from_row(row).map_err(AddressPersistenceError::query))
            .collect()
    }
}
