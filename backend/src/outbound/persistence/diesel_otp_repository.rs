//! PostgreSQL-backed `OtpRepository` implementation using Diesel ORM.
//!
//! Consuming a code is a conditional update guarded on `used_at IS NULL`
//! and the attempt budget, so two concurrent correct verifications cannot
//! both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{OtpPersistenceError, OtpRepository};
use crate::domain::{OtpCode, OtpPurpose, PhoneNumber};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::OtpCodeRow;
use super::pool::{DbPool, PoolError};
use super::row_mapping::{otp_from_row, otp_to_row};
use super::schema::otp_codes;

/// Diesel-backed implementation of the OTP repository port.
#[derive(Clone)]
pub struct DieselOtpRepository {
    pool: DbPool,
}

impl DieselOtpRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OtpPersistenceError {
    map_basic_pool_error(error, OtpPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> OtpPersistenceError {
    map_basic_diesel_error(
        error,
        OtpPersistenceError::query,
        OtpPersistenceError::connection,
    )
}

#[async_trait]
impl OtpRepository for DieselOtpRepository {
    async fn insert(&self, otp: &OtpCode) -> Result<(), OtpPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(otp_codes::table)
            .values(&otp_to_row(otp))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_active(
        &self,
        phone: &PhoneNumber,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpCode>, OtpPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = otp_codes::table
            .filter(
                otp_codes::phone
                    .eq(phone.as_str())
                    .and(otp_codes::purpose.eq(purpose.as_str()))
                    .and(otp_codes::used_at.is_null())
                    .and(otp_codes::expires_at.gt(now)),
            )
            .order(otp_codes::created_at.desc())
            .select(OtpCodeRow::as_select())
            .first::<OtpCodeRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| otp_from_row(row).map_err(OtpPersistenceError::query))
            .transpose()
    }

    async fn increment_attempts(&self, id: Uuid) -> Result<(), OtpPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(otp_codes::table.find(id))
            .set(otp_codes::attempts.eq(otp_codes::attempts + 1))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn mark_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, OtpPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            otp_codes::table.filter(
                otp_codes::id
                    .eq(id)
                    .and(otp_codes::used_at.is_null())
                    .and(otp_codes::attempts.lt(otp_codes::max_attempts)),
            ),
        )
        .set(otp_codes::used_at.eq(at))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated == 1)
    }
}
