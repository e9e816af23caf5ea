//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    HelperProfile, NewUser, PhoneNumber, ProfileUpdate, StoredCredentials, UserAccount,
    UserId,
};

use super::diesel_basic_error_mapping::{map_basic_pool_error, map_diesel_error_with_unique};
use super::models::{HelperProfileRow, UserProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::row_mapping::{helper_profile_from_row, helper_profile_to_row, user_from_row, user_to_row};
use super::schema::{helper_profiles, users};

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error_with_unique(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
        |constraint| {
            (constraint == Some("users_phone_key")).then(UserPersistenceError::duplicate_phone)
        },
    )
}

async fn load_account(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Option<UserAccount>, UserPersistenceError> {
    let Some(row) = users::table
        .find(id)
        .select(UserRow::as_select())
        .first::<UserRow>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
    else {
        return Ok(None);
    };
    let profile = helper_profiles::table
        .find(id)
        .select(HelperProfileRow::as_select())
        .first::<HelperProfileRow>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

    let (user, _) = user_from_row(row).map_err(UserPersistenceError::query)?;
    Ok(Some(UserAccount {
        user,
        helper_profile: profile.map(helper_profile_from_row),
    }))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &NewUser,
        helper_profile: Option<HelperProfile>,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_row = user_to_row(&user.user, &user.password_hash);
        let profile_row = helper_profile.as_ref().map(helper_profile_to_row);

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(users::table)
                    .values(&user_row)
                    .execute(conn)
                    .await?;
                if let Some(profile_row) = profile_row {
                    diesel::insert_into(helper_profiles::table)
                        .values(&profile_row)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::phone.eq(phone.as_str()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| {
            user_from_row(row)
                .map(|(user, password_hash)| StoredCredentials {
                    user,
                    password_hash,
                })
                .map_err(UserPersistenceError::query)
        })
        .transpose()
    }

    async fn find_account(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_account(&mut conn, *id.as_uuid()).await
    }

    async fn record_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.find(id.as_uuid()))
            .set((users::last_login_at.eq(at), users::updated_at.eq(at)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id = *id.as_uuid();
        let changeset = UserProfileChangeset {
            first_name: update.first_name.as_ref().map(|name| name.as_str()),
            last_name: update.last_name.as_ref().map(|name| name.as_str()),
            city: update.city.as_ref().map(|city| city.as_str()),
            avatar_url: update.avatar_url.as_deref(),
            updated_at: at,
        };
        let bio = update.bio.as_deref();

        let touched = conn
            .transaction(|conn| {
                async move {
                    let touched = diesel::update(users::table.find(user_id))
                        .set(&changeset)
                        .execute(conn)
                        .await?;
                    if let Some(bio) = bio {
                        diesel::update(helper_profiles::table.find(user_id))
                            .set(helper_profiles::bio.eq(bio))
                            .execute(conn)
                            .await?;
                    }
                    Ok(touched)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        if touched == 0 {
            return Ok(None);
        }
        debug!(%user_id, "profile row updated");
        load_account(&mut conn, user_id).await
    }
}

#[cfg(test)]
mod tests {
    //! Error mapping coverage; query behaviour is exercised against the
    //! in-memory store and a live database.

    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn duplicate_phone_constraint_maps_to_domain_variant() {
        struct Info;
        impl diesel::result::DatabaseErrorInformation for Info {
            fn message(&self) -> &str {
                "duplicate key value violates unique constraint"
            }
            fn details(&self) -> Option<&str> {
                None
            }
            fn hint(&self) -> Option<&str> {
                None
            }
            fn table_name(&self) -> Option<&str> {
                Some("users")
            }
            fn column_name(&self) -> Option<&str> {
                None
            }
            fn constraint_name(&self) -> Option<&str> {
                Some("users_phone_key")
            }
            fn statement_position(&self) -> Option<i32> {
                None
            }
        }

        let error = DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, Box::new(Info));
        assert_eq!(
            map_diesel_error(error),
            UserPersistenceError::DuplicatePhone
        );
    }

    #[rstest]
    fn pool_failure_is_connection_error() {
        let error = map_pool_error(PoolError::checkout("timeout"));
        assert!(matches!(error, UserPersistenceError::Connection { .. }));
    }
}
