//! PostgreSQL-backed `JobRepository` implementation using Diesel ORM.
//!
//! Status changes are compare-and-swap updates on the `status` column, so a
//! request racing another transition observes zero affected rows instead of
//! overwriting it.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{JobPersistenceError, JobRepository};
use crate::domain::{Job, JobId, JobListing, JobSearch, JobStatus, StatusChange, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::JobRow;
use super::pool::{DbPool, PoolError};
use super::row_mapping::{job_from_row, job_to_row};
use super::schema::{applications, helper_profiles, jobs};

/// Diesel-backed implementation of the job repository port.
#[derive(Clone)]
pub struct DieselJobRepository {
    pool: DbPool,
}

impl DieselJobRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> JobPersistenceError {
    map_basic_pool_error(error, JobPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> JobPersistenceError {
    map_basic_diesel_error(
        error,
        JobPersistenceError::query,
        JobPersistenceError::connection,
    )
}

/// Attach application counts to loaded job rows, preserving their order.
pub(super) async fn with_application_counts(
    conn: &mut AsyncPgConnection,
    rows: Vec<JobRow>,
) -> Result<Vec<JobListing>, JobPersistenceError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let counts: HashMap<Uuid, i64> = applications::table
        .filter(applications::job_id.eq_any(&ids))
        .group_by(applications::job_id)
        .select((applications::job_id, diesel::dsl::count(applications::id)))
        .load::<(Uuid, i64)>(conn)
        .await
        .map_err(map_diesel_error)?
        .into_iter()
        .collect();

    rows.into_iter()
        .map(|row| {
            let applications_count = counts.get(&row.id).copied().unwrap_or(0);
            let job = job_from_row(row).map_err(JobPersistenceError::query)?;
            Ok(JobListing {
                job,
                applications_count,
                distance_km: None,
            })
        })
        .collect()
}

fn page_bounds(search: &JobSearch) -> Result<(i64, i64), JobPersistenceError> {
    let limit = i64::from(search.page.limit());
    let offset = i64::try_from(search.page.offset())
        .map_err(|_| JobPersistenceError::query("requested page exceeds i64 range"))?;
    Ok((limit, offset))
}

#[async_trait]
impl JobRepository for DieselJobRepository {
    async fn insert(&self, job: &Job) -> Result<(), JobPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(jobs::table)
            .values(&job_to_row(job))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>, JobPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = jobs::table
            .find(id.as_uuid())
            .select(JobRow::as_select())
            .first::<JobRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| job_from_row(row).map_err(JobPersistenceError::query))
            .transpose()
    }

    async fn search(&self, search: &JobSearch) -> Result<Vec<JobListing>, JobPersistenceError> {
        let (limit, offset) = page_bounds(search)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = jobs::table
            .select(JobRow::as_select())
            .filter(jobs::status.eq(search.status.as_str()))
            .order((jobs::created_at.desc(), jobs::id.desc()))
            .into_boxed();

        if let Some(category) = &search.category_id {
            query = query.filter(jobs::category_id.eq(*category.as_uuid()));
        }
        if let Some(city) = &search.city {
            query = query.filter(jobs::city.eq(city.clone()));
        }

        let rows = query
            .limit(limit)
            .offset(offset)
            .load::<JobRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        with_application_counts(&mut conn, rows).await
    }

    async fn list_for_client(
        &self,
        client: &UserId,
        status: Option<JobStatus>,
    ) -> Result<Vec<JobListing>, JobPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = jobs::table
            .select(JobRow::as_select())
            .filter(jobs::client_id.eq(*client.as_uuid()))
            .order((jobs::created_at.desc(), jobs::id.desc()))
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(jobs::status.eq(status.as_str()));
        }

        let rows = query
            .load::<JobRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        with_application_counts(&mut conn, rows).await
    }

    async fn apply_status_change(
        &self,
        change: &StatusChange,
    ) -> Result<bool, JobPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let job_id = *change.job_id.as_uuid();
        let from = change.from.as_str();
        let to = change.to;
        let at = change.at;
        let reason = change.cancellation_reason.clone();

        let applied = conn
            .transaction(|conn| {
                async move {
                    let guarded = jobs::table.filter(jobs::id.eq(job_id).and(jobs::status.eq(from)));
                    let base = (jobs::status.eq(to.as_str()), jobs::updated_at.eq(at));
                    let updated = match to {
                        JobStatus::InProgress => {
                            diesel::update(guarded)
                                .set((base, jobs::started_at.eq(at)))
                                .execute(conn)
                                .await?
                        }
                        JobStatus::Completed => {
                            diesel::update(guarded)
                                .set((base, jobs::completed_at.eq(at)))
                                .execute(conn)
                                .await?
                        }
                        JobStatus::Cancelled => {
                            diesel::update(guarded)
                                .set((
                                    base,
                                    jobs::cancelled_at.eq(at),
                                    jobs::cancellation_reason.eq(reason),
                                ))
                                .execute(conn)
                                .await?
                        }
                        JobStatus::Open | JobStatus::Assigned | JobStatus::PendingReview => {
                            diesel::update(guarded).set(base).execute(conn).await?
                        }
                    };
                    if updated != 1 {
                        return Ok(false);
                    }

                    if to == JobStatus::Completed {
                        let helper = jobs::table
                            .find(job_id)
                            .select(jobs::assigned_helper_id)
                            .first::<Option<Uuid>>(conn)
                            .await?;
                        if let Some(helper) = helper {
                            diesel::update(helper_profiles::table.find(helper))
                                .set(
                                    helper_profiles::total_jobs_completed
                                        .eq(helper_profiles::total_jobs_completed + 1),
                                )
                                .execute(conn)
                                .await?;
                        }
                    }
                    Ok(true)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        debug!(%job_id, from, to = to.as_str(), applied, "job status change attempted");
        Ok(applied)
    }
}
