//! PostgreSQL-backed `ApplicationRepository` implementation using Diesel ORM.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ApplicationPersistenceError, ApplicationRepository};
use crate::domain::{
    Application, ApplicationId, ApplicationStatus, HelperApplication, Job, JobId, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_pool_error, map_diesel_error_with_unique};
use super::models::{ApplicationRow, JobRow};
use super::pool::{DbPool, PoolError};
use super::row_mapping::{application_from_row, application_to_row, job_from_row};
use super::schema::{applications, jobs};

/// Diesel-backed implementation of the application repository port.
#[derive(Clone)]
pub struct DieselApplicationRepository {
    pool: DbPool,
}

impl DieselApplicationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ApplicationPersistenceError {
    map_basic_pool_error(error, ApplicationPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ApplicationPersistenceError {
    map_diesel_error_with_unique(
        error,
        ApplicationPersistenceError::query,
        ApplicationPersistenceError::connection,
        |constraint| {
            (constraint == Some("applications_job_helper_key"))
                .then(ApplicationPersistenceError::duplicate_application)
        },
    )
}

fn to_domain(row: ApplicationRow) -> Result<Application, ApplicationPersistenceError> {
    application_from_row(row).map_err(ApplicationPersistenceError::query)
}

#[async_trait]
impl ApplicationRepository for DieselApplicationRepository {
    async fn insert(&self, application: &Application) -> Result<(), ApplicationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(applications::table)
            .values(&application_to_row(application))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, ApplicationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        applications::table
            .find(id.as_uuid())
            .select(ApplicationRow::as_select())
            .first::<ApplicationRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn exists_for(
        &self,
        job: &JobId,
        helper: &UserId,
    ) -> Result<bool, ApplicationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(applications::table.filter(
            applications::job_id
                .eq(job.as_uuid())
                .and(applications::helper_id.eq(helper.as_uuid())),
        )))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn list_for_job(
        &self,
        job: &JobId,
    ) -> Result<Vec<Application>, ApplicationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        applications::table
            .filter(applications::job_id.eq(job.as_uuid()))
            .order((applications::created_at.asc(), applications::id.asc()))
            .select(ApplicationRow::as_select())
            .load::<ApplicationRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn list_for_helper(
        &self,
        helper: &UserId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<HelperApplication>, ApplicationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = applications::table
            .filter(applications::helper_id.eq(*helper.as_uuid()))
            .order((applications::created_at.desc(), applications::id.desc()))
            .select(ApplicationRow::as_select())
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(applications::status.eq(status.as_str()));
        }
        let rows = query
            .load::<ApplicationRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let job_ids: Vec<Uuid> = rows.iter().map(|row| row.job_id).collect();
        let mut jobs_by_id: HashMap<Uuid, Job> = HashMap::new();
        for row in jobs::table
            .filter(jobs::id.eq_any(&job_ids))
            .select(JobRow::as_select())
            .load::<JobRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
        {
            let id = row.id;
            let job = job_from_row(row).map_err(ApplicationPersistenceError::query)?;
            jobs_by_id.insert(id, job);
        }

        rows.into_iter()
            .map(|row| {
                let job = jobs_by_id.get(&row.job_id).cloned().ok_or_else(|| {
                    ApplicationPersistenceError::query(format!(
                        "application {} references missing job {}",
                        row.id, row.job_id
                    ))
                })?;
                Ok(HelperApplication {
                    application: to_domain(row)?,
                    job,
                })
            })
            .collect()
    }

    async fn decline(
        &self,
        id: &ApplicationId,
        at: DateTime<Utc>,
    ) -> Result<bool, ApplicationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            applications::table.filter(
                applications::id
                    .eq(id.as_uuid())
                    .and(applications::status.eq(ApplicationStatus::Pending.as_str())),
            ),
        )
        .set((
            applications::status.eq(ApplicationStatus::Declined.as_str()),
            applications::updated_at.eq(at),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated == 1)
    }
}
