//! PostgreSQL-backed `ReviewRepository` implementation using Diesel ORM.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Double, Integer};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{ReviewPersistenceError, ReviewRepository};
use crate::domain::{JobId, PageRequest, RatingSummary, Review, ReviewListing, UserId};

use super::diesel_basic_error_mapping::{map_basic_pool_error, map_diesel_error_with_unique};
use super::models::{ParticipantRow, ReviewRow};
use super::pool::{DbPool, PoolError};
use super::row_mapping::{participant_from_row, review_from_row, review_to_row};
use super::schema::{helper_profiles, jobs, reviews, users};

/// Recompute a helper's rating from every client-written review about them.
const REFRESH_RATING_SQL: &str = r#"
UPDATE helper_profiles AS profile
SET average_rating = COALESCE(stats.average, 0),
    total_reviews = stats.total
FROM (
    SELECT AVG(overall_rating)::float8 AS average, COUNT(*)::int4 AS total
    FROM reviews
    WHERE reviewee_id = $1 AND is_client_review
) AS stats
WHERE profile.user_id = $1
RETURNING profile.average_rating, profile.total_reviews
"#;

#[derive(QueryableByName)]
struct RatingRow {
    #[diesel(sql_type = Double)]
    average_rating: f64,
    #[diesel(sql_type = Integer)]
    total_reviews: i32,
}

/// Diesel-backed implementation of the review repository port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReviewPersistenceError {
    map_basic_pool_error(error, ReviewPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ReviewPersistenceError {
    map_diesel_error_with_unique(
        error,
        ReviewPersistenceError::query,
        ReviewPersistenceError::connection,
        |constraint| {
            (constraint == Some("reviews_job_id_key")).then(ReviewPersistenceError::duplicate_review)
        },
    )
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn insert_and_rate(
        &self,
        review: &Review,
    ) -> Result<Option<RatingSummary>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = review_to_row(review);
        let rated = review.is_client_review.then_some(*review.reviewee_id.as_uuid());

        let summary = conn
            .transaction(|conn| {
                async move {
                    diesel::insert_into(reviews::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    let Some(helper) = rated else {
                        return Ok(None);
                    };
                    // Serialise recomputes per helper so each one sees every
                    // committed review.
                    helper_profiles::table
                        .find(helper)
                        .select(helper_profiles::user_id)
                        .for_update()
                        .first::<Uuid>(conn)
                        .await?;
                    let rating = sql_query(REFRESH_RATING_SQL)
                        .bind::<diesel::sql_types::Uuid, _>(helper)
                        .get_result::<RatingRow>(conn)
                        .await?;
                    Ok(Some(RatingSummary {
                        average_rating: rating.average_rating,
                        total_reviews: rating.total_reviews,
                    }))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        debug!(review_id = %review.id, rated = summary.is_some(), "review stored");
        Ok(summary)
    }

    async fn exists_for_job(&self, job: &JobId) -> Result<bool, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            reviews::table.filter(reviews::job_id.eq(job.as_uuid())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn list_for_reviewee(
        &self,
        reviewee: &UserId,
        page: PageRequest,
    ) -> Result<Vec<ReviewListing>, ReviewPersistenceError> {
        let offset = i64::try_from(page.offset())
            .map_err(|_| ReviewPersistenceError::query("requested page exceeds i64 range"))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = reviews::table
            .filter(reviews::reviewee_id.eq(reviewee.as_uuid()))
            .order((reviews::created_at.desc(), reviews::id.desc()))
            .limit(i64::from(page.limit()))
            .offset(offset)
            .select(ReviewRow::as_select())
            .load::<ReviewRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let reviewer_ids: Vec<Uuid> = rows.iter().map(|row| row.reviewer_id).collect();
        let reviewers: HashMap<Uuid, ParticipantRow> = users::table
            .filter(users::id.eq_any(&reviewer_ids))
            .select(ParticipantRow::as_select())
            .load::<ParticipantRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| (row.id, row))
            .collect();

        let job_ids: Vec<Uuid> = rows.iter().map(|row| row.job_id).collect();
        let titles: HashMap<Uuid, String> = jobs::table
            .filter(jobs::id.eq_any(&job_ids))
            .select((jobs::id, jobs::title))
            .load::<(Uuid, String)>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .collect();

        rows.into_iter()
            .map(|row| {
                let reviewer = reviewers.get(&row.reviewer_id).cloned().ok_or_else(|| {
                    ReviewPersistenceError::query(format!(
                        "review {} references missing reviewer",
                        row.id
                    ))
                })?;
                let job_title = titles.get(&row.job_id).cloned().unwrap_or_default();
                Ok(ReviewListing {
                    review: review_from_row(row).map_err(ReviewPersistenceError::query)?,
                    reviewer: participant_from_row(reviewer),
                    job_title,
                })
            })
            .collect()
    }
}
