//! Review creation and helper rating aggregation.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::service_errors::{map_job_error, map_review_error};
use crate::domain::ports::{JobRepository, Notifier, ReviewCommand, ReviewQuery, ReviewRepository};
use crate::domain::{
    Error, JobId, JobStatus, NewNotification, NotificationKind, Page, PageRequest, Review,
    ReviewDraft, ReviewListing, UserId,
};

/// Review service implementing [`ReviewCommand`] and [`ReviewQuery`].
#[derive(Clone)]
pub struct ReviewService<R, J> {
    reviews: Arc<R>,
    jobs: Arc<J>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl<R, J> ReviewService<R, J> {
    /// Create the service over the review and job stores.
    pub fn new(
        reviews: Arc<R>,
        jobs: Arc<J>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reviews,
            jobs,
            notifier,
            clock,
        }
    }
}

#[async_trait]
impl<R, J> ReviewCommand for ReviewService<R, J>
where
    R: ReviewRepository,
    J: JobRepository,
{
    async fn create_review(
        &self,
        reviewer: &UserId,
        job_id: &JobId,
        draft: ReviewDraft,
    ) -> Result<Review, Error> {
        let job = self
            .jobs
            .find_by_id(job_id)
            .await
            .map_err(map_job_error)?
            .ok_or_else(|| Error::not_found("job not found"))?;
        if job.status != JobStatus::Completed {
            return Err(Error::forbidden("only COMPLETED jobs can be reviewed"));
        }
        let Some(reviewee) = job.counterpart_of(reviewer) else {
            return Err(Error::forbidden("only the job's participants may review it"));
        };
        let already_reviewed = self
            .reviews
            .exists_for_job(job_id)
            .await
            .map_err(map_review_error)?;
        if already_reviewed {
            return Err(Error::conflict("a review already exists for this job"));
        }

        let is_client_review = job.is_owned_by(reviewer);
        let review = draft.into_review(
            job.id,
            *reviewer,
            reviewee,
            is_client_review,
            self.clock.utc(),
        );
        let summary = self
            .reviews
            .insert_and_rate(&review)
            .await
            .map_err(map_review_error)?;
        info!(review_id = %review.id, job_id = %job.id, is_client_review, "review created");
        if let Some(summary) = summary {
            info!(
                helper_id = %reviewee,
                average_rating = summary.average_rating,
                total_reviews = summary.total_reviews,
                "helper rating recomputed"
            );
        }

        self.notifier
            .notify(NewNotification::about_job(
                reviewee,
                NotificationKind::NewReview,
                &job,
            ))
            .await;
        Ok(review)
    }
}

#[async_trait]
impl<R, J> ReviewQuery for ReviewService<R, J>
where
    R: ReviewRepository,
    J: JobRepository,
{
    async fn user_reviews(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Page<ReviewListing>, Error> {
        let items = self
            .reviews
            .list_for_reviewee(user, page)
            .await
            .map_err(map_review_error)?;
        Ok(Page::new(items, page))
    }
}
