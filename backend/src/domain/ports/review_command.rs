//! Driving port for writing reviews.

use async_trait::async_trait;

use crate::domain::{Error, JobId, Review, ReviewDraft, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewCommand: Send + Sync {
    /// Review the other party of a completed job.
    async fn create_review(
        &self,
        reviewer: &UserId,
        job: &JobId,
        draft: ReviewDraft,
    ) -> Result<Review, Error>;
}
