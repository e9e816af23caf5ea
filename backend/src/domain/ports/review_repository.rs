//! Port abstraction for review persistence.
use async_trait::async_trait;

use crate::domain::{JobId, PageRequest, RatingSummary, Review, ReviewListing, UserId};

use super::define_repository_error;

define_repository_error! {
    /// Persistence errors raised by review repository adapters.
    pub enum ReviewPersistenceError("review repository") {
        /// The job already has a review.
        DuplicateReview => "job already reviewed",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Insert a review. A client-written review also recomputes the
    /// reviewee's helper rating from every client review in the same unit of
    /// work and returns the fresh summary; nothing is stored if either fails.
    async fn insert_and_rate(
        &self,
        review: &Review,
    ) -> Result<Option<RatingSummary>, ReviewPersistenceError>;

    async fn exists_for_job(&self, job: &JobId) -> Result<bool, ReviewPersistenceError>;

    /// Reviews about `reviewee`, newest first.
    async fn list_for_reviewee(
        &self,
        reviewee: &UserId,
        page: PageRequest,
    ) -> Result<Vec<ReviewListing>, ReviewPersistenceError>;
}
