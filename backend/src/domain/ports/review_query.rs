//! Driving port for reading reviews.

use async_trait::async_trait;

use crate::domain::{Error, Page, PageRequest, ReviewListing, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewQuery: Send + Sync {
    /// Reviews about `user`, newest first.
    async fn user_reviews(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Page<ReviewListing>, Error>;
}
