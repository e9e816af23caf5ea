//! Reviews and notifications.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{MemoryStore, newest_first, page_of};
use crate::domain::ports::{
    NotificationPersistenceError, NotificationRepository, ReviewPersistenceError,
    ReviewRepository,
};
use crate::domain::{
    JobId, Notification, NotificationId, PageRequest, ParticipantSummary, Rating, RatingSummary,
    Review, ReviewListing, UserId,
};

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn insert_and_rate(
        &self,
        review: &Review,
    ) -> Result<Option<RatingSummary>, ReviewPersistenceError> {
        let mut state = self.lock(ReviewPersistenceError::connection)?;
        if state.reviews.iter().any(|existing| existing.job_id == review.job_id) {
            return Err(ReviewPersistenceError::duplicate_review());
        }
        if !review.is_client_review {
            state.reviews.push(review.clone());
            return Ok(None);
        }

        let helper = review.reviewee_id;
        let ratings: Vec<Rating> = state
            .reviews
            .iter()
            .filter(|existing| existing.reviewee_id == helper && existing.is_client_review)
            .map(|existing| existing.overall_rating)
            .chain(std::iter::once(review.overall_rating))
            .collect();
        let summary = RatingSummary::from_ratings(&ratings);
        let Some(profile) = state.helper_profiles.get_mut(helper.as_uuid()) else {
            return Err(ReviewPersistenceError::query(format!(
                "reviewee {helper} has no helper profile"
            )));
        };
        profile.average_rating = summary.average_rating;
        profile.total_reviews = summary.total_reviews;
        state.reviews.push(review.clone());
        Ok(Some(summary))
    }

    async fn exists_for_job(&self, job: &JobId) -> Result<bool, ReviewPersistenceError> {
        let state = self.lock(ReviewPersistenceError::connection)?;
        Ok(state.reviews.iter().any(|review| &review.job_id == job))
    }

    async fn list_for_reviewee(
        &self,
        reviewee: &UserId,
        page: PageRequest,
    ) -> Result<Vec<ReviewListing>, ReviewPersistenceError> {
        let state = self.lock(ReviewPersistenceError::connection)?;
        let listings = newest_first(&state.reviews, |review| review.created_at)
            .into_iter()
            .map(|index| &state.reviews[index])
            .filter(|review| &review.reviewee_id == reviewee)
            .map(|review| {
                let reviewer = state
                    .users
                    .get(review.reviewer_id.as_uuid())
                    .map(|stored| ParticipantSummary {
                        id: review.reviewer_id,
                        first_name: stored.user.first_name.as_str().to_owned(),
                        avatar_url: stored.user.avatar_url.clone(),
                    })
                    .ok_or_else(|| {
                        ReviewPersistenceError::query(format!(
                            "review {} references missing reviewer",
                            review.id
                        ))
                    })?;
                let job_title = state
                    .jobs
                    .iter()
                    .find(|job| job.id == review.job_id)
                    .map(|job| job.title.clone())
                    .unwrap_or_default();
                Ok(ReviewListing {
                    review: review.clone(),
                    reviewer,
                    job_title,
                })
            })
            .collect::<Result<Vec<_>, ReviewPersistenceError>>()?;
        Ok(page_of(listings, page.offset(), page.limit()))
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationPersistenceError> {
        let mut state = self.lock(NotificationPersistenceError::connection)?;
        state.notifications.push(notification.clone());
        Ok(())
    }

    async fn list(
        &self,
        user: &UserId,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Vec<Notification>, NotificationPersistenceError> {
        let state = self.lock(NotificationPersistenceError::connection)?;
        let inbox: Vec<Notification> =
            newest_first(&state.notifications, |notification| notification.created_at)
                .into_iter()
                .map(|index| &state.notifications[index])
                .filter(|notification| {
                    &notification.user_id == user && (!unread_only || !notification.is_read)
                })
                .cloned()
                .collect();
        Ok(page_of(inbox, page.offset(), page.limit()))
    }

    async fn unread_count(&self, user: &UserId) -> Result<u64, NotificationPersistenceError> {
        let state = self.lock(NotificationPersistenceError::connection)?;
        let count = state
            .notifications
            .iter()
            .filter(|notification| &notification.user_id == user && !notification.is_read)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn mark_read(
        &self,
        user: &UserId,
        ids: &[NotificationId],
        at: DateTime<Utc>,
    ) -> Result<u64, NotificationPersistenceError> {
        let mut state = self.lock(NotificationPersistenceError::connection)?;
        let mut changed = 0_u64;
        for notification in state.notifications.iter_mut().filter(|notification| {
            &notification.user_id == user && !notification.is_read && ids.contains(&notification.id)
        }) {
            notification.is_read = true;
            notification.read_at = Some(at);
            changed += 1;
        }
        Ok(changed)
    }

    async fn mark_all_read(
        &self,
        user: &UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, NotificationPersistenceError> {
        let mut state = self.lock(NotificationPersistenceError::connection)?;
        let mut changed = 0_u64;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|notification| &notification.user_id == user && !notification.is_read)
        {
            notification.is_read = true;
            notification.read_at = Some(at);
            changed += 1;
        }
        Ok(changed)
    }
}
