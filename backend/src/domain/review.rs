//! Reviews left once a job is completed, and helper rating aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JobId, ParticipantSummary, ReviewId, UserId};

/// Maximum number of characters in a review comment.
pub const REVIEW_COMMENT_MAX: usize = 1000;
/// Default number of reviews per page.
pub const REVIEWS_DEFAULT_LIMIT: u32 = 10;
/// Upper bound on reviews per page.
pub const REVIEWS_MAX_LIMIT: u32 = 50;

/// Validation errors for review input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    #[error("{field} must be between 1 and 5")]
    RatingOutOfRange { field: &'static str },
    #[error("comment must be at most {max} characters")]
    CommentTooLong { max: usize },
}

impl ReviewValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::RatingOutOfRange { field } => field,
            Self::CommentTooLong { .. } => "comment",
        }
    }
}

/// Star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct Rating(u8);

impl Rating {
    /// Validate a rating for the named field.
    ///
    /// # Examples
    /// ```
    /// use khedma::domain::Rating;
    ///
    /// assert!(Rating::new(5, "overallRating").is_ok());
    /// assert!(Rating::new(6, "overallRating").is_err());
    /// ```
    pub fn new(value: i16, field: &'static str) -> Result<Self, ReviewValidationError> {
        u8::try_from(value)
            .ok()
            .filter(|stars| (1..=5).contains(stars))
            .map(Self)
            .ok_or(ReviewValidationError::RatingOutOfRange { field })
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<Rating> for i16 {
    fn from(value: Rating) -> Self {
        i16::from(value.0)
    }
}

impl TryFrom<i16> for Rating {
    type Error = ReviewValidationError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value, "rating")
    }
}

/// A review of one party of a completed job by the other.
///
/// `is_client_review` is `true` when the job's client wrote the review, i.e.
/// the helper is being rated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub job_id: JobId,
    pub reviewer_id: UserId,
    pub reviewee_id: UserId,
    pub overall_rating: Rating,
    pub punctuality_rating: Option<Rating>,
    pub quality_rating: Option<Rating>,
    pub communication_rating: Option<Rating>,
    pub value_rating: Option<Rating>,
    pub comment: Option<String>,
    pub is_client_review: bool,
    pub created_at: DateTime<Utc>,
}

/// Raw review ratings before validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingsInput {
    pub overall: i16,
    pub punctuality: Option<i16>,
    pub quality: Option<i16>,
    pub communication: Option<i16>,
    pub value: Option<i16>,
}

/// Validated review input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub overall_rating: Rating,
    pub punctuality_rating: Option<Rating>,
    pub quality_rating: Option<Rating>,
    pub communication_rating: Option<Rating>,
    pub value_rating: Option<Rating>,
    pub comment: Option<String>,
}

fn optional_rating(
    value: Option<i16>,
    field: &'static str,
) -> Result<Option<Rating>, ReviewValidationError> {
    value.map(|stars| Rating::new(stars, field)).transpose()
}

impl ReviewDraft {
    pub fn new(
        ratings: RatingsInput,
        comment: Option<&str>,
    ) -> Result<Self, ReviewValidationError> {
        let comment = comment
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                if value.chars().count() > REVIEW_COMMENT_MAX {
                    Err(ReviewValidationError::CommentTooLong {
                        max: REVIEW_COMMENT_MAX,
                    })
                } else {
                    Ok(value.to_owned())
                }
            })
            .transpose()?;
        Ok(Self {
            overall_rating: Rating::new(ratings.overall, "overallRating")?,
            punctuality_rating: optional_rating(ratings.punctuality, "punctualityRating")?,
            quality_rating: optional_rating(ratings.quality, "qualityRating")?,
            communication_rating: optional_rating(ratings.communication, "communicationRating")?,
            value_rating: optional_rating(ratings.value, "valueRating")?,
            comment,
        })
    }

    /// Materialise the review written by `reviewer` about `reviewee`.
    pub fn into_review(
        self,
        job_id: JobId,
        reviewer_id: UserId,
        reviewee_id: UserId,
        is_client_review: bool,
        now: DateTime<Utc>,
    ) -> Review {
        Review {
            id: ReviewId::random(),
            job_id,
            reviewer_id,
            reviewee_id,
            overall_rating: self.overall_rating,
            punctuality_rating: self.punctuality_rating,
            quality_rating: self.quality_rating,
            communication_rating: self.communication_rating,
            value_rating: self.value_rating,
            comment: self.comment,
            is_client_review,
            created_at: now,
        }
    }
}

/// Aggregate helper rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_reviews: i32,
}

impl RatingSummary {
    /// Mean and count of `ratings`; zero when empty.
    ///
    /// # Examples
    /// ```
    /// use khedma::domain::{Rating, RatingSummary};
    ///
    /// let ratings = [5, 4, 3].map(|r| Rating::new(r, "overallRating").expect("valid"));
    /// let summary = RatingSummary::from_ratings(&ratings);
    /// assert_eq!(summary.average_rating, 4.0);
    /// assert_eq!(summary.total_reviews, 3);
    /// ```
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        let total_reviews = i32::try_from(ratings.len()).unwrap_or(i32::MAX);
        if ratings.is_empty() {
            return Self {
                average_rating: 0.0,
                total_reviews,
            };
        }
        let sum: f64 = ratings.iter().map(|rating| f64::from(rating.value())).sum();
        Self {
            average_rating: sum / f64::from(total_reviews),
            total_reviews,
        }
    }
}

/// Review as listed on a user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListing {
    #[serde(flatten)]
    pub review: Review,
    pub reviewer: ParticipantSummary,
    pub job_title: String,
}
