//! Conversions between Diesel rows and validated domain types.
//!
//! Reads go through the domain constructors so corrupt rows surface as query
//! errors instead of leaking unvalidated values. Failures are reported as
//! plain messages; each repository wraps them in its own error type.

use std::str::FromStr;

use uuid::Uuid;

use crate::domain::{
    Address, AddressId, Amount, Application, ApplicationId, CategoryId, City, Conversation,
    ConversationId, Coordinates, HelperProfile, Job, JobId, Message, MessageContent, MessageId,
    Notification, NotificationId, OtpCode, OtpCodeValue, ParticipantSummary, PersonName,
    PhoneNumber, Rating, Review, ReviewId, User, UserId,
};

use super::models::{
    AddressRow, ApplicationRow, ConversationRow, HelperProfileRow, JobRow, MessageRow,
    NotificationRow, OtpCodeRow, ParticipantRow, ReviewRow, UserRow,
};

fn parse_text<T>(value: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|err| err.to_string())
}

fn coordinates(latitude: f64, longitude: f64) -> Result<Coordinates, String> {
    Coordinates::new(latitude, longitude).map_err(|err| err.to_string())
}

fn rating(value: i16, field: &'static str) -> Result<Rating, String> {
    Rating::new(value, field).map_err(|err| err.to_string())
}

fn optional_rating(value: Option<i16>, field: &'static str) -> Result<Option<Rating>, String> {
    value.map(|stars| rating(stars, field)).transpose()
}

fn amount(value: Option<f64>, field: &'static str) -> Result<Option<Amount>, String> {
    value
        .map(|raw| Amount::new(raw, field).map_err(|err| err.to_string()))
        .transpose()
}

pub(crate) fn user_from_row(row: UserRow) -> Result<(User, String), String> {
    let user = User {
        id: UserId::from_uuid(row.id),
        phone: PhoneNumber::new(row.phone).map_err(|err| err.to_string())?,
        first_name: PersonName::new(&row.first_name, "firstName").map_err(|err| err.to_string())?,
        last_name: PersonName::new(&row.last_name, "lastName").map_err(|err| err.to_string())?,
        role: parse_text(&row.role)?,
        status: parse_text(&row.status)?,
        city: City::new(&row.city).map_err(|err| err.to_string())?,
        avatar_url: row.avatar_url,
        phone_verified: row.phone_verified,
        last_login_at: row.last_login_at,
        created_at: row.created_at,
    };
    Ok((user, row.password_hash))
}

pub(crate) fn user_to_row(user: &User, password_hash: &str) -> UserRow {
    UserRow {
        id: *user.id.as_uuid(),
        phone: user.phone.as_str().to_owned(),
        password_hash: password_hash.to_owned(),
        first_name: user.first_name.as_str().to_owned(),
        last_name: user.last_name.as_str().to_owned(),
        role: user.role.as_str().to_owned(),
        status: user.status.as_str().to_owned(),
        city: user.city.as_str().to_owned(),
        avatar_url: user.avatar_url.clone(),
        phone_verified: user.phone_verified,
        last_login_at: user.last_login_at,
        created_at: user.created_at,
        updated_at: user.created_at,
    }
}

pub(crate) fn helper_profile_from_row(row: HelperProfileRow) -> HelperProfile {
    HelperProfile {
        user_id: UserId::from_uuid(row.user_id),
        bio: row.bio,
        average_rating: row.average_rating,
        total_reviews: row.total_reviews,
        total_jobs_completed: row.total_jobs_completed,
        is_verified: row.is_verified,
    }
}

pub(crate) fn helper_profile_to_row(profile: &HelperProfile) -> HelperProfileRow {
    HelperProfileRow {
        user_id: *profile.user_id.as_uuid(),
        bio: profile.bio.clone(),
        average_rating: profile.average_rating,
        total_reviews: profile.total_reviews,
        total_jobs_completed: profile.total_jobs_completed,
        is_verified: profile.is_verified,
    }
}

pub(crate) fn participant_from_row(row: ParticipantRow) -> ParticipantSummary {
    ParticipantSummary {
        id: UserId::from_uuid(row.id),
        first_name: row.first_name,
        avatar_url: row.avatar_url,
    }
}

pub(crate) fn otp_from_row(row: OtpCodeRow) -> Result<OtpCode, String> {
    Ok(OtpCode {
        id: row.id,
        phone: PhoneNumber::new(row.phone).map_err(|err| err.to_string())?,
        code: OtpCodeValue::new(row.code).map_err(|err| err.to_string())?,
        purpose: parse_text(&row.purpose)?,
        expires_at: row.expires_at,
        used_at: row.used_at,
        attempts: row.attempts,
        max_attempts: row.max_attempts,
        created_at: row.created_at,
    })
}

pub(crate) fn otp_to_row(otp: &OtpCode) -> OtpCodeRow {
    OtpCodeRow {
        id: otp.id,
        phone: otp.phone.as_str().to_owned(),
        code: otp.code.as_str().to_owned(),
        purpose: otp.purpose.as_str().to_owned(),
        expires_at: otp.expires_at,
        used_at: otp.used_at,
        attempts: otp.attempts,
        max_attempts: otp.max_attempts,
        created_at: otp.created_at,
    }
}

pub(crate) fn address_from_row(row: AddressRow) -> Result<Address, String> {
    Ok(Address {
        id: AddressId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        label: row.label,
        street: row.street,
        city: City::new(&row.city).map_err(|err| err.to_string())?,
        neighbourhood: row.neighbourhood,
        location: coordinates(row.latitude, row.longitude)?,
        is_default: row.is_default,
        created_at: row.created_at,
    })
}

pub(crate) fn address_to_row(address: &Address) -> AddressRow {
    AddressRow {
        id: *address.id.as_uuid(),
        user_id: *address.user_id.as_uuid(),
        label: address.label.clone(),
        street: address.street.clone(),
        city: address.city.as_str().to_owned(),
        neighbourhood: address.neighbourhood.clone(),
        latitude: address.location.latitude(),
        longitude: address.location.longitude(),
        is_default: address.is_default,
        created_at: address.created_at,
    }
}

pub(crate) fn job_from_row(row: JobRow) -> Result<Job, String> {
    Ok(Job {
        id: JobId::from_uuid(row.id),
        client_id: UserId::from_uuid(row.client_id),
        category_id: CategoryId::from_uuid(row.category_id),
        address_id: AddressId::from_uuid(row.address_id),
        title: row.title,
        description: row.description,
        preferred_date: row.preferred_date,
        time_preference: parse_text(&row.time_preference)?,
        budget_type: parse_text(&row.budget_type)?,
        budget_amount: amount(row.budget_amount, "budgetAmount")?,
        city: City::new(&row.city).map_err(|err| err.to_string())?,
        location: coordinates(row.latitude, row.longitude)?,
        status: parse_text(&row.status)?,
        assigned_helper_id: row.assigned_helper_id.map(UserId::from_uuid),
        started_at: row.started_at,
        completed_at: row.completed_at,
        cancelled_at: row.cancelled_at,
        cancellation_reason: row.cancellation_reason,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(crate) fn job_to_row(job: &Job) -> JobRow {
    JobRow {
        id: *job.id.as_uuid(),
        client_id: *job.client_id.as_uuid(),
        category_id: *job.category_id.as_uuid(),
        address_id: *job.address_id.as_uuid(),
        title: job.title.clone(),
        description: job.description.clone(),
        preferred_date: job.preferred_date,
        time_preference: job.time_preference.as_str().to_owned(),
        budget_type: job.budget_type.as_str().to_owned(),
        budget_amount: job.budget_amount.map(Amount::value),
        city: job.city.as_str().to_owned(),
        latitude: job.location.latitude(),
        longitude: job.location.longitude(),
        status: job.status.as_str().to_owned(),
        assigned_helper_id: job.assigned_helper_id.map(|id| *id.as_uuid()),
        started_at: job.started_at,
        completed_at: job.completed_at,
        cancelled_at: job.cancelled_at,
        cancellation_reason: job.cancellation_reason.clone(),
        created_at: job.created_at,
        updated_at: job.updated_at,
    }
}

pub(crate) fn application_from_row(row: ApplicationRow) -> Result<Application, String> {
    Ok(Application {
        id: ApplicationId::from_uuid(row.id),
        job_id: JobId::from_uuid(row.job_id),
        helper_id: UserId::from_uuid(row.helper_id),
        message: row.message,
        proposed_rate: amount(row.proposed_rate, "proposedRate")?,
        status: parse_text(&row.status)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(crate) fn application_to_row(application: &Application) -> ApplicationRow {
    ApplicationRow {
        id: *application.id.as_uuid(),
        job_id: *application.job_id.as_uuid(),
        helper_id: *application.helper_id.as_uuid(),
        message: application.message.clone(),
        proposed_rate: application.proposed_rate.map(Amount::value),
        status: application.status.as_str().to_owned(),
        created_at: application.created_at,
        updated_at: application.updated_at,
    }
}

/// Rebuild a conversation from its row and participants ordered by position.
pub(crate) fn conversation_from_row(
    row: ConversationRow,
    participants: &[Uuid],
) -> Result<Conversation, String> {
    let [client, helper] = participants else {
        return Err(format!(
            "conversation {} has {} participants",
            row.id,
            participants.len()
        ));
    };
    Ok(Conversation {
        id: ConversationId::from_uuid(row.id),
        job_id: JobId::from_uuid(row.job_id),
        participants: [UserId::from_uuid(*client), UserId::from_uuid(*helper)],
        last_message_at: row.last_message_at,
        created_at: row.created_at,
    })
}

pub(crate) fn conversation_to_row(conversation: &Conversation) -> ConversationRow {
    ConversationRow {
        id: *conversation.id.as_uuid(),
        job_id: *conversation.job_id.as_uuid(),
        last_message_at: conversation.last_message_at,
        created_at: conversation.created_at,
    }
}

pub(crate) fn message_from_row(row: MessageRow) -> Result<Message, String> {
    Ok(Message {
        id: MessageId::from_uuid(row.id),
        conversation_id: ConversationId::from_uuid(row.conversation_id),
        sender_id: UserId::from_uuid(row.sender_id),
        content: MessageContent::new(&row.content).map_err(|err| err.to_string())?,
        is_read: row.is_read,
        read_at: row.read_at,
        created_at: row.created_at,
    })
}

pub(crate) fn message_to_row(message: &Message) -> MessageRow {
    MessageRow {
        id: *message.id.as_uuid(),
        conversation_id: *message.conversation_id.as_uuid(),
        sender_id: *message.sender_id.as_uuid(),
        content: message.content.as_str().to_owned(),
        is_read: message.is_read,
        read_at: message.read_at,
        created_at: message.created_at,
    }
}

pub(crate) fn review_from_row(row: ReviewRow) -> Result<Review, String> {
    Ok(Review {
        id: ReviewId::from_uuid(row.id),
        job_id: JobId::from_uuid(row.job_id),
        reviewer_id: UserId::from_uuid(row.reviewer_id),
        reviewee_id: UserId::from_uuid(row.reviewee_id),
        overall_rating: rating(row.overall_rating, "overallRating")?,
        punctuality_rating: optional_rating(row.punctuality_rating, "punctualityRating")?,
        quality_rating: optional_rating(row.quality_rating, "qualityRating")?,
        communication_rating: optional_rating(row.communication_rating, "communicationRating")?,
        value_rating: optional_rating(row.value_rating, "valueRating")?,
        comment: row.comment,
        is_client_review: row.is_client_review,
        created_at: row.created_at,
    })
}

pub(crate) fn review_to_row(review: &Review) -> ReviewRow {
    ReviewRow {
        id: *review.id.as_uuid(),
        job_id: *review.job_id.as_uuid(),
        reviewer_id: *review.reviewer_id.as_uuid(),
        reviewee_id: *review.reviewee_id.as_uuid(),
        overall_rating: i16::from(review.overall_rating),
        punctuality_rating: review.punctuality_rating.map(i16::from),
        quality_rating: review.quality_rating.map(i16::from),
        communication_rating: review.communication_rating.map(i16::from),
        value_rating: review.value_rating.map(i16::from),
        comment: review.comment.clone(),
        is_client_review: review.is_client_review,
        created_at: review.created_at,
    }
}

pub(crate) fn notification_from_row(row: NotificationRow) -> Result<Notification, String> {
    Ok(Notification {
        id: NotificationId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        kind: parse_text(&row.kind)?,
        title: row.title,
        body: row.body,
        data: row.data,
        is_read: row.is_read,
        read_at: row.read_at,
        created_at: row.created_at,
    })
}

pub(crate) fn notification_to_row(notification: &Notification) -> NotificationRow {
    NotificationRow {
        id: *notification.id.as_uuid(),
        user_id: *notification.user_id.as_uuid(),
        kind: notification.kind.as_str().to_owned(),
        title: notification.title.clone(),
        body: notification.body.clone(),
        data: notification.data.clone(),
        is_read: notification.is_read,
        read_at: notification.read_at,
        created_at: notification.created_at,
    }
}
