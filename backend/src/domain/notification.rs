//! In-app notifications raised by marketplace activity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::text_enum::define_text_enum;
use super::{Job, JobId, Message, NotificationId, UserId};

/// Characters of a message quoted in its notification body.
const MESSAGE_PREVIEW_CHARS: usize = 100;

pub const NOTIFICATIONS_DEFAULT_LIMIT: u32 = 20;
pub const NOTIFICATIONS_MAX_LIMIT: u32 = 100;

define_text_enum! {
    /// What happened.
    pub enum NotificationKind {
        NewApplication => "NEW_APPLICATION",
        ApplicationAccepted => "APPLICATION_ACCEPTED",
        ApplicationDeclined => "APPLICATION_DECLINED",
        NewMessage => "NEW_MESSAGE",
        JobStarted => "JOB_STARTED",
        JobCompleted => "JOB_COMPLETED",
        NewReview => "NEW_REVIEW",
        JobCancelled => "JOB_CANCELLED",
    }
}

impl NotificationKind {
    /// Default title shown for this kind.
    pub const fn title(self) -> &'static str {
        match self {
            Self::NewApplication => "New application",
            Self::ApplicationAccepted => "Application accepted",
            Self::ApplicationDeclined => "Application declined",
            Self::NewMessage => "New message",
            Self::JobStarted => "Job started",
            Self::JobCompleted => "Job completed",
            Self::NewReview => "New review",
            Self::JobCancelled => "Job cancelled",
        }
    }
}

/// Stored notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub data: Value,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Notification about to be delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub data: Value,
}

impl NewNotification {
    /// Notification about `job`, carrying its id and title in `data`.
    pub fn about_job(user_id: UserId, kind: NotificationKind, job: &Job) -> Self {
        Self {
            user_id,
            kind,
            title: kind.title().to_owned(),
            body: job.title.clone(),
            data: json!({ "jobId": job.id }),
        }
    }

    /// Notification telling `user_id` that `message` arrived.
    pub fn about_message(user_id: UserId, message: &Message, job_id: JobId) -> Self {
        let kind = NotificationKind::NewMessage;
        Self {
            user_id,
            kind,
            title: kind.title().to_owned(),
            body: message
                .content
                .as_str()
                .chars()
                .take(MESSAGE_PREVIEW_CHARS)
                .collect(),
            data: json!({
                "conversationId": message.conversation_id,
                "jobId": job_id,
            }),
        }
    }

    pub fn into_notification(self, now: DateTime<Utc>) -> Notification {
        Notification {
            id: NotificationId::random(),
            user_id: self.user_id,
            kind: self.kind,
            title: self.title,
            body: self.body,
            data: self.data,
            is_read: false,
            read_at: None,
            created_at: now,
        }
    }
}
