//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions to and from domain types live
//! in `row_mapping.rs`.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    addresses, applications, conversation_participants, conversations, helper_profiles, jobs,
    messages, notifications, otp_codes, reviews, users,
};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Row struct for reading from and inserting into the users table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub phone: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub status: String,
    pub city: String,
    pub avatar_url: Option<String>,
    pub phone_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserProfileChangeset<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub city: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = helper_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HelperProfileRow {
    pub user_id: Uuid,
    pub bio: Option<String>,
    pub average_rating: f64,
    pub total_reviews: i32,
    pub total_jobs_completed: i32,
    pub is_verified: bool,
}

/// Minimal user columns for participant and reviewer cards.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ParticipantRow {
    pub id: Uuid,
    pub first_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = otp_codes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OtpCodeRow {
    pub id: Uuid,
    pub phone: String,
    pub code: String,
    pub purpose: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = addresses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AddressRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub street: String,
    pub city: String,
    pub neighbourhood: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Jobs and applications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct JobRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub category_id: Uuid,
    pub address_id: Uuid,
    pub title: String,
    pub description: String,
    pub preferred_date: Option<NaiveDate>,
    pub time_preference: String,
    pub budget_type: String,
    pub budget_amount: Option<f64>,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: String,
    pub assigned_helper_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub helper_id: Uuid,
    pub message: Option<String>,
    pub proposed_rate: Option<f64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Conversations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConversationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = conversation_participants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ParticipantLinkRow {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub position: i16,
    pub last_read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Reviews and notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub overall_rating: i16,
    pub punctuality_rating: Option<i16>,
    pub quality_rating: Option<i16>,
    pub communication_rating: Option<i16>,
    pub value_rating: Option<i16>,
    pub comment: Option<String>,
    pub is_client_review: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
