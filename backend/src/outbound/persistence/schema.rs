//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. When the migrations
//! change, regenerate with `diesel print-schema` or update by hand.

diesel::table! {
    /// Registered accounts. `phone` is unique.
    users (id) {
        id -> Uuid,
        phone -> Varchar,
        password_hash -> Text,
        first_name -> Varchar,
        last_name -> Varchar,
        role -> Varchar,
        status -> Varchar,
        city -> Varchar,
        avatar_url -> Nullable<Text>,
        phone_verified -> Bool,
        last_login_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per helper account.
    helper_profiles (user_id) {
        user_id -> Uuid,
        bio -> Nullable<Text>,
        average_rating -> Float8,
        total_reviews -> Int4,
        total_jobs_completed -> Int4,
        is_verified -> Bool,
    }
}

diesel::table! {
    /// Issued one-time codes. Rows are never deleted.
    otp_codes (id) {
        id -> Uuid,
        phone -> Varchar,
        code -> Varchar,
        purpose -> Varchar,
        expires_at -> Timestamptz,
        used_at -> Nullable<Timestamptz>,
        attempts -> Int4,
        max_attempts -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    addresses (id) {
        id -> Uuid,
        user_id -> Uuid,
        label -> Varchar,
        street -> Varchar,
        city -> Varchar,
        neighbourhood -> Nullable<Varchar>,
        latitude -> Float8,
        longitude -> Float8,
        is_default -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Posted jobs; `status` holds the lifecycle state name.
    jobs (id) {
        id -> Uuid,
        client_id -> Uuid,
        category_id -> Uuid,
        address_id -> Uuid,
        title -> Varchar,
        description -> Varchar,
        preferred_date -> Nullable<Date>,
        time_preference -> Varchar,
        budget_type -> Varchar,
        budget_amount -> Nullable<Float8>,
        city -> Varchar,
        latitude -> Float8,
        longitude -> Float8,
        status -> Varchar,
        assigned_helper_id -> Nullable<Uuid>,
        started_at -> Nullable<Timestamptz>,
        completed_at -> Nullable<Timestamptz>,
        cancelled_at -> Nullable<Timestamptz>,
        cancellation_reason -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Unique per `(job_id, helper_id)`.
    applications (id) {
        id -> Uuid,
        job_id -> Uuid,
        helper_id -> Uuid,
        message -> Nullable<Varchar>,
        proposed_rate -> Nullable<Float8>,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    conversations (id) {
        id -> Uuid,
        job_id -> Uuid,
        last_message_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// `position` 0 is the client, 1 the helper.
    conversation_participants (conversation_id, user_id) {
        conversation_id -> Uuid,
        user_id -> Uuid,
        position -> Int2,
        last_read_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    messages (id) {
        id -> Uuid,
        conversation_id -> Uuid,
        sender_id -> Uuid,
        content -> Varchar,
        is_read -> Bool,
        read_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One review per job.
    reviews (id) {
        id -> Uuid,
        job_id -> Uuid,
        reviewer_id -> Uuid,
        reviewee_id -> Uuid,
        overall_rating -> Int2,
        punctuality_rating -> Nullable<Int2>,
        quality_rating -> Nullable<Int2>,
        communication_rating -> Nullable<Int2>,
        value_rating -> Nullable<Int2>,
        comment -> Nullable<Varchar>,
        is_client_review -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        kind -> Varchar,
        title -> Varchar,
        body -> Text,
        data -> Jsonb,
        is_read -> Bool,
        read_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(helper_profiles -> users (user_id));
diesel::joinable!(addresses -> users (user_id));
diesel::joinable!(applications -> jobs (job_id));
diesel::joinable!(conversations -> jobs (job_id));
diesel::joinable!(conversation_participants -> conversations (conversation_id));
diesel::joinable!(conversation_participants -> users (user_id));
diesel::joinable!(messages -> conversations (conversation_id));
diesel::joinable!(reviews -> jobs (job_id));
diesel::joinable!(notifications -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    helper_profiles,
    otp_codes,
    addresses,
    jobs,
    applications,
    conversations,
    conversation_participants,
    messages,
    reviews,
    notifications,
);
