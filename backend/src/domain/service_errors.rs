//! Mapping from driven-port failures to domain errors.
//!
//! Connection failures surface as `service_unavailable`; query failures as
//! `internal`. Domain-specific variants map to the status the caller can act
//! on.

use super::Error;
use super::ports::{
    AddressPersistenceError, ApplicationPersistenceError, ConversationPersistenceError,
    JobLifecyclePersistenceError, JobPersistenceError, NotificationPersistenceError,
    OtpPersistenceError, PasswordHashError, ReviewPersistenceError, TokenError,
    UserPersistenceError,
};

macro_rules! map_basic_error {
    ($fn_name:ident, $error:ident, $label:literal) => {
        pub(crate) fn $fn_name(error: $error) -> Error {
            match error {
                $error::Connection { message } => {
                    Error::service_unavailable(format!(concat!($label, " unavailable: {}"), message))
                }
                $error::Query { message } => {
                    Error::internal(format!(concat!($label, " error: {}"), message))
                }
            }
        }
    };
}

map_basic_error!(map_otp_error, OtpPersistenceError, "otp repository");
map_basic_error!(map_address_error, AddressPersistenceError, "address repository");
map_basic_error!(map_job_error, JobPersistenceError, "job repository");
map_basic_error!(
    map_notification_error,
    NotificationPersistenceError,
    "notification repository"
);
map_basic_error!(
    map_conversation_error,
    ConversationPersistenceError,
    "conversation repository"
);

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicatePhone => Error::conflict("phone number already registered"),
    }
}

pub(crate) fn map_application_error(error: ApplicationPersistenceError) -> Error {
    match error {
        ApplicationPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("application repository unavailable: {message}"))
        }
        ApplicationPersistenceError::Query { message } => {
            Error::internal(format!("application repository error: {message}"))
        }
        ApplicationPersistenceError::DuplicateApplication => {
            Error::conflict("you have already applied to this job")
        }
    }
}

pub(crate) fn map_lifecycle_error(error: JobLifecyclePersistenceError) -> Error {
    match error {
        JobLifecyclePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("lifecycle repository unavailable: {message}"))
        }
        JobLifecyclePersistenceError::Query { message } => {
            Error::internal(format!("lifecycle repository error: {message}"))
        }
        JobLifecyclePersistenceError::StaleState { message } => Error::conflict(message),
    }
}

pub(crate) fn map_review_error(error: ReviewPersistenceError) -> Error {
    match error {
        ReviewPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("review repository unavailable: {message}"))
        }
        ReviewPersistenceError::Query { message } => {
            Error::internal(format!("review repository error: {message}"))
        }
        ReviewPersistenceError::DuplicateReview => {
            Error::conflict("a review already exists for this job")
        }
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

/// Token failures while signing are internal; verification failures are
/// reported as `unauthorized` with the given message.
pub(crate) fn map_token_error(error: TokenError, unauthorized_message: &str) -> Error {
    match error {
        TokenError::Signing { message } => Error::internal(format!("token signing failed: {message}")),
        TokenError::Invalid { .. } | TokenError::Expired => {
            Error::unauthorized(unauthorized_message)
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[case(JobPersistenceError::connection("down"), ErrorCode::ServiceUnavailable)]
    #[case(JobPersistenceError::query("syntax"), ErrorCode::InternalError)]
    fn basic_errors_map_by_kind(#[case] error: JobPersistenceError, #[case] code: ErrorCode) {
        assert_eq!(map_job_error(error).code(), code);
    }

    #[rstest]
    fn domain_variants_map_to_conflict() {
        assert_eq!(
            map_user_error(UserPersistenceError::duplicate_phone()).code(),
            ErrorCode::Conflict
        );
        assert_eq!(
            map_application_error(ApplicationPersistenceError::duplicate_application()).code(),
            ErrorCode::Conflict
        );
        assert_eq!(
            map_review_error(ReviewPersistenceError::duplicate_review()).code(),
            ErrorCode::Conflict
        );
        assert_eq!(
            map_lifecycle_error(JobLifecyclePersistenceError::stale_state("job changed")).code(),
            ErrorCode::Conflict
        );
    }

    #[rstest]
    #[case(TokenError::expired(), ErrorCode::Unauthorized)]
    #[case(TokenError::invalid("bad signature"), ErrorCode::Unauthorized)]
    #[case(TokenError::signing("no key"), ErrorCode::InternalError)]
    fn token_errors_map_by_phase(#[case] error: TokenError, #[case] code: ErrorCode) {
        assert_eq!(map_token_error(error, "invalid token").code(), code);
    }
}
