//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejected field produces an `invalid_request` error whose details
//! carry `{ field, code, value? }` so clients can highlight the input.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::domain::{
    AddressValidationError, ApplicationValidationError, AuthValidationError, Error,
    JobValidationError, MessageValidationError, PhoneNumber, ReviewValidationError,
    UnknownVariant, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidPhone,
    InvalidCode,
    InvalidValue,
    InvalidLength,
    InvalidRole,
    Empty,
    TooShort,
    TooLong,
    OutOfRange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidPhone => "invalid_phone",
            ErrorCode::InvalidCode => "invalid_code",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::InvalidLength => "invalid_length",
            ErrorCode::InvalidRole => "invalid_role",
            ErrorCode::Empty => "empty",
            ErrorCode::TooShort => "too_short",
            ErrorCode::TooLong => "too_long",
            ErrorCode::OutOfRange => "out_of_range",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<Value>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

/// Parse a path or body identifier with the aggregate's own constructor.
pub(crate) fn parse_id<'a, T, E>(
    value: &'a str,
    field: FieldName,
    parse: impl FnOnce(&'a str) -> Result<T, E>,
) -> Result<T, Error> {
    parse(value).map_err(|_| invalid_uuid_error(field, value))
}

/// Parse an optional identifier, treating absence as `None`.
pub(crate) fn parse_optional_id<'a, T, E>(
    value: Option<&'a str>,
    field: FieldName,
    parse: impl FnOnce(&'a str) -> Result<T, E>,
) -> Result<Option<T>, Error> {
    value.map(|raw| parse_id(raw, field, parse)).transpose()
}

/// Require a body field that serde accepted as optional.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_phone(value: &str, field: FieldName) -> Result<PhoneNumber, Error> {
    PhoneNumber::new(value).map_err(|err| {
        ValidationError::new(field.as_str(), err.to_string())
            .with_value(ErrorCode::InvalidPhone, value)
    })
}

/// Parse one of the fixed text values of a domain enum.
pub(crate) fn parse_text_enum<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = UnknownVariant>,
{
    T::from_str(value).map_err(|err| {
        ValidationError::new(field.as_str(), err.to_string())
            .with_value(ErrorCode::InvalidValue, err.value())
    })
}

pub(crate) fn parse_optional_text_enum<T>(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<T>, Error>
where
    T: FromStr<Err = UnknownVariant>,
{
    value.map(|raw| parse_text_enum(raw, field)).transpose()
}

/// Parse an optional calendar date in `YYYY-MM-DD` form.
pub(crate) fn parse_optional_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                ValidationError::new(
                    field.as_str(),
                    format!("{} must be a date in YYYY-MM-DD form", field.as_str()),
                )
                .with_value(ErrorCode::InvalidValue, raw)
            })
        })
        .transpose()
}

/// Parse an optional absolute `http(s)` URL, returning its normalised form.
pub(crate) fn parse_optional_url(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<String>, Error> {
    value
        .map(|raw| {
            url::Url::parse(raw.trim())
                .ok()
                .filter(|parsed| matches!(parsed.scheme(), "http" | "https"))
                .map(String::from)
                .ok_or_else(|| {
                    ValidationError::new(
                        field.as_str(),
                        format!("{} must be an absolute http(s) URL", field.as_str()),
                    )
                    .with_value(ErrorCode::InvalidValue, raw)
                })
        })
        .transpose()
}

/// Domain validation failures that name the offending request field.
pub(crate) trait FieldViolation: Display {
    fn field(&self) -> &'static str;
    fn code(&self) -> ErrorCode;
}

/// Turn a domain validation failure into an `invalid_request` error.
pub(crate) fn invalid<E: FieldViolation>(err: E) -> Error {
    ValidationError::new(err.field(), err.to_string()).with_code(err.code())
}

impl FieldViolation for UserValidationError {
    fn field(&self) -> &'static str {
        UserValidationError::field(self)
    }

    fn code(&self) -> ErrorCode {
        match self {
            Self::Empty { .. } => ErrorCode::Empty,
            Self::TooLong { .. } => ErrorCode::TooLong,
            Self::InvalidId => ErrorCode::InvalidUuid,
            Self::RoleNotSelfAssignable => ErrorCode::InvalidRole,
        }
    }
}

impl FieldViolation for JobValidationError {
    fn field(&self) -> &'static str {
        JobValidationError::field(self)
    }

    fn code(&self) -> ErrorCode {
        match self {
            Self::TitleLength { .. } | Self::DescriptionLength { .. } => ErrorCode::InvalidLength,
            Self::AmountOutOfRange { .. } => ErrorCode::OutOfRange,
            Self::ReasonTooLong { .. } => ErrorCode::TooLong,
        }
    }
}

impl FieldViolation for ApplicationValidationError {
    fn field(&self) -> &'static str {
        ApplicationValidationError::field(self)
    }

    fn code(&self) -> ErrorCode {
        match self {
            Self::MessageTooLong { .. } => ErrorCode::TooLong,
            Self::Rate(inner) => FieldViolation::code(inner),
        }
    }
}

impl FieldViolation for ReviewValidationError {
    fn field(&self) -> &'static str {
        ReviewValidationError::field(self)
    }

    fn code(&self) -> ErrorCode {
        match self {
            Self::RatingOutOfRange { .. } => ErrorCode::OutOfRange,
            Self::CommentTooLong { .. } => ErrorCode::TooLong,
        }
    }
}

impl FieldViolation for AddressValidationError {
    fn field(&self) -> &'static str {
        AddressValidationError::field(self)
    }

    fn code(&self) -> ErrorCode {
        match self {
            Self::Empty { .. } => ErrorCode::Empty,
            Self::TooLong { .. } => ErrorCode::TooLong,
            Self::LatitudeOutOfRange { .. } | Self::LongitudeOutOfRange { .. } => {
                ErrorCode::OutOfRange
            }
            Self::City(inner) => FieldViolation::code(inner),
        }
    }
}

impl FieldViolation for MessageValidationError {
    fn field(&self) -> &'static str {
        "content"
    }

    fn code(&self) -> ErrorCode {
        match self {
            Self::Empty => ErrorCode::Empty,
            Self::TooLong { .. } => ErrorCode::TooLong,
        }
    }
}

impl FieldViolation for AuthValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::MalformedCode => "code",
            Self::PasswordTooShort { .. } | Self::PasswordTooLong { .. } | Self::EmptyPassword => {
                "password"
            }
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedCode => ErrorCode::InvalidCode,
            Self::PasswordTooShort { .. } => ErrorCode::TooShort,
            Self::PasswordTooLong { .. } => ErrorCode::TooLong,
            Self::EmptyPassword => ErrorCode::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::{ErrorCode as DomainCode, JobId, JobStatus};

    fn details(error: &Error) -> &Value {
        error.details().expect("details present")
    }

    #[rstest]
    fn phone_errors_echo_the_rejected_value() {
        let error = parse_phone("0612345678", FieldName::new("phone")).expect_err("invalid");

        assert_eq!(error.code(), DomainCode::InvalidRequest);
        assert_eq!(
            details(&error),
            &json!({ "field": "phone", "code": "invalid_phone", "value": "0612345678" })
        );
    }

    #[rstest]
    fn identifiers_are_parsed_with_the_aggregate_constructor() {
        let id = JobId::random();
        let parsed = parse_id(&id.to_string(), FieldName::new("jobId"), JobId::new).expect("valid");
        assert_eq!(parsed, id);

        let error = parse_id("nope", FieldName::new("jobId"), JobId::new).expect_err("invalid");
        assert_eq!(details(&error)["code"], "invalid_uuid");
        assert_eq!(details(&error)["value"], "nope");
    }

    #[rstest]
    #[case("OPEN", Some(JobStatus::Open))]
    #[case("PENDING_REVIEW", Some(JobStatus::PendingReview))]
    #[case("open", None)]
    fn text_enums_accept_wire_values_only(#[case] raw: &str, #[case] expected: Option<JobStatus>) {
        let parsed = parse_text_enum::<JobStatus>(raw, FieldName::new("status"));
        match expected {
            Some(status) => assert_eq!(parsed.expect("valid"), status),
            None => {
                let error = parsed.expect_err("invalid");
                assert_eq!(details(&error)["code"], "invalid_value");
                assert_eq!(details(&error)["value"], raw);
            }
        }
    }

    #[rstest]
    #[case(
        AuthValidationError::PasswordTooShort { min: 8 },
        "password",
        "too_short"
    )]
    #[case(AuthValidationError::MalformedCode, "code", "invalid_code")]
    fn auth_violations_name_their_field(
        #[case] violation: AuthValidationError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let error = invalid(violation);
        assert_eq!(details(&error), &json!({ "field": field, "code": code }));
    }

    #[rstest]
    fn nested_violations_report_the_inner_field() {
        let error = invalid(ApplicationValidationError::Rate(
            JobValidationError::AmountOutOfRange {
                field: "proposedRate",
                max: 100_000.0,
            },
        ));
        assert_eq!(
            details(&error),
            &json!({ "field": "proposedRate", "code": "out_of_range" })
        );
    }

    #[rstest]
    #[case(Some("2026-05-01"), true)]
    #[case(Some("01/05/2026"), false)]
    #[case(None, true)]
    fn dates_use_iso_calendar_form(#[case] raw: Option<&str>, #[case] ok: bool) {
        let parsed = parse_optional_date(raw, FieldName::new("preferredDate"));
        assert_eq!(parsed.is_ok(), ok);
    }

    #[rstest]
    #[case("https://cdn.example.com/a.png", true)]
    #[case("ftp://cdn.example.com/a.png", false)]
    #[case("not a url", false)]
    fn avatar_urls_must_be_web_urls(#[case] raw: &str, #[case] ok: bool) {
        let parsed = parse_optional_url(Some(raw), FieldName::new("avatarUrl"));
        assert_eq!(parsed.is_ok(), ok);
    }

    #[rstest]
    fn missing_fields_are_reported() {
        let error = require::<String>(None, FieldName::new("role")).expect_err("missing");
        assert_eq!(
            details(&error),
            &json!({ "field": "role", "code": "missing_field" })
        );
    }
}
