//! Moroccan mobile phone numbers.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Validation errors for [`PhoneNumber`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhoneValidationError {
    #[error("phone number must not be empty")]
    Empty,
    #[error("phone number must be a Moroccan mobile number in +212 format")]
    InvalidFormat,
}

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^\+212[5-7]\d{8}$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// E.164 phone number restricted to Moroccan mobile and fixed ranges
/// (`+212` followed by 5, 6 or 7 and eight more digits).
///
/// # Examples
/// ```
/// use khedma::domain::PhoneNumber;
///
/// assert!(PhoneNumber::new("+212612345678").is_ok());
/// assert!(PhoneNumber::new("+33612345678").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate and construct a phone number.
    pub fn new(raw: impl Into<String>) -> Result<Self, PhoneValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(PhoneValidationError::Empty);
        }
        if !phone_regex().is_match(&raw) {
            return Err(PhoneValidationError::InvalidFormat);
        }
        Ok(Self(raw))
    }

    /// Borrow the number as text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Short SHA-256 fingerprint used in logs instead of the raw number.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(digest.get(..6).unwrap_or_default())
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
