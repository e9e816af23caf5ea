//! Port for producing one-time code digits.
use crate::domain::OtpCodeValue;

/// Source of six-digit codes.
#[cfg_attr(test, mockall::automock)]
pub trait OtpCodeGenerator: Send + Sync {
    /// Produce a code uniformly from `100000..=999999`.
    fn generate(&self) -> OtpCodeValue;
}

/// Generator returning the same code every time.
#[derive(Debug, Clone)]
pub struct FixedOtpCodeGenerator(OtpCodeValue);

impl FixedOtpCodeGenerator {
    pub fn new(code: OtpCodeValue) -> Self {
        Self(code)
    }
}

impl OtpCodeGenerator for FixedOtpCodeGenerator {
    fn generate(&self) -> OtpCodeValue {
        self.0.clone()
    }
}
