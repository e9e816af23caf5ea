//! Random one-time code generator.

use rand::Rng;

use crate::domain::OtpCodeValue;
use crate::domain::ports::OtpCodeGenerator;

/// Draws six-digit codes from the thread-local CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomOtpCodeGenerator;

impl OtpCodeGenerator for RandomOtpCodeGenerator {
    fn generate(&self) -> OtpCodeValue {
        let value: u32 = rand::thread_rng().gen_range(100_000..=999_999);
        OtpCodeValue::from_digits(value)
    }
}
