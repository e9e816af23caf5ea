//! Port for delivering one-time codes by SMS.
use async_trait::async_trait;

use crate::domain::{OtpCodeValue, PhoneNumber};

use super::define_port_error;

define_port_error! {
    /// Errors raised by SMS adapters.
    pub enum SmsError {
        /// The gateway could not be reached.
        Transport { message: String } => "sms gateway unreachable: {message}",
        /// The gateway refused the message.
        Rejected { status: u16 } => "sms gateway rejected message with status {status}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_code(&self, phone: &PhoneNumber, code: &OtpCodeValue) -> Result<(), SmsError>;
}
