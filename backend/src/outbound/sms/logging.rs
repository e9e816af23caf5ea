//! SMS sender that writes codes to the log instead of a gateway.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{SmsError, SmsSender};
use crate::domain::{OtpCodeValue, PhoneNumber};

/// Development sender: the code is only visible in the service log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSmsSender;

#[async_trait]
impl SmsSender for LoggingSmsSender {
    async fn send_code(&self, phone: &PhoneNumber, code: &OtpCodeValue) -> Result<(), SmsError> {
        info!(
            phone = %phone.fingerprint(),
            code = code.as_str(),
            "one-time code issued (logging sender)"
        );
        Ok(())
    }
}
