//! Reqwest-backed SMS gateway adapter.
//!
//! Posts a form with the destination number and message text, authenticated
//! with HTTP basic credentials. The adapter only handles transport; retry
//! and fallback decisions belong to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{SmsError, SmsSender};
use crate::domain::{OtpCodeValue, PhoneNumber};

/// Gateway endpoint and credentials.
#[derive(Clone)]
pub struct SmsGatewaySettings {
    pub endpoint: Url,
    pub username: String,
    pub password: Zeroizing<String>,
    pub sender_id: String,
    pub timeout: Duration,
}

/// SMS sender that posts to an HTTP gateway.
pub struct HttpSmsSender {
    client: Client,
    endpoint: Url,
    username: String,
    password: Zeroizing<String>,
    sender_id: String,
}

impl HttpSmsSender {
    /// Build a sender with a client bound to the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(settings: SmsGatewaySettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint,
            username: settings.username,
            password: settings.password,
            sender_id: settings.sender_id,
        })
    }
}

fn message_text(code: &OtpCodeValue) -> String {
    format!("Khedma: votre code de vérification est {}", code.as_str())
}

fn map_status(status: StatusCode) -> Result<(), SmsError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(SmsError::rejected(status.as_u16()))
    }
}

#[async_trait]
impl SmsSender for HttpSmsSender {
    async fn send_code(&self, phone: &PhoneNumber, code: &OtpCodeValue) -> Result<(), SmsError> {
        let text = message_text(code);
        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.username, Some(self.password.as_str()))
            .form(&[
                ("from", self.sender_id.as_str()),
                ("to", phone.as_str()),
                ("text", text.as_str()),
            ])
            .send()
            .await
            .map_err(|err| SmsError::transport(err.to_string()))?;

        let status = response.status();
        debug!(phone = %phone.fingerprint(), status = status.as_u16(), "sms gateway responded");
        map_status(status)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(StatusCode::OK, true)]
    #[case(StatusCode::ACCEPTED, true)]
    #[case(StatusCode::UNAUTHORIZED, false)]
    #[case(StatusCode::BAD_GATEWAY, false)]
    fn only_success_statuses_are_accepted(#[case] status: StatusCode, #[case] ok: bool) {
        assert_eq!(map_status(status).is_ok(), ok);
    }

    #[rstest]
    fn rejection_carries_the_status_code() {
        assert_eq!(
            map_status(StatusCode::TOO_MANY_REQUESTS),
            Err(SmsError::rejected(429_u16))
        );
    }

    #[rstest]
    fn message_contains_the_code() {
        let code = OtpCodeValue::new("483920").expect("code");
        assert!(message_text(&code).ends_with("483920"));
    }

    #[rstest]
    fn sender_builds_with_settings() {
        let settings = SmsGatewaySettings {
            endpoint: Url::parse("https://sms.example.test/send").expect("url"),
            username: "khedma".to_owned(),
            password: Zeroizing::new("secret".to_owned()),
            sender_id: "KHEDMA".to_owned(),
            timeout: Duration::from_secs(5),
        };
        assert!(HttpSmsSender::new(settings).is_ok());
    }
}
