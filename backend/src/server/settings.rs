//! Process settings loaded via OrthoConfig from `KHEDMA_*` variables, an
//! optional config file, and command-line flags.

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use khedma::domain::OtpPolicy;
use khedma::outbound::credentials::JwtSettings;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_SMS_SENDER_ID: &str = "Khedma";
const DEFAULT_SMS_TIMEOUT_SECS: u64 = 10;

/// Settings for the HTTP server and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "KHEDMA")]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// PostgreSQL connection string. The in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Secret for access tokens.
    pub jwt_access_secret: Option<String>,
    /// Secret for refresh tokens.
    pub jwt_refresh_secret: Option<String>,
    /// Secret for phone-verification tokens.
    pub jwt_verification_secret: Option<String>,
    /// Generate throwaway token secrets when none are configured.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secrets: bool,
    /// Access token lifetime in minutes.
    pub access_token_minutes: Option<i64>,
    /// Refresh token lifetime in days.
    pub refresh_token_days: Option<i64>,
    /// Lifetime of one-time codes in minutes.
    pub otp_ttl_minutes: Option<i64>,
    /// Wrong guesses allowed before a code is locked.
    pub otp_max_attempts: Option<i32>,
    /// SMS gateway endpoint. Codes are only logged when unset.
    pub sms_gateway_url: Option<String>,
    pub sms_username: Option<String>,
    pub sms_password: Option<String>,
    pub sms_sender_id: Option<String>,
    pub sms_timeout_secs: Option<u64>,
}

/// The three token secrets, present only when all are configured.
pub struct TokenSecrets {
    pub access: String,
    pub refresh: String,
    pub verification: String,
}

impl ServerSettings {
    /// Socket address assembled from host and port.
    ///
    /// # Errors
    ///
    /// Returns an error when the host is not an IP literal.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        let port = self.port.unwrap_or(DEFAULT_PORT);
        format!("{host}:{port}").parse()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// OTP policy with configured overrides.
    pub fn otp_policy(&self) -> OtpPolicy {
        let defaults = OtpPolicy::default();
        OtpPolicy {
            ttl: self
                .otp_ttl_minutes
                .map(TimeDelta::minutes)
                .unwrap_or(defaults.ttl),
            max_attempts: self.otp_max_attempts.unwrap_or(defaults.max_attempts),
        }
    }

    pub fn token_secrets(&self) -> Option<TokenSecrets> {
        Some(TokenSecrets {
            access: self.jwt_access_secret.clone()?,
            refresh: self.jwt_refresh_secret.clone()?,
            verification: self.jwt_verification_secret.clone()?,
        })
    }

    /// Apply configured token lifetimes on top of `jwt`.
    pub fn token_lifetimes(&self, mut jwt: JwtSettings) -> JwtSettings {
        if let Some(minutes) = self.access_token_minutes {
            jwt.access_ttl = TimeDelta::minutes(minutes);
        }
        if let Some(days) = self.refresh_token_days {
            jwt.refresh_ttl = TimeDelta::days(days);
        }
        jwt
    }

    pub fn sms_sender_id(&self) -> &str {
        self.sms_sender_id.as_deref().unwrap_or(DEFAULT_SMS_SENDER_ID)
    }

    pub fn sms_timeout(&self) -> Duration {
        Duration::from_secs(self.sms_timeout_secs.unwrap_or(DEFAULT_SMS_TIMEOUT_SECS))
    }
}
