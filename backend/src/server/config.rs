//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use khedma::domain::OtpPolicy;
use khedma::domain::ports::{OtpCodeGenerator, SmsSender};
use khedma::outbound::credentials::{JwtSettings, RandomOtpCodeGenerator};
use khedma::outbound::memory::MemoryStore;
use khedma::outbound::persistence::DbPool;
use khedma::outbound::sms::LoggingSmsSender;

/// Where repository ports keep their state.
#[derive(Clone)]
pub enum Storage {
    Database(DbPool),
    Memory(Arc<MemoryStore>),
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) storage: Storage,
    pub(crate) jwt: JwtSettings,
    pub(crate) sms: Arc<dyn SmsSender>,
    pub(crate) codes: Arc<dyn OtpCodeGenerator>,
    pub(crate) otp_policy: OtpPolicy,
    pub(crate) clock: Arc<dyn Clock>,
}

impl ServerConfig {
    /// Configuration backed by a fresh in-memory store, logging SMS sender,
    /// random codes and the system clock.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, jwt: JwtSettings) -> Self {
        Self {
            bind_addr,
            storage: Storage::Memory(Arc::new(MemoryStore::new())),
            jwt,
            sms: Arc::new(LoggingSmsSender),
            codes: Arc::new(RandomOtpCodeGenerator),
            otp_policy: OtpPolicy::default(),
            clock: Arc::new(DefaultClock),
        }
    }

    /// Attach a database connection pool for the Diesel repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.storage = Storage::Database(pool);
        self
    }

    #[cfg_attr(
        not(test),
        expect(dead_code, reason = "Exercised by tests that inject doubles")
    )]
    /// Share an existing in-memory store, e.g. to inject failures in tests.
    #[must_use]
    pub fn with_memory_store(mut self, store: Arc<MemoryStore>) -> Self {
        self.storage = Storage::Memory(store);
        self
    }

    #[must_use]
    pub fn with_sms_sender(mut self, sms: Arc<dyn SmsSender>) -> Self {
        self.sms = sms;
        self
    }

    #[cfg_attr(
        not(test),
        expect(dead_code, reason = "Exercised by tests that inject doubles")
    )]
    /// Replace the code generator; tests use a fixed code.
    #[must_use]
    pub fn with_code_generator(mut self, codes: Arc<dyn OtpCodeGenerator>) -> Self {
        self.codes = codes;
        self
    }

    #[must_use]
    pub fn with_otp_policy(mut self, policy: OtpPolicy) -> Self {
        self.otp_policy = policy;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Whether repositories run against PostgreSQL.
    #[must_use]
    pub fn uses_database(&self) -> bool {
        matches!(self.storage, Storage::Database(_))
    }
}
