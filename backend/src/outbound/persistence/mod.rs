//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each repository implements one domain port over a shared [`DbPool`].
//! Diesel row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module; `row_mapping.rs` converts them to domain types.
//!
//! ```ignore
//! use khedma::outbound::persistence::{DbPool, DieselJobRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/khedma")).await?;
//! let jobs = DieselJobRepository::new(pool);
//! ```

mod diesel_address_repository;
mod diesel_application_repository;
mod diesel_basic_error_mapping;
mod diesel_conversation_repository;
mod diesel_job_lifecycle_repository;
mod diesel_job_repository;
mod diesel_notification_repository;
mod diesel_otp_repository;
mod diesel_review_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod row_mapping;
mod schema;

pub use diesel_address_repository::DieselAddressRepository;
pub use diesel_application_repository::DieselApplicationRepository;
pub use diesel_conversation_repository::DieselConversationRepository;
pub use diesel_job_lifecycle_repository::DieselJobLifecycleRepository;
pub use diesel_job_repository::DieselJobRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_otp_repository::DieselOtpRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
