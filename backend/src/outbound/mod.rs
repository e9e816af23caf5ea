//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: a process-local store implementing every repository port
//! - **credentials**: password hashing, JWT issuance and OTP generation
//! - **sms**: one-time code delivery
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod credentials;
pub mod memory;
pub mod persistence;
pub mod sms;
