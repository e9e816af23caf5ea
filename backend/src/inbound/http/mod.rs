//! HTTP inbound adapter exposing REST endpoints.

pub mod applications;
pub mod auth;
pub mod bearer;
pub mod conversations;
pub mod error;
pub mod health;
pub mod jobs;
pub mod notifications;
pub mod reviews;
pub mod routes;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
