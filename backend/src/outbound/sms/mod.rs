//! SMS delivery adapters for one-time codes.

mod http_gateway;
mod logging;

pub use http_gateway::{HttpSmsSender, SmsGatewaySettings};
pub use logging::LoggingSmsSender;
