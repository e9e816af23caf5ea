//! Shared WebSocket adapter state.
//!
//! The upgrade handler and sessions depend on domain ports plus the
//! connection hub, so they stay testable with mocks or the in-memory store.

use std::sync::Arc;

use crate::domain::ports::{AuthCommand, Messaging};

use super::hub::ConnectionHub;

/// Dependency bundle for the `/ws` endpoint and its sessions.
#[derive(Clone)]
pub struct WsState {
    pub auth: Arc<dyn AuthCommand>,
    pub messaging: Arc<dyn Messaging>,
    pub hub: Arc<ConnectionHub>,
}

impl WsState {
    /// Construct state from explicit port implementations.
    ///
    /// `hub` must be the publisher handed to the messaging service so
    /// stored messages reach these sessions.
    pub fn new(
        auth: Arc<dyn AuthCommand>,
        messaging: Arc<dyn Messaging>,
        hub: Arc<ConnectionHub>,
    ) -> Self {
        Self {
            auth,
            messaging,
            hub,
        }
    }
}
