//! Per-connection WebSocket handler.
//!
//! Keeps framing and heartbeats at the edge and defers every client event to
//! the [`Messaging`] port, always on behalf of the authenticated user. The
//! connection is pinged every 5s and considered idle after 10s without client
//! traffic; tests shorten both intervals.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::time;
use tracing::{debug, info, warn};

use crate::domain::ports::Messaging;
use crate::domain::{ConversationId, Error, ErrorCode, MessageContent, RealtimeEvent, UserId};
use crate::inbound::http::validation::invalid;

use super::hub::Subscription;
use super::messages::{ClientEvent, ServerEvent};

/// Time between heartbeats to the client.
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client.
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(500);

pub(super) async fn handle_ws_session(
    messaging: Arc<dyn Messaging>,
    subscription: Subscription,
    session: Session,
    stream: MessageStream,
) {
    let user = subscription.user_id();
    WsSession::new(messaging, user)
        .run(subscription, session, stream)
        .await;
    info!(user_id = %user, "websocket disconnected");
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    InvalidPayload,
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession {
    messaging: Arc<dyn Messaging>,
    user: UserId,
    joined: HashSet<ConversationId>,
}

impl WsSession {
    fn new(messaging: Arc<dyn Messaging>, user: UserId) -> Self {
        Self {
            messaging,
            user,
            joined: HashSet::new(),
        }
    }

    async fn run(
        &mut self,
        mut subscription: Subscription,
        mut session: Session,
        mut stream: MessageStream,
    ) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    self.handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
                Some(event) = subscription.recv() => {
                    self.forward(&mut session, event).await.map_err(SessionError::Network)
                }
            };

            if let Err(error) = result {
                self.log_shutdown_reason(&error);
                let close_action = self.close_action_for(&error);
                self.close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        &self,
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_text_message(session, text.as_ref()).await
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_text_message(
        &mut self,
        session: &mut Session,
        text: &str,
    ) -> Result<(), SessionError> {
        let event = match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => event,
            Err(error) => {
                warn!(error = %error, user_id = %self.user, "Rejected malformed WebSocket payload");
                return Err(SessionError::InvalidPayload);
            }
        };

        let sent = match self.handle_client_event(event).await {
            Ok(Some(reply)) => self.send_json(session, &reply).await,
            Ok(None) => Ok(()),
            Err(error) => {
                let code = error.code();
                if matches!(code, ErrorCode::InternalError | ErrorCode::ServiceUnavailable) {
                    warn!(%code, user_id = %self.user, message = %error.message(), "WebSocket event failed");
                }
                self.send_json(session, &ServerEvent::from(&error)).await
            }
        };
        sent.map_err(SessionError::Network)
    }

    /// Apply a client event; the reply, if any, goes to this connection only.
    async fn handle_client_event(
        &mut self,
        event: ClientEvent,
    ) -> Result<Option<ServerEvent>, Error> {
        match event {
            ClientEvent::JoinConversation { conversation_id } => {
                self.messaging
                    .conversation(&conversation_id, &self.user)
                    .await?;
                self.joined.insert(conversation_id);
                debug!(user_id = %self.user, %conversation_id, "joined conversation");
                Ok(Some(ServerEvent::Joined { conversation_id }))
            }
            ClientEvent::LeaveConversation { conversation_id } => {
                self.joined.remove(&conversation_id);
                Ok(Some(ServerEvent::Left { conversation_id }))
            }
            ClientEvent::SendMessage {
                conversation_id,
                content,
            } => {
                let content = MessageContent::new(&content).map_err(invalid)?;
                // The stored message comes back through the hub as `new_message`.
                self.messaging
                    .send(&conversation_id, &self.user, content)
                    .await?;
                Ok(None)
            }
            ClientEvent::Typing { conversation_id } => {
                self.messaging
                    .typing(&conversation_id, &self.user, true)
                    .await?;
                Ok(None)
            }
            ClientEvent::StopTyping { conversation_id } => {
                self.messaging
                    .typing(&conversation_id, &self.user, false)
                    .await?;
                Ok(None)
            }
        }
    }

    /// Push a hub event. Typing signals only reach joined conversations.
    async fn forward(&self, session: &mut Session, event: RealtimeEvent) -> Result<(), Closed> {
        if matches!(event, RealtimeEvent::Typing { .. })
            && !self.joined.contains(&event.conversation_id())
        {
            return Ok(());
        }
        self.send_json(session, &ServerEvent::from(event)).await
    }

    async fn send_json<T: serde::Serialize>(
        &self,
        session: &mut Session,
        payload: &T,
    ) -> Result<(), Closed> {
        match serde_json::to_string(payload) {
            Ok(body) => session.text(body).await,
            Err(error) => {
                warn!(error = %error, "Failed to serialize WebSocket payload");
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(&self, error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!(user_id = %self.user, "WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, user_id = %self.user, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, user_id = %self.user, "WebSocket send failed; closing connection");
            }
            SessionError::InvalidPayload
            | SessionError::ClientClosed(_)
            | SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(&self, error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::InvalidPayload => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Policy,
                description: Some("invalid payload".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(&self, session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "Failed to close WebSocket session");
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
