//! Registry of live WebSocket connections keyed by the authenticated user.
//!
//! The hub is the [`RealtimePublisher`] adapter: domain services publish to
//! user ids and every open connection of those users receives a copy.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

use crate::domain::ports::RealtimePublisher;
use crate::domain::{RealtimeEvent, UserId};

/// Events buffered per connection before a lagging client starts losing them.
const CONNECTION_BUFFER: usize = 64;

struct Listener {
    id: u64,
    events: mpsc::Sender<RealtimeEvent>,
}

/// Open connections per user.
#[derive(Default)]
pub struct ConnectionHub {
    listeners: Mutex<HashMap<UserId, Vec<Listener>>>,
    next_id: AtomicU64,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for `user`.
    ///
    /// The connection stays registered until the returned [`Subscription`]
    /// is dropped.
    pub fn subscribe(self: &Arc<Self>, user: UserId) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(CONNECTION_BUFFER);
        self.listeners().entry(user).or_default().push(Listener {
            id,
            events: sender,
        });
        Subscription {
            hub: Arc::clone(self),
            user,
            id,
            events: receiver,
        }
    }

    /// Number of open connections held by `user`.
    pub fn connections(&self, user: &UserId) -> usize {
        self.listeners().get(user).map_or(0, Vec::len)
    }

    fn listeners(&self) -> MutexGuard<'_, HashMap<UserId, Vec<Listener>>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, user: &UserId, id: u64) {
        let mut listeners = self.listeners();
        if let Some(entries) = listeners.get_mut(user) {
            entries.retain(|listener| listener.id != id);
            if entries.is_empty() {
                listeners.remove(user);
            }
        }
    }
}

impl RealtimePublisher for ConnectionHub {
    fn publish(&self, recipients: &[UserId], event: &RealtimeEvent) {
        let listeners = self.listeners();
        for user in recipients {
            for listener in listeners.get(user).into_iter().flatten() {
                match listener.events.try_send(event.clone()) {
                    Ok(()) | Err(TrySendError::Closed(_)) => {}
                    Err(TrySendError::Full(_)) => {
                        warn!(user_id = %user, "live connection is lagging; event dropped");
                    }
                }
            }
        }
    }
}

/// Receiving end of one registered connection.
pub struct Subscription {
    hub: Arc<ConnectionHub>,
    user: UserId,
    id: u64,
    events: mpsc::Receiver<RealtimeEvent>,
}

impl Subscription {
    pub fn user_id(&self) -> UserId {
        self.user
    }

    /// Next event for this connection.
    pub async fn recv(&mut self) -> Option<RealtimeEvent> {
        self.events.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.remove(&self.user, self.id);
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ConversationId;

    fn typing(user: UserId) -> RealtimeEvent {
        RealtimeEvent::Typing {
            conversation_id: ConversationId::random(),
            user_id: user,
            active: true,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn every_connection_of_a_recipient_gets_a_copy() {
        let hub = Arc::new(ConnectionHub::new());
        let user = UserId::random();
        let mut phone = hub.subscribe(user);
        let mut tablet = hub.subscribe(user);
        let event = typing(UserId::random());

        hub.publish(&[user], &event);

        assert_eq!(phone.recv().await, Some(event.clone()));
        assert_eq!(tablet.recv().await, Some(event));
    }

    #[rstest]
    #[tokio::test]
    async fn other_users_receive_nothing() {
        let hub = Arc::new(ConnectionHub::new());
        let recipient = UserId::random();
        let _recipient_connection = hub.subscribe(recipient);
        let mut bystander = hub.subscribe(UserId::random());

        hub.publish(&[recipient], &typing(UserId::random()));

        assert!(bystander.events.try_recv().is_err());
    }

    #[rstest]
    fn dropping_a_subscription_unregisters_it() {
        let hub = Arc::new(ConnectionHub::new());
        let user = UserId::random();
        let first = hub.subscribe(user);
        let second = hub.subscribe(user);
        assert_eq!(hub.connections(&user), 2);

        drop(first);
        assert_eq!(hub.connections(&user), 1);
        drop(second);
        assert_eq!(hub.connections(&user), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn lagging_connections_lose_events_without_blocking() {
        let hub = Arc::new(ConnectionHub::new());
        let user = UserId::random();
        let mut connection = hub.subscribe(user);
        let event = typing(UserId::random());

        for _ in 0..CONNECTION_BUFFER + 5 {
            hub.publish(&[user], &event);
        }

        let mut received = 0;
        while connection.events.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, CONNECTION_BUFFER);
    }
}
