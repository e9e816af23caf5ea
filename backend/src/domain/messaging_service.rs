//! Job conversations between a client and the accepted helper.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use super::service_errors::map_conversation_error;
use crate::domain::ports::{ConversationRepository, Messaging, Notifier, RealtimePublisher};
use crate::domain::{
    Conversation, ConversationId, ConversationSummary, Error, Message, MessageContent,
    MessageQuery, NewNotification, RealtimeEvent, UserId,
};

/// Messaging service implementing [`Messaging`].
#[derive(Clone)]
pub struct MessagingService<C> {
    conversations: Arc<C>,
    notifier: Arc<dyn Notifier>,
    realtime: Arc<dyn RealtimePublisher>,
    clock: Arc<dyn Clock>,
}

impl<C> MessagingService<C> {
    /// Create the service over the conversation store.
    ///
    /// Stored messages and typing signals are pushed live through `realtime`.
    pub fn new(
        conversations: Arc<C>,
        notifier: Arc<dyn Notifier>,
        realtime: Arc<dyn RealtimePublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            conversations,
            notifier,
            realtime,
            clock,
        }
    }
}

impl<C> MessagingService<C>
where
    C: ConversationRepository,
{
    /// Load a conversation `user` takes part in.
    async fn joined(&self, id: &ConversationId, user: &UserId) -> Result<Conversation, Error> {
        let conversation = self
            .conversations
            .find_by_id(id)
            .await
            .map_err(map_conversation_error)?
            .ok_or_else(|| Error::not_found("conversation not found"))?;
        if !conversation.has_participant(user) {
            return Err(Error::forbidden(
                "you are not a participant of this conversation",
            ));
        }
        Ok(conversation)
    }
}

#[async_trait]
impl<C> Messaging for MessagingService<C>
where
    C: ConversationRepository,
{
    async fn conversations(&self, user: &UserId) -> Result<Vec<ConversationSummary>, Error> {
        self.conversations
            .list_for_user(user)
            .await
            .map_err(map_conversation_error)
    }

    async fn conversation(
        &self,
        conversation: &ConversationId,
        user: &UserId,
    ) -> Result<Conversation, Error> {
        self.joined(conversation, user).await
    }

    async fn messages(
        &self,
        conversation: &ConversationId,
        user: &UserId,
        query: MessageQuery,
    ) -> Result<Vec<Message>, Error> {
        self.joined(conversation, user).await?;
        self.conversations
            .messages(conversation, query)
            .await
            .map_err(map_conversation_error)
    }

    async fn send(
        &self,
        conversation_id: &ConversationId,
        sender: &UserId,
        content: MessageContent,
    ) -> Result<Message, Error> {
        let conversation = self.joined(conversation_id, sender).await?;
        let message = Message::compose(conversation.id, *sender, content, self.clock.utc());
        self.conversations
            .insert_message(&message)
            .await
            .map_err(map_conversation_error)?;
        debug!(conversation_id = %conversation.id, message_id = %message.id, "message sent");
        self.realtime.publish(
            &conversation.participants,
            &RealtimeEvent::NewMessage(message.clone()),
        );

        if let Some(recipient) = conversation.other_participant(sender) {
            self.notifier
                .notify(NewNotification::about_message(
                    recipient,
                    &message,
                    conversation.job_id,
                ))
                .await;
        }
        Ok(message)
    }

    async fn mark_read(&self, conversation: &ConversationId, reader: &UserId) -> Result<(), Error> {
        self.joined(conversation, reader).await?;
        self.conversations
            .mark_read(conversation, reader, self.clock.utc())
            .await
            .map_err(map_conversation_error)
    }

    async fn typing(
        &self,
        conversation: &ConversationId,
        user: &UserId,
        active: bool,
    ) -> Result<(), Error> {
        let conversation = self.joined(conversation, user).await?;
        if let Some(recipient) = conversation.other_participant(user) {
            self.realtime.publish(
                &[recipient],
                &RealtimeEvent::Typing {
                    conversation_id: conversation.id,
                    user_id: *user,
                    active,
                },
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::fixtures::{fixture_clock, fixture_time};
    use crate::domain::ports::{
        MockConversationRepository, MockNotifier, MockRealtimePublisher, NoOpRealtimePublisher,
    };
    use crate::domain::{ErrorCode, JobId, NotificationKind};

    fn conversation(client: UserId, helper: UserId) -> Conversation {
        Conversation::open(JobId::random(), client, helper, fixture_time())
    }

    fn service(
        repo: MockConversationRepository,
        notifier: MockNotifier,
    ) -> MessagingService<MockConversationRepository> {
        live_service(repo, notifier, Arc::new(NoOpRealtimePublisher))
    }

    fn live_service(
        repo: MockConversationRepository,
        notifier: MockNotifier,
        realtime: Arc<dyn RealtimePublisher>,
    ) -> MessagingService<MockConversationRepository> {
        MessagingService::new(Arc::new(repo), Arc::new(notifier), realtime, fixture_clock())
    }

    #[rstest]
    #[tokio::test]
    async fn send_stores_message_and_notifies_other_participant() {
        let client = UserId::random();
        let helper = UserId::random();
        let conversation = conversation(client, helper);
        let id = conversation.id;
        let mut repo = MockConversationRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(conversation)));
        repo.expect_insert_message()
            .withf(move |message| message.sender_id == helper && !message.is_read)
            .times(1)
            .return_once(|_| Ok(()));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(move |n| n.user_id == client && n.kind == NotificationKind::NewMessage)
            .times(1)
            .return_once(|_| ());

        let content = MessageContent::new("On my way").expect("valid content");
        let message = service(repo, notifier)
            .send(&id, &helper, content)
            .await
            .expect("sent");
        assert_eq!(message.conversation_id, id);
        assert_eq!(message.created_at, fixture_time());
    }

    #[rstest]
    #[tokio::test]
    async fn outsiders_cannot_read_messages() {
        let conversation = conversation(UserId::random(), UserId::random());
        let id = conversation.id;
        let mut repo = MockConversationRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(conversation)));
        repo.expect_messages().never();

        let error = service(repo, MockNotifier::new())
            .messages(&id, &UserId::random(), MessageQuery::new(None, None))
            .await
            .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn messages_pass_cursor_through() {
        let client = UserId::random();
        let conversation = conversation(client, UserId::random());
        let id = conversation.id;
        let mut repo = MockConversationRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(conversation)));
        repo.expect_messages()
            .withf(|_, query| query.limit == 100 && query.before.is_none())
            .return_once(|_, _| Ok(Vec::new()));

        let messages = service(repo, MockNotifier::new())
            .messages(&id, &client, MessageQuery::new(None, Some(500)))
            .await
            .expect("listed");
        assert!(messages.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_conversation_is_not_found() {
        let mut repo = MockConversationRepository::new();
        repo.expect_find_by_id().return_once(|_| Ok(None));

        let error = service(repo, MockNotifier::new())
            .mark_read(&ConversationId::random(), &UserId::random())
            .await
            .expect_err("not found");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn mark_read_stamps_reader() {
        let helper = UserId::random();
        let conversation = conversation(UserId::random(), helper);
        let id = conversation.id;
        let mut repo = MockConversationRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(conversation)));
        repo.expect_mark_read()
            .withf(move |_, reader, at| *reader == helper && *at == fixture_time())
            .times(1)
            .return_once(|_, _, _| Ok(()));

        let result = service(repo, MockNotifier::new()).mark_read(&id, &helper).await;
        assert!(result.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn sent_messages_are_pushed_to_both_participants() {
        let client = UserId::random();
        let helper = UserId::random();
        let conversation = conversation(client, helper);
        let id = conversation.id;
        let mut repo = MockConversationRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(conversation)));
        repo.expect_insert_message().return_once(|_| Ok(()));
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().return_once(|_| ());
        let mut realtime = MockRealtimePublisher::new();
        realtime
            .expect_publish()
            .withf(move |recipients, event| {
                recipients == [client, helper]
                    && matches!(event, RealtimeEvent::NewMessage(message) if message.sender_id == client)
            })
            .times(1)
            .return_const(());

        let content = MessageContent::new("See you at nine").expect("valid content");
        live_service(repo, notifier, Arc::new(realtime))
            .send(&id, &client, content)
            .await
            .expect("sent");
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    #[tokio::test]
    async fn typing_reaches_only_the_other_participant(#[case] active: bool) {
        let client = UserId::random();
        let helper = UserId::random();
        let conversation = conversation(client, helper);
        let id = conversation.id;
        let mut repo = MockConversationRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(conversation)));
        let mut realtime = MockRealtimePublisher::new();
        realtime
            .expect_publish()
            .withf(move |recipients, event| {
                recipients == [client]
                    && *event
                        == RealtimeEvent::Typing {
                            conversation_id: id,
                            user_id: helper,
                            active,
                        }
            })
            .times(1)
            .return_const(());

        live_service(repo, MockNotifier::new(), Arc::new(realtime))
            .typing(&id, &helper, active)
            .await
            .expect("typing signalled");
    }

    #[rstest]
    #[tokio::test]
    async fn outsiders_cannot_signal_typing() {
        let conversation = conversation(UserId::random(), UserId::random());
        let id = conversation.id;
        let mut repo = MockConversationRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(conversation)));
        let mut realtime = MockRealtimePublisher::new();
        realtime.expect_publish().never();

        let error = live_service(repo, MockNotifier::new(), Arc::new(realtime))
            .typing(&id, &UserId::random(), true)
            .await
            .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }
}
