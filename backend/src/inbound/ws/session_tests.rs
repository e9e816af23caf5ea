//! WebSocket session tests against a live server over the in-memory store.

use std::net::TcpListener;

use actix_web::http::{StatusCode, header};
use actix_web::{App, HttpServer, web};
use awc::error::WsClientError;
use awc::{BoxedSocket, ws::Codec, ws::Frame};
use futures_util::{SinkExt, StreamExt};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::fixtures::{fixture_clock, fixture_time, open_job, pending_application};
use crate::domain::ports::{
    ApplicationRepository, ConversationRepository, JobLifecycleRepository, JobRepository,
    MockAuthCommand, NoOpNotifier,
};
use crate::domain::{MessagingService, plan_acceptance};
use crate::inbound::ws::hub::ConnectionHub;
use crate::inbound::ws::state::WsState;
use crate::inbound::ws::ws_entry;
use crate::outbound::memory::MemoryStore;

type Socket = actix_codec::Framed<BoxedSocket, Codec>;

const CLIENT_TOKEN: &str = "client-token";
const HELPER_TOKEN: &str = "helper-token";
const OUTSIDER_TOKEN: &str = "outsider-token";

struct Harness {
    url: String,
    conversation: ConversationId,
    client: UserId,
}

/// Serve `/ws` over a store holding one accepted job and its conversation.
async fn start_ws_server() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let job = open_job(UserId::random());
    let application = pending_application(&job, UserId::random());
    JobRepository::insert(store.as_ref(), &job).await.expect("job");
    ApplicationRepository::insert(store.as_ref(), &application)
        .await
        .expect("application");
    let plan = plan_acceptance(&job, &application, &job.client_id, fixture_time()).expect("plan");
    store.apply(&plan).await.expect("accept");
    let conversation = ConversationRepository::list_for_user(store.as_ref(), &job.client_id)
        .await
        .expect("conversations")
        .first()
        .expect("conversation")
        .id;

    let client = job.client_id;
    let helper = application.helper_id;
    let outsider = UserId::random();
    let mut auth = MockAuthCommand::new();
    auth.expect_authenticate().returning(move |token| match token {
        CLIENT_TOKEN => Ok(client),
        HELPER_TOKEN => Ok(helper),
        OUTSIDER_TOKEN => Ok(outsider),
        _ => Err(Error::unauthorized("invalid or expired token")),
    });
    let hub = Arc::new(ConnectionHub::new());
    let messaging = Arc::new(MessagingService::new(
        store,
        Arc::new(NoOpNotifier),
        hub.clone(),
        fixture_clock(),
    ));
    let ws_state = WsState::new(Arc::new(auth), messaging, hub);

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(ws_state.clone()))
            .service(ws_entry)
    })
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    actix_web::rt::spawn(server);

    Harness {
        url: format!("http://{addr}"),
        conversation,
        client,
    }
}

async fn connect(url: &str, token: &str) -> Socket {
    let (_response, socket) = awc::Client::default()
        .ws(format!("{url}/ws"))
        .set_header(header::AUTHORIZATION, format!("Bearer {token}"))
        .connect()
        .await
        .expect("websocket connect");
    socket
}

async fn send(socket: &mut Socket, payload: Value) {
    socket
        .send(awc::ws::Message::Text(payload.to_string().into()))
        .await
        .expect("send text");
}

async fn next_event(socket: &mut Socket) -> Value {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Text(bytes) => return serde_json::from_slice(&bytes).expect("json"),
            Frame::Ping(_) | Frame::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

async fn join(socket: &mut Socket, conversation: ConversationId) {
    send(
        socket,
        json!({"event": "join_conversation", "conversationId": conversation}),
    )
    .await;
    let reply = next_event(socket).await;
    assert_eq!(reply.get("event"), Some(&json!("joined")));
}

#[rstest]
#[actix_rt::test]
async fn messages_reach_both_participants_from_the_authenticated_sender() {
    let harness = start_ws_server().await;
    let mut helper = connect(&harness.url, HELPER_TOKEN).await;
    join(&mut helper, harness.conversation).await;
    let mut client = connect(&harness.url, CLIENT_TOKEN).await;

    send(
        &mut client,
        json!({
            "event": "send_message",
            "conversationId": harness.conversation,
            "content": "  Door code is 4411  ",
            "userId": UserId::random(),
        }),
    )
    .await;

    for socket in [&mut helper, &mut client] {
        let event = next_event(socket).await;
        assert_eq!(event.get("event"), Some(&json!("new_message")));
        let message = event.get("message").expect("message");
        assert_eq!(message.get("senderId"), Some(&json!(harness.client)));
        assert_eq!(message.get("content"), Some(&json!("Door code is 4411")));
    }
}

#[rstest]
#[actix_rt::test]
async fn typing_signals_reach_a_joined_participant() {
    let harness = start_ws_server().await;
    let mut helper = connect(&harness.url, HELPER_TOKEN).await;
    join(&mut helper, harness.conversation).await;
    let mut client = connect(&harness.url, CLIENT_TOKEN).await;

    for (event, expected) in [("typing", "user_typing"), ("stop_typing", "user_stop_typing")] {
        send(
            &mut client,
            json!({"event": event, "conversationId": harness.conversation}),
        )
        .await;
        let received = next_event(&mut helper).await;
        assert_eq!(
            received,
            json!({
                "event": expected,
                "conversationId": harness.conversation,
                "userId": harness.client,
            })
        );
    }
}

#[rstest]
#[actix_rt::test]
async fn typing_skips_connections_outside_the_conversation() {
    let harness = start_ws_server().await;
    let mut helper = connect(&harness.url, HELPER_TOKEN).await;
    let mut client = connect(&harness.url, CLIENT_TOKEN).await;

    send(
        &mut client,
        json!({"event": "typing", "conversationId": harness.conversation}),
    )
    .await;
    send(
        &mut client,
        json!({"event": "send_message", "conversationId": harness.conversation, "content": "hi"}),
    )
    .await;

    let first = next_event(&mut helper).await;
    assert_eq!(first.get("event"), Some(&json!("new_message")));
}

#[rstest]
#[actix_rt::test]
async fn refused_events_answer_with_an_error_and_keep_the_connection() {
    let harness = start_ws_server().await;
    let mut outsider = connect(&harness.url, OUTSIDER_TOKEN).await;

    send(
        &mut outsider,
        json!({"event": "join_conversation", "conversationId": harness.conversation}),
    )
    .await;
    let refusal = next_event(&mut outsider).await;
    assert_eq!(refusal.get("event"), Some(&json!("error")));
    assert_eq!(refusal.get("code"), Some(&json!("forbidden")));

    send(
        &mut outsider,
        json!({"event": "leave_conversation", "conversationId": harness.conversation}),
    )
    .await;
    let reply = next_event(&mut outsider).await;
    assert_eq!(reply.get("event"), Some(&json!("left")));
}

#[rstest]
#[actix_rt::test]
async fn blank_messages_are_refused() {
    let harness = start_ws_server().await;
    let mut client = connect(&harness.url, CLIENT_TOKEN).await;

    send(
        &mut client,
        json!({"event": "send_message", "conversationId": harness.conversation, "content": "   "}),
    )
    .await;

    let refusal = next_event(&mut client).await;
    assert_eq!(refusal.get("code"), Some(&json!("invalid_request")));
}

#[rstest]
#[actix_rt::test]
async fn closes_on_malformed_json() {
    let harness = start_ws_server().await;
    let mut client = connect(&harness.url, CLIENT_TOKEN).await;
    client
        .send(awc::ws::Message::Text("not-json".into()))
        .await
        .expect("send text");

    let frame = client.next().await.expect("response frame").expect("frame");
    match frame {
        Frame::Close(reason) => {
            assert_eq!(reason.expect("reason").code, CloseCode::Policy);
        }
        other => panic!("expected close frame, got {other:?}"),
    }
}

#[rstest]
#[actix_rt::test]
async fn closes_idle_connections() {
    let harness = start_ws_server().await;
    let mut client = connect(&harness.url, CLIENT_TOKEN).await;

    loop {
        let frame = client.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Ping(_) => continue,
            Frame::Close(reason) => {
                assert_eq!(reason.expect("reason").code, CloseCode::Normal);
                break;
            }
            other => panic!("expected close frame, got {other:?}"),
        }
    }
}

#[rstest]
#[case(Some("stale-token"))]
#[case(None)]
#[actix_rt::test]
async fn upgrade_without_a_valid_token_is_refused(#[case] token: Option<&str>) {
    let harness = start_ws_server().await;
    let mut request = awc::Client::default().ws(format!("{}/ws", harness.url));
    if let Some(token) = token {
        request = request.set_header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let Err(error) = request.connect().await else {
        panic!("refused");
    };

    match error {
        WsClientError::InvalidResponseStatus(status) => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}
