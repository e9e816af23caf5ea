//! End-to-end coverage for phone verification, registration and login.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::json;

#[expect(
    dead_code,
    reason = "server config include exposes members unused in this integration test"
)]
#[path = "../src/server/config.rs"]
mod config;
pub use config::ServerConfig;

#[path = "../src/server/state_builders.rs"]
mod state_builders;

#[expect(
    dead_code,
    reason = "shared harness offers job helpers this suite does not need"
)]
#[path = "support/marketplace.rs"]
mod marketplace;

use marketplace::{Marketplace, OTP_CODE, PASSWORD, register, send, send_otp, verify_otp};

const PHONE: &str = "+212612345678";

#[actix_web::test]
async fn registered_user_can_log_in_and_refresh() {
    let market = Marketplace::new();
    let app = market.app().await;
    let member = register(&app, PHONE, "CLIENT").await;

    let (status, session) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "phone": PHONE, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{session}");
    assert_eq!(session["user"]["id"], member.id.as_str());

    let (status, refreshed) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .set_json(json!({ "refreshToken": session["tokens"]["refreshToken"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{refreshed}");
    assert!(refreshed["accessToken"].is_string());
}

#[actix_web::test]
async fn five_wrong_codes_lock_the_code() {
    let market = Marketplace::new();
    let app = market.app().await;
    let (status, _) = send_otp(&app, PHONE, "registration").await;
    assert_eq!(status, StatusCode::OK);

    for _ in 0..5 {
        let (status, body) = verify_otp(&app, PHONE, "000000", "registration").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "incorrect code");
    }

    let (status, body) = verify_otp(&app, PHONE, OTP_CODE, "registration").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "maximum attempts exceeded");
}

#[actix_web::test]
async fn fresh_code_replaces_a_locked_one() {
    let market = Marketplace::new();
    let app = market.app().await;
    send_otp(&app, PHONE, "registration").await;
    for _ in 0..5 {
        verify_otp(&app, PHONE, "000000", "registration").await;
    }

    let (status, _) = send_otp(&app, PHONE, "registration").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = verify_otp(&app, PHONE, OTP_CODE, "registration").await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["verified"], true);
}

#[rstest]
#[case("0612345678")]
#[case("+21261234567")]
#[case("+212812345678")]
#[actix_web::test]
async fn malformed_phone_is_rejected(#[case] phone: &str) {
    let market = Marketplace::new();
    let app = market.app().await;

    let (status, body) = send_otp(&app, phone, "registration").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn wrong_password_is_unauthorised() {
    let market = Marketplace::new();
    let app = market.app().await;
    register(&app, PHONE, "HELPER").await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "phone": PHONE, "password": "not-the-password" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn storage_outage_surfaces_as_service_unavailable() {
    let market = Marketplace::new();
    let app = market.app().await;
    market.store.set_unavailable(true);

    let (status, body) = send_otp(&app, PHONE, "login").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "service_unavailable");
}

fn websocket_upgrade(uri: &str) -> actix_test::TestRequest {
    actix_test::TestRequest::get()
        .uri(uri)
        .insert_header(("connection", "upgrade"))
        .insert_header(("upgrade", "websocket"))
        .insert_header(("sec-websocket-version", "13"))
        .insert_header(("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ=="))
}

#[rstest]
#[case("/ws")]
#[case("/ws?token=not-a-jwt")]
#[actix_web::test]
async fn websocket_upgrade_needs_a_valid_access_token(#[case] uri: &str) {
    let market = Marketplace::new();
    let app = market.app().await;

    let (status, body) = send(&app, websocket_upgrade(uri)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn access_token_in_the_query_opens_the_websocket() {
    let market = Marketplace::new();
    let app = market.app().await;
    let member = register(&app, PHONE, "HELPER").await;

    let response = actix_test::call_service(
        &app,
        websocket_upgrade(&format!("/ws?token={}", member.token)).to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SWITCHING_PROTOCOLS);
}
