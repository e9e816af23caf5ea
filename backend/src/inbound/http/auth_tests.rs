//! Tests for phone authentication handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::fixtures::{phone, user};
use crate::domain::{
    AuthSession, Error, OtpDispatch, OtpPurpose, OtpVerified, TokenPair, UserRole,
};
use crate::inbound::http::test_utils::{TestPorts, call};

fn tokens() -> TokenPair {
    TokenPair {
        access_token: "access".to_owned(),
        refresh_token: "refresh".to_owned(),
        expires_in: 900,
    }
}

async fn post_json(ports: TestPorts, uri: &str, body: Value) -> (StatusCode, Value) {
    call(
        ports,
        actix_test::TestRequest::post().uri(uri).set_json(&body),
    )
    .await
}

#[rstest]
#[case("0612345678")]
#[case("+212812345678")]
#[case("+21261234567")]
#[actix_web::test]
async fn send_otp_rejects_invalid_phones_before_calling_the_port(#[case] raw: &str) {
    let mut ports = TestPorts::default();
    ports.auth.expect_send_otp().never();

    let (status, body) = post_json(
        ports,
        "/api/v1/auth/send-otp",
        json!({ "phone": raw, "purpose": "registration" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], "phone");
    assert_eq!(body["details"]["code"], "invalid_phone");
    assert_eq!(body["details"]["value"], raw);
}

#[actix_web::test]
async fn send_otp_returns_the_dispatch_without_the_code() {
    let mut ports = TestPorts::default();
    ports
        .auth
        .expect_send_otp()
        .withf(|request| {
            request.phone == phone(1) && request.purpose == OtpPurpose::Registration
        })
        .times(1)
        .return_once(|_| {
            Ok(OtpDispatch {
                message: "OTP sent successfully".to_owned(),
                expires_in: 300,
            })
        });

    let (status, body) = post_json(
        ports,
        "/api/v1/auth/send-otp",
        json!({ "phone": phone(1).as_str(), "purpose": "registration" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "OTP sent successfully", "expiresIn": 300 })
    );
}

#[actix_web::test]
async fn send_otp_rejects_unknown_purposes() {
    let mut ports = TestPorts::default();
    ports.auth.expect_send_otp().never();

    let (status, body) = post_json(
        ports,
        "/api/v1/auth/send-otp",
        json!({ "phone": phone(1).as_str(), "purpose": "sign_up" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "purpose");
    assert_eq!(body["details"]["code"], "invalid_value");
}

#[rstest]
#[case("12345")]
#[case("12a456")]
#[actix_web::test]
async fn verify_otp_rejects_malformed_codes(#[case] code: &str) {
    let mut ports = TestPorts::default();
    ports.auth.expect_verify_otp().never();

    let (status, body) = post_json(
        ports,
        "/api/v1/auth/verify-otp",
        json!({ "phone": phone(1).as_str(), "code": code, "purpose": "registration" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "code");
    assert_eq!(body["details"]["code"], "invalid_code");
}

#[actix_web::test]
async fn verify_otp_returns_the_verification_token() {
    let mut ports = TestPorts::default();
    ports
        .auth
        .expect_verify_otp()
        .withf(|request| request.code.as_str() == "482913")
        .times(1)
        .return_once(|_| {
            Ok(OtpVerified {
                verified: true,
                verification_token: "verification".to_owned(),
            })
        });

    let (status, body) = post_json(
        ports,
        "/api/v1/auth/verify-otp",
        json!({ "phone": phone(1).as_str(), "code": "482913", "purpose": "registration" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "verified": true, "verificationToken": "verification" })
    );
}

#[actix_web::test]
async fn verify_otp_surfaces_domain_rejections() {
    let mut ports = TestPorts::default();
    ports
        .auth
        .expect_verify_otp()
        .return_once(|_| Err(Error::invalid_request("incorrect code")));

    let (status, body) = post_json(
        ports,
        "/api/v1/auth/verify-otp",
        json!({ "phone": phone(1).as_str(), "code": "000000", "purpose": "login" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "incorrect code");
}

fn registration(role: Option<&str>) -> Value {
    let mut body = json!({
        "verificationToken": "verification",
        "phone": phone(1).as_str(),
        "password": "s3cretpass",
        "firstName": "Amina",
        "lastName": "Bennani",
        "city": "Casablanca",
    });
    if let Some(role) = role {
        body["role"] = json!(role);
    }
    body
}

#[actix_web::test]
async fn register_passes_the_validated_draft_to_the_port() {
    let account = user(UserRole::Helper, 1);
    let mut ports = TestPorts::default();
    ports
        .auth
        .expect_register()
        .withf(|draft| {
            draft.role == UserRole::Helper
                && draft.first_name.as_str() == "Amina"
                && draft.city.as_str() == "Casablanca"
                && draft.verification_token == "verification"
        })
        .times(1)
        .return_once(move |_| {
            Ok(AuthSession {
                user: account,
                tokens: tokens(),
            })
        });

    let (status, body) = post_json(ports, "/api/v1/auth/register", registration(Some("HELPER")))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "HELPER");
    assert_eq!(body["tokens"]["accessToken"], "access");
}

#[rstest]
#[case(Some("ADMIN"), "invalid_role")]
#[case(Some("helper"), "invalid_value")]
#[case(None, "missing_field")]
#[actix_web::test]
async fn register_rejects_roles_users_cannot_pick(
    #[case] role: Option<&str>,
    #[case] code: &str,
) {
    let mut ports = TestPorts::default();
    ports.auth.expect_register().never();

    let (status, body) = post_json(ports, "/api/v1/auth/register", registration(role)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "role");
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn register_rejects_short_passwords() {
    let mut ports = TestPorts::default();
    ports.auth.expect_register().never();
    let mut body = registration(Some("CLIENT"));
    body["password"] = json!("short");

    let (status, body) = post_json(ports, "/api/v1/auth/register", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "password");
    assert_eq!(body["details"]["code"], "too_short");
}

#[actix_web::test]
async fn login_maps_invalid_credentials_to_unauthorised() {
    let mut ports = TestPorts::default();
    ports
        .auth
        .expect_login()
        .withf(|credentials| credentials.password.expose() == "whatever")
        .return_once(|_| Err(Error::unauthorized("invalid credentials")));

    let (status, body) = post_json(
        ports,
        "/api/v1/auth/login",
        json!({ "phone": phone(1).as_str(), "password": "whatever" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn malformed_json_is_an_invalid_request() {
    let mut ports = TestPorts::default();
    ports.auth.expect_login().never();

    let (status, body) = post_json(
        ports,
        "/api/v1/auth/login",
        json!({ "phone": phone(1).as_str() }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn refresh_forwards_the_token() {
    let mut ports = TestPorts::default();
    ports
        .auth
        .expect_refresh()
        .withf(|token| token == "refresh-me")
        .times(1)
        .return_once(|_| Ok(tokens()));

    let (status, body) = post_json(
        ports,
        "/api/v1/auth/refresh",
        json!({ "refreshToken": "refresh-me" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["refreshToken"], "refresh");
    assert_eq!(body["expiresIn"], 900);
}
