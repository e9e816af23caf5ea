//! Tests for profile and address handlers.

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use rstest::rstest;
use serde_json::json;

use crate::domain::fixtures::{address, user};
use crate::domain::{Error, HelperProfile, PublicProfile, UserAccount, UserId, UserRole};
use crate::inbound::http::test_utils::{TestPorts, bearer, call};

fn helper_account() -> UserAccount {
    let helper = user(UserRole::Helper, 7);
    UserAccount {
        helper_profile: Some(HelperProfile {
            average_rating: 4.5,
            total_reviews: 2,
            ..HelperProfile::empty(helper.id)
        }),
        user: helper,
    }
}

#[actix_web::test]
async fn me_returns_the_account_with_helper_statistics() {
    let account = helper_account();
    let id = account.user.id;
    let mut ports = TestPorts::signed_in(id);
    ports
        .profile_query
        .expect_me()
        .withf(move |caller| *caller == id)
        .times(1)
        .return_once(move |_| Ok(account));

    let (status, body) = call(
        ports,
        TestRequest::get().uri("/api/v1/users/me").insert_header(bearer()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "HELPER");
    assert_eq!(body["helperProfile"]["averageRating"], 4.5);
}

#[actix_web::test]
async fn me_requires_a_bearer_token() {
    let mut ports = TestPorts::default();
    ports.profile_query.expect_me().never();

    let (status, _) = call(ports, TestRequest::get().uri("/api/v1/users/me")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn patch_sends_only_the_given_fields() {
    let account = helper_account();
    let id = account.user.id;
    let mut ports = TestPorts::signed_in(id);
    ports
        .profile
        .expect_update_me()
        .withf(|_, update| {
            update.first_name.is_none()
                && update.city.as_ref().map(|city| city.as_str()) == Some("Rabat")
                && update.bio.as_deref() == Some("Plumber for ten years")
                && update.avatar_url.as_deref() == Some("https://cdn.example.com/me.png")
        })
        .times(1)
        .return_once(move |_, _| Ok(account));

    let (status, _) = call(
        ports,
        TestRequest::patch()
            .uri("/api/v1/users/me")
            .insert_header(bearer())
            .set_json(json!({
                "city": "Rabat",
                "bio": "Plumber for ten years",
                "avatarUrl": "https://cdn.example.com/me.png",
            })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[case(json!({ "firstName": "  " }), "firstName", "empty")]
#[case(json!({ "avatarUrl": "javascript:alert(1)" }), "avatarUrl", "invalid_value")]
#[case(json!({ "lastName": "x".repeat(51) }), "lastName", "too_long")]
#[actix_web::test]
async fn patch_rejects_invalid_fields(
    #[case] payload: serde_json::Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let mut ports = TestPorts::signed_in(UserId::random());
    ports.profile.expect_update_me().never();

    let (status, body) = call(
        ports,
        TestRequest::patch()
            .uri("/api/v1/users/me")
            .insert_header(bearer())
            .set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn bio_from_a_client_is_rejected_by_the_service() {
    let mut ports = TestPorts::signed_in(UserId::random());
    ports
        .profile
        .expect_update_me()
        .return_once(|_, _| Err(Error::invalid_request("only helpers have a bio")));

    let (status, _) = call(
        ports,
        TestRequest::patch()
            .uri("/api/v1/users/me")
            .insert_header(bearer())
            .set_json(json!({ "bio": "hello" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn addresses_are_listed_for_the_caller() {
    let owner = UserId::random();
    let saved = vec![address(owner)];
    let mut ports = TestPorts::signed_in(owner);
    ports
        .profile_query
        .expect_addresses()
        .withf(move |caller| *caller == owner)
        .times(1)
        .return_once(move |_| Ok(saved));

    let (status, body) = call(
        ports,
        TestRequest::get()
            .uri("/api/v1/users/me/addresses")
            .insert_header(bearer()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["label"], "Home");
    assert_eq!(body[0]["isDefault"], true);
    assert_eq!(body[0]["latitude"], 33.5731);
}

#[actix_web::test]
async fn add_address_validates_coordinates() {
    let mut ports = TestPorts::signed_in(UserId::random());
    ports.profile.expect_add_address().never();

    let (status, body) = call(
        ports,
        TestRequest::post()
            .uri("/api/v1/users/me/addresses")
            .insert_header(bearer())
            .set_json(json!({
                "label": "Home",
                "street": "12 Rue Atlas",
                "city": "Casablanca",
                "latitude": 33.5,
                "longitude": 200.0,
            })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "longitude");
    assert_eq!(body["details"]["code"], "out_of_range");
}

#[actix_web::test]
async fn add_address_requires_coordinates() {
    let mut ports = TestPorts::signed_in(UserId::random());
    ports.profile.expect_add_address().never();

    let (status, body) = call(
        ports,
        TestRequest::post()
            .uri("/api/v1/users/me/addresses")
            .insert_header(bearer())
            .set_json(json!({ "label": "Home", "street": "12 Rue Atlas", "city": "Casablanca" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "missing_field");
}

#[actix_web::test]
async fn add_address_forwards_the_draft() {
    let owner = UserId::random();
    let saved = address(owner);
    let mut ports = TestPorts::signed_in(owner);
    ports
        .profile
        .expect_add_address()
        .withf(|_, draft| {
            draft.label == "Work" && draft.neighbourhood.as_deref() == Some("Maarif")
        })
        .times(1)
        .return_once(move |_, _| Ok(saved));

    let (status, _) = call(
        ports,
        TestRequest::post()
            .uri("/api/v1/users/me/addresses")
            .insert_header(bearer())
            .set_json(json!({
                "label": "Work",
                "street": "4 Bd Zerktouni",
                "city": "Casablanca",
                "neighbourhood": "Maarif",
                "latitude": 33.58,
                "longitude": -7.63,
            })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn public_profile_needs_no_token() {
    let profile = PublicProfile::from(helper_account());
    let id = profile.id;
    let mut ports = TestPorts::default();
    ports
        .profile_query
        .expect_public_profile()
        .withf(move |requested| *requested == id)
        .times(1)
        .return_once(move |_| Ok(profile));

    let (status, body) = call(
        ports,
        TestRequest::get().uri(&format!("/api/v1/users/{id}/public")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lastName"], "B.");
    assert!(body.get("phone").is_none());
}
