//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test as actix_test, web};
use serde_json::Value;

use crate::domain::UserId;
use crate::domain::ports::{
    MockApplicationCommand, MockApplicationQuery, MockAuthCommand, MockJobCommand, MockJobQuery,
    MockMessaging, MockNotificationInbox, MockProfileCommand, MockProfileQuery, MockReviewCommand,
    MockReviewQuery,
};

use super::state::HttpState;

/// Token accepted by [`TestPorts::signed_in`].
pub const TEST_TOKEN: &str = "test-access-token";

/// Mocked driving ports; unexpected calls fail the test.
#[derive(Default)]
pub struct TestPorts {
    pub auth: MockAuthCommand,
    pub jobs: MockJobCommand,
    pub jobs_query: MockJobQuery,
    pub applications: MockApplicationCommand,
    pub applications_query: MockApplicationQuery,
    pub reviews: MockReviewCommand,
    pub reviews_query: MockReviewQuery,
    pub profile: MockProfileCommand,
    pub profile_query: MockProfileQuery,
    pub messaging: MockMessaging,
    pub notifications: MockNotificationInbox,
}

impl TestPorts {
    /// Ports whose auth mock resolves [`TEST_TOKEN`] to `user`.
    pub fn signed_in(user: UserId) -> Self {
        let mut ports = Self::default();
        ports
            .auth
            .expect_authenticate()
            .withf(|token| token == TEST_TOKEN)
            .returning(move |_| Ok(user));
        ports
    }

    pub fn into_state(self) -> HttpState {
        HttpState {
            auth: Arc::new(self.auth),
            jobs: Arc::new(self.jobs),
            jobs_query: Arc::new(self.jobs_query),
            applications: Arc::new(self.applications),
            applications_query: Arc::new(self.applications_query),
            reviews: Arc::new(self.reviews),
            reviews_query: Arc::new(self.reviews_query),
            profile: Arc::new(self.profile),
            profile_query: Arc::new(self.profile_query),
            messaging: Arc::new(self.messaging),
            notifications: Arc::new(self.notifications),
        }
    }
}

/// `Authorization` header carrying [`TEST_TOKEN`].
pub fn bearer() -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
}

/// Application exposing every API route over the mocked ports.
pub fn test_app(
    ports: TestPorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .service(web::scope("/api/v1").configure(super::routes::configure))
}

/// Send `request` through [`test_app`] and decode the JSON body, if any.
pub async fn call(ports: TestPorts, request: actix_test::TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(ports)).await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON response body")
    };
    (status, body)
}
