//! In-process marketplace harness for HTTP integration suites.
//!
//! Builds the real service graph over a shared [`MemoryStore`] with a fixed
//! one-time code, and offers helpers that drive the public API the way a
//! mobile client would.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, HeaderValue};
use actix_web::{App, test as actix_test, web};
use khedma::Trace;
use khedma::domain::OtpCodeValue;
use khedma::domain::ports::FixedOtpCodeGenerator;
use khedma::inbound::http::routes;
use khedma::inbound::ws;
use khedma::outbound::credentials::JwtSettings;
use khedma::outbound::memory::MemoryStore;
use serde_json::{Value, json};
use zeroize::Zeroizing;

use crate::ServerConfig;
use crate::state_builders::{AdapterStates, build_states};

pub const OTP_CODE: &str = "123456";
pub const PASSWORD: &str = "s3cure-pass";

/// A registered user and their access token.
#[derive(Debug, Clone)]
pub struct Member {
    pub id: String,
    pub token: String,
}

impl Member {
    pub fn bearer(&self) -> (actix_web::http::header::HeaderName, HeaderValue) {
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .expect("token is a valid header value");
        (AUTHORIZATION, value)
    }
}

/// Shared store plus the adapter state wired over it.
pub struct Marketplace {
    pub store: Arc<MemoryStore>,
    states: AdapterStates,
}

impl Marketplace {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let jwt = JwtSettings::with_secrets(
            Zeroizing::new("integration-access".to_owned()),
            Zeroizing::new("integration-refresh".to_owned()),
            Zeroizing::new("integration-verification".to_owned()),
        );
        let config = ServerConfig::new("127.0.0.1:0".parse().expect("socket address"), jwt)
            .with_memory_store(store.clone())
            .with_code_generator(Arc::new(FixedOtpCodeGenerator::new(
                OtpCodeValue::new(OTP_CODE).expect("fixed code"),
            )));
        Self {
            store,
            states: build_states(&config),
        }
    }

    pub async fn app(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
        actix_test::init_service(
            App::new()
                .app_data(self.states.http.clone())
                .app_data(self.states.ws.clone())
                .wrap(Trace)
                .service(web::scope("/api/v1").configure(routes::configure))
                .service(ws::ws_entry),
        )
        .await
    }
}

/// Send `request` and decode the JSON body; empty bodies decode to `Null`.
pub async fn send<S>(app: &S, request: actix_test::TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

pub async fn send_otp<S>(app: &S, phone: &str, purpose: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/send-otp")
            .set_json(json!({ "phone": phone, "purpose": purpose })),
    )
    .await
}

pub async fn verify_otp<S>(app: &S, phone: &str, code: &str, purpose: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/verify-otp")
            .set_json(json!({ "phone": phone, "code": code, "purpose": purpose })),
    )
    .await
}

/// Verify `phone` and register it with `role`.
pub async fn register<S>(app: &S, phone: &str, role: &str) -> Member
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let (status, _) = send_otp(app, phone, "registration").await;
    assert_eq!(status, StatusCode::OK, "send-otp for {phone}");
    let (status, verified) = verify_otp(app, phone, OTP_CODE, "registration").await;
    assert_eq!(status, StatusCode::OK, "verify-otp for {phone}");

    let (status, session) = send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({
                "verificationToken": verified["verificationToken"],
                "phone": phone,
                "password": PASSWORD,
                "firstName": "Youssef",
                "lastName": "Alaoui",
                "role": role,
                "city": "Casablanca",
            })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register {phone}: {session}");
    Member {
        id: session["user"]["id"].as_str().expect("user id").to_owned(),
        token: session["tokens"]["accessToken"]
            .as_str()
            .expect("access token")
            .to_owned(),
    }
}

/// Save an address for `member` and return its id.
pub async fn add_address<S>(app: &S, member: &Member) -> String
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/users/me/addresses")
            .insert_header(member.bearer())
            .set_json(json!({
                "label": "Home",
                "street": "12 Rue Atlas",
                "city": "Casablanca",
                "latitude": 33.5731,
                "longitude": -7.5898,
            })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "add address: {body}");
    body["id"].as_str().expect("address id").to_owned()
}

/// Post an open job for `client` and return its id.
pub async fn post_job<S>(app: &S, client: &Member) -> String
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let address_id = add_address(app, client).await;
    let (status, body) = send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/jobs")
            .insert_header(client.bearer())
            .set_json(json!({
                "categoryId": "0b7e1c1e-58a4-4c47-9d0e-3f5d8a1e2b10",
                "addressId": address_id,
                "title": "Fix kitchen sink",
                "description": "The kitchen sink leaks under the cabinet.",
                "budgetAmount": 250.0,
            })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "post job: {body}");
    body["id"].as_str().expect("job id").to_owned()
}

/// Apply to `job_id` as `helper`, returning the status and body.
pub async fn apply<S>(app: &S, helper: &Member, job_id: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    send(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/jobs/{job_id}/applications"))
            .insert_header(helper.bearer())
            .set_json(json!({ "message": "Available tomorrow", "proposedRate": 200.0 })),
    )
    .await
}

/// POST to `uri` as `member` with no body.
pub async fn post_as<S>(app: &S, member: &Member, uri: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    send(
        app,
        actix_test::TestRequest::post()
            .uri(uri)
            .insert_header(member.bearer()),
    )
    .await
}

/// GET `uri` as `member`.
pub async fn get_as<S>(app: &S, member: &Member, uri: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    send(
        app,
        actix_test::TestRequest::get()
            .uri(uri)
            .insert_header(member.bearer()),
    )
    .await
}
