//! Tests for job application handlers.

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use serde_json::json;

use crate::domain::fixtures::{open_job, pending_application};
use crate::domain::{
    ApplicationId, ApplicationStatus, Error, HelperApplication, JobId, UserId,
};
use crate::inbound::http::test_utils::{TestPorts, bearer, call};

#[actix_web::test]
async fn apply_sends_the_draft_for_the_caller() {
    let helper = UserId::random();
    let job = open_job(UserId::random());
    let job_id = job.id;
    let application = pending_application(&job, helper);
    let mut ports = TestPorts::signed_in(helper);
    ports
        .applications
        .expect_apply()
        .withf(move |caller, id, draft| {
            *caller == helper
                && *id == job_id
                && draft.message.as_deref() == Some("I can come tomorrow.")
                && draft.proposed_rate.map(f64::from) == Some(200.0)
        })
        .times(1)
        .return_once(move |_, _, _| Ok(application));

    let (status, body) = call(
        ports,
        TestRequest::post()
            .uri(&format!("/api/v1/jobs/{job_id}/applications"))
            .insert_header(bearer())
            .set_json(json!({ "message": "I can come tomorrow.", "proposedRate": 200.0 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["jobId"], job_id.to_string());
}

#[actix_web::test]
async fn apply_without_a_body_sends_an_empty_draft() {
    let helper = UserId::random();
    let job = open_job(UserId::random());
    let application = pending_application(&job, helper);
    let mut ports = TestPorts::signed_in(helper);
    ports
        .applications
        .expect_apply()
        .withf(|_, _, draft| draft.message.is_none() && draft.proposed_rate.is_none())
        .times(1)
        .return_once(move |_, _, _| Ok(application));

    let (status, _) = call(
        ports,
        TestRequest::post()
            .uri(&format!("/api/v1/jobs/{}/applications", job.id))
            .insert_header(bearer()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn duplicate_applications_are_conflicts() {
    let mut ports = TestPorts::signed_in(UserId::random());
    ports
        .applications
        .expect_apply()
        .return_once(|_, _, _| Err(Error::conflict("you have already applied to this job")));

    let (status, body) = call(
        ports,
        TestRequest::post()
            .uri(&format!("/api/v1/jobs/{}/applications", JobId::random()))
            .insert_header(bearer())
            .set_json(json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "you have already applied to this job");
}

#[actix_web::test]
async fn apply_rejects_a_non_positive_rate() {
    let mut ports = TestPorts::signed_in(UserId::random());
    ports.applications.expect_apply().never();

    let (status, body) = call(
        ports,
        TestRequest::post()
            .uri(&format!("/api/v1/jobs/{}/applications", JobId::random()))
            .insert_header(bearer())
            .set_json(json!({ "proposedRate": 0.0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "proposedRate");
}

#[actix_web::test]
async fn job_applications_are_listed_for_the_owner() {
    let client = UserId::random();
    let job = open_job(client);
    let job_id = job.id;
    let applications = vec![
        pending_application(&job, UserId::random()),
        pending_application(&job, UserId::random()),
    ];
    let mut ports = TestPorts::signed_in(client);
    ports
        .applications_query
        .expect_job_applications()
        .withf(move |id, caller| *id == job_id && *caller == client)
        .times(1)
        .return_once(move |_, _| Ok(applications));

    let (status, body) = call(
        ports,
        TestRequest::get()
            .uri(&format!("/api/v1/jobs/{job_id}/applications"))
            .insert_header(bearer()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn my_applications_embed_their_job() {
    let helper = UserId::random();
    let job = open_job(UserId::random());
    let listed = HelperApplication {
        application: pending_application(&job, helper),
        job: job.clone(),
    };
    let mut ports = TestPorts::signed_in(helper);
    ports
        .applications_query
        .expect_helper_applications()
        .withf(move |caller, status| {
            *caller == helper && *status == Some(ApplicationStatus::Pending)
        })
        .times(1)
        .return_once(move |_, _| Ok(vec![listed]));

    let (status, body) = call(
        ports,
        TestRequest::get()
            .uri("/api/v1/applications/my?status=PENDING")
            .insert_header(bearer()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["status"], "PENDING");
    assert_eq!(body[0]["job"]["title"], job.title);
}

#[actix_web::test]
async fn accept_is_requested_by_the_caller() {
    let client = UserId::random();
    let job = open_job(client);
    let mut accepted = pending_application(&job, UserId::random());
    accepted.status = ApplicationStatus::Accepted;
    let application_id = accepted.id;
    let mut ports = TestPorts::signed_in(client);
    ports
        .applications
        .expect_accept()
        .withf(move |id, caller| *id == application_id && *caller == client)
        .times(1)
        .return_once(move |_, _| Ok(accepted));

    let (status, body) = call(
        ports,
        TestRequest::post()
            .uri(&format!("/api/v1/applications/{application_id}/accept"))
            .insert_header(bearer()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACCEPTED");
}

#[actix_web::test]
async fn accepting_for_someone_else_is_forbidden() {
    let mut ports = TestPorts::signed_in(UserId::random());
    ports
        .applications
        .expect_accept()
        .return_once(|_, _| Err(Error::forbidden("only the job's client can accept")));

    let (status, _) = call(
        ports,
        TestRequest::post()
            .uri(&format!("/api/v1/applications/{}/accept", ApplicationId::random()))
            .insert_header(bearer()),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn decline_returns_the_declined_application() {
    let client = UserId::random();
    let job = open_job(client);
    let mut declined = pending_application(&job, UserId::random());
    declined.status = ApplicationStatus::Declined;
    let mut ports = TestPorts::signed_in(client);
    ports
        .applications
        .expect_decline()
        .times(1)
        .return_once(move |_, _| Ok(declined));

    let (status, body) = call(
        ports,
        TestRequest::post()
            .uri(&format!("/api/v1/applications/{}/decline", ApplicationId::random()))
            .insert_header(bearer()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "DECLINED");
}
