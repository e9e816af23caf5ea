//! Tests for the application service.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::fixtures::{fixture_clock, job_in, open_job, pending_application, user};
use crate::domain::ports::{
    ApplicationPersistenceError, JobLifecyclePersistenceError, MockApplicationRepository,
    MockJobLifecycleRepository, MockJobRepository, MockNotifier, MockUserRepository,
};
use crate::domain::{ErrorCode, LifecycleMutation, UserAccount};

struct Mocks {
    applications: MockApplicationRepository,
    jobs: MockJobRepository,
    lifecycle: MockJobLifecycleRepository,
    users: MockUserRepository,
    notifier: MockNotifier,
}

#[fixture]
fn mocks() -> Mocks {
    Mocks {
        applications: MockApplicationRepository::new(),
        jobs: MockJobRepository::new(),
        lifecycle: MockJobLifecycleRepository::new(),
        users: MockUserRepository::new(),
        notifier: MockNotifier::new(),
    }
}

type Service = ApplicationService<
    MockApplicationRepository,
    MockJobRepository,
    MockJobLifecycleRepository,
    MockUserRepository,
>;

fn make_service(mocks: Mocks) -> Service {
    ApplicationService::new(
        ApplicationRepositories {
            applications: Arc::new(mocks.applications),
            jobs: Arc::new(mocks.jobs),
            lifecycle: Arc::new(mocks.lifecycle),
            users: Arc::new(mocks.users),
        },
        Arc::new(mocks.notifier),
        fixture_clock(),
    )
}

fn expect_account(users: &mut MockUserRepository, role: UserRole) -> UserId {
    let account_user = user(role, 11);
    let id = account_user.id;
    users.expect_find_account().return_once(move |_| {
        Ok(Some(UserAccount {
            user: account_user,
            helper_profile: None,
        }))
    });
    id
}

fn expect_job(jobs: &mut MockJobRepository, job: Job) {
    jobs.expect_find_by_id().return_once(move |_| Ok(Some(job)));
}

fn draft() -> ApplicationDraft {
    ApplicationDraft::new(Some("Available this weekend."), Some(180.0)).expect("valid draft")
}

#[rstest]
#[tokio::test]
async fn apply_stores_pending_application_and_notifies_client(mut mocks: Mocks) {
    let helper = expect_account(&mut mocks.users, UserRole::Helper);
    let client = UserId::random();
    let job = open_job(client);
    let job_id = job.id;
    expect_job(&mut mocks.jobs, job);
    mocks
        .applications
        .expect_exists_for()
        .return_once(|_, _| Ok(false));
    mocks
        .applications
        .expect_insert()
        .withf(move |application| application.helper_id == helper && application.is_pending())
        .times(1)
        .return_once(|_| Ok(()));
    mocks
        .notifier
        .expect_notify()
        .withf(move |n| n.user_id == client && n.kind == NotificationKind::NewApplication)
        .times(1)
        .return_once(|_| ());

    let application = make_service(mocks)
        .apply(&helper, &job_id, draft())
        .await
        .expect("applied");
    assert_eq!(application.job_id, job_id);
    assert_eq!(application.status, ApplicationStatus::Pending);
}

#[rstest]
#[tokio::test]
async fn clients_cannot_apply(mut mocks: Mocks) {
    let client = expect_account(&mut mocks.users, UserRole::Client);
    mocks.applications.expect_insert().never();

    let error = make_service(mocks)
        .apply(&client, &JobId::random(), draft())
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn applying_to_assigned_job_conflicts(mut mocks: Mocks) {
    let helper = expect_account(&mut mocks.users, UserRole::Helper);
    let job = job_in(JobStatus::Assigned, UserId::random(), Some(UserId::random()));
    let job_id = job.id;
    expect_job(&mut mocks.jobs, job);

    let error = make_service(mocks)
        .apply(&helper, &job_id, draft())
        .await
        .expect_err("conflict");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn second_application_conflicts(mut mocks: Mocks) {
    let helper = expect_account(&mut mocks.users, UserRole::Helper);
    let job = open_job(UserId::random());
    let job_id = job.id;
    expect_job(&mut mocks.jobs, job);
    mocks
        .applications
        .expect_exists_for()
        .return_once(|_, _| Ok(true));
    mocks.applications.expect_insert().never();

    let error = make_service(mocks)
        .apply(&helper, &job_id, draft())
        .await
        .expect_err("conflict");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn duplicate_insert_race_maps_to_conflict(mut mocks: Mocks) {
    let helper = expect_account(&mut mocks.users, UserRole::Helper);
    let job = open_job(UserId::random());
    let job_id = job.id;
    expect_job(&mut mocks.jobs, job);
    mocks
        .applications
        .expect_exists_for()
        .return_once(|_, _| Ok(false));
    mocks
        .applications
        .expect_insert()
        .return_once(|_| Err(ApplicationPersistenceError::duplicate_application()));
    mocks.notifier.expect_notify().never();

    let error = make_service(mocks)
        .apply(&helper, &job_id, draft())
        .await
        .expect_err("conflict");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn accept_applies_lifecycle_plan_and_notifies_helper(mut mocks: Mocks) {
    let client = UserId::random();
    let helper = UserId::random();
    let job = open_job(client);
    let application = pending_application(&job, helper);
    let application_id = application.id;
    mocks
        .applications
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(application)));
    expect_job(&mut mocks.jobs, job);
    mocks
        .lifecycle
        .expect_apply()
        .withf(move |mutations| {
            mutations.len() == 4
                && matches!(
                    mutations[2],
                    LifecycleMutation::AssignJob { helper_id, .. } if helper_id == helper
                )
        })
        .times(1)
        .return_once(|_| Ok(()));
    mocks
        .notifier
        .expect_notify()
        .withf(move |n| n.user_id == helper && n.kind == NotificationKind::ApplicationAccepted)
        .times(1)
        .return_once(|_| ());

    let accepted = make_service(mocks)
        .accept(&application_id, &client)
        .await
        .expect("accepted");
    assert_eq!(accepted.status, ApplicationStatus::Accepted);
}

#[rstest]
#[tokio::test]
async fn accept_by_non_owner_is_forbidden(mut mocks: Mocks) {
    let job = open_job(UserId::random());
    let application = pending_application(&job, UserId::random());
    let application_id = application.id;
    mocks
        .applications
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(application)));
    expect_job(&mut mocks.jobs, job);
    mocks.lifecycle.expect_apply().never();

    let error = make_service(mocks)
        .accept(&application_id, &UserId::random())
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn accept_on_assigned_job_conflicts(mut mocks: Mocks) {
    let client = UserId::random();
    let job = job_in(JobStatus::Assigned, client, Some(UserId::random()));
    let application = pending_application(&job, UserId::random());
    let application_id = application.id;
    mocks
        .applications
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(application)));
    expect_job(&mut mocks.jobs, job);
    mocks.lifecycle.expect_apply().never();

    let error = make_service(mocks)
        .accept(&application_id, &client)
        .await
        .expect_err("conflict");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn stale_lifecycle_state_is_conflict(mut mocks: Mocks) {
    let client = UserId::random();
    let job = open_job(client);
    let application = pending_application(&job, UserId::random());
    let application_id = application.id;
    mocks
        .applications
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(application)));
    expect_job(&mut mocks.jobs, job);
    mocks
        .lifecycle
        .expect_apply()
        .return_once(|_| Err(JobLifecyclePersistenceError::stale_state("job is no longer OPEN")));
    mocks.notifier.expect_notify().never();

    let error = make_service(mocks)
        .accept(&application_id, &client)
        .await
        .expect_err("conflict");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn missing_application_is_not_found(mut mocks: Mocks) {
    mocks
        .applications
        .expect_find_by_id()
        .return_once(|_| Ok(None));

    let error = make_service(mocks)
        .decline(&ApplicationId::random(), &UserId::random())
        .await
        .expect_err("not found");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn decline_marks_application_and_notifies_helper(mut mocks: Mocks) {
    let client = UserId::random();
    let helper = UserId::random();
    let job = open_job(client);
    let application = pending_application(&job, helper);
    let application_id = application.id;
    mocks
        .applications
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(application)));
    expect_job(&mut mocks.jobs, job);
    mocks
        .applications
        .expect_decline()
        .times(1)
        .return_once(|_, _| Ok(true));
    mocks
        .notifier
        .expect_notify()
        .withf(move |n| n.user_id == helper && n.kind == NotificationKind::ApplicationDeclined)
        .times(1)
        .return_once(|_| ());

    let declined = make_service(mocks)
        .decline(&application_id, &client)
        .await
        .expect("declined");
    assert_eq!(declined.status, ApplicationStatus::Declined);
}

#[rstest]
#[tokio::test]
async fn job_applications_hidden_from_other_users(mut mocks: Mocks) {
    let job = open_job(UserId::random());
    let job_id = job.id;
    expect_job(&mut mocks.jobs, job);
    mocks.applications.expect_list_for_job().never();

    let error = make_service(mocks)
        .job_applications(&job_id, &UserId::random())
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}
