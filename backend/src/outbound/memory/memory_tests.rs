//! Behavioural coverage for the in-memory store.

use chrono::TimeDelta;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::fixtures::{fixture_time, job_in, open_job, pending_application, phone, user};
use crate::domain::ports::{
    ApplicationRepository, ConversationRepository, JobLifecyclePersistenceError,
    JobLifecycleRepository, JobRepository, NotificationRepository, OtpRepository,
    ReviewPersistenceError, ReviewRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{
    ApplicationStatus, JobStatus, JobTransition, Message, MessageContent, MessageQuery,
    NewNotification, NewUser, NotificationKind, OtpCodeValue, OtpPolicy, OtpPurpose, PageRequest,
    RatingsInput, ReviewDraft, UserId, UserRole, plan_acceptance,
};

#[fixture]
fn store() -> MemoryStore {
    MemoryStore::new()
}

async fn seed_open_job(store: &MemoryStore) -> (Job, Application, Application) {
    let job = open_job(UserId::random());
    let first = pending_application(&job, UserId::random());
    let second = pending_application(&job, UserId::random());
    JobRepository::insert(store, &job).await.expect("job");
    ApplicationRepository::insert(store, &first).await.expect("first");
    ApplicationRepository::insert(store, &second).await.expect("second");
    (job, first, second)
}

#[rstest]
#[tokio::test]
async fn acceptance_applies_every_intent(store: MemoryStore) {
    let (job, first, second) = seed_open_job(&store).await;
    let plan = plan_acceptance(&job, &first, &job.client_id, fixture_time()).expect("plan");

    store.apply(&plan).await.expect("apply");

    let job = JobRepository::find_by_id(&store, &job.id)
        .await
        .expect("query")
        .expect("job");
    assert_eq!(job.status, JobStatus::Assigned);
    assert_eq!(job.assigned_helper_id, Some(first.helper_id));
    let statuses: Vec<ApplicationStatus> = store
        .list_for_job(&job.id)
        .await
        .expect("list")
        .into_iter()
        .map(|application| application.status)
        .collect();
    assert_eq!(
        statuses,
        vec![ApplicationStatus::Accepted, ApplicationStatus::Declined]
    );
    let conversations = ConversationRepository::list_for_user(&store, &second.helper_id)
        .await
        .expect("conversations");
    assert!(conversations.is_empty());
    assert_eq!(
        ConversationRepository::list_for_user(&store, &first.helper_id)
            .await
            .expect("conversations")
            .len(),
        1
    );
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(2)]
#[case(3)]
#[tokio::test]
async fn injected_failure_leaves_no_partial_state(store: MemoryStore, #[case] step: usize) {
    let (job, first, _) = seed_open_job(&store).await;
    let plan = plan_acceptance(&job, &first, &job.client_id, fixture_time()).expect("plan");
    store.fail_lifecycle_step(step);

    let error = store.apply(&plan).await.expect_err("injected failure");

    assert!(matches!(error, JobLifecyclePersistenceError::Query { .. }));
    let job = JobRepository::find_by_id(&store, &job.id)
        .await
        .expect("query")
        .expect("job");
    assert_eq!(job.status, JobStatus::Open);
    assert!(
        store
            .list_for_job(&job.id)
            .await
            .expect("list")
            .iter()
            .all(Application::is_pending)
    );
    assert!(
        ConversationRepository::list_for_user(&store, &job.client_id)
            .await
            .expect("conversations")
            .is_empty()
    );
}

#[rstest]
#[tokio::test]
async fn second_acceptance_is_stale(store: MemoryStore) {
    let (job, first, second) = seed_open_job(&store).await;
    let winner = plan_acceptance(&job, &first, &job.client_id, fixture_time()).expect("plan");
    let loser = plan_acceptance(&job, &second, &job.client_id, fixture_time()).expect("plan");

    store.apply(&winner).await.expect("winner");
    let error = store.apply(&loser).await.expect_err("loser");

    assert!(matches!(error, JobLifecyclePersistenceError::StaleState { .. }));
    let stored = ApplicationRepository::find_by_id(&store, &second.id)
        .await
        .expect("query")
        .expect("application");
    assert_eq!(stored.status, ApplicationStatus::Declined);
}

#[rstest]
#[tokio::test]
async fn status_change_is_compare_and_swap(store: MemoryStore) {
    let helper = UserId::random();
    let job = job_in(JobStatus::Assigned, UserId::random(), Some(helper));
    JobRepository::insert(&store, &job).await.expect("job");
    let change = job
        .plan_transition(&helper, JobTransition::Start, fixture_time())
        .expect("transition");

    assert!(store.apply_status_change(&change).await.expect("first"));
    assert!(!store.apply_status_change(&change).await.expect("second"));
}

async fn seed_helper(store: &MemoryStore, seed: u32) -> UserId {
    let helper = user(UserRole::Helper, seed);
    let id = helper.id;
    UserRepository::insert(
        store,
        &NewUser {
            user: helper,
            password_hash: "hash".to_owned(),
        },
        Some(HelperProfile::empty(id)),
    )
    .await
    .expect("helper");
    id
}

async fn helper_profile(store: &MemoryStore, helper: &UserId) -> HelperProfile {
    store
        .find_account(helper)
        .await
        .expect("query")
        .and_then(|account| account.helper_profile)
        .expect("helper profile")
}

fn client_review(job: &Job, helper: UserId, overall: i16) -> Review {
    ReviewDraft::new(
        RatingsInput {
            overall,
            ..RatingsInput::default()
        },
        None,
    )
    .expect("draft")
    .into_review(job.id, job.client_id, helper, true, fixture_time())
}

#[rstest]
#[tokio::test]
async fn confirmation_counts_the_job_once(store: MemoryStore) {
    let helper = seed_helper(&store, 3).await;
    let job = job_in(JobStatus::PendingReview, UserId::random(), Some(helper));
    JobRepository::insert(&store, &job).await.expect("job");
    let change = job
        .plan_transition(&job.client_id, JobTransition::Confirm, fixture_time())
        .expect("transition");

    assert!(store.apply_status_change(&change).await.expect("confirm"));

    assert_eq!(helper_profile(&store, &helper).await.total_jobs_completed, 1);
}

#[rstest]
#[tokio::test]
async fn client_reviews_recompute_the_helper_rating(store: MemoryStore) {
    let helper = seed_helper(&store, 4).await;
    let first = job_in(JobStatus::Completed, UserId::random(), Some(helper));
    let second = job_in(JobStatus::Completed, UserId::random(), Some(helper));

    let summary = store
        .insert_and_rate(&client_review(&first, helper, 5))
        .await
        .expect("first review");
    assert_eq!(summary.map(|s| s.total_reviews), Some(1));
    store
        .insert_and_rate(&client_review(&second, helper, 4))
        .await
        .expect("second review");

    let profile = helper_profile(&store, &helper).await;
    assert_eq!(profile.total_reviews, 2);
    assert!((profile.average_rating - 4.5).abs() < f64::EPSILON);
}

#[rstest]
#[tokio::test]
async fn failed_rating_update_stores_no_review(store: MemoryStore) {
    let job = job_in(JobStatus::Completed, UserId::random(), Some(UserId::random()));
    let review = client_review(&job, UserId::random(), 5);

    let error = store.insert_and_rate(&review).await.expect_err("no profile");

    assert!(matches!(error, ReviewPersistenceError::Query { .. }));
    assert!(!store.exists_for_job(&job.id).await.expect("query"));
}

#[rstest]
#[tokio::test]
async fn duplicate_phone_is_rejected(store: MemoryStore) {
    let account = user(UserRole::Client, 1);
    let twin = user(UserRole::Helper, 1);
    let new_user = |user| NewUser {
        user,
        password_hash: "hash".to_owned(),
    };

    UserRepository::insert(&store, &new_user(account), None)
        .await
        .expect("first");
    let error = UserRepository::insert(&store, &new_user(twin), None)
        .await
        .expect_err("duplicate");

    assert_eq!(error, UserPersistenceError::DuplicatePhone);
}

#[rstest]
#[tokio::test]
async fn used_codes_cannot_be_marked_twice(store: MemoryStore) {
    let code = OtpCode::issue(
        phone(7),
        OtpPurpose::Login,
        OtpCodeValue::new("123456").expect("code"),
        fixture_time(),
        OtpPolicy::default(),
    );
    OtpRepository::insert(&store, &code).await.expect("insert");

    assert!(store.mark_used(code.id, fixture_time()).await.expect("first"));
    assert!(!store.mark_used(code.id, fixture_time()).await.expect("second"));
    assert!(
        store
            .find_active(&phone(7), OtpPurpose::Login, fixture_time())
            .await
            .expect("query")
            .is_none()
    );
}

#[rstest]
#[tokio::test]
async fn messages_page_backwards_from_the_cursor(store: MemoryStore) {
    let (job, first, _) = seed_open_job(&store).await;
    let plan = plan_acceptance(&job, &first, &job.client_id, fixture_time()).expect("plan");
    store.apply(&plan).await.expect("apply");
    let conversation = ConversationRepository::list_for_user(&store, &job.client_id)
        .await
        .expect("list")
        .remove(0);

    let mut sent = Vec::new();
    for minute in 0..3 {
        let message = Message::compose(
            conversation.id,
            job.client_id,
            MessageContent::new(&format!("message {minute}")).expect("content"),
            fixture_time() + TimeDelta::minutes(minute),
        );
        store.insert_message(&message).await.expect("insert");
        sent.push(message);
    }

    let newest = store
        .messages(&conversation.id, MessageQuery::new(None, Some(2)))
        .await
        .expect("page");
    assert_eq!(newest.iter().map(|m| m.id).collect::<Vec<_>>(), vec![sent[2].id, sent[1].id]);

    let older = store
        .messages(&conversation.id, MessageQuery::new(Some(sent[1].id), Some(2)))
        .await
        .expect("page");
    assert_eq!(older.iter().map(|m| m.id).collect::<Vec<_>>(), vec![sent[0].id]);

    ConversationRepository::mark_read(&store, &conversation.id, &first.helper_id, fixture_time())
        .await
        .expect("read");
    let refreshed = store
        .messages(&conversation.id, MessageQuery::new(None, None))
        .await
        .expect("page");
    assert!(refreshed.iter().all(|message| message.is_read));
}

#[rstest]
#[tokio::test]
async fn notifications_are_paged_newest_first(store: MemoryStore) {
    let job = open_job(UserId::random());
    for minute in 0..3 {
        let notification =
            NewNotification::about_job(job.client_id, NotificationKind::NewApplication, &job)
                .into_notification(fixture_time() + TimeDelta::minutes(minute));
        NotificationRepository::insert(&store, &notification)
            .await
            .expect("insert");
    }

    let page = store
        .list(&job.client_id, false, PageRequest::new(Some(1), Some(2), 20, 50))
        .await
        .expect("list");
    assert_eq!(page.len(), 2);
    assert!(page[0].created_at > page[1].created_at);

    let changed = store
        .mark_all_read(&job.client_id, fixture_time())
        .await
        .expect("mark");
    assert_eq!(changed, 3);
    assert_eq!(store.unread_count(&job.client_id).await.expect("count"), 0);
}

#[rstest]
#[tokio::test]
async fn unavailable_store_reports_connection_errors(store: MemoryStore) {
    store.set_unavailable(true);

    let error = JobRepository::find_by_id(&store, &open_job(UserId::random()).id)
        .await
        .expect_err("unavailable");

    assert!(matches!(
        error,
        crate::domain::ports::JobPersistenceError::Connection { .. }
    ));
}
