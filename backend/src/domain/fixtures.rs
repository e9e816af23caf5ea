//! Shared builders for domain unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::{
    Address, AddressDraft, Application, ApplicationDraft, CategoryId, City, Job, JobDraft,
    JobDraftInput, JobStatus, PersonName, PhoneNumber, User, UserId, UserRole, UserStatus,
};

pub(crate) fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 2, 8, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_time(),
    })
}

pub(crate) fn phone(suffix: u32) -> PhoneNumber {
    PhoneNumber::new(format!("+2126{suffix:08}")).expect("valid fixture phone")
}

pub(crate) fn user(role: UserRole, suffix: u32) -> User {
    User {
        id: UserId::random(),
        phone: phone(suffix),
        first_name: PersonName::new("Salma", "firstName").expect("valid name"),
        last_name: PersonName::new("Bennani", "lastName").expect("valid name"),
        role,
        status: UserStatus::Active,
        city: City::new("Casablanca").expect("valid city"),
        avatar_url: None,
        phone_verified: true,
        last_login_at: None,
        created_at: fixture_time(),
    }
}

pub(crate) fn address(owner: UserId) -> Address {
    AddressDraft::new("Home", "12 Rue Atlas", "Casablanca", None, 33.5731, -7.5898)
        .expect("valid address")
        .into_address(owner, true, fixture_time())
}

pub(crate) fn open_job(client: UserId) -> Job {
    let address = address(client);
    JobDraft::new(JobDraftInput {
        category_id: CategoryId::random(),
        address_id: address.id,
        title: "Fix kitchen sink",
        description: "The kitchen sink leaks under the cabinet.",
        preferred_date: None,
        time_preference: None,
        budget_type: None,
        budget_amount: Some(250.0),
    })
    .expect("valid job draft")
    .into_job(client, &address, fixture_time())
}

pub(crate) fn job_in(status: JobStatus, client: UserId, helper: Option<UserId>) -> Job {
    let mut job = open_job(client);
    job.status = status;
    job.assigned_helper_id = helper;
    job
}

pub(crate) fn pending_application(job: &Job, helper: UserId) -> Application {
    ApplicationDraft::new(Some("I can come tomorrow."), Some(200.0))
        .expect("valid application draft")
        .into_application(job.id, helper, fixture_time())
}
