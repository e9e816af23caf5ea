//! Tests for user value objects and projections.

use chrono::TimeZone;
use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn account() -> UserAccount {
    let created_at = Utc
        .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp");
    let id = UserId::random();
    UserAccount {
        user: User {
            id,
            phone: PhoneNumber::new("+212612345678").expect("valid phone"),
            first_name: PersonName::new("Youssef", "firstName").expect("valid name"),
            last_name: PersonName::new("Benali", "lastName").expect("valid name"),
            role: UserRole::Helper,
            status: UserStatus::Active,
            city: City::new("Casablanca").expect("valid city"),
            avatar_url: None,
            phone_verified: true,
            last_login_at: None,
            created_at,
        },
        helper_profile: Some(HelperProfile::empty(id)),
    }
}

#[rstest]
#[case("", UserValidationError::Empty { field: "firstName" })]
#[case("   ", UserValidationError::Empty { field: "firstName" })]
fn names_must_not_be_blank(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(PersonName::new(raw, "firstName"), Err(expected));
}

#[rstest]
fn names_are_trimmed_and_bounded() {
    let name = PersonName::new("  Amina ", "firstName").expect("valid name");
    assert_eq!(name.as_str(), "Amina");

    let long = "a".repeat(NAME_MAX + 1);
    let err = PersonName::new(&long, "lastName").expect_err("too long");
    assert_eq!(err.field(), "lastName");
}

#[rstest]
fn initial_keeps_first_character_only() {
    let name = PersonName::new("Élodie", "lastName").expect("valid name");
    assert_eq!(name.initial(), "É.");
}

#[rstest]
fn admin_cannot_be_self_assigned() {
    assert_eq!(UserRole::Client.self_assignable(), Ok(UserRole::Client));
    assert_eq!(UserRole::Helper.self_assignable(), Ok(UserRole::Helper));
    assert_eq!(
        UserRole::Admin.self_assignable(),
        Err(UserValidationError::RoleNotSelfAssignable)
    );
}

#[rstest]
fn public_profile_truncates_last_name(account: UserAccount) {
    let profile = PublicProfile::from(account.clone());
    assert_eq!(profile.first_name, "Youssef");
    assert_eq!(profile.last_name, "B.");
    assert_eq!(profile.member_since, account.user.created_at);
    assert!(profile.helper_profile.is_some());
}

#[rstest]
fn user_id_rejects_non_uuid_text() {
    assert_eq!(UserId::new("nope"), Err(UserValidationError::InvalidId));
}

#[rstest]
fn status_text_matches_storage_values() {
    assert_eq!(UserStatus::PendingVerification.as_str(), "PENDING_VERIFICATION");
    assert_eq!("SUSPENDED".parse::<UserStatus>(), Ok(UserStatus::Suspended));
}
