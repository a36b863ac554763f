// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Duration, OffsetDateTime};

use crate::{
    Persistence, PersistenceError, SessionData, UserData, format_session_timestamp,
    parse_session_timestamp,
};

#[test]
fn test_create_user_normalizes_email() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let user_id: i64 = persistence
        .create_user("  Admin@Example.COM ", "Admin User", "s3cret-pass")
        .unwrap();

    let user: UserData = persistence
        .get_user_by_email("admin@example.com")
        .unwrap()
        .unwrap();
    assert_eq!(user.user_id, user_id);
    assert_eq!(user.email, "admin@example.com");
    assert_eq!(user.full_name, "Admin User");
    assert_ne!(user.password_hash, "s3cret-pass");
}

#[test]
fn test_duplicate_email_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    persistence
        .create_user("a@example.com", "A", "password-1")
        .unwrap();

    let result: Result<i64, PersistenceError> =
        persistence.create_user("A@example.com", "Other", "password-2");

    assert_eq!(
        result,
        Err(PersistenceError::DuplicateEmail(String::from("a@example.com")))
    );
    assert_eq!(persistence.count_users().unwrap(), 1);
}

#[test]
fn test_verify_password() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let user_id: i64 = persistence
        .create_user("a@example.com", "A", "correct horse")
        .unwrap();
    let user: UserData = persistence.get_user_by_id(user_id).unwrap().unwrap();

    assert!(Persistence::verify_password("correct horse", &user.password_hash).unwrap());
    assert!(!Persistence::verify_password("wrong", &user.password_hash).unwrap());
}

#[test]
fn test_unknown_user_lookups_return_none() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    assert!(persistence.get_user_by_id(99).unwrap().is_none());
    assert!(
        persistence
            .get_user_by_email("nobody@example.com")
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_session_lifecycle() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let user_id: i64 = persistence
        .create_user("a@example.com", "A", "password")
        .unwrap();
    let expires_at: String =
        format_session_timestamp(OffsetDateTime::now_utc() + Duration::hours(8)).unwrap();

    let session_id: i64 = persistence
        .create_session("session_abc", user_id, &expires_at)
        .unwrap();
    let session: SessionData = persistence
        .get_session_by_token("session_abc")
        .unwrap()
        .unwrap();
    assert_eq!(session.session_id, session_id);
    assert_eq!(session.user_id, user_id);
    assert_eq!(
        parse_session_timestamp(&session.expires_at).unwrap(),
        parse_session_timestamp(&expires_at).unwrap()
    );

    persistence.update_session_activity(session_id).unwrap();
    persistence.delete_session("session_abc").unwrap();

    assert!(
        persistence
            .get_session_by_token("session_abc")
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_session_requires_existing_user() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let expires_at: String = format_session_timestamp(OffsetDateTime::now_utc()).unwrap();

    let result: Result<i64, PersistenceError> =
        persistence.create_session("session_orphan", 404, &expires_at);

    assert!(result.is_err());
}

#[test]
fn test_delete_expired_sessions_keeps_live_ones() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let user_id: i64 = persistence
        .create_user("a@example.com", "A", "password")
        .unwrap();
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let expired: String = format_session_timestamp(now - Duration::hours(1)).unwrap();
    let live: String = format_session_timestamp(now + Duration::hours(1)).unwrap();

    persistence
        .create_session("session_old", user_id, &expired)
        .unwrap();
    persistence
        .create_session("session_new", user_id, &live)
        .unwrap();

    let removed: usize = persistence.delete_expired_sessions(now).unwrap();

    assert_eq!(removed, 1);
    assert!(
        persistence
            .get_session_by_token("session_new")
            .unwrap()
            .is_some()
    );
}
