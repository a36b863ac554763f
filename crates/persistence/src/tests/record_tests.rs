// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde_json::{Map, Value, json};
use staffdesk_domain::{
    Database, DatabasePermissions, DomainError, EntityKind, Record, Role, Staff, StaffStatus,
};
use std::collections::BTreeSet;

use super::create_test_staff;
use crate::{EntityStore, Persistence, PersistenceError};

fn patch(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("patch must be an object, got {other}"),
    }
}

#[test]
fn test_create_assigns_id_and_timestamps() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let first: Record<Staff> = persistence
        .create(&create_test_staff("Ann", Some("Sales"), StaffStatus::Active))
        .unwrap();
    let second: Record<Staff> = persistence
        .create(&create_test_staff("Bob", Some("Sales"), StaffStatus::Active))
        .unwrap();

    assert!(second.id > first.id);
    assert_eq!(first.created_date, first.updated_date);
    assert_eq!(first.first_name, "Ann");
}

#[test]
fn test_get_round_trips_fields() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let created: Record<Staff> = persistence
        .create(&create_test_staff("Ann", Some("Sales"), StaffStatus::OnLeave))
        .unwrap();

    let fetched: Record<Staff> = persistence.get(created.id).unwrap();

    assert_eq!(fetched, created);
}

#[test]
fn test_get_is_scoped_to_entity_type() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let created: Record<Staff> = persistence
        .create(&create_test_staff("Ann", None, StaffStatus::Active))
        .unwrap();

    let result: Result<Record<Role>, PersistenceError> = persistence.get(created.id);

    assert_eq!(
        result,
        Err(PersistenceError::RecordNotFound {
            kind: EntityKind::Role,
            id: created.id,
        })
    );
}

#[test]
fn test_create_rejects_invalid_entity() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let mut invalid: Staff = create_test_staff("Ann", None, StaffStatus::Active);
    invalid.email = String::from("not-an-email");

    let result: Result<Record<Staff>, PersistenceError> = persistence.create(&invalid);

    assert!(matches!(
        result,
        Err(PersistenceError::ValidationFailed(DomainError::InvalidField { .. }))
    ));
    assert_eq!(persistence.count_records(EntityKind::Staff).unwrap(), 0);
}

#[test]
fn test_update_merges_top_level_fields() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let created: Record<Staff> = persistence
        .create(&create_test_staff("Ann", Some("Sales"), StaffStatus::Active))
        .unwrap();

    let updated: Record<Staff> = persistence
        .update(
            created.id,
            &patch(json!({"department": "Legal", "status": "On Leave"})),
        )
        .unwrap();

    assert_eq!(updated.department.as_deref(), Some("Legal"));
    assert_eq!(updated.status, StaffStatus::OnLeave);
    assert_eq!(updated.first_name, "Ann");
    assert_eq!(updated.created_date, created.created_date);
    assert!(updated.updated_date >= created.updated_date);

    let fetched: Record<Staff> = persistence.get(created.id).unwrap();
    assert_eq!(fetched.department.as_deref(), Some("Legal"));
}

#[test]
fn test_update_ignores_store_owned_fields() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let created: Record<Staff> = persistence
        .create(&create_test_staff("Ann", None, StaffStatus::Active))
        .unwrap();

    let updated: Record<Staff> = persistence
        .update(created.id, &patch(json!({"id": 999, "last_name": "Lee"})))
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.last_name, "Lee");
}

#[test]
fn test_update_with_wrong_type_is_invalid_fields() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let created: Record<Staff> = persistence
        .create(&create_test_staff("Ann", None, StaffStatus::Active))
        .unwrap();

    let result: Result<Record<Staff>, PersistenceError> =
        persistence.update(created.id, &patch(json!({"status": "Retired"})));

    assert!(matches!(
        result,
        Err(PersistenceError::InvalidFields {
            kind: EntityKind::Staff,
            ..
        })
    ));
}

#[test]
fn test_update_rejects_unknown_field() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let created: Record<Staff> = persistence
        .create(&create_test_staff("Ann", None, StaffStatus::Active))
        .unwrap();

    let result: Result<Record<Staff>, PersistenceError> =
        persistence.update(created.id, &patch(json!({"statuss": "Inactive"})));

    assert!(matches!(
        result,
        Err(PersistenceError::InvalidFields {
            kind: EntityKind::Staff,
            ..
        })
    ));
    let fetched: Record<Staff> = persistence.get(created.id).unwrap();
    assert_eq!(fetched.status, StaffStatus::Active);
}

#[test]
fn test_update_missing_record_is_not_found() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let result: Result<Record<Staff>, PersistenceError> =
        persistence.update(42, &patch(json!({"last_name": "Lee"})));

    assert!(result.unwrap_err().is_not_found());
}

#[test]
fn test_save_replaces_nested_sets() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let created: Record<Database> = persistence
        .create(&Database {
            name: String::from("Library"),
            description: None,
            created_by: 1,
            permissions: DatabasePermissions::owned_by(1),
        })
        .unwrap();

    let mut fields: Database = created.fields.clone();
    fields.permissions.view = BTreeSet::from([1, 2, 3]);
    let saved: Record<Database> = persistence.save(created.id, &fields).unwrap();

    assert_eq!(saved.permissions.view, BTreeSet::from([1, 2, 3]));
    let fetched: Record<Database> = persistence.get(created.id).unwrap();
    assert_eq!(fetched.permissions, saved.permissions);
}

#[test]
fn test_delete_removes_record() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let created: Record<Staff> = persistence
        .create(&create_test_staff("Ann", None, StaffStatus::Active))
        .unwrap();

    persistence.delete::<Staff>(created.id).unwrap();

    let result: Result<Record<Staff>, PersistenceError> = persistence.get(created.id);
    assert!(result.unwrap_err().is_not_found());
}

#[test]
fn test_delete_nonexistent_record_fails() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let result: Result<(), PersistenceError> = persistence.delete::<Staff>(7);

    assert_eq!(
        result,
        Err(PersistenceError::RecordNotFound {
            kind: EntityKind::Staff,
            id: 7,
        })
    );
}

#[test]
fn test_error_classification() {
    assert!(PersistenceError::NotFound(String::from("x")).is_not_found());
    assert!(!PersistenceError::NotFound(String::from("x")).is_unavailable());
    assert!(PersistenceError::DatabaseConnectionFailed(String::from("x")).is_unavailable());
    assert!(PersistenceError::QueryFailed(String::from("x")).is_unavailable());
    assert!(!PersistenceError::SerializationError(String::from("x")).is_unavailable());
}
