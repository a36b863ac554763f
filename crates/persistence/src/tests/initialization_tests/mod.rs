// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend initialization tests.
//!
//! Migrations and foreign key enforcement are also exercised implicitly by
//! every other test that calls `Persistence::new_in_memory()`.

use staffdesk_domain::{EntityKind, Record, Staff, StaffStatus};

use super::create_test_staff;
use crate::{EntityStore, Persistence, PersistenceError};

#[test]
fn test_persistence_initialization() {
    let result: Result<Persistence, PersistenceError> = Persistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_foreign_keys_are_enforced() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1: Persistence = Persistence::new_in_memory().unwrap();
    let mut db2: Persistence = Persistence::new_in_memory().unwrap();

    let _created: Record<Staff> = db1
        .create(&create_test_staff("Ann", None, StaffStatus::Active))
        .unwrap();

    assert_eq!(db1.count_records(EntityKind::Staff).unwrap(), 1);
    assert_eq!(db2.count_records(EntityKind::Staff).unwrap(), 0);
}
