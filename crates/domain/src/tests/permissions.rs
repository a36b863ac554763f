// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeSet;

use crate::{Capability, Database, DatabasePermissions, RecordId, has_permission};

fn database(created_by: RecordId, permissions: DatabasePermissions) -> Database {
    Database {
        name: String::from("Library"),
        description: None,
        created_by,
        permissions,
    }
}

#[test]
fn test_creator_holds_every_capability_with_empty_grants() {
    let db: Database = database(7, DatabasePermissions::default());

    for capability in Capability::ALL {
        assert!(has_permission(&db, capability, 7));
    }
}

#[test]
fn test_ungranted_user_is_denied() {
    let db: Database = database(7, DatabasePermissions::owned_by(7));

    for capability in Capability::ALL {
        assert!(!has_permission(&db, capability, 8));
    }
}

#[test]
fn test_grants_are_per_capability() {
    let mut permissions: DatabasePermissions = DatabasePermissions::owned_by(1);
    assert!(permissions.grant(Capability::View, 2));
    let db: Database = database(1, permissions);

    assert!(has_permission(&db, Capability::View, 2));
    assert!(!has_permission(&db, Capability::Edit, 2));
    assert!(!has_permission(&db, Capability::Delete, 2));
}

#[test]
fn test_grant_and_revoke_report_changes() {
    let mut permissions: DatabasePermissions = DatabasePermissions::default();

    assert!(permissions.grant(Capability::Edit, 3));
    assert!(!permissions.grant(Capability::Edit, 3));
    assert!(permissions.revoke(Capability::Edit, 3));
    assert!(!permissions.revoke(Capability::Edit, 3));
    assert!(permissions.grants(Capability::Edit).is_empty());
}

#[test]
fn test_owned_by_puts_owner_in_every_set() {
    let permissions: DatabasePermissions = DatabasePermissions::owned_by(5);
    let expected: BTreeSet<RecordId> = BTreeSet::from([5]);

    assert_eq!(permissions.view, expected);
    assert_eq!(permissions.edit, expected);
    assert_eq!(permissions.delete, expected);
}

#[test]
fn test_permissions_deserialize_with_missing_sets() {
    let db: Database =
        serde_json::from_str(r#"{"name":"Assets","created_by":4,"permissions":{"view":[9]}}"#)
            .unwrap();

    assert!(db.permissions.view.contains(&9));
    assert!(db.permissions.edit.is_empty());
    assert!(has_permission(&db, Capability::Delete, 4));
}

#[test]
fn test_capability_parses_lowercase_names() {
    assert_eq!("view".parse::<Capability>().unwrap(), Capability::View);
    assert_eq!("delete".parse::<Capability>().unwrap(), Capability::Delete);
    assert!("admin".parse::<Capability>().is_err());
}
