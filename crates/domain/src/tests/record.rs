// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde_json::Value;

use super::helpers::{record, staff};
use crate::{EntityKind, Record, Staff, StaffStatus};

#[test]
fn test_entity_kind_round_trips_through_str() {
    for kind in EntityKind::ALL {
        let parsed: EntityKind = kind.as_str().parse().unwrap();
        assert_eq!(parsed, kind);
    }
    assert!("payroll".parse::<EntityKind>().is_err());
}

#[test]
fn test_record_serializes_as_flat_object() {
    let member: Record<Staff> = record(12, staff("Ann", "Lee", None, StaffStatus::OnLeave));

    let json: Value = serde_json::to_value(&member).unwrap();

    assert_eq!(json["id"], 12);
    assert_eq!(json["first_name"], "Ann");
    assert_eq!(json["status"], "On Leave");
    assert_eq!(json["created_date"], "1970-01-01T00:00:00Z");
    assert!(json.get("fields").is_none());
}

#[test]
fn test_record_derefs_to_fields() {
    let member: Record<Staff> = record(1, staff("Ann", "Lee", None, StaffStatus::Active));

    assert_eq!(member.full_name(), "Ann Lee");
}
