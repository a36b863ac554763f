// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde_json::{Value, json};
use staffdesk_domain::{
    ColumnDefinition, ColumnType, DatabaseRow, DatabaseTable, Record, Staff, StaffStatus,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::create_test_staff;
use crate::{EntityStore, EqualityFilter, Persistence, SortSpec, compare_json};

fn seed_staff(persistence: &mut Persistence) -> Vec<Record<Staff>> {
    let people: [(&str, Option<&str>, StaffStatus); 5] = [
        ("Cara", Some("Sales"), StaffStatus::Active),
        ("Abe", Some("Legal"), StaffStatus::Inactive),
        ("Eve", None, StaffStatus::Active),
        ("Dan", Some("Sales"), StaffStatus::Active),
        ("Bea", Some("Sales"), StaffStatus::OnLeave),
    ];
    people
        .iter()
        .map(|(name, dept, status)| {
            persistence
                .create(&create_test_staff(name, *dept, *status))
                .unwrap()
        })
        .collect()
}

fn names(records: &[Record<Staff>]) -> Vec<&str> {
    records.iter().map(|r| r.first_name.as_str()).collect()
}

#[test]
fn test_sort_spec_parse() {
    assert_eq!(
        SortSpec::parse("-created_date"),
        Some(SortSpec::descending("created_date"))
    );
    assert_eq!(SortSpec::parse("name"), Some(SortSpec::ascending("name")));
    assert_eq!(SortSpec::parse("-"), None);
    assert_eq!(SortSpec::parse(""), None);
    assert_eq!(SortSpec::descending("level").to_string(), "-level");
}

#[test]
fn test_list_defaults_to_insertion_order() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    seed_staff(&mut persistence);

    let listed: Vec<Record<Staff>> = persistence.list(None).unwrap();

    assert_eq!(names(&listed), vec!["Cara", "Abe", "Eve", "Dan", "Bea"]);
}

#[test]
fn test_list_sorted_ascending_and_descending() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    seed_staff(&mut persistence);

    let ascending: Vec<Record<Staff>> = persistence
        .list(Some(&SortSpec::ascending("first_name")))
        .unwrap();
    let descending: Vec<Record<Staff>> = persistence
        .list(Some(&SortSpec::descending("first_name")))
        .unwrap();

    assert_eq!(names(&ascending), vec!["Abe", "Bea", "Cara", "Dan", "Eve"]);
    assert_eq!(names(&descending), vec!["Eve", "Dan", "Cara", "Bea", "Abe"]);
}

#[test]
fn test_sort_by_created_date_descending_is_newest_first() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let seeded: Vec<Record<Staff>> = seed_staff(&mut persistence);

    let newest_first: Vec<Record<Staff>> = persistence
        .list(Some(&SortSpec::descending("created_date")))
        .unwrap();

    // Timestamps may collide; ordering must never contradict them.
    for pair in newest_first.windows(2) {
        assert!(pair[0].created_date >= pair[1].created_date);
    }
    assert_eq!(newest_first.len(), seeded.len());
}

#[test]
fn test_sort_ties_keep_insertion_order() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    seed_staff(&mut persistence);

    let by_department: Vec<Record<Staff>> = persistence
        .list(Some(&SortSpec::ascending("department")))
        .unwrap();

    // Null sorts first, then Legal, then the three Sales in insertion order.
    assert_eq!(names(&by_department), vec!["Eve", "Abe", "Cara", "Dan", "Bea"]);
}

#[test]
fn test_filter_by_equality() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    seed_staff(&mut persistence);

    let sales_active: Vec<Record<Staff>> = persistence
        .filter(
            &EqualityFilter::new()
                .with("department", "Sales")
                .with("status", "Active"),
            None,
        )
        .unwrap();

    assert_eq!(names(&sales_active), vec!["Cara", "Dan"]);
}

#[test]
fn test_filter_on_record_id() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let seeded: Vec<Record<Staff>> = seed_staff(&mut persistence);

    let found: Vec<Record<Staff>> = persistence
        .filter(&EqualityFilter::new().with("id", seeded[3].id), None)
        .unwrap();

    assert_eq!(names(&found), vec!["Dan"]);
}

#[test]
fn test_filter_rows_by_table_then_sort() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let table: Record<DatabaseTable> = persistence
        .create(&DatabaseTable {
            database_id: 1,
            name: String::from("Books"),
            description: None,
            columns: vec![ColumnDefinition::new("Pages", ColumnType::Number, false)],
        })
        .unwrap();

    for (table_id, pages) in [(table.id, 300), (table.id + 100, 50), (table.id, 120)] {
        let values: BTreeMap<String, Value> =
            BTreeMap::from([(String::from("Pages"), json!(pages))]);
        persistence
            .create(&DatabaseRow { table_id, values })
            .unwrap();
    }

    let rows: Vec<Record<DatabaseRow>> = persistence
        .filter(
            &EqualityFilter::new().with("table_id", table.id),
            Some(&SortSpec::descending("id")),
        )
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].values["Pages"], json!(120));
    assert_eq!(rows[1].values["Pages"], json!(300));
}

#[test]
fn test_compare_json_orders_by_type_then_value() {
    assert_eq!(compare_json(None, Some(&json!(1))), Ordering::Less);
    assert_eq!(compare_json(Some(&json!(2)), Some(&json!(10))), Ordering::Less);
    assert_eq!(compare_json(Some(&json!(2.5)), Some(&json!(2))), Ordering::Greater);
    assert_eq!(compare_json(Some(&json!("b")), Some(&json!("a"))), Ordering::Greater);
    assert_eq!(compare_json(Some(&json!(true)), Some(&json!("a"))), Ordering::Less);
}
