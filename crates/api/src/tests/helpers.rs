// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use serde_json::{Map, Value, json};
use staffdesk_domain::{
    ColumnDefinition, ColumnType, Database, DatabaseTable, Entity, EntityKind, Record,
    RecordId, Staff, StaffStatus, TimeOffRequest, TimeOffStatus,
};
use staffdesk_persistence::{EntityStore, EqualityFilter, Persistence, PersistenceError, SortSpec};
use std::collections::BTreeMap;
use time::{Date, Month};

use crate::auth::CurrentUser;
use crate::custom_databases::{create_database, create_row, create_table};
use crate::request_response::{CreateDatabaseRequest, CreateTableRequest};

pub const TEST_PASSWORD: &str = "Correct-Horse-42";

pub fn new_store() -> Persistence {
    Persistence::new_in_memory().unwrap()
}

/// Registers an account directly in persistence and returns it as the
/// current user.
pub fn create_test_user(persistence: &mut Persistence, email: &str) -> CurrentUser {
    let user_id: RecordId = persistence
        .create_user(email, "Test User", TEST_PASSWORD)
        .unwrap();
    let user = persistence.get_user_by_id(user_id).unwrap().unwrap();
    CurrentUser::from(&user)
}

/// A current user that was never stored; enough for capability checks.
pub fn user_with_id(id: RecordId) -> CurrentUser {
    CurrentUser {
        id,
        email: format!("user{id}@example.com"),
        full_name: format!("User {id}"),
    }
}

pub fn date(year: i32, month: Month, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).unwrap()
}

pub fn staff(first: &str, last: &str, department: Option<&str>, status: StaffStatus) -> Staff {
    Staff {
        employee_id: format!("E-{first}-{last}"),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
        phone: None,
        position: None,
        department: department.map(str::to_string),
        role_id: None,
        status,
        hire_date: None,
    }
}

pub fn time_off(staff_id: RecordId, request_type: &str, status: TimeOffStatus) -> TimeOffRequest {
    TimeOffRequest {
        staff_id,
        request_type: request_type.to_string(),
        status,
        start_date: date(2026, Month::March, 2),
        end_date: date(2026, Month::March, 6),
        reason: None,
    }
}

pub fn patch(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("patch must be a JSON object, got {other}"),
    }
}

pub fn inventory_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("item", ColumnType::Text, true),
        ColumnDefinition::new("quantity", ColumnType::Number, false),
        ColumnDefinition::new("received", ColumnType::Date, false),
    ]
}

pub fn row_values(item: &str, quantity: i64) -> BTreeMap<String, Value> {
    BTreeMap::from([
        (String::from("item"), json!(item)),
        (String::from("quantity"), json!(quantity)),
    ])
}

/// Creates a database owned by `owner` with `tables` tables holding
/// `rows_per_table` rows each. Returns the database id and the table ids.
pub fn seed_database<S: EntityStore>(
    store: &mut S,
    owner: &CurrentUser,
    tables: usize,
    rows_per_table: usize,
) -> (RecordId, Vec<RecordId>) {
    let database: Record<Database> = create_database(
        store,
        owner,
        &CreateDatabaseRequest {
            name: String::from("Inventory"),
            description: None,
        },
    )
    .unwrap();

    let mut table_ids: Vec<RecordId> = Vec::new();
    for t in 0..tables {
        let table: Record<DatabaseTable> = create_table(
            store,
            owner,
            database.id,
            &CreateTableRequest {
                name: format!("Shelf {t}"),
                description: None,
                columns: inventory_columns(),
            },
        )
        .unwrap();

        for r in 0..rows_per_table {
            let quantity: i64 = i64::try_from(r).unwrap();
            create_row(store, owner, table.id, row_values("widget", quantity)).unwrap();
        }
        table_ids.push(table.id);
    }

    (database.id, table_ids)
}

/// An entity store that fails every delete of one entity kind once a
/// number of those deletes have succeeded.
pub struct FailingStore {
    pub inner: Persistence,
    fail_kind: EntityKind,
    allowed_deletes: usize,
    deletes_seen: usize,
}

impl FailingStore {
    pub const fn new(inner: Persistence, fail_kind: EntityKind, allowed_deletes: usize) -> Self {
        Self {
            inner,
            fail_kind,
            allowed_deletes,
            deletes_seen: 0,
        }
    }
}

impl EntityStore for FailingStore {
    fn list<T: Entity>(
        &mut self,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Record<T>>, PersistenceError> {
        self.inner.list(sort)
    }

    fn filter<T: Entity>(
        &mut self,
        equality: &EqualityFilter,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Record<T>>, PersistenceError> {
        self.inner.filter(equality, sort)
    }

    fn get<T: Entity>(&mut self, id: RecordId) -> Result<Record<T>, PersistenceError> {
        self.inner.get(id)
    }

    fn create<T: Entity>(&mut self, fields: &T) -> Result<Record<T>, PersistenceError> {
        self.inner.create(fields)
    }

    fn update<T: Entity>(
        &mut self,
        id: RecordId,
        patch: &Map<String, Value>,
    ) -> Result<Record<T>, PersistenceError> {
        self.inner.update(id, patch)
    }

    fn delete<T: Entity>(&mut self, id: RecordId) -> Result<(), PersistenceError> {
        if T::KIND == self.fail_kind {
            if self.deletes_seen >= self.allowed_deletes {
                return Err(PersistenceError::DatabaseError(String::from(
                    "injected delete failure",
                )));
            }
            self.deletes_seen += 1;
        }
        self.inner.delete::<T>(id)
    }
}

/// Counts what is left of a database in the store.
pub fn remaining(persistence: &mut Persistence) -> (i64, i64, i64) {
    (
        persistence.count_records(EntityKind::Database).unwrap(),
        persistence.count_records(EntityKind::DatabaseTable).unwrap(),
        persistence.count_records(EntityKind::DatabaseRow).unwrap(),
    )
}
