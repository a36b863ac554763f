// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The entity store contract.
//!
//! Every collection is addressed by its entity type. Records are returned
//! in insertion order unless a [`SortSpec`] says otherwise, and a sort
//! never reorders records that compare equal.

use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use staffdesk_domain::{Entity, Record, RecordId};

use crate::error::PersistenceError;

/// Keys owned by the store. They are present on every record's JSON form
/// and are never taken from caller-supplied fields.
pub const RESERVED_FIELDS: [&str; 3] = ["id", "created_date", "updated_date"];

/// Sort order for a listing: a field name, optionally prefixed with `-` for
/// descending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

impl SortSpec {
    /// Parses `"field"` or `"-field"`. Returns `None` for an empty field.
    #[must_use]
    pub fn parse(spec: &str) -> Option<Self> {
        let spec: &str = spec.trim();
        let (field, descending) = spec
            .strip_prefix('-')
            .map_or((spec, false), |field| (field, true));

        if field.is_empty() {
            return None;
        }

        Some(Self {
            field: field.to_string(),
            descending,
        })
    }

    #[must_use]
    pub fn ascending(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: false,
        }
    }

    #[must_use]
    pub fn descending(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }
}

impl std::fmt::Display for SortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            write!(f, "{}", self.field)
        }
    }
}

/// Exact-match conditions on a record's JSON form.
///
/// A record passes when every listed field is present and equal to the
/// given value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EqualityFilter {
    conditions: BTreeMap<String, Value>,
}

impl EqualityFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition, replacing any earlier condition on the same field.
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether the JSON form of a record satisfies every condition.
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }
}

/// Typed access to the entity store.
///
/// Methods take `&mut self` because a store owns a single connection.
pub trait EntityStore {
    /// Lists every record of `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list<T: Entity>(&mut self, sort: Option<&SortSpec>)
    -> Result<Vec<Record<T>>, PersistenceError>;

    /// Lists the records of `T` matching every equality condition.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn filter<T: Entity>(
        &mut self,
        equality: &EqualityFilter,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Record<T>>, PersistenceError>;

    /// Fetches one record.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if no record of `T` has this id.
    fn get<T: Entity>(&mut self, id: RecordId) -> Result<Record<T>, PersistenceError>;

    /// Validates and stores a new record. The store assigns the id and both
    /// timestamps.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` if `fields` breaks an entity rule.
    fn create<T: Entity>(&mut self, fields: &T) -> Result<Record<T>, PersistenceError>;

    /// Merges `patch` into the stored fields at the top level, validates the
    /// result and stores it.
    ///
    /// Keys in [`RESERVED_FIELDS`] are ignored.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if the record is absent, `InvalidFields` if
    /// the merged fields do not form a `T` and `ValidationFailed` if they
    /// break an entity rule.
    fn update<T: Entity>(
        &mut self,
        id: RecordId,
        patch: &Map<String, Value>,
    ) -> Result<Record<T>, PersistenceError>;

    /// Deletes one record.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if no record of `T` has this id.
    fn delete<T: Entity>(&mut self, id: RecordId) -> Result<(), PersistenceError>;

    /// Replaces every field of a record.
    ///
    /// # Errors
    ///
    /// Same as [`EntityStore::update`].
    fn save<T: Entity>(&mut self, id: RecordId, fields: &T) -> Result<Record<T>, PersistenceError> {
        let patch: Map<String, Value> = to_field_map(fields)?;
        self.update(id, &patch)
    }
}

/// Serializes entity fields into a JSON object.
///
/// # Errors
///
/// Returns `SerializationError` if `T` does not serialize to an object.
pub fn to_field_map<T: Entity>(fields: &T) -> Result<Map<String, Value>, PersistenceError> {
    match serde_json::to_value(fields)? {
        Value::Object(map) => Ok(map),
        other => Err(PersistenceError::SerializationError(format!(
            "{} fields serialized to {other} instead of an object",
            T::KIND
        ))),
    }
}

/// Applies an equality filter and an optional sort to records already in
/// insertion order.
///
/// # Errors
///
/// Returns `SerializationError` if a record cannot be rendered to JSON.
pub fn select_records<T: Entity>(
    records: Vec<Record<T>>,
    equality: &EqualityFilter,
    sort: Option<&SortSpec>,
) -> Result<Vec<Record<T>>, PersistenceError> {
    if equality.is_empty() && sort.is_none() {
        return Ok(records);
    }

    let mut keyed: Vec<(Record<T>, Value)> = Vec::with_capacity(records.len());
    for record in records {
        let json: Value = serde_json::to_value(&record)?;
        if equality.matches(&json) {
            keyed.push((record, json));
        }
    }

    if let Some(sort) = sort {
        keyed.sort_by(|(a, a_json), (b, b_json)| {
            let ordering: Ordering = compare_field(&sort.field, a, a_json, b, b_json);
            if sort.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }

    Ok(keyed.into_iter().map(|(record, _)| record).collect())
}

fn compare_field<T>(
    field: &str,
    a: &Record<T>,
    a_json: &Value,
    b: &Record<T>,
    b_json: &Value,
) -> Ordering {
    // Store-owned fields compare on their typed values; RFC 3339 strings
    // with differing fractional precision do not sort lexically.
    match field {
        "id" => a.id.cmp(&b.id),
        "created_date" => a.created_date.cmp(&b.created_date),
        "updated_date" => a.updated_date.cmp(&b.updated_date),
        _ => compare_json(a_json.get(field), b_json.get(field)),
    }
}

const fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_) | Value::Object(_)) => 4,
    }
}

/// Orders JSON values: absent and null first, then booleans, numbers,
/// strings and finally composite values, which compare equal.
#[must_use]
pub fn compare_json(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            match (x.as_i64(), y.as_i64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => x
                    .as_f64()
                    .partial_cmp(&y.as_f64())
                    .unwrap_or(Ordering::Equal),
            }
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
