// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use staffdesk_domain::{Entity, EntityKind, Record, RecordId};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use crate::diesel_schema::records;
use crate::error::PersistenceError;

/// Diesel Queryable struct for record rows.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = records)]
pub struct RecordRow {
    pub record_id: i64,
    pub entity_type: String,
    pub data_json: String,
    pub created_date: String,
    pub updated_date: String,
}

impl RecordRow {
    /// Decodes the stored JSON and timestamps into a typed record.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if the row does not hold a valid `T`.
    pub fn decode<T: Entity>(self) -> Result<Record<T>, PersistenceError> {
        let fields: T = serde_json::from_str(&self.data_json).map_err(|e| {
            PersistenceError::SerializationError(format!(
                "{} record {}: {e}",
                self.entity_type, self.record_id
            ))
        })?;

        Ok(Record::new(
            self.record_id,
            parse_timestamp(&self.created_date)?,
            parse_timestamp(&self.updated_date)?,
            fields,
        ))
    }
}

/// Formats a store timestamp.
///
/// # Errors
///
/// Returns `SerializationError` if the timestamp cannot be formatted.
pub fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, PersistenceError> {
    timestamp
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(format!("Invalid timestamp: {e}")))
}

fn parse_timestamp(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| {
        PersistenceError::SerializationError(format!("Invalid stored timestamp '{value}': {e}"))
    })
}

/// Lists every row of one entity type in insertion order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_records(
    conn: &mut SqliteConnection,
    kind: EntityKind,
) -> Result<Vec<RecordRow>, PersistenceError> {
    debug!("Listing {} records", kind);

    Ok(records::table
        .filter(records::entity_type.eq(kind.as_str()))
        .order(records::record_id.asc())
        .select(RecordRow::as_select())
        .load(conn)?)
}

/// Fetches one row by entity type and id.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no such record exists.
pub fn get_record(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    id: RecordId,
) -> Result<Option<RecordRow>, PersistenceError> {
    debug!("Looking up {} record {}", kind, id);

    Ok(records::table
        .filter(records::entity_type.eq(kind.as_str()))
        .filter(records::record_id.eq(id))
        .select(RecordRow::as_select())
        .first(conn)
        .optional()?)
}

/// Counts the rows of one entity type.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_records(
    conn: &mut SqliteConnection,
    kind: EntityKind,
) -> Result<i64, PersistenceError> {
    use diesel::dsl::count;

    Ok(records::table
        .filter(records::entity_type.eq(kind.as_str()))
        .select(count(records::record_id))
        .first(conn)?)
}
