// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use staffdesk_domain::{EntityKind, RecordId};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::records;
use crate::error::PersistenceError;

/// Inserts a record row and returns its assigned id.
///
/// Both timestamps are set to `now`.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_record(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    data_json: &str,
    now: &str,
) -> Result<RecordId, PersistenceError> {
    diesel::insert_into(records::table)
        .values((
            records::entity_type.eq(kind.as_str()),
            records::data_json.eq(data_json),
            records::created_date.eq(now),
            records::updated_date.eq(now),
        ))
        .execute(conn)?;

    let record_id: RecordId = conn.get_last_insert_rowid()?;

    info!(record_id, entity_type = %kind, "Record created");
    Ok(record_id)
}

/// Overwrites the stored fields of a record and bumps `updated_date`.
///
/// # Errors
///
/// Returns `RecordNotFound` if no row was updated.
pub fn update_record(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    id: RecordId,
    data_json: &str,
    now: &str,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(records::table)
        .filter(records::entity_type.eq(kind.as_str()))
        .filter(records::record_id.eq(id))
        .set((
            records::data_json.eq(data_json),
            records::updated_date.eq(now),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::RecordNotFound { kind, id });
    }

    info!(record_id = id, entity_type = %kind, "Record updated");
    Ok(())
}

/// Deletes one record.
///
/// # Errors
///
/// Returns `RecordNotFound` if no row was deleted.
pub fn delete_record(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    id: RecordId,
) -> Result<(), PersistenceError> {
    debug!("Deleting {} record {}", kind, id);

    let rows_affected: usize = diesel::delete(records::table)
        .filter(records::entity_type.eq(kind.as_str()))
        .filter(records::record_id.eq(id))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::RecordNotFound { kind, id });
    }

    info!(record_id = id, entity_type = %kind, "Record deleted");
    Ok(())
}
