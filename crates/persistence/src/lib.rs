// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for StaffDesk.
//!
//! This crate provides the entity store that holds every StaffDesk
//! collection (staff, roles, departments, time-off requests and the
//! user-defined databases with their tables and rows) together with the
//! dashboard accounts and their login sessions.
//!
//! ## Storage
//!
//! Records of all entity types share one `records` table. The entity
//! fields are stored as a JSON object next to the store-owned id and
//! timestamps. Equality filters and sorting run over each record's JSON
//! form after it is loaded, so any entity field can be filtered or sorted
//! on without schema changes.
//!
//! `SQLite` is the only backend. Tests use a fresh shared in-memory
//! database per [`Persistence::new_in_memory`] call; the server uses a
//! file-backed database in WAL mode.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use serde_json::{Map, Value};
use staffdesk_domain::{Entity, EntityKind, Record, RecordId};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use time::format_description::well_known::Iso8601;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod store;

#[cfg(test)]
mod tests;

pub use data_models::{SessionData, UserData};
pub use error::PersistenceError;
pub use store::{
    EntityStore, EqualityFilter, RESERVED_FIELDS, SortSpec, compare_json, select_records,
    to_field_map,
};

use backend::PersistenceBackend;
use backend::sqlite::StorageTarget;
use queries::records::{RecordRow, format_timestamp};

/// Formats a session timestamp the way `expires_at` is stored.
///
/// Stored expiries compare lexically, so every writer must use this format.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be formatted.
pub fn format_session_timestamp(timestamp: OffsetDateTime) -> Result<String, PersistenceError> {
    timestamp
        .format(&Iso8601::DEFAULT)
        .map_err(|e| PersistenceError::Other(format!("Failed to format timestamp: {e}")))
}

/// Parses a stored session timestamp.
///
/// # Errors
///
/// Returns an error if the value is not an ISO 8601 timestamp.
pub fn parse_session_timestamp(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Iso8601::DEFAULT)
        .map_err(|e| PersistenceError::Other(format!("Failed to parse timestamp '{value}': {e}")))
}

/// `SQLite`-backed entity store and account storage.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// so concurrently running tests never share state.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let conn: SqliteConnection = backend::sqlite::open(&StorageTarget::InMemory(db_id))?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let conn: SqliteConnection =
            backend::sqlite::open(&StorageTarget::File(path_str.to_string()))?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    /// Counts the records of one entity type.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_records(&mut self, kind: EntityKind) -> Result<i64, PersistenceError> {
        queries::records::count_records(&mut self.conn, kind)
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Creates a dashboard account.
    ///
    /// # Arguments
    ///
    /// * `email` - The login email (normalized to lowercase)
    /// * `full_name` - The display name
    /// * `password` - The plain-text password (will be hashed)
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEmail` if the email is taken.
    pub fn create_user(
        &mut self,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::users::create_user(&mut self.conn, email, full_name, password)
    }

    /// Retrieves a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_email(&mut self.conn, email)
    }

    /// Retrieves a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_id(&mut self, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_id(&mut self.conn, user_id)
    }

    /// Lists all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_users(&mut self) -> Result<Vec<UserData>, PersistenceError> {
        queries::users::list_users(&mut self.conn)
    }

    /// Counts users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_users(&mut self) -> Result<i64, PersistenceError> {
        queries::users::count_users(&mut self.conn)
    }

    /// Verifies a password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hash is malformed.
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
        queries::users::verify_password(password, password_hash)
    }

    // ========================================================================
    // Session Management
    // ========================================================================

    /// Creates a new session.
    ///
    /// # Arguments
    ///
    /// * `session_token` - The unique session token
    /// * `user_id` - The user the session belongs to
    /// * `expires_at` - Expiry, formatted with [`format_session_timestamp`]
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        user_id: i64,
        expires_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::users::create_session(&mut self.conn, session_token, user_id, expires_at)
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::users::get_session_by_token(&mut self.conn, session_token)
    }

    /// Updates the last activity timestamp for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_session_activity(&mut self, session_id: i64) -> Result<(), PersistenceError> {
        mutations::users::update_session_activity(&mut self.conn, session_id)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::users::delete_session(&mut self.conn, session_token)
    }

    /// Deletes every session that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_expired_sessions(
        &mut self,
        now: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        let now: String = format_session_timestamp(now)?;
        mutations::users::delete_expired_sessions(&mut self.conn, &now)
    }
}

impl EntityStore for Persistence {
    fn list<T: Entity>(
        &mut self,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Record<T>>, PersistenceError> {
        self.filter(&EqualityFilter::new(), sort)
    }

    fn filter<T: Entity>(
        &mut self,
        equality: &EqualityFilter,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Record<T>>, PersistenceError> {
        let rows: Vec<RecordRow> = queries::records::list_records(&mut self.conn, T::KIND)?;
        let records: Vec<Record<T>> = rows
            .into_iter()
            .map(RecordRow::decode)
            .collect::<Result<_, _>>()?;
        select_records(records, equality, sort)
    }

    fn get<T: Entity>(&mut self, id: RecordId) -> Result<Record<T>, PersistenceError> {
        queries::records::get_record(&mut self.conn, T::KIND, id)?
            .ok_or(PersistenceError::RecordNotFound { kind: T::KIND, id })?
            .decode()
    }

    fn create<T: Entity>(&mut self, fields: &T) -> Result<Record<T>, PersistenceError> {
        fields.validate()?;

        let data_json: String = serde_json::to_string(fields)?;
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let id: RecordId = mutations::records::insert_record(
            &mut self.conn,
            T::KIND,
            &data_json,
            &format_timestamp(now)?,
        )?;

        Ok(Record::new(id, now, now, fields.clone()))
    }

    fn update<T: Entity>(
        &mut self,
        id: RecordId,
        patch: &Map<String, Value>,
    ) -> Result<Record<T>, PersistenceError> {
        let existing: Record<T> = self.get(id)?;

        // Every field serializes as a key, so an unmatched key is a typo.
        let mut merged: Map<String, Value> = to_field_map(&existing.fields)?;
        for (key, value) in patch {
            if RESERVED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            if !merged.contains_key(key) {
                return Err(PersistenceError::InvalidFields {
                    kind: T::KIND,
                    reason: format!("unknown field `{key}`"),
                });
            }
            merged.insert(key.clone(), value.clone());
        }

        let fields: T = serde_json::from_value(Value::Object(merged)).map_err(|e| {
            PersistenceError::InvalidFields {
                kind: T::KIND,
                reason: e.to_string(),
            }
        })?;
        fields.validate()?;

        let data_json: String = serde_json::to_string(&fields)?;
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        mutations::records::update_record(
            &mut self.conn,
            T::KIND,
            id,
            &data_json,
            &format_timestamp(now)?,
        )?;

        Ok(Record::new(id, existing.created_date, now, fields))
    }

    fn delete<T: Entity>(&mut self, id: RecordId) -> Result<(), PersistenceError> {
        mutations::records::delete_record(&mut self.conn, T::KIND, id)
    }
}
