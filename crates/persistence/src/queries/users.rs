// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account and session queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::{SessionData, UserData};
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;

/// Diesel Queryable struct for user rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
struct UserRow {
    user_id: i64,
    email: String,
    full_name: String,
    password_hash: String,
    created_at: String,
}

impl From<UserRow> for UserData {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            email: row.email,
            full_name: row.full_name,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

/// Diesel Queryable struct for session rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
struct SessionRow {
    session_id: i64,
    session_token: String,
    user_id: i64,
    created_at: String,
    last_activity_at: String,
    expires_at: String,
}

impl From<SessionRow> for SessionData {
    fn from(row: SessionRow) -> Self {
        Self {
            session_id: row.session_id,
            session_token: row.session_token,
            user_id: row.user_id,
            created_at: row.created_at,
            last_activity_at: row.last_activity_at,
            expires_at: row.expires_at,
        }
    }
}

/// Normalizes an email address for storage and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Retrieves a user by email, compared case-insensitively.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<UserData>, PersistenceError> {
    let normalized_email: String = normalize_email(email);

    debug!("Looking up user by email: {}", normalized_email);

    Ok(users::table
        .filter(users::email.eq(&normalized_email))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(UserData::from))
}

/// Retrieves a user by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_id(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<UserData>, PersistenceError> {
    debug!("Looking up user by ID: {}", user_id);

    Ok(users::table
        .filter(users::user_id.eq(user_id))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(UserData::from))
}

/// Lists all users ordered by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users(conn: &mut SqliteConnection) -> Result<Vec<UserData>, PersistenceError> {
    debug!("Listing all users");

    let rows: Vec<UserRow> = users::table
        .order(users::user_id.asc())
        .select(UserRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(UserData::from).collect())
}

/// Counts users.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_users(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    use diesel::dsl::count;

    Ok(users::table.select(count(users::user_id)).first(conn)?)
}

/// Retrieves a session by token.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the session is not found.
pub fn get_session_by_token(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    debug!("Looking up session by token");

    Ok(sessions::table
        .filter(sessions::session_token.eq(session_token))
        .select(SessionRow::as_select())
        .first(conn)
        .optional()?
        .map(SessionData::from))
}

/// Verifies a password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns an error if the hash cannot be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| PersistenceError::Other(format!("Failed to verify password: {e}")))
}
