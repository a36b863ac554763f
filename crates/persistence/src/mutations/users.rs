// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account and session mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;
use crate::queries::users::{get_user_by_email, normalize_email};

/// Creates a new user.
///
/// The email is trimmed and lowercased so lookups are case-insensitive.
///
/// # Errors
///
/// Returns `DuplicateEmail` if the address is taken, or an error if the
/// password cannot be hashed or the insert fails.
pub fn create_user(
    conn: &mut SqliteConnection,
    email: &str,
    full_name: &str,
    password: &str,
) -> Result<i64, PersistenceError> {
    let normalized_email: String = normalize_email(email);

    if get_user_by_email(conn, &normalized_email)?.is_some() {
        return Err(PersistenceError::DuplicateEmail(normalized_email));
    }

    info!("Creating user with email: {}", normalized_email);

    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    diesel::insert_into(users::table)
        .values((
            users::email.eq(&normalized_email),
            users::full_name.eq(full_name),
            users::password_hash.eq(&password_hash),
        ))
        .execute(conn)?;

    let user_id: i64 = conn.get_last_insert_rowid()?;

    info!(user_id, "User created");
    Ok(user_id)
}

/// Creates a new session for a user.
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    user_id: i64,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    debug!(
        "Creating session for user ID: {} with expiration: {}",
        user_id, expires_at
    );

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::user_id.eq(user_id),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    let session_id: i64 = conn.get_last_insert_rowid()?;

    debug!(session_id, user_id, "Session created");
    Ok(session_id)
}

/// Updates the last activity timestamp for a session.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut SqliteConnection,
    session_id: i64,
) -> Result<(), PersistenceError> {
    debug!("Updating last_activity_at for session ID: {}", session_id);

    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set(
            sessions::last_activity_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>(
                "CURRENT_TIMESTAMP",
            )),
        )
        .execute(conn)?;

    Ok(())
}

/// Deletes a session by token. Deleting an unknown token is not an error.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<(), PersistenceError> {
    debug!("Deleting session by token");

    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;

    Ok(())
}

/// Deletes sessions whose expiry sorts before `now`.
///
/// `now` must be formatted the same way as the stored `expires_at` values.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: &str,
) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.lt(now))
        .execute(conn)?;

    info!("Deleted {} expired sessions", rows_affected);
    Ok(rows_affected)
}
