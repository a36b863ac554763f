// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SQLite connection setup.
//!
//! Diesel has no PRAGMA DSL, so connection settings and the two lookups
//! below are raw SQL.

use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer};
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a writer waits on a locked file database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Where a store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    /// A private in-memory database. The id keeps instances apart.
    InMemory(u64),
    /// A database file, created if missing.
    File(String),
}

impl StorageTarget {
    fn url(&self) -> String {
        match self {
            Self::InMemory(id) => format!("file:memdb_staffdesk_{id}?mode=memory&cache=shared"),
            Self::File(path) => path.clone(),
        }
    }

    /// Connection settings applied before migrating. Every target needs
    /// foreign keys for sessions; files also get WAL and a busy timeout.
    fn pragmas(&self) -> Vec<String> {
        let mut pragmas: Vec<String> = vec![String::from("PRAGMA foreign_keys = ON")];
        if let Self::File(_) = self {
            pragmas.push(String::from("PRAGMA journal_mode = WAL"));
            pragmas.push(format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"));
        }
        pragmas
    }
}

#[derive(QueryableByName)]
struct PragmaRow {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Opens `target`, applies its settings, migrates the schema and checks
/// foreign key enforcement.
///
/// # Errors
///
/// Returns `DatabaseConnectionFailed`, `QueryFailed` or `MigrationFailed`
/// for the step that failed.
pub fn open(target: &StorageTarget) -> Result<SqliteConnection, PersistenceError> {
    let url: String = target.url();
    info!(database = %url, "Opening SQLite database");

    let mut conn: SqliteConnection = SqliteConnection::establish(&url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;

    for pragma in target.pragmas() {
        diesel::sql_query(&pragma)
            .execute(&mut conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("{pragma}: {e}")))?;
    }

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "Applied schema migrations");
    }

    verify_foreign_key_enforcement(&mut conn)?;
    Ok(conn)
}

/// Returns `last_insert_rowid()` for this connection.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_last_insert_rowid(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("last_insert_rowid()")).get_result(conn)?)
}

/// Fails unless `PRAGMA foreign_keys` reports enforcement as active.
///
/// # Errors
///
/// Returns `ForeignKeyEnforcementNotEnabled` when enforcement is off.
pub fn verify_foreign_key_enforcement(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    let row: PragmaRow = diesel::sql_query("PRAGMA foreign_keys").get_result(conn)?;
    if row.foreign_keys == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }

    debug!("SQLite foreign key enforcement is enabled");
    Ok(())
}
