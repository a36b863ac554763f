// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Handlers for user-defined databases, their tables and their rows.
//!
//! Every operation resolves the owning database first and checks the
//! current user's capability on it:
//!
//! - reading a database, its tables or rows requires `view`
//! - changing the database, its grants, tables or rows requires `edit`
//! - deleting the database requires `delete`
//!
//! Deleting a database cascades to its tables and rows. The cascade is a
//! sequence of single-record deletes with no transaction around it.

use serde::Serialize;
use serde_json::{Map, Value};
use staffdesk_domain::{
    Capability, Database, DatabasePermissions, DatabaseRow, DatabaseTable, Record, RecordId,
    validate_row_values,
};
use staffdesk_persistence::{EntityStore, EqualityFilter, PersistenceError, SortSpec};
use std::collections::BTreeMap;
use tracing::{debug, error, info};

use crate::auth::CurrentUser;
use crate::capabilities::{DatabaseCapabilities, authorize, compute_database_capabilities};
use crate::error::{ApiError, CascadeDeleteError, CascadeStep};
use crate::request_response::{
    CascadeDeleteReport, CreateDatabaseRequest, CreateTableRequest, DeleteResponse,
    TableDeleteReport, UpdateDatabaseRequest, UpdateTableRequest,
};

/// A database as listed for the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseListing {
    pub database: Record<Database>,
    pub table_count: usize,
    pub capabilities: DatabaseCapabilities,
}

/// A table together with its rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDetail {
    pub table: Record<DatabaseTable>,
    pub rows: Vec<Record<DatabaseRow>>,
}

/// A database with everything it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseDetail {
    pub database: Record<Database>,
    pub capabilities: DatabaseCapabilities,
    pub tables: Vec<TableDetail>,
}

// ============================================================================
// Lookups
// ============================================================================

/// Lists the tables of a database in creation order.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn tables_of<S: EntityStore>(
    store: &mut S,
    database_id: RecordId,
) -> Result<Vec<Record<DatabaseTable>>, PersistenceError> {
    store.filter(&EqualityFilter::new().with("database_id", database_id), None)
}

/// Lists the rows of a table in creation order.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn rows_of<S: EntityStore>(
    store: &mut S,
    table_id: RecordId,
) -> Result<Vec<Record<DatabaseRow>>, PersistenceError> {
    store.filter(&EqualityFilter::new().with("table_id", table_id), None)
}

/// Resolves a table and its owning database, checking `capability`.
pub(crate) fn authorized_table<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    table_id: RecordId,
    capability: Capability,
) -> Result<(Record<Database>, Record<DatabaseTable>), ApiError> {
    let table: Record<DatabaseTable> = store.get(table_id)?;
    let database: Record<Database> = store.get(table.database_id)?;
    authorize(&database, capability, user)?;
    Ok((database, table))
}

/// Resolves a row with its table and database, checking `capability`.
fn authorized_row<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    row_id: RecordId,
    capability: Capability,
) -> Result<(Record<DatabaseTable>, Record<DatabaseRow>), ApiError> {
    let row: Record<DatabaseRow> = store.get(row_id)?;
    let (_, table) = authorized_table(store, user, row.table_id, capability)?;
    Ok((table, row))
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Databases
// ============================================================================

/// Lists every database, newest first, with the current user's
/// capabilities on each.
///
/// Databases the user cannot view are listed too; the capabilities say
/// what the user may do with them.
///
/// # Errors
///
/// Returns `StoreUnavailable` if the store cannot be read.
pub fn list_databases<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
) -> Result<Vec<DatabaseListing>, ApiError> {
    let databases: Vec<Record<Database>> =
        store.list(Some(&SortSpec::descending("created_date")))?;
    let tables: Vec<Record<DatabaseTable>> = store.list(None)?;

    Ok(databases
        .into_iter()
        .map(|database| DatabaseListing {
            table_count: tables
                .iter()
                .filter(|t| t.database_id == database.id)
                .count(),
            capabilities: compute_database_capabilities(&database, user),
            database,
        })
        .collect())
}

/// Creates a database owned by the current user.
///
/// The creator starts out in all three grant sets.
///
/// # Errors
///
/// Returns `ValidationFailure` if the name is empty.
pub fn create_database<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    request: &CreateDatabaseRequest,
) -> Result<Record<Database>, ApiError> {
    let database: Database = Database {
        name: request.name.trim().to_string(),
        description: optional_text(request.description.as_deref()),
        created_by: user.id,
        permissions: DatabasePermissions::owned_by(user.id),
    };

    let record: Record<Database> = store.create(&database)?;
    info!(database_id = record.id, user_id = user.id, "Created custom database");
    Ok(record)
}

/// Renames or re-describes a database.
///
/// # Errors
///
/// Returns `Forbidden` without `edit` on the database.
pub fn update_database<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    database_id: RecordId,
    request: &UpdateDatabaseRequest,
) -> Result<Record<Database>, ApiError> {
    let database: Record<Database> = store.get(database_id)?;
    authorize(&database, Capability::Edit, user)?;

    let mut patch: Map<String, Value> = Map::new();
    if let Some(name) = &request.name {
        patch.insert(String::from("name"), Value::String(name.trim().to_string()));
    }
    if let Some(description) = &request.description {
        patch.insert(
            String::from("description"),
            optional_text(Some(description)).map_or(Value::Null, Value::String),
        );
    }

    let updated: Record<Database> = store.update(database_id, &patch)?;
    info!(database_id, "Updated custom database");
    Ok(updated)
}

/// Replaces the grant sets of a database.
///
/// The creator keeps every capability whatever the new sets say.
///
/// # Errors
///
/// Returns `Forbidden` without `edit` on the database.
pub fn update_database_permissions<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    database_id: RecordId,
    permissions: &DatabasePermissions,
) -> Result<Record<Database>, ApiError> {
    let database: Record<Database> = store.get(database_id)?;
    authorize(&database, Capability::Edit, user)?;

    let mut patch: Map<String, Value> = Map::new();
    patch.insert(
        String::from("permissions"),
        serde_json::to_value(permissions).map_err(PersistenceError::from)?,
    );

    let updated: Record<Database> = store.update(database_id, &patch)?;
    info!(
        database_id,
        viewers = permissions.view.len(),
        editors = permissions.edit.len(),
        deleters = permissions.delete.len(),
        "Updated custom database permissions"
    );
    Ok(updated)
}

/// Fetches a database with its tables and their rows.
///
/// # Errors
///
/// Returns `Forbidden` without `view` on the database.
pub fn get_database_detail<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    database_id: RecordId,
) -> Result<DatabaseDetail, ApiError> {
    let database: Record<Database> = store.get(database_id)?;
    authorize(&database, Capability::View, user)?;

    let mut tables: Vec<TableDetail> = Vec::new();
    for table in tables_of(store, database_id)? {
        let rows: Vec<Record<DatabaseRow>> = rows_of(store, table.id)?;
        tables.push(TableDetail { table, rows });
    }

    debug!(database_id, tables = tables.len(), "Loaded custom database");

    Ok(DatabaseDetail {
        capabilities: compute_database_capabilities(&database, user),
        database,
        tables,
    })
}

/// Deletes a database with all of its tables and rows.
///
/// # Errors
///
/// Returns `Forbidden` without `delete` on the database and
/// `CascadeDelete` if the cascade stops part way.
pub fn delete_database<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    database_id: RecordId,
) -> Result<CascadeDeleteReport, ApiError> {
    let database: Record<Database> = store.get(database_id)?;
    authorize(&database, Capability::Delete, user)?;

    Ok(cascade_delete_database(store, database_id)?)
}

/// Deletes every row of every table, then every table, then the database.
///
/// The first failing delete stops the cascade. Earlier deletes stay
/// applied and later steps do not run.
///
/// # Errors
///
/// Returns a `CascadeDeleteError` naming the failed step and the progress
/// made before it.
pub fn cascade_delete_database<S: EntityStore>(
    store: &mut S,
    database_id: RecordId,
) -> Result<CascadeDeleteReport, CascadeDeleteError> {
    let mut rows_deleted: usize = 0;
    let mut tables_deleted: usize = 0;

    let fail = |step: CascadeStep, rows: usize, tables: usize, source: PersistenceError| {
        error!(
            database_id,
            step = %step,
            rows_deleted = rows,
            tables_deleted = tables,
            error = %source,
            "Cascade delete stopped"
        );
        CascadeDeleteError {
            database_id,
            step,
            rows_deleted: rows,
            tables_deleted: tables,
            source,
        }
    };

    let tables: Vec<Record<DatabaseTable>> = tables_of(store, database_id)
        .map_err(|e| fail(CascadeStep::DeleteRows, rows_deleted, tables_deleted, e))?;

    for table in &tables {
        let rows: Vec<Record<DatabaseRow>> = rows_of(store, table.id)
            .map_err(|e| fail(CascadeStep::DeleteRows, rows_deleted, tables_deleted, e))?;
        for row in &rows {
            store
                .delete::<DatabaseRow>(row.id)
                .map_err(|e| fail(CascadeStep::DeleteRows, rows_deleted, tables_deleted, e))?;
            rows_deleted += 1;
        }
    }

    for table in &tables {
        store
            .delete::<DatabaseTable>(table.id)
            .map_err(|e| fail(CascadeStep::DeleteTables, rows_deleted, tables_deleted, e))?;
        tables_deleted += 1;
    }

    store
        .delete::<Database>(database_id)
        .map_err(|e| fail(CascadeStep::DeleteDatabase, rows_deleted, tables_deleted, e))?;

    info!(
        database_id,
        rows_deleted, tables_deleted, "Deleted custom database"
    );

    Ok(CascadeDeleteReport {
        database_id,
        rows_deleted,
        tables_deleted,
    })
}

// ============================================================================
// Tables
// ============================================================================

/// Creates a table in a database.
///
/// # Errors
///
/// Returns `Forbidden` without `edit` on the database and
/// `ValidationFailure` for an empty name or duplicate column names.
pub fn create_table<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    database_id: RecordId,
    request: &CreateTableRequest,
) -> Result<Record<DatabaseTable>, ApiError> {
    let database: Record<Database> = store.get(database_id)?;
    authorize(&database, Capability::Edit, user)?;

    let table: DatabaseTable = DatabaseTable {
        database_id,
        name: request.name.trim().to_string(),
        description: optional_text(request.description.as_deref()),
        columns: request.columns.clone(),
    };

    let record: Record<DatabaseTable> = store.create(&table)?;
    info!(
        database_id,
        table_id = record.id,
        columns = record.columns.len(),
        "Created custom table"
    );
    Ok(record)
}

/// Changes a table's name, description or columns.
///
/// Existing rows are not rewritten when the columns change.
///
/// # Errors
///
/// Returns `Forbidden` without `edit` on the owning database.
pub fn update_table<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    table_id: RecordId,
    request: &UpdateTableRequest,
) -> Result<Record<DatabaseTable>, ApiError> {
    let (_, mut table) = authorized_table(store, user, table_id, Capability::Edit)?;

    if let Some(name) = &request.name {
        table.fields.name = name.trim().to_string();
    }
    if let Some(description) = &request.description {
        table.fields.description = optional_text(Some(description));
    }
    if let Some(columns) = &request.columns {
        table.fields.columns.clone_from(columns);
    }

    let updated: Record<DatabaseTable> = store.save(table_id, &table.fields)?;
    info!(table_id, "Updated custom table");
    Ok(updated)
}

/// Deletes a table after deleting its rows.
///
/// # Errors
///
/// Returns `Forbidden` without `edit` on the owning database.
pub fn delete_table<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    table_id: RecordId,
) -> Result<TableDeleteReport, ApiError> {
    authorized_table(store, user, table_id, Capability::Edit)?;

    let rows: Vec<Record<DatabaseRow>> = rows_of(store, table_id)?;
    for row in &rows {
        store.delete::<DatabaseRow>(row.id)?;
    }
    store.delete::<DatabaseTable>(table_id)?;

    info!(table_id, rows_deleted = rows.len(), "Deleted custom table");
    Ok(TableDeleteReport {
        table_id,
        rows_deleted: rows.len(),
    })
}

// ============================================================================
// Rows
// ============================================================================

/// Adds a row to a table.
///
/// # Errors
///
/// Returns `Forbidden` without `edit` on the owning database and
/// `ValidationFailure` if the values do not fit the table's columns.
pub fn create_row<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    table_id: RecordId,
    values: BTreeMap<String, Value>,
) -> Result<Record<DatabaseRow>, ApiError> {
    let (_, table) = authorized_table(store, user, table_id, Capability::Edit)?;

    let row: DatabaseRow = DatabaseRow { table_id, values };
    validate_row_values(&row, &table)?;

    let record: Record<DatabaseRow> = store.create(&row)?;
    debug!(table_id, row_id = record.id, "Created custom row");
    Ok(record)
}

/// Replaces the values of a row.
///
/// # Errors
///
/// Returns `Forbidden` without `edit` on the owning database and
/// `ValidationFailure` if the values do not fit the table's columns.
pub fn update_row<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    row_id: RecordId,
    values: BTreeMap<String, Value>,
) -> Result<Record<DatabaseRow>, ApiError> {
    let (table, row) = authorized_row(store, user, row_id, Capability::Edit)?;

    let replacement: DatabaseRow = DatabaseRow {
        table_id: row.table_id,
        values,
    };
    validate_row_values(&replacement, &table)?;

    let updated: Record<DatabaseRow> = store.save(row_id, &replacement)?;
    debug!(row_id, "Updated custom row");
    Ok(updated)
}

/// Deletes a row.
///
/// # Errors
///
/// Returns `Forbidden` without `edit` on the owning database.
pub fn delete_row<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    row_id: RecordId,
) -> Result<DeleteResponse, ApiError> {
    authorized_row(store, user, row_id, Capability::Edit)?;
    store.delete::<DatabaseRow>(row_id)?;
    debug!(row_id, "Deleted custom row");
    Ok(DeleteResponse { id: row_id })
}

/// Fetches a table and its rows.
///
/// # Errors
///
/// Returns `Forbidden` without `view` on the owning database.
pub fn get_table_detail<S: EntityStore>(
    store: &mut S,
    user: &CurrentUser,
    table_id: RecordId,
) -> Result<TableDetail, ApiError> {
    let (_, table) = authorized_table(store, user, table_id, Capability::View)?;
    let rows: Vec<Record<DatabaseRow>> = rows_of(store, table_id)?;
    Ok(TableDetail { table, rows })
}
