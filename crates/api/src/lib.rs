// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for StaffDesk.
//!
//! Handlers here take an entity store (and, for custom databases, the
//! current user), run one API operation and translate every failure into
//! an [`ApiError`]. The HTTP server is a thin shell over this crate.

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

mod auth;
mod capabilities;
mod custom_databases;
mod error;
mod handlers;
mod password_policy;
mod request_response;
mod table_csv;
mod views;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticationService, CurrentUser};
pub use capabilities::{DatabaseCapabilities, Grant, authorize, compute_database_capabilities};
pub use custom_databases::{
    DatabaseDetail, DatabaseListing, TableDetail, cascade_delete_database, create_database,
    create_row, create_table, delete_database, delete_row, delete_table, get_database_detail,
    get_table_detail, list_databases, rows_of, tables_of, update_database,
    update_database_permissions, update_row, update_table,
};
pub use error::{ApiError, CascadeDeleteError, CascadeStep};
pub use handlers::{
    DirectoryEntity, create_entity, delete_entity, get_entity, list_entities, set_time_off_status,
    update_department, update_entity, update_time_off,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    CascadeDeleteReport, CreateAccountRequest, CreateDatabaseRequest, CreateTableRequest,
    CsvImportRequest, DeleteResponse, DepartmentUpdateResponse, ListQuery, LoginRequest,
    LoginResponse, RowValuesRequest, SearchQuery, SetTimeOffStatusRequest, StaffDirectoryQuery,
    TableDeleteReport, TimeOffQuery, UpdateDatabaseRequest, UpdateTableRequest,
};
pub use table_csv::{
    CsvImportResult, CsvPreviewResult, CsvRowResult, CsvRowStatus, export_table_csv,
    import_table_csv, preview_table_csv,
};
pub use views::{
    DashboardView, DatabasesView, DepartmentCard, DepartmentsView, PENDING_PREVIEW_LIMIT,
    PageController, RolesView, StaffDirectoryView, TimeOffEntry, TimeOffView,
};
