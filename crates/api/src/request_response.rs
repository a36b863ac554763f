// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response types.
//!
//! These types define the API contract and are separate from domain types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use staffdesk_domain::{
    ColumnDefinition, Department, FieldFilter, Record, RecordId, StaffFilters, TimeOffFilters,
    TimeOffStatus,
};
use staffdesk_persistence::SortSpec;
use std::collections::BTreeMap;

use crate::auth::CurrentUser;
use crate::error::ApiError;

// ============================================================================
// Authentication
// ============================================================================

/// Request to log in.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub session_token: String,
    /// ISO 8601 expiry of the session.
    pub expires_at: String,
    pub user: CurrentUser,
}

/// Request to create a dashboard account.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub password_confirmation: String,
}

// ============================================================================
// Listing queries
// ============================================================================

/// Query string of a plain listing: `?sort=field` or `?sort=-field`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub sort: Option<String>,
}

impl ListQuery {
    /// The requested sort, if any.
    #[must_use]
    pub fn sort_spec(&self) -> Option<SortSpec> {
        self.sort.as_deref().and_then(SortSpec::parse)
    }
}

fn parse_filter<V: std::str::FromStr>(
    field: &str,
    raw: Option<&str>,
) -> Result<FieldFilter<V>, ApiError>
where
    V::Err: std::fmt::Display,
{
    raw.unwrap_or_default()
        .trim()
        .parse::<FieldFilter<V>>()
        .map_err(|e| ApiError::invalid_input(field, e.to_string()))
}

/// Query string of the staff directory page.
///
/// Every filter accepts `all` (or nothing) for no constraint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffDirectoryQuery {
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

impl StaffDirectoryQuery {
    /// Parses the filter parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown status or a non-numeric role.
    pub fn filters(&self) -> Result<StaffFilters, ApiError> {
        Ok(StaffFilters {
            department: parse_filter("department", self.department.as_deref())?,
            status: parse_filter("status", self.status.as_deref())?,
            role: parse_filter("role", self.role.as_deref())?,
        })
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        self.search.as_deref().map_or("", str::trim)
    }
}

/// Query string of the time-off page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeOffQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub request_type: Option<String>,
    #[serde(default)]
    pub staff: Option<String>,
}

impl TimeOffQuery {
    /// Parses the filter parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown status or a non-numeric staff id.
    pub fn filters(&self) -> Result<TimeOffFilters, ApiError> {
        Ok(TimeOffFilters {
            status: parse_filter("status", self.status.as_deref())?,
            request_type: parse_filter("type", self.request_type.as_deref())?,
            staff: parse_filter("staff", self.staff.as_deref())?,
        })
    }
}

/// Query string of the departments page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}

impl SearchQuery {
    #[must_use]
    pub fn search_term(&self) -> &str {
        self.search.as_deref().map_or("", str::trim)
    }
}

// ============================================================================
// Directory entities
// ============================================================================

/// Request to approve or deny a time-off request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SetTimeOffStatusRequest {
    pub status: TimeOffStatus,
}

/// Response for a department update.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentUpdateResponse {
    pub department: Record<Department>,
    /// Staff re-pointed to the department's new name.
    pub staff_updated: usize,
}

/// Response for a single-record delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteResponse {
    pub id: RecordId,
}

// ============================================================================
// Custom databases
// ============================================================================

/// Request to create a custom database.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDatabaseRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request to rename or re-describe a custom database.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDatabaseRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request to create a table.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTableRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

/// Request to change a table. Absent fields are left as they are.
///
/// Changing the columns does not rewrite existing rows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTableRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<ColumnDefinition>>,
}

/// Request body carrying a row's values, keyed by column name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RowValuesRequest {
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
}

/// Request body carrying CSV text for a table import.
#[derive(Debug, Clone, Deserialize)]
pub struct CsvImportRequest {
    pub csv: String,
}

/// Outcome of deleting a table and its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableDeleteReport {
    pub table_id: RecordId,
    pub rows_deleted: usize,
}

/// Outcome of a completed cascading database delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CascadeDeleteReport {
    pub database_id: RecordId,
    pub rows_deleted: usize,
    pub tables_deleted: usize,
}
