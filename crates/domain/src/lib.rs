// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod custom_database;
mod error;
mod filter;
mod record;
mod stats;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use custom_database::{
    Capability, ColumnDefinition, ColumnType, Database, DatabasePermissions, DatabaseRow,
    DatabaseTable, has_permission,
};
pub use error::DomainError;
pub use filter::{
    ALL, FieldFilter, RecordFilter, Searchable, StaffFilters, TimeOffFilters, filter_and_search,
    filter_records, matches_search, search_records,
};
pub use record::{Entity, EntityKind, Record, RecordId};
pub use stats::{
    DatabaseAccessSummary, DepartmentShare, DepartmentStaffStats, DepartmentSummary,
    RECENT_HIRE_WINDOW_DAYS, RECENT_HIRES_LIMIT, TimeOffCounts, UNASSIGNED_DEPARTMENT,
    count_active_staff, count_recent_hires, database_access_summary, department_distribution,
    department_staff_stats, department_summary, max_role_level, percentage_of, recent_hires,
    time_off_status_counts, total_permission_grants,
};
pub use types::{
    Department, DepartmentStatus, Role, Staff, StaffStatus, TimeOffRequest, TimeOffStatus,
};
pub use validation::{require_non_empty, validate_email, validate_row_values};
