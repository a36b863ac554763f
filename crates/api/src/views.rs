// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Page view-models.
//!
//! Each dashboard page is a plain struct built by a `load` function that
//! fetches the collections the page needs and derives everything it shows
//! from them. Nothing is cached between loads.
//!
//! [`PageController`] holds the last successfully loaded view of a page
//! and performs the explicit reload.

use serde::Serialize;
use staffdesk_domain::{
    Database, DatabaseAccessSummary, Department, DepartmentShare, DepartmentStaffStats,
    DepartmentSummary, RECENT_HIRES_LIMIT, Record, RecordId, Role, Staff, StaffFilters,
    TimeOffCounts, TimeOffFilters, TimeOffRequest, TimeOffStatus, count_active_staff,
    count_recent_hires, database_access_summary, department_distribution, department_staff_stats,
    department_summary, filter_and_search, filter_records, max_role_level, recent_hires,
    search_records, time_off_status_counts, total_permission_grants,
};
use staffdesk_persistence::{EntityStore, EqualityFilter, SortSpec};
use std::collections::{BTreeSet, HashMap};
use time::Date;
use tracing::{debug, warn};

use crate::auth::CurrentUser;
use crate::custom_databases::{
    DatabaseDetail, DatabaseListing, get_database_detail, list_databases,
};
use crate::error::ApiError;

/// How many pending time-off requests the dashboard lists.
pub const PENDING_PREVIEW_LIMIT: usize = 5;

fn newest_first() -> SortSpec {
    SortSpec::descending("created_date")
}

// ============================================================================
// Dashboard
// ============================================================================

/// The dashboard page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub total_staff: usize,
    pub active_staff: usize,
    pub recent_hire_count: usize,
    /// All pending requests, not just the listed ones.
    pub pending_request_count: usize,
    /// Newest hires first.
    pub recent_hires: Vec<Record<Staff>>,
    /// Newest pending requests first.
    pub pending_requests: Vec<Record<TimeOffRequest>>,
    pub department_distribution: Vec<DepartmentShare>,
}

impl DashboardView {
    /// Loads the dashboard as of `today`.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if a collection cannot be read.
    pub fn load<S: EntityStore>(store: &mut S, today: Date) -> Result<Self, ApiError> {
        let staff: Vec<Record<Staff>> = store.list(Some(&newest_first()))?;
        let mut pending: Vec<Record<TimeOffRequest>> = store.filter(
            &EqualityFilter::new().with("status", TimeOffStatus::Pending.as_str()),
            Some(&newest_first()),
        )?;

        let pending_request_count: usize = pending.len();
        pending.truncate(PENDING_PREVIEW_LIMIT);

        Ok(Self {
            total_staff: staff.len(),
            active_staff: count_active_staff(&staff),
            recent_hire_count: count_recent_hires(&staff, today),
            pending_request_count,
            recent_hires: recent_hires(&staff, today, RECENT_HIRES_LIMIT),
            pending_requests: pending,
            department_distribution: department_distribution(&staff),
        })
    }
}

// ============================================================================
// Staff directory
// ============================================================================

/// The staff directory page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffDirectoryView {
    /// Staff passing the filters and search, newest first.
    pub staff: Vec<Record<Staff>>,
    /// Size of the unfiltered directory.
    pub total_staff: usize,
    pub roles: Vec<Record<Role>>,
    /// Distinct department names present in the directory, sorted.
    pub departments: Vec<String>,
    pub filters: StaffFilters,
    pub search: String,
}

impl StaffDirectoryView {
    /// Loads the directory narrowed by `filters` and `search`.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if a collection cannot be read.
    pub fn load<S: EntityStore>(
        store: &mut S,
        filters: StaffFilters,
        search: &str,
    ) -> Result<Self, ApiError> {
        let all_staff: Vec<Record<Staff>> = store.list(Some(&newest_first()))?;
        let roles: Vec<Record<Role>> = store.list(None)?;

        let departments: BTreeSet<String> = all_staff
            .iter()
            .filter_map(|s| s.department.clone())
            .collect();

        Ok(Self {
            staff: filter_and_search(&all_staff, &filters, search),
            total_staff: all_staff.len(),
            roles,
            departments: departments.into_iter().collect(),
            filters,
            search: search.to_string(),
        })
    }

    /// Whether any filter or search narrows the list.
    #[must_use]
    pub fn is_narrowed(&self) -> bool {
        !self.search.is_empty()
            || self.filters.department.is_active()
            || self.filters.status.is_active()
            || self.filters.role.is_active()
    }
}

// ============================================================================
// Departments
// ============================================================================

/// One department with its headcount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentCard {
    pub department: Record<Department>,
    pub stats: DepartmentStaffStats,
}

/// The departments page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentsView {
    pub summary: DepartmentSummary,
    /// Departments matching the search, newest first.
    pub departments: Vec<DepartmentCard>,
    pub search: String,
}

impl DepartmentsView {
    /// Loads the departments page narrowed by `search`.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if a collection cannot be read.
    pub fn load<S: EntityStore>(store: &mut S, search: &str) -> Result<Self, ApiError> {
        let departments: Vec<Record<Department>> = store.list(Some(&newest_first()))?;
        let staff: Vec<Record<Staff>> = store.list(None)?;

        let cards: Vec<DepartmentCard> = search_records(&departments, search)
            .into_iter()
            .map(|department| DepartmentCard {
                stats: department_staff_stats(&department, &staff),
                department,
            })
            .collect();

        Ok(Self {
            summary: department_summary(&departments, &staff),
            departments: cards,
            search: search.to_string(),
        })
    }
}

// ============================================================================
// Roles
// ============================================================================

/// The roles page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolesView {
    /// Roles by ascending level.
    pub roles: Vec<Record<Role>>,
    pub total_roles: usize,
    pub max_level: i32,
    pub total_permissions: usize,
}

impl RolesView {
    /// Loads the roles page.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the roles cannot be read.
    pub fn load<S: EntityStore>(store: &mut S) -> Result<Self, ApiError> {
        let roles: Vec<Record<Role>> = store.list(Some(&SortSpec::ascending("level")))?;

        Ok(Self {
            total_roles: roles.len(),
            max_level: max_role_level(&roles),
            total_permissions: total_permission_grants(&roles),
            roles,
        })
    }
}

// ============================================================================
// Time off
// ============================================================================

/// A time-off request with the requester resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeOffEntry {
    pub request: Record<TimeOffRequest>,
    /// `None` when the staff record no longer exists.
    pub staff_name: Option<String>,
    pub days: i64,
}

/// The time-off page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeOffView {
    /// Counts over every request, ignoring the filters.
    pub counts: TimeOffCounts,
    /// Requests passing the filters, newest first.
    pub requests: Vec<TimeOffEntry>,
    pub filters: TimeOffFilters,
    pub is_filtered: bool,
    /// Distinct request types present, sorted.
    pub request_types: Vec<String>,
    pub staff: Vec<Record<Staff>>,
}

impl TimeOffView {
    /// Loads the time-off page narrowed by `filters`.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if a collection cannot be read.
    pub fn load<S: EntityStore>(store: &mut S, filters: TimeOffFilters) -> Result<Self, ApiError> {
        let requests: Vec<Record<TimeOffRequest>> = store.list(Some(&newest_first()))?;
        let staff: Vec<Record<Staff>> = store.list(None)?;

        let names: HashMap<RecordId, String> =
            staff.iter().map(|s| (s.id, s.full_name())).collect();
        let request_types: BTreeSet<String> =
            requests.iter().map(|r| r.request_type.clone()).collect();

        let entries: Vec<TimeOffEntry> = filter_records(&requests, &filters)
            .into_iter()
            .map(|request| TimeOffEntry {
                staff_name: names.get(&request.staff_id).cloned(),
                days: request.days(),
                request,
            })
            .collect();

        Ok(Self {
            counts: time_off_status_counts(&requests),
            requests: entries,
            is_filtered: filters.is_active(),
            filters,
            request_types: request_types.into_iter().collect(),
            staff,
        })
    }
}

// ============================================================================
// Custom databases
// ============================================================================

/// The custom databases page, with an optionally opened database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabasesView {
    /// Every database, newest first.
    pub databases: Vec<DatabaseListing>,
    pub access: DatabaseAccessSummary,
    pub selected: Option<DatabaseDetail>,
}

impl DatabasesView {
    /// Loads the databases page for `user`, opening `selected` if given.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if a collection cannot be read, and
    /// `Forbidden` if the selected database exists but cannot be viewed.
    /// A selected database that no longer exists is left closed.
    pub fn load<S: EntityStore>(
        store: &mut S,
        user: &CurrentUser,
        selected: Option<RecordId>,
    ) -> Result<Self, ApiError> {
        let databases: Vec<DatabaseListing> = list_databases(store, user)?;
        let records: Vec<Record<Database>> =
            databases.iter().map(|d| d.database.clone()).collect();

        // A deleted database closes instead of failing the page.
        let selected: Option<DatabaseDetail> = match selected {
            Some(id) => match get_database_detail(store, user, id) {
                Ok(detail) => Some(detail),
                Err(ApiError::NotFound { .. }) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };

        Ok(Self {
            access: database_access_summary(&records, user.id),
            databases,
            selected,
        })
    }

    /// The id of the opened database, if any.
    #[must_use]
    pub fn selected_id(&self) -> Option<RecordId> {
        self.selected.as_ref().map(|d| d.database.id)
    }

    /// Forgets a deleted database: drops it from the list and closes it if
    /// it was open.
    pub fn forget_database(&mut self, database_id: RecordId) {
        self.databases.retain(|d| d.database.id != database_id);
        if self.selected_id() == Some(database_id) {
            self.selected = None;
        }
    }
}

// ============================================================================
// Page controller
// ============================================================================

/// Holds the displayed view of one page and its loading flag.
#[derive(Debug, Clone, PartialEq)]
pub struct PageController<V> {
    view: Option<V>,
    is_loading: bool,
}

impl<V> Default for PageController<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PageController<V> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            view: None,
            is_loading: false,
        }
    }

    /// The last successfully loaded view.
    #[must_use]
    pub const fn view(&self) -> Option<&V> {
        self.view.as_ref()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Marks a load as in progress.
    pub const fn begin_loading(&mut self) {
        self.is_loading = true;
    }

    /// Finishes a load.
    ///
    /// A new view replaces the displayed one. On failure the displayed view
    /// is kept, the failure is logged and handed back to the caller.
    ///
    /// # Errors
    ///
    /// Returns the load's error unchanged.
    pub fn finish_loading(&mut self, outcome: Result<V, ApiError>) -> Result<&V, ApiError> {
        self.is_loading = false;
        match outcome {
            Ok(view) => {
                debug!("Page view reloaded");
                let view: &V = self.view.insert(view);
                Ok(view)
            }
            Err(e) => {
                warn!(error = %e, "Page reload failed, keeping the previous view");
                Err(e)
            }
        }
    }

    /// Reloads the page by running `load`.
    ///
    /// # Errors
    ///
    /// Returns the load's error; the previous view stays displayed.
    pub fn reload<F>(&mut self, load: F) -> Result<&V, ApiError>
    where
        F: FnOnce() -> Result<V, ApiError>,
    {
        self.begin_loading();
        let outcome: Result<V, ApiError> = load();
        self.finish_loading(outcome)
    }

    /// Applies a change to the displayed view without refetching.
    pub fn update_view(&mut self, change: impl FnOnce(&mut V)) {
        if let Some(view) = self.view.as_mut() {
            change(view);
        }
    }
}
