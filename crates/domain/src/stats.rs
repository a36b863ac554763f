// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Aggregate figures shown on the dashboard pages.
//!
//! Every function here is a pure reduction over an already fetched
//! collection. Nothing is cached: callers recompute after every load.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::{Date, Duration};

use crate::custom_database::{Capability, Database, has_permission};
use crate::record::{Record, RecordId};
use crate::types::{
    Department, DepartmentStatus, Role, Staff, StaffStatus, TimeOffRequest, TimeOffStatus,
};

/// Hires newer than this many days count as recent.
pub const RECENT_HIRE_WINDOW_DAYS: i64 = 30;

/// How many recent hires the dashboard lists.
pub const RECENT_HIRES_LIMIT: usize = 5;

/// Group label for staff with no department.
pub const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

/// Counts staff whose status is `Active`.
#[must_use]
pub fn count_active_staff(staff: &[Record<Staff>]) -> usize {
    staff
        .iter()
        .filter(|s| s.status == StaffStatus::Active)
        .count()
}

fn recent_hire_cutoff(today: Date) -> Date {
    today
        .checked_sub(Duration::days(RECENT_HIRE_WINDOW_DAYS))
        .unwrap_or(Date::MIN)
}

fn is_recent_hire(staff: &Staff, cutoff: Date) -> bool {
    staff.hire_date.is_some_and(|hired| hired > cutoff)
}

/// Counts staff hired within the recent-hire window ending at `today`.
#[must_use]
pub fn count_recent_hires(staff: &[Record<Staff>], today: Date) -> usize {
    let cutoff: Date = recent_hire_cutoff(today);
    staff.iter().filter(|s| is_recent_hire(s, cutoff)).count()
}

/// Returns staff hired within the recent-hire window ending at `today`,
/// newest first, truncated to `limit`.
///
/// Staff sharing a hire date keep their input order.
#[must_use]
pub fn recent_hires(staff: &[Record<Staff>], today: Date, limit: usize) -> Vec<Record<Staff>> {
    let cutoff: Date = recent_hire_cutoff(today);
    let mut recent: Vec<Record<Staff>> = staff
        .iter()
        .filter(|s| is_recent_hire(s, cutoff))
        .cloned()
        .collect();
    recent.sort_by(|a, b| b.hire_date.cmp(&a.hire_date));
    recent.truncate(limit);
    recent
}

/// One department's share of the total headcount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentShare {
    pub name: String,
    pub count: usize,
    /// Percentage of all staff, rounded to one decimal place.
    pub percentage: f64,
}

/// Percentage of `count` in `total`, rounded to one decimal place.
///
/// Returns 0.0 when `total` is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    ((count as f64 / total as f64) * 1000.0).round() / 10.0
}

/// Groups staff by department name.
///
/// Groups appear in order of first occurrence in `staff`. Staff without a
/// department are grouped under [`UNASSIGNED_DEPARTMENT`]. An empty input
/// yields an empty distribution.
#[must_use]
pub fn department_distribution(staff: &[Record<Staff>]) -> Vec<DepartmentShare> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for member in staff {
        let name: &str = member
            .department
            .as_deref()
            .unwrap_or(UNASSIGNED_DEPARTMENT);
        if let Some(&slot) = index.get(name) {
            order[slot].1 += 1;
        } else {
            index.insert(name.to_string(), order.len());
            order.push((name.to_string(), 1));
        }
    }

    let total: usize = staff.len();
    order
        .into_iter()
        .map(|(name, count)| DepartmentShare {
            name,
            count,
            percentage: percentage_of(count, total),
        })
        .collect()
}

/// Time-off request counts by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeOffCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub denied: usize,
}

impl TimeOffCounts {
    /// The count for a single status.
    #[must_use]
    pub const fn for_status(&self, status: TimeOffStatus) -> usize {
        match status {
            TimeOffStatus::Pending => self.pending,
            TimeOffStatus::Approved => self.approved,
            TimeOffStatus::Denied => self.denied,
        }
    }
}

/// Counts time-off requests by status.
#[must_use]
pub fn time_off_status_counts(requests: &[Record<TimeOffRequest>]) -> TimeOffCounts {
    requests
        .iter()
        .fold(TimeOffCounts::default(), |mut counts, request| {
            counts.total += 1;
            match request.status {
                TimeOffStatus::Pending => counts.pending += 1,
                TimeOffStatus::Approved => counts.approved += 1,
                TimeOffStatus::Denied => counts.denied += 1,
            }
            counts
        })
}

/// The highest role level, or 0 when there are no roles.
#[must_use]
pub fn max_role_level(roles: &[Record<Role>]) -> i32 {
    roles.iter().map(|r| r.level).max().unwrap_or(0)
}

/// Total number of permission grants across all roles.
#[must_use]
pub fn total_permission_grants(roles: &[Record<Role>]) -> usize {
    roles.iter().map(|r| r.permissions.len()).sum()
}

/// Header figures of the departments page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DepartmentSummary {
    pub total: usize,
    pub active: usize,
    pub total_staff: usize,
    pub total_budget: f64,
}

/// Computes the departments page header figures.
#[must_use]
pub fn department_summary(
    departments: &[Record<Department>],
    staff: &[Record<Staff>],
) -> DepartmentSummary {
    DepartmentSummary {
        total: departments.len(),
        active: departments
            .iter()
            .filter(|d| d.status == DepartmentStatus::Active)
            .count(),
        total_staff: staff.len(),
        total_budget: departments.iter().filter_map(|d| d.budget).sum(),
    }
}

/// Headcount figures for a single department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentStaffStats {
    pub total_staff: usize,
    pub active_staff: usize,
    pub head_of_department: Option<Record<Staff>>,
}

/// Computes headcount for `department`.
///
/// Staff belong to a department when their `department` field equals the
/// department name. The head is looked up by staff record id and is `None`
/// when the reference dangles.
#[must_use]
pub fn department_staff_stats(
    department: &Department,
    staff: &[Record<Staff>],
) -> DepartmentStaffStats {
    let members: Vec<&Record<Staff>> = staff
        .iter()
        .filter(|s| s.department.as_deref() == Some(department.name.as_str()))
        .collect();

    let head_of_department: Option<Record<Staff>> = department
        .head_of_department
        .and_then(|head_id| staff.iter().find(|s| s.id == head_id).cloned());

    DepartmentStaffStats {
        total_staff: members.len(),
        active_staff: members
            .iter()
            .filter(|s| s.status == StaffStatus::Active)
            .count(),
        head_of_department,
    }
}

/// What a given user may do across the custom databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatabaseAccessSummary {
    pub total: usize,
    pub can_view: usize,
    pub can_edit: usize,
    pub can_delete: usize,
}

/// Counts databases by the capabilities `user_id` holds on them.
#[must_use]
pub fn database_access_summary(
    databases: &[Record<Database>],
    user_id: RecordId,
) -> DatabaseAccessSummary {
    let count_with = |capability: Capability| -> usize {
        databases
            .iter()
            .filter(|db| has_permission(db, capability, user_id))
            .count()
    };

    DatabaseAccessSummary {
        total: databases.len(),
        can_view: count_with(Capability::View),
        can_edit: count_with(Capability::Edit),
        can_delete: count_with(Capability::Delete),
    }
}
