// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use time::Date;

use crate::error::DomainError;
use crate::record::{Entity, EntityKind, RecordId};
use crate::validation::{require_non_empty, validate_email};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Employment status of a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StaffStatus {
    #[default]
    Active,
    Inactive,
    #[serde(rename = "On Leave")]
    OnLeave,
    Terminated,
}

impl StaffStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::OnLeave => "On Leave",
            Self::Terminated => "Terminated",
        }
    }
}

impl FromStr for StaffStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Inactive" => Ok(Self::Inactive),
            "On Leave" => Ok(Self::OnLeave),
            "Terminated" => Ok(Self::Terminated),
            _ => Err(DomainError::ParseError {
                kind: "staff status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for StaffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operating status of a department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DepartmentStatus {
    #[default]
    Active,
    Inactive,
}

/// Decision state of a time-off request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeOffStatus {
    #[default]
    Pending,
    Approved,
    Denied,
}

impl TimeOffStatus {
    /// The fixed set of statuses counted on the time-off page.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Denied];

    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Denied => "Denied",
        }
    }
}

impl FromStr for TimeOffStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::ParseError {
                kind: "time-off status",
                value: s.to_string(),
            })
    }
}

impl std::fmt::Display for TimeOffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A member of staff in the directory.
///
/// `department` holds the department *name*. Staff are associated with a
/// department by name equality at read time, not by stored reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role_id: Option<RecordId>,
    #[serde(default)]
    pub status: StaffStatus,
    #[serde(default, with = "iso_date::option")]
    pub hire_date: Option<Date>,
}

impl Staff {
    /// Returns "first last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Staff {
    const KIND: EntityKind = EntityKind::Staff;

    fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(Self::KIND, "employee_id", &self.employee_id)?;
        require_non_empty(Self::KIND, "first_name", &self.first_name)?;
        require_non_empty(Self::KIND, "last_name", &self.last_name)?;
        validate_email(Self::KIND, &self.email)
    }
}

const fn default_role_level() -> i32 {
    1
}

/// A named role carrying a set of permission strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Rank in the hierarchy. Only used for ordering and the max-level figure.
    #[serde(default = "default_role_level")]
    pub level: i32,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl Entity for Role {
    const KIND: EntityKind = EntityKind::Role;

    fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(Self::KIND, "name", &self.name)?;
        if self.permissions.iter().any(|p| p.trim().is_empty()) {
            return Err(DomainError::InvalidField {
                entity: Self::KIND,
                field: "permissions",
                reason: String::from("permission names cannot be empty"),
            });
        }
        Ok(())
    }
}

/// An organisational department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: DepartmentStatus,
    #[serde(default)]
    pub budget: Option<f64>,
    /// Staff record id of the head of department. Not enforced.
    #[serde(default)]
    pub head_of_department: Option<RecordId>,
}

impl Entity for Department {
    const KIND: EntityKind = EntityKind::Department;

    fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(Self::KIND, "name", &self.name)?;
        if let Some(budget) = self.budget
            && (!budget.is_finite() || budget < 0.0)
        {
            return Err(DomainError::InvalidField {
                entity: Self::KIND,
                field: "budget",
                reason: format!("budget must be a non-negative number, got {budget}"),
            });
        }
        Ok(())
    }
}

/// A request for time away from work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffRequest {
    pub staff_id: RecordId,
    #[serde(rename = "type")]
    pub request_type: String,
    #[serde(default)]
    pub status: TimeOffStatus,
    #[serde(with = "iso_date")]
    pub start_date: Date,
    #[serde(with = "iso_date")]
    pub end_date: Date,
    #[serde(default)]
    pub reason: Option<String>,
}

impl TimeOffRequest {
    /// Number of calendar days covered, both ends inclusive.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).whole_days() + 1
    }
}

impl Entity for TimeOffRequest {
    const KIND: EntityKind = EntityKind::TimeOffRequest;

    fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(Self::KIND, "type", &self.request_type)?;
        if self.end_date < self.start_date {
            return Err(DomainError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}
