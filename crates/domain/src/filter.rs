// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory narrowing of fetched collections.
//!
//! A collection is narrowed by a set of exact-match field filters and an
//! optional free-text search. Both compose with logical AND and the
//! surviving records keep their input order.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::record::{Record, RecordId};
use crate::types::{Department, Staff, StaffStatus, TimeOffRequest, TimeOffStatus};

/// Sentinel accepted by [`FieldFilter::from_str`] meaning "no constraint".
pub const ALL: &str = "all";

/// A single field constraint: either anything, or one exact value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFilter<V> {
    #[default]
    All,
    Exactly(V),
}

impl<V: PartialEq> FieldFilter<V> {
    /// Whether a record whose field holds `value` passes this filter.
    ///
    /// An absent value only passes `All`.
    pub fn admits(&self, value: Option<&V>) -> bool {
        match self {
            Self::All => true,
            Self::Exactly(expected) => value == Some(expected),
        }
    }

    /// Whether this filter constrains anything.
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Exactly(_))
    }
}

impl<V: FromStr> FromStr for FieldFilter<V> {
    type Err = V::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == ALL {
            return Ok(Self::All);
        }
        s.parse().map(Self::Exactly)
    }
}

/// Entities that support free-text search.
pub trait Searchable {
    /// The fields a search term is matched against, in a fixed order.
    fn search_fields(&self) -> Vec<Option<&str>>;
}

impl Searchable for Staff {
    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.first_name.as_str()),
            Some(self.last_name.as_str()),
            Some(self.email.as_str()),
            self.department.as_deref(),
            Some(self.employee_id.as_str()),
        ]
    }
}

impl Searchable for Department {
    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.name.as_str()),
            self.description.as_deref(),
            self.location.as_deref(),
        ]
    }
}

/// Case-insensitive substring match of `term` against the searchable fields.
///
/// An empty term matches everything.
pub fn matches_search<T: Searchable>(item: &T, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle: String = term.to_lowercase();
    item.search_fields()
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// A group of field filters applying to one entity type.
pub trait RecordFilter<T> {
    /// Whether `item` passes every active filter.
    fn matches(&self, item: &T) -> bool;
}

/// Filters of the staff directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StaffFilters {
    pub department: FieldFilter<String>,
    pub status: FieldFilter<StaffStatus>,
    pub role: FieldFilter<RecordId>,
}

impl RecordFilter<Staff> for StaffFilters {
    fn matches(&self, item: &Staff) -> bool {
        self.department.admits(item.department.as_ref())
            && self.status.admits(Some(&item.status))
            && self.role.admits(item.role_id.as_ref())
    }
}

/// Filters of the time-off page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeOffFilters {
    pub status: FieldFilter<TimeOffStatus>,
    pub request_type: FieldFilter<String>,
    pub staff: FieldFilter<RecordId>,
}

impl TimeOffFilters {
    /// Whether any filter is set; the page marks results as filtered.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active() || self.request_type.is_active() || self.staff.is_active()
    }
}

impl RecordFilter<TimeOffRequest> for TimeOffFilters {
    fn matches(&self, item: &TimeOffRequest) -> bool {
        self.status.admits(Some(&item.status))
            && self.request_type.admits(Some(&item.request_type))
            && self.staff.admits(Some(&item.staff_id))
    }
}

/// Narrows `records` by search term only.
#[must_use]
pub fn search_records<T: Searchable + Clone>(records: &[Record<T>], term: &str) -> Vec<Record<T>> {
    if term.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| matches_search(&r.fields, term))
        .cloned()
        .collect()
}

/// Narrows `records` by field filters only.
#[must_use]
pub fn filter_records<T: Clone, F: RecordFilter<T>>(
    records: &[Record<T>],
    filters: &F,
) -> Vec<Record<T>> {
    records
        .iter()
        .filter(|r| filters.matches(&r.fields))
        .cloned()
        .collect()
}

/// Narrows `records` by field filters and search term.
#[must_use]
pub fn filter_and_search<T: Searchable + Clone, F: RecordFilter<T>>(
    records: &[Record<T>],
    filters: &F,
    term: &str,
) -> Vec<Record<T>> {
    records
        .iter()
        .filter(|r| matches_search(&r.fields, term) && filters.matches(&r.fields))
        .cloned()
        .collect()
}
