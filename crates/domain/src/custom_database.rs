// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User-defined databases: a database owns tables, a table owns rows.
//!
//! Access to a database is governed by three explicit grant sets
//! (`view`, `edit`, `delete`) plus implicit access for the creator.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::str::FromStr;
use time::Date;

use crate::error::DomainError;
use crate::record::{Entity, EntityKind, RecordId};
use crate::validation::require_non_empty;

/// An action a user may take on a custom database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    View,
    Edit,
    Delete,
}

impl Capability {
    pub const ALL: [Self; 3] = [Self::View, Self::Edit, Self::Delete];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for Capability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|cap| cap.as_str() == s)
            .ok_or_else(|| DomainError::ParseError {
                kind: "capability",
                value: s.to_string(),
            })
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Explicit per-capability grants of a custom database.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabasePermissions {
    pub view: BTreeSet<RecordId>,
    pub edit: BTreeSet<RecordId>,
    pub delete: BTreeSet<RecordId>,
}

impl DatabasePermissions {
    /// The grants a new database starts with: the creator in every set.
    #[must_use]
    pub fn owned_by(user_id: RecordId) -> Self {
        let only_owner: BTreeSet<RecordId> = BTreeSet::from([user_id]);
        Self {
            view: only_owner.clone(),
            edit: only_owner.clone(),
            delete: only_owner,
        }
    }

    /// The users explicitly granted `capability`.
    #[must_use]
    pub const fn grants(&self, capability: Capability) -> &BTreeSet<RecordId> {
        match capability {
            Capability::View => &self.view,
            Capability::Edit => &self.edit,
            Capability::Delete => &self.delete,
        }
    }

    fn grants_mut(&mut self, capability: Capability) -> &mut BTreeSet<RecordId> {
        match capability {
            Capability::View => &mut self.view,
            Capability::Edit => &mut self.edit,
            Capability::Delete => &mut self.delete,
        }
    }

    /// Adds `user_id` to the grant set. Returns `false` if already present.
    pub fn grant(&mut self, capability: Capability, user_id: RecordId) -> bool {
        self.grants_mut(capability).insert(user_id)
    }

    /// Removes `user_id` from the grant set. Returns `false` if absent.
    pub fn revoke(&mut self, capability: Capability, user_id: RecordId) -> bool {
        self.grants_mut(capability).remove(&user_id)
    }
}

/// A user-defined database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// The user who created the database. Always holds every capability.
    pub created_by: RecordId,
    #[serde(default)]
    pub permissions: DatabasePermissions,
}

impl Entity for Database {
    const KIND: EntityKind = EntityKind::Database;

    fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(Self::KIND, "name", &self.name)
    }
}

/// Returns whether `user_id` may exercise `capability` on `database`.
///
/// The creator holds every capability regardless of the grant sets.
#[must_use]
pub fn has_permission(database: &Database, capability: Capability, user_id: RecordId) -> bool {
    database.created_by == user_id || database.permissions.grants(capability).contains(&user_id)
}

/// Value type of a custom table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Date,
    Boolean,
}

impl ColumnType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Boolean => "boolean",
        }
    }

    /// Whether a non-null JSON value is acceptable for this column type.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Text, Value::String(_))
            | (Self::Number, Value::Number(_))
            | (Self::Boolean, Value::Bool(_)) => true,
            (Self::Date, Value::String(s)) => {
                Date::parse(s, time::macros::format_description!("[year]-[month]-[day]")).is_ok()
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A column of a custom table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    #[serde(default)]
    pub required: bool,
}

impl ColumnDefinition {
    #[must_use]
    pub fn new(name: &str, column_type: ColumnType, required: bool) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            required,
        }
    }
}

/// A table inside a custom database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseTable {
    pub database_id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

impl DatabaseTable {
    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl Entity for DatabaseTable {
    const KIND: EntityKind = EntityKind::DatabaseTable;

    fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(Self::KIND, "name", &self.name)?;

        // CSV headers match columns case-insensitively, so names must too.
        let mut seen: HashSet<String> = HashSet::new();
        for column in &self.columns {
            require_non_empty(Self::KIND, "columns.name", &column.name)?;
            if !seen.insert(column.name.trim().to_lowercase()) {
                return Err(DomainError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(())
    }
}

/// A row of a custom table, keyed by column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseRow {
    pub table_id: RecordId,
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
}

impl Entity for DatabaseRow {
    const KIND: EntityKind = EntityKind::DatabaseRow;

    // Column checks need the owning table; see `validate_row_values`.
    fn validate(&self) -> Result<(), DomainError> {
        if self.values.keys().any(|k| k.trim().is_empty()) {
            return Err(DomainError::UnknownColumn(String::new()));
        }
        Ok(())
    }
}
