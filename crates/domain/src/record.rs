// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persisted record envelope and the entity contract shared by all
//! collections in the entity store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

use crate::error::DomainError;

/// Store-assigned record identifier.
pub type RecordId = i64;

/// The collections held by the entity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Staff,
    Role,
    Department,
    TimeOffRequest,
    Database,
    DatabaseTable,
    DatabaseRow,
}

impl EntityKind {
    /// All entity kinds, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Staff,
        Self::Role,
        Self::Department,
        Self::TimeOffRequest,
        Self::Database,
        Self::DatabaseTable,
        Self::DatabaseRow,
    ];

    /// The value stored in the `entity_type` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Role => "role",
            Self::Department => "department",
            Self::TimeOffRequest => "time_off_request",
            Self::Database => "database",
            Self::DatabaseTable => "database_table",
            Self::DatabaseRow => "database_row",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::ParseError {
                kind: "entity kind",
                value: s.to_string(),
            })
    }
}

/// A typed entity that can live in the entity store.
///
/// `validate` checks the context-free rules of the entity (required
/// fields, ranges). Rules that need other records, such as custom row
/// values against their table's columns, live in `validation`.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The collection this entity belongs to.
    const KIND: EntityKind;

    /// Validates the entity's fields.
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` describing the first rule violated.
    fn validate(&self) -> Result<(), DomainError>;
}

/// A persisted entity together with its store-assigned metadata.
///
/// The entity fields are flattened so the JSON form of a record is a single
/// object, which is also the shape equality filters and sort specs address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<T> {
    /// The store-assigned identifier.
    pub id: RecordId,
    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    /// When the record was last written.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_date: OffsetDateTime,
    /// The entity fields.
    #[serde(flatten)]
    pub fields: T,
}

impl<T> Record<T> {
    /// Creates a record envelope around entity fields.
    #[must_use]
    pub const fn new(
        id: RecordId,
        created_date: OffsetDateTime,
        updated_date: OffsetDateTime,
        fields: T,
    ) -> Self {
        Self {
            id,
            created_date,
            updated_date,
            fields,
        }
    }
}

impl<T> std::ops::Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.fields
    }
}
