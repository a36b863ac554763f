// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::custom_database::ColumnType;
use crate::record::EntityKind;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field is empty or absent.
    MissingField {
        /// The entity being validated.
        entity: EntityKind,
        /// The name of the missing field.
        field: &'static str,
    },
    /// A field is present but its value is not acceptable.
    InvalidField {
        /// The entity being validated.
        entity: EntityKind,
        /// The name of the invalid field.
        field: &'static str,
        /// Description of the problem.
        reason: String,
    },
    /// A date range ends before it starts.
    InvalidDateRange {
        /// The first day of the range.
        start: time::Date,
        /// The last day of the range.
        end: time::Date,
    },
    /// Two columns of a custom table share a name.
    DuplicateColumn(String),
    /// A row carries a value for a column the table does not define.
    UnknownColumn(String),
    /// A row has no value for a column marked as required.
    MissingRequiredColumn(String),
    /// A row value does not match the declared column type.
    ColumnTypeMismatch {
        /// The column name.
        column: String,
        /// The declared column type.
        expected: ColumnType,
    },
    /// A string could not be parsed into a domain value.
    ParseError {
        /// What was being parsed.
        kind: &'static str,
        /// The offending input.
        value: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { entity, field } => {
                write!(f, "{entity} is missing required field '{field}'")
            }
            Self::InvalidField {
                entity,
                field,
                reason,
            } => {
                write!(f, "Invalid {entity} field '{field}': {reason}")
            }
            Self::InvalidDateRange { start, end } => {
                write!(f, "Date range ends ({end}) before it starts ({start})")
            }
            Self::DuplicateColumn(name) => write!(f, "Duplicate column name: '{name}'"),
            Self::UnknownColumn(name) => write!(f, "Unknown column: '{name}'"),
            Self::MissingRequiredColumn(name) => {
                write!(f, "Missing value for required column '{name}'")
            }
            Self::ColumnTypeMismatch { column, expected } => {
                write!(f, "Value for column '{column}' must be of type {expected}")
            }
            Self::ParseError { kind, value } => write!(f, "Invalid {kind}: '{value}'"),
        }
    }
}

impl std::error::Error for DomainError {}
