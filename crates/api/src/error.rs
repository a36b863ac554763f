// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use serde::Serialize;
use staffdesk_domain::{Capability, DomainError, RecordId};
use staffdesk_persistence::PersistenceError;
use thiserror::Error;

/// A stage of a cascading database delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStep {
    /// Removing every row of every table of the database.
    DeleteRows,
    /// Removing every table of the database.
    DeleteTables,
    /// Removing the database record itself.
    DeleteDatabase,
}

impl std::fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeleteRows => write!(f, "deleting rows"),
            Self::DeleteTables => write!(f, "deleting tables"),
            Self::DeleteDatabase => write!(f, "deleting the database"),
        }
    }
}

/// A cascading delete stopped part way.
///
/// Nothing deleted before the failing step is restored. The counters say
/// how far the cascade got.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Cascade delete of database {database_id} failed while {step} \
     ({rows_deleted} rows and {tables_deleted} tables already deleted): {source}"
)]
pub struct CascadeDeleteError {
    /// The database being deleted.
    pub database_id: RecordId,
    /// The step that failed.
    pub step: CascadeStep,
    /// Rows removed before the failure.
    pub rows_deleted: usize,
    /// Tables removed before the failure.
    pub tables_deleted: usize,
    /// The store failure that stopped the cascade.
    #[source]
    pub source: PersistenceError,
}

/// API-level errors.
///
/// Each variant is a distinct failure kind so that callers can pick a
/// response (and a retry policy) per kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The addressed record does not exist.
    #[error("{resource} not found: {message}")]
    NotFound {
        /// The kind of record that was looked up.
        resource: String,
        /// What was not found.
        message: String,
    },
    /// No valid session accompanies the request, or login failed.
    #[error("Authentication failed: {reason}")]
    Unauthenticated {
        /// Why authentication failed.
        reason: String,
    },
    /// The current user lacks a capability on a custom database.
    #[error("Permission denied: '{capability}' is not granted on database {database_id}")]
    Forbidden {
        /// The capability that was required.
        capability: Capability,
        /// The database the capability was checked against.
        database_id: RecordId,
    },
    /// Submitted fields break an entity rule.
    #[error("Validation failed: {message}")]
    ValidationFailure {
        /// A human-readable description of the violation.
        message: String,
    },
    /// Request input could not be interpreted at all.
    #[error("Invalid input for '{field}': {message}")]
    InvalidInput {
        /// The input that was rejected.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The request conflicts with the current state of a record.
    #[error("Conflict: {message}")]
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The entity store could not serve the request.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// The underlying store failure.
        message: String,
    },
    /// An unexpected failure inside the API layer.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the failure.
        message: String,
    },
    /// A cascading delete stopped part way.
    #[error(transparent)]
    CascadeDelete(#[from] CascadeDeleteError),
}

impl ApiError {
    /// Builds an `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ParseError { kind, value } => Self::InvalidInput {
                field: kind.to_string(),
                message: format!("'{value}' is not a valid {kind}"),
            },
            other => Self::ValidationFailure {
                message: other.to_string(),
            },
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::RecordNotFound { kind, id } => Self::NotFound {
                resource: kind.to_string(),
                message: format!("No {kind} record with id {id}"),
            },
            PersistenceError::NotFound(message) => Self::NotFound {
                resource: String::from("resource"),
                message,
            },
            PersistenceError::ValidationFailed(domain) => domain.into(),
            PersistenceError::InvalidFields { .. } => Self::ValidationFailure {
                message: err.to_string(),
            },
            PersistenceError::DuplicateEmail(email) => Self::Conflict {
                message: format!("An account with email '{email}' already exists"),
            },
            other => Self::StoreUnavailable {
                message: other.to_string(),
            },
        }
    }
}
