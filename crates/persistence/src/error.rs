// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use staffdesk_domain::{DomainError, EntityKind, RecordId};

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// No record of this kind has this id.
    RecordNotFound { kind: EntityKind, id: RecordId },
    /// The requested resource was not found.
    NotFound(String),
    /// The entity failed its validation rules.
    ValidationFailed(DomainError),
    /// Caller-supplied fields do not form a valid entity.
    InvalidFields { kind: EntityKind, reason: String },
    /// Stored data could not be serialized or deserialized.
    SerializationError(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// An account with this email already exists.
    DuplicateEmail(String),
    /// A general error occurred.
    Other(String),
}

impl PersistenceError {
    /// Whether the error means the addressed record or resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. } | Self::NotFound(_))
    }

    /// Whether the error means the store itself could not serve the request.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_)
                | Self::DatabaseConnectionFailed(_)
                | Self::MigrationFailed(_)
                | Self::QueryFailed(_)
                | Self::InitializationError(_)
                | Self::ForeignKeyEnforcementNotEnabled
        )
    }
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::RecordNotFound { kind, id } => write!(f, "No {kind} record with id {id}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::ValidationFailed(err) => write!(f, "Validation failed: {err}"),
            Self::InvalidFields { kind, reason } => {
                write!(f, "Invalid {kind} fields: {reason}")
            }
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::DuplicateEmail(email) => {
                write!(f, "An account with email '{email}' already exists")
            }
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<DomainError> for PersistenceError {
    fn from(err: DomainError) -> Self {
        Self::ValidationFailed(err)
    }
}
