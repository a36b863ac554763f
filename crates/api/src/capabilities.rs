// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability checks on custom databases.
//!
//! [`compute_database_capabilities`] is advisory and lets a client hide
//! actions the user cannot take. [`authorize`] is the enforcing check run
//! by every custom-database operation.

use serde::Serialize;
use staffdesk_domain::{Capability, Database, Record, has_permission};
use tracing::warn;

use crate::auth::CurrentUser;
use crate::error::ApiError;

/// Whether an action is available to the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
    Allowed,
    Denied,
}

impl From<bool> for Grant {
    fn from(allowed: bool) -> Self {
        if allowed { Self::Allowed } else { Self::Denied }
    }
}

impl Grant {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// What the current user may do with one custom database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatabaseCapabilities {
    pub can_view: Grant,
    pub can_edit: Grant,
    pub can_delete: Grant,
    /// The user created the database and holds every capability.
    pub is_owner: bool,
}

/// Computes the capabilities `user` holds on `database`.
#[must_use]
pub fn compute_database_capabilities(
    database: &Database,
    user: &CurrentUser,
) -> DatabaseCapabilities {
    let grant = |capability: Capability| Grant::from(has_permission(database, capability, user.id));

    DatabaseCapabilities {
        can_view: grant(Capability::View),
        can_edit: grant(Capability::Edit),
        can_delete: grant(Capability::Delete),
        is_owner: database.created_by == user.id,
    }
}

/// Requires `user` to hold `capability` on `database`.
///
/// # Errors
///
/// Returns `Forbidden` naming the capability and database otherwise.
pub fn authorize(
    database: &Record<Database>,
    capability: Capability,
    user: &CurrentUser,
) -> Result<(), ApiError> {
    if has_permission(database, capability, user.id) {
        return Ok(());
    }

    warn!(
        user_id = user.id,
        database_id = database.id,
        capability = %capability,
        "Denied custom database access"
    );
    Err(ApiError::Forbidden {
        capability,
        database_id: database.id,
    })
}
