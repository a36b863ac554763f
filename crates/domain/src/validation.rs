// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde_json::Value;

use crate::custom_database::{DatabaseRow, DatabaseTable};
use crate::error::DomainError;
use crate::record::EntityKind;

/// Rejects empty or whitespace-only required text fields.
///
/// # Errors
///
/// Returns `DomainError::MissingField` if `value` is blank.
pub fn require_non_empty(
    entity: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::MissingField { entity, field });
    }
    Ok(())
}

/// Performs the minimal shape check on an email address.
///
/// # Errors
///
/// Returns an error if the address is empty or lacks a local part and a
/// domain separated by `@`.
pub fn validate_email(entity: EntityKind, email: &str) -> Result<(), DomainError> {
    require_non_empty(entity, "email", email)?;

    match email.trim().split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DomainError::InvalidField {
            entity,
            field: "email",
            reason: format!("'{email}' is not an email address"),
        }),
    }
}

/// Validates a custom row's values against the columns of its table.
///
/// Every key must name a column, every required column must carry a
/// non-null value, and non-null values must match the column type.
///
/// # Errors
///
/// Returns the first violation found, checking unknown columns before
/// required columns.
pub fn validate_row_values(row: &DatabaseRow, table: &DatabaseTable) -> Result<(), DomainError> {
    for (name, value) in &row.values {
        let column = table
            .column(name)
            .ok_or_else(|| DomainError::UnknownColumn(name.clone()))?;

        if !value.is_null() && !column.column_type.accepts(value) {
            return Err(DomainError::ColumnTypeMismatch {
                column: name.clone(),
                expected: column.column_type,
            });
        }
    }

    for column in table.columns.iter().filter(|c| c.required) {
        let present: bool = row
            .values
            .get(&column.name)
            .is_some_and(|v| !matches!(v, Value::Null));
        if !present {
            return Err(DomainError::MissingRequiredColumn(column.name.clone()));
        }
    }

    Ok(())
}
