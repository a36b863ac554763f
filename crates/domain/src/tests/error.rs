// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Month;

use super::helpers::date;
use crate::{ColumnType, DomainError, EntityKind};

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::MissingField {
        entity: EntityKind::Staff,
        field: "email",
    };
    assert_eq!(format!("{err}"), "staff is missing required field 'email'");

    let err: DomainError = DomainError::InvalidField {
        entity: EntityKind::Department,
        field: "budget",
        reason: String::from("must be positive"),
    };
    assert_eq!(
        format!("{err}"),
        "Invalid department field 'budget': must be positive"
    );

    let err: DomainError = DomainError::InvalidDateRange {
        start: date(2026, Month::March, 10),
        end: date(2026, Month::March, 1),
    };
    assert_eq!(
        format!("{err}"),
        "Date range ends (2026-03-01) before it starts (2026-03-10)"
    );

    let err: DomainError = DomainError::DuplicateColumn(String::from("Title"));
    assert_eq!(format!("{err}"), "Duplicate column name: 'Title'");

    let err: DomainError = DomainError::UnknownColumn(String::from("Colour"));
    assert_eq!(format!("{err}"), "Unknown column: 'Colour'");

    let err: DomainError = DomainError::MissingRequiredColumn(String::from("Title"));
    assert_eq!(format!("{err}"), "Missing value for required column 'Title'");

    let err: DomainError = DomainError::ColumnTypeMismatch {
        column: String::from("Pages"),
        expected: ColumnType::Number,
    };
    assert_eq!(
        format!("{err}"),
        "Value for column 'Pages' must be of type number"
    );

    let err: DomainError = DomainError::ParseError {
        kind: "staff status",
        value: String::from("Retired"),
    };
    assert_eq!(format!("{err}"), "Invalid staff status: 'Retired'");
}

#[test]
fn test_domain_error_is_std_error() {
    let err: DomainError = DomainError::UnknownColumn(String::from("x"));
    let boxed: Box<dyn std::error::Error> = Box::new(err);
    assert!(boxed.to_string().contains("Unknown column"));
}
