// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Date, Month, OffsetDateTime};

use crate::{Department, DepartmentStatus, Record, RecordId, Staff, StaffStatus};

pub fn date(year: i32, month: Month, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).unwrap()
}

pub fn record<T>(id: RecordId, fields: T) -> Record<T> {
    let now: OffsetDateTime = OffsetDateTime::UNIX_EPOCH;
    Record::new(id, now, now, fields)
}

pub fn staff(first: &str, last: &str, department: Option<&str>, status: StaffStatus) -> Staff {
    Staff {
        employee_id: format!("E-{first}"),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}@example.com", first.to_lowercase()),
        phone: None,
        position: None,
        department: department.map(str::to_string),
        role_id: None,
        status,
        hire_date: None,
    }
}

pub fn hired(mut member: Staff, on: Date) -> Staff {
    member.hire_date = Some(on);
    member
}

pub fn department(name: &str, budget: Option<f64>, head: Option<RecordId>) -> Department {
    Department {
        name: name.to_string(),
        description: None,
        location: None,
        status: DepartmentStatus::Active,
        budget,
        head_of_department: head,
    }
}
