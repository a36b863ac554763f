// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod initialization_tests;
mod record_tests;
mod session_tests;
mod sort_filter_tests;

use staffdesk_domain::{Staff, StaffStatus};

pub fn create_test_staff(first_name: &str, department: Option<&str>, status: StaffStatus) -> Staff {
    Staff {
        employee_id: format!("EMP-{first_name}"),
        first_name: first_name.to_string(),
        last_name: String::from("Tester"),
        email: format!("{}@example.com", first_name.to_lowercase()),
        phone: None,
        position: None,
        department: department.map(str::to_string),
        role_id: None,
        status,
        hire_date: None,
    }
}
