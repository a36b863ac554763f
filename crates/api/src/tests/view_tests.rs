// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use staffdesk_domain::{
    Capability, DatabasePermissions, Department, DepartmentShare, DepartmentStatus, FieldFilter,
    Record, RecordId, Role, Staff, StaffFilters, StaffStatus, TimeOffFilters, TimeOffRequest,
    TimeOffStatus,
};
use staffdesk_persistence::Persistence;
use std::collections::BTreeSet;
use time::{Date, Month};

use crate::auth::CurrentUser;
use crate::custom_databases::{delete_database, update_database_permissions};
use crate::error::ApiError;
use crate::handlers::create_entity;
use crate::tests::helpers::{date, new_store, seed_database, staff, time_off, user_with_id};
use crate::views::{
    DashboardView, DatabasesView, DepartmentCard, DepartmentsView, PENDING_PREVIEW_LIMIT,
    PageController, RolesView, StaffDirectoryView, TimeOffEntry, TimeOffView,
};

fn today() -> Date {
    date(2026, Month::March, 31)
}

fn hired(mut fields: Staff, on: Date) -> Staff {
    fields.hire_date = Some(on);
    fields
}

fn role(name: &str, level: i32, permissions: &[&str]) -> Role {
    Role {
        name: name.to_string(),
        description: None,
        level,
        permissions: permissions.iter().map(|p| (*p).to_string()).collect(),
    }
}

fn department(name: &str, status: DepartmentStatus, budget: f64) -> Department {
    Department {
        name: name.to_string(),
        description: None,
        location: None,
        status,
        budget: Some(budget),
        head_of_department: None,
    }
}

#[test]
fn test_dashboard_lists_five_pending_and_counts_all() {
    let mut store: Persistence = new_store();
    for _ in 0..7 {
        create_entity(&mut store, &time_off(1, "Vacation", TimeOffStatus::Pending)).unwrap();
    }
    create_entity(&mut store, &time_off(1, "Vacation", TimeOffStatus::Approved)).unwrap();

    let view: DashboardView = DashboardView::load(&mut store, today()).unwrap();

    assert_eq!(view.pending_request_count, 7);
    assert_eq!(view.pending_requests.len(), PENDING_PREVIEW_LIMIT);
    assert!(
        view.pending_requests
            .iter()
            .all(|r| r.status == TimeOffStatus::Pending)
    );
}

#[test]
fn test_dashboard_staff_figures() {
    let mut store: Persistence = new_store();
    create_entity(
        &mut store,
        &hired(
            staff("Ada", "Byron", Some("Engineering"), StaffStatus::Active),
            date(2026, Month::March, 20),
        ),
    )
    .unwrap();
    create_entity(
        &mut store,
        &hired(
            staff("Bea", "Clark", Some("Engineering"), StaffStatus::Inactive),
            date(2025, Month::June, 1),
        ),
    )
    .unwrap();
    create_entity(&mut store, &staff("Cal", "Dunn", None, StaffStatus::Active)).unwrap();
    create_entity(
        &mut store,
        &hired(
            staff("Dee", "Ellis", Some("Sales"), StaffStatus::OnLeave),
            date(2026, Month::March, 30),
        ),
    )
    .unwrap();

    let view: DashboardView = DashboardView::load(&mut store, today()).unwrap();

    assert_eq!(view.total_staff, 4);
    assert_eq!(view.active_staff, 2);
    assert_eq!(view.recent_hire_count, 2);
    assert_eq!(view.recent_hires[0].first_name, "Dee");
    assert_eq!(view.recent_hires[1].first_name, "Ada");
    assert_eq!(view.pending_request_count, 0);

    let engineering: &DepartmentShare = view
        .department_distribution
        .iter()
        .find(|share| share.name == "Engineering")
        .unwrap();
    assert_eq!(engineering.count, 2);
    assert!((engineering.percentage - 50.0).abs() < f64::EPSILON);
    assert!(
        view.department_distribution
            .iter()
            .any(|share| share.name == "Unassigned" && share.count == 1)
    );
}

#[test]
fn test_empty_dashboard() {
    let mut store: Persistence = new_store();

    let view: DashboardView = DashboardView::load(&mut store, today()).unwrap();

    assert_eq!(view.total_staff, 0);
    assert!(view.department_distribution.is_empty());
    assert!(view.pending_requests.is_empty());
}

#[test]
fn test_staff_directory_filters_and_search() {
    let mut store: Persistence = new_store();
    let names: [(&str, &str, StaffStatus); 5] = [
        ("Anna", "Smith", StaffStatus::Active),
        ("Ben", "Smithers", StaffStatus::Active),
        ("Cara", "Jones", StaffStatus::Active),
        ("Dan", "Smith", StaffStatus::Terminated),
        ("Eve", "Brown", StaffStatus::Inactive),
    ];
    for (first, last, status) in names {
        create_entity(&mut store, &staff(first, last, Some("Support"), status)).unwrap();
    }
    for idx in 0..7 {
        create_entity(
            &mut store,
            &staff(&format!("Temp{idx}"), "Worker", Some("Warehouse"), StaffStatus::Active),
        )
        .unwrap();
    }

    let active_only: StaffFilters = StaffFilters {
        status: FieldFilter::Exactly(StaffStatus::Active),
        ..StaffFilters::default()
    };

    let filtered: StaffDirectoryView =
        StaffDirectoryView::load(&mut store, active_only.clone(), "").unwrap();
    assert_eq!(filtered.total_staff, 12);
    assert_eq!(filtered.staff.len(), 10);
    assert!(filtered.is_narrowed());
    assert_eq!(filtered.departments, vec!["Support", "Warehouse"]);

    let searched: StaffDirectoryView =
        StaffDirectoryView::load(&mut store, active_only, "SMITH").unwrap();
    let found: BTreeSet<String> = searched.staff.iter().map(|s| s.full_name()).collect();
    assert_eq!(
        found,
        BTreeSet::from([String::from("Anna Smith"), String::from("Ben Smithers")])
    );

    let everyone: StaffDirectoryView =
        StaffDirectoryView::load(&mut store, StaffFilters::default(), "").unwrap();
    assert_eq!(everyone.staff.len(), 12);
    assert!(!everyone.is_narrowed());
}

#[test]
fn test_departments_view_stats() {
    let mut store: Persistence = new_store();
    let head: Record<Staff> =
        create_entity(&mut store, &staff("Hana", "Ito", Some("Support"), StaffStatus::Active))
            .unwrap();
    create_entity(&mut store, &staff("Ivo", "Jan", Some("Support"), StaffStatus::Inactive))
        .unwrap();
    create_entity(&mut store, &staff("Kim", "Lee", Some("Legal"), StaffStatus::Active)).unwrap();

    let mut support: Department = department("Support", DepartmentStatus::Active, 1_000.0);
    support.head_of_department = Some(head.id);
    create_entity(&mut store, &support).unwrap();
    let mut legal: Department = department("Legal", DepartmentStatus::Inactive, 500.0);
    legal.head_of_department = Some(9_999);
    create_entity(&mut store, &legal).unwrap();

    let view: DepartmentsView = DepartmentsView::load(&mut store, "").unwrap();

    assert_eq!(view.summary.total, 2);
    assert_eq!(view.summary.active, 1);
    assert_eq!(view.summary.total_staff, 3);
    assert!((view.summary.total_budget - 1_500.0).abs() < f64::EPSILON);

    let support_card: &DepartmentCard = view
        .departments
        .iter()
        .find(|card| card.department.name == "Support")
        .unwrap();
    assert_eq!(support_card.stats.total_staff, 2);
    assert_eq!(support_card.stats.active_staff, 1);
    assert_eq!(
        support_card.stats.head_of_department.as_ref().map(|s| s.id),
        Some(head.id)
    );

    let legal_card: &DepartmentCard = view
        .departments
        .iter()
        .find(|card| card.department.name == "Legal")
        .unwrap();
    assert_eq!(legal_card.stats.head_of_department, None);

    let searched: DepartmentsView = DepartmentsView::load(&mut store, "leg").unwrap();
    assert_eq!(searched.departments.len(), 1);
    // The summary ignores the search.
    assert_eq!(searched.summary.total, 2);
}

#[test]
fn test_roles_view_orders_by_level() {
    let mut store: Persistence = new_store();
    create_entity(&mut store, &role("Director", 5, &["hire", "fire", "approve"])).unwrap();
    create_entity(&mut store, &role("Intern", 1, &[])).unwrap();
    create_entity(&mut store, &role("Lead", 3, &["approve"])).unwrap();

    let view: RolesView = RolesView::load(&mut store).unwrap();

    let levels: Vec<i32> = view.roles.iter().map(|r| r.level).collect();
    assert_eq!(levels, vec![1, 3, 5]);
    assert_eq!(view.total_roles, 3);
    assert_eq!(view.max_level, 5);
    assert_eq!(view.total_permissions, 4);
}

#[test]
fn test_roles_view_without_roles() {
    let mut store: Persistence = new_store();

    let view: RolesView = RolesView::load(&mut store).unwrap();

    assert_eq!(view.max_level, 0);
    assert_eq!(view.total_permissions, 0);
}

#[test]
fn test_time_off_view_resolves_staff_and_counts() {
    let mut store: Persistence = new_store();
    let member: Record<Staff> =
        create_entity(&mut store, &staff("Lia", "Moss", None, StaffStatus::Active)).unwrap();
    create_entity(&mut store, &time_off(member.id, "Vacation", TimeOffStatus::Pending)).unwrap();
    create_entity(&mut store, &time_off(member.id, "Sick", TimeOffStatus::Approved)).unwrap();
    let dangling: Record<TimeOffRequest> =
        create_entity(&mut store, &time_off(4_242, "Vacation", TimeOffStatus::Denied)).unwrap();

    let view: TimeOffView = TimeOffView::load(&mut store, TimeOffFilters::default()).unwrap();

    assert_eq!(view.counts.total, 3);
    assert_eq!(view.counts.pending, 1);
    assert_eq!(view.counts.approved, 1);
    assert_eq!(view.counts.denied, 1);
    assert!(!view.is_filtered);
    assert_eq!(view.request_types, vec!["Sick", "Vacation"]);

    let orphan: &TimeOffEntry = view
        .requests
        .iter()
        .find(|entry| entry.request.id == dangling.id)
        .unwrap();
    assert_eq!(orphan.staff_name, None);
    assert_eq!(orphan.days, 5);
    assert!(
        view.requests
            .iter()
            .filter(|entry| entry.request.staff_id == member.id)
            .all(|entry| entry.staff_name.as_deref() == Some("Lia Moss"))
    );
}

#[test]
fn test_time_off_view_filters_keep_full_counts() {
    let mut store: Persistence = new_store();
    for status in [
        TimeOffStatus::Pending,
        TimeOffStatus::Pending,
        TimeOffStatus::Approved,
    ] {
        create_entity(&mut store, &time_off(1, "Vacation", status)).unwrap();
    }

    let filters: TimeOffFilters = TimeOffFilters {
        status: FieldFilter::Exactly(TimeOffStatus::Pending),
        ..TimeOffFilters::default()
    };
    let view: TimeOffView = TimeOffView::load(&mut store, filters).unwrap();

    assert!(view.is_filtered);
    assert_eq!(view.requests.len(), 2);
    assert_eq!(view.counts.total, 3);
}

#[test]
fn test_databases_view_selection() {
    let mut store: Persistence = new_store();
    let owner: CurrentUser = user_with_id(1);
    let (first, _) = seed_database(&mut store, &owner, 1, 1);
    let (second, _) = seed_database(&mut store, &owner, 2, 0);

    let mut view: DatabasesView = DatabasesView::load(&mut store, &owner, Some(first)).unwrap();

    assert_eq!(view.databases.len(), 2);
    assert_eq!(view.access.total, 2);
    assert_eq!(view.access.can_delete, 2);
    assert_eq!(view.selected_id(), Some(first));
    assert_eq!(view.selected.as_ref().unwrap().tables.len(), 1);

    delete_database(&mut store, &owner, first).unwrap();
    view.forget_database(first);

    assert_eq!(view.selected_id(), None);
    let remaining: Vec<RecordId> = view.databases.iter().map(|d| d.database.id).collect();
    assert_eq!(remaining, vec![second]);
}

#[test]
fn test_databases_view_reload_after_deleting_open_database() {
    let mut store: Persistence = new_store();
    let owner: CurrentUser = user_with_id(1);
    let (first, _) = seed_database(&mut store, &owner, 1, 1);
    let (second, _) = seed_database(&mut store, &owner, 0, 0);

    DatabasesView::load(&mut store, &owner, Some(first)).unwrap();
    delete_database(&mut store, &owner, first).unwrap();

    let view: DatabasesView = DatabasesView::load(&mut store, &owner, Some(first)).unwrap();

    assert_eq!(view.selected_id(), None);
    let remaining: Vec<RecordId> = view.databases.iter().map(|d| d.database.id).collect();
    assert_eq!(remaining, vec![second]);
}

#[test]
fn test_databases_view_access_for_grantee() {
    let mut store: Persistence = new_store();
    let owner: CurrentUser = user_with_id(1);
    let viewer: CurrentUser = user_with_id(2);
    let (shared, _) = seed_database(&mut store, &owner, 0, 0);
    seed_database(&mut store, &owner, 0, 0);

    let mut permissions: DatabasePermissions = DatabasePermissions::owned_by(owner.id);
    permissions.grant(Capability::View, viewer.id);
    update_database_permissions(&mut store, &owner, shared, &permissions).unwrap();

    let view: DatabasesView = DatabasesView::load(&mut store, &viewer, None).unwrap();
    assert_eq!(view.access.total, 2);
    assert_eq!(view.access.can_view, 1);
    assert_eq!(view.access.can_edit, 0);

    let denied: Result<DatabasesView, ApiError> = DatabasesView::load(
        &mut store,
        &viewer,
        view.databases
            .iter()
            .find(|d| d.database.id != shared)
            .map(|d| d.database.id),
    );
    assert!(matches!(denied, Err(ApiError::Forbidden { .. })));
}

#[test]
fn test_failed_reload_keeps_previous_view() {
    let mut store: Persistence = new_store();
    create_entity(&mut store, &role("Lead", 3, &[])).unwrap();
    let mut controller: PageController<RolesView> = PageController::new();

    controller.reload(|| RolesView::load(&mut store)).unwrap();
    assert_eq!(controller.view().unwrap().total_roles, 1);

    let result: Result<&RolesView, ApiError> = controller.reload(|| {
        Err(ApiError::StoreUnavailable {
            message: String::from("disk went away"),
        })
    });

    assert!(matches!(result, Err(ApiError::StoreUnavailable { .. })));
    assert!(!controller.is_loading());
    assert_eq!(controller.view().unwrap().total_roles, 1);
}

#[test]
fn test_controller_loading_flag_and_local_update() {
    let mut controller: PageController<RolesView> = PageController::default();
    assert!(controller.view().is_none());

    controller.begin_loading();
    assert!(controller.is_loading());

    let loaded: RolesView = RolesView {
        roles: Vec::new(),
        total_roles: 0,
        max_level: 0,
        total_permissions: 0,
    };
    controller.finish_loading(Ok(loaded)).unwrap();
    assert!(!controller.is_loading());

    controller.update_view(|view| view.total_roles = 9);
    assert_eq!(controller.view().unwrap().total_roles, 9);
}
