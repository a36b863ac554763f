// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for the directory collections: staff, roles,
//! departments and time-off requests.
//!
//! Custom databases have their own handlers in `custom_databases`.

use serde_json::{Map, Value};
use staffdesk_domain::{
    Department, Entity, Record, RecordId, Role, Staff, TimeOffRequest, TimeOffStatus,
};
use staffdesk_persistence::{EntityStore, EqualityFilter, SortSpec};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::request_response::{DeleteResponse, DepartmentUpdateResponse};

/// Collections managed through the generic directory handlers.
pub trait DirectoryEntity: Entity {}

impl DirectoryEntity for Staff {}
impl DirectoryEntity for Role {}
impl DirectoryEntity for Department {}
impl DirectoryEntity for TimeOffRequest {}

/// Lists a directory collection, optionally sorted.
///
/// # Errors
///
/// Returns `StoreUnavailable` if the collection cannot be read.
pub fn list_entities<S: EntityStore, T: DirectoryEntity>(
    store: &mut S,
    sort: Option<&SortSpec>,
) -> Result<Vec<Record<T>>, ApiError> {
    let records: Vec<Record<T>> = store.list(sort)?;
    debug!(kind = %T::KIND, count = records.len(), "Listed records");
    Ok(records)
}

/// Fetches one directory record.
///
/// # Errors
///
/// Returns `NotFound` if the record does not exist.
pub fn get_entity<S: EntityStore, T: DirectoryEntity>(
    store: &mut S,
    id: RecordId,
) -> Result<Record<T>, ApiError> {
    Ok(store.get(id)?)
}

/// Creates a directory record.
///
/// # Errors
///
/// Returns `ValidationFailure` if the fields break an entity rule.
pub fn create_entity<S: EntityStore, T: DirectoryEntity>(
    store: &mut S,
    fields: &T,
) -> Result<Record<T>, ApiError> {
    let record: Record<T> = store.create(fields)?;
    info!(kind = %T::KIND, id = record.id, "Created record");
    Ok(record)
}

/// Applies a partial update to a directory record.
///
/// # Errors
///
/// Returns `NotFound` if the record does not exist and
/// `ValidationFailure` if the merged fields break an entity rule.
pub fn update_entity<S: EntityStore, T: DirectoryEntity>(
    store: &mut S,
    id: RecordId,
    patch: &Map<String, Value>,
) -> Result<Record<T>, ApiError> {
    let record: Record<T> = store.update(id, patch)?;
    info!(kind = %T::KIND, id, fields = patch.len(), "Updated record");
    Ok(record)
}

/// Deletes a directory record. Nothing referring to it is touched.
///
/// # Errors
///
/// Returns `NotFound` if the record does not exist.
pub fn delete_entity<S: EntityStore, T: DirectoryEntity>(
    store: &mut S,
    id: RecordId,
) -> Result<DeleteResponse, ApiError> {
    store.delete::<T>(id)?;
    info!(kind = %T::KIND, id, "Deleted record");
    Ok(DeleteResponse { id })
}

/// Updates a department and re-points staff when its name changes.
///
/// Staff belong to a department by name, so renaming a department moves
/// every staff member carrying the old name to the new one. The rename
/// and the staff updates are separate writes.
///
/// # Errors
///
/// Returns `NotFound` if the department does not exist and
/// `ValidationFailure` if the merged fields break a department rule.
pub fn update_department<S: EntityStore>(
    store: &mut S,
    id: RecordId,
    patch: &Map<String, Value>,
) -> Result<DepartmentUpdateResponse, ApiError> {
    let previous: Record<Department> = store.get(id)?;
    let department: Record<Department> = store.update(id, patch)?;

    if previous.name == department.name {
        info!(department_id = id, "Updated department");
        return Ok(DepartmentUpdateResponse {
            department,
            staff_updated: 0,
        });
    }

    let members: Vec<Record<Staff>> = store.filter(
        &EqualityFilter::new().with("department", previous.name.as_str()),
        None,
    )?;

    let mut rename: Map<String, Value> = Map::new();
    rename.insert(
        String::from("department"),
        Value::String(department.name.clone()),
    );

    for member in &members {
        store.update::<Staff>(member.id, &rename)?;
    }
    let staff_updated: usize = members.len();

    info!(
        department_id = id,
        from = %previous.name,
        to = %department.name,
        staff_updated,
        "Renamed department"
    );

    Ok(DepartmentUpdateResponse {
        department,
        staff_updated,
    })
}

/// Applies a partial update to a time-off request.
///
/// The status only moves through [`set_time_off_status`], so a patch that
/// names it is rejected.
///
/// # Errors
///
/// Returns `ValidationFailure` if the patch carries `status` or the merged
/// fields break a request rule, and `NotFound` if it does not exist.
pub fn update_time_off<S: EntityStore>(
    store: &mut S,
    id: RecordId,
    patch: &Map<String, Value>,
) -> Result<Record<TimeOffRequest>, ApiError> {
    if patch.contains_key("status") {
        return Err(ApiError::ValidationFailure {
            message: String::from("Time-off status changes only by a decision"),
        });
    }

    update_entity(store, id, patch)
}

/// Approves or denies a pending time-off request.
///
/// # Errors
///
/// Returns `ValidationFailure` if `status` is `Pending`, `Conflict` if the
/// request has already been decided and `NotFound` if it does not exist.
pub fn set_time_off_status<S: EntityStore>(
    store: &mut S,
    id: RecordId,
    status: TimeOffStatus,
) -> Result<Record<TimeOffRequest>, ApiError> {
    if status == TimeOffStatus::Pending {
        return Err(ApiError::ValidationFailure {
            message: String::from("A time-off decision must be Approved or Denied"),
        });
    }

    let request: Record<TimeOffRequest> = store.get(id)?;
    if request.status != TimeOffStatus::Pending {
        return Err(ApiError::Conflict {
            message: format!(
                "Time-off request {id} was already {}",
                request.status.as_str().to_lowercase()
            ),
        });
    }

    let mut patch: Map<String, Value> = Map::new();
    patch.insert(
        String::from("status"),
        Value::String(status.as_str().to_string()),
    );
    let decided: Record<TimeOffRequest> = store.update(id, &patch)?;

    info!(request_id = id, status = %status, "Decided time-off request");
    Ok(decided)
}
