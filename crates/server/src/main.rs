// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use staffdesk_api::{
    ApiError, AuthenticationService, CascadeDeleteReport, CascadeStep, CreateAccountRequest,
    CreateDatabaseRequest, CreateTableRequest, CsvImportRequest, CsvImportResult,
    CsvPreviewResult, CurrentUser, DashboardView, DatabaseDetail, DatabaseListing,
    DatabasesView, DeleteResponse, DepartmentUpdateResponse, DepartmentsView, DirectoryEntity,
    ListQuery, LoginRequest, LoginResponse, PasswordPolicy, RolesView, RowValuesRequest,
    SearchQuery, SetTimeOffStatusRequest, StaffDirectoryQuery, StaffDirectoryView,
    TableDeleteReport, TableDetail, TimeOffQuery, TimeOffView, UpdateDatabaseRequest,
    UpdateTableRequest, create_database, create_entity, create_row, create_table,
    delete_database, delete_entity, delete_row, delete_table, export_table_csv,
    get_database_detail, get_entity, get_table_detail, import_table_csv, list_databases,
    list_entities, preview_table_csv, set_time_off_status, update_database,
    update_database_permissions, update_department, update_entity, update_row, update_table,
    update_time_off,
};
use staffdesk_domain::{
    Database, DatabasePermissions, DatabaseRow, DatabaseTable, Department, Record, RecordId, Role,
    Staff, TimeOffRequest,
};
use staffdesk_persistence::{Persistence, SortSpec};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::session::{BearerToken, SessionUser};

/// `StaffDesk` Server - HTTP server for the `StaffDesk` HR dashboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Email of an account to create at startup if it does not exist yet
    #[arg(long, requires = "admin_password")]
    admin_email: Option<String>,

    /// Password for the startup account
    #[arg(long, requires = "admin_email")]
    admin_password: Option<String>,

    /// Full name for the startup account
    #[arg(long, default_value = "Administrator")]
    admin_name: String,
}

/// Application state shared across handlers.
///
/// The single persistence connection sits behind a mutex. A handler holds
/// the lock for the whole of one API call, so multi-step operations such as
/// a cascade delete run without interleaving but are not transactions.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<Persistence>>,
    password_policy: PasswordPolicy,
}

impl AppState {
    fn new(persistence: Persistence) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            password_policy: PasswordPolicy::default(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Progress of a cascade delete that stopped part way.
#[derive(Debug, Clone, Serialize)]
struct CascadeProgress {
    database_id: RecordId,
    step: CascadeStep,
    rows_deleted: usize,
    tables_deleted: usize,
}

/// Error response type.
#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
    /// Set when a cascade delete stopped part way.
    #[serde(skip_serializing_if = "Option::is_none")]
    cascade: Option<CascadeProgress>,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    status: StatusCode,
    message: String,
    cascade: Option<CascadeProgress>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
            cascade: self.cascade,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::ValidationFailure { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::CascadeDelete(cascade) if cascade.source.is_unavailable() => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::CascadeDelete(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %err, "Request failed");
        }

        let cascade: Option<CascadeProgress> = match &err {
            ApiError::CascadeDelete(cascade) => Some(CascadeProgress {
                database_id: cascade.database_id,
                step: cascade.step,
                rows_deleted: cascade.rows_deleted,
                tables_deleted: cascade.tables_deleted,
            }),
            _ => None,
        };

        Self {
            status,
            message: err.to_string(),
            cascade,
        }
    }
}

type HttpResult<T> = Result<T, HttpError>;

// ============================================================================
// Authentication and accounts
// ============================================================================

/// Handler for POST `/auth/login`.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> HttpResult<Json<LoginResponse>> {
    info!(email = %req.email, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse =
        AuthenticationService::login(&mut persistence, &req.email, &req.password)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/auth/logout`.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    BearerToken(token): BearerToken,
) -> HttpResult<StatusCode> {
    let mut persistence = app_state.persistence.lock().await;
    AuthenticationService::logout(&mut persistence, &token)?;
    drop(persistence);

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET `/auth/me`.
#[allow(clippy::unused_async)]
async fn handle_me(SessionUser(user): SessionUser) -> Json<CurrentUser> {
    Json(user)
}

/// Handler for GET `/users`.
///
/// Lists accounts so database owners can pick grantees.
async fn handle_list_users(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_user): SessionUser,
) -> HttpResult<Json<Vec<CurrentUser>>> {
    let mut persistence = app_state.persistence.lock().await;
    let users: Vec<CurrentUser> = AuthenticationService::list_accounts(&mut persistence)?;
    drop(persistence);

    Ok(Json(users))
}

/// Handler for POST `/users`.
async fn handle_create_user(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Json(req): Json<CreateAccountRequest>,
) -> HttpResult<(StatusCode, Json<CurrentUser>)> {
    info!(created_by = user.id, email = %req.email, "Handling create account request");

    let mut persistence = app_state.persistence.lock().await;
    let created: CurrentUser = AuthenticationService::create_account(
        &mut persistence,
        &req,
        &app_state.password_policy,
    )?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(created)))
}

// ============================================================================
// Directory collections
// ============================================================================

/// Handler for GET on a directory collection, with an optional `?sort=`.
async fn handle_list<T: DirectoryEntity>(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_user): SessionUser,
    Query(query): Query<ListQuery>,
) -> HttpResult<Json<Vec<Record<T>>>> {
    let sort: Option<SortSpec> = query.sort_spec();

    let mut persistence = app_state.persistence.lock().await;
    let records: Vec<Record<T>> = list_entities(&mut *persistence, sort.as_ref())?;
    drop(persistence);

    Ok(Json(records))
}

/// Handler for GET on one directory record.
async fn handle_get<T: DirectoryEntity>(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_user): SessionUser,
    Path(id): Path<RecordId>,
) -> HttpResult<Json<Record<T>>> {
    let mut persistence = app_state.persistence.lock().await;
    let record: Record<T> = get_entity(&mut *persistence, id)?;
    drop(persistence);

    Ok(Json(record))
}

/// Handler for POST on a directory collection.
async fn handle_create<T: DirectoryEntity>(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Json(fields): Json<T>,
) -> HttpResult<(StatusCode, Json<Record<T>>)> {
    info!(user_id = user.id, kind = %T::KIND, "Handling create request");

    let mut persistence = app_state.persistence.lock().await;
    let record: Record<T> = create_entity(&mut *persistence, &fields)?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(record)))
}

/// Handler for PATCH on one directory record.
async fn handle_update<T: DirectoryEntity>(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
    Json(patch): Json<Map<String, Value>>,
) -> HttpResult<Json<Record<T>>> {
    info!(user_id = user.id, kind = %T::KIND, id, "Handling update request");

    let mut persistence = app_state.persistence.lock().await;
    let record: Record<T> = update_entity(&mut *persistence, id, &patch)?;
    drop(persistence);

    Ok(Json(record))
}

/// Handler for DELETE on one directory record.
async fn handle_delete<T: DirectoryEntity>(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
) -> HttpResult<Json<DeleteResponse>> {
    info!(user_id = user.id, kind = %T::KIND, id, "Handling delete request");

    let mut persistence = app_state.persistence.lock().await;
    let response: DeleteResponse = delete_entity::<_, T>(&mut *persistence, id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for PATCH `/departments/{id}`.
///
/// Renames propagate to staff carrying the old department name.
async fn handle_update_department(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
    Json(patch): Json<Map<String, Value>>,
) -> HttpResult<Json<DepartmentUpdateResponse>> {
    info!(user_id = user.id, department_id = id, "Handling update_department request");

    let mut persistence = app_state.persistence.lock().await;
    let response: DepartmentUpdateResponse = update_department(&mut *persistence, id, &patch)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for PATCH `/time_off/{id}`.
async fn handle_update_time_off(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
    Json(patch): Json<Map<String, Value>>,
) -> HttpResult<Json<Record<TimeOffRequest>>> {
    info!(user_id = user.id, request_id = id, "Handling time-off update");

    let mut persistence = app_state.persistence.lock().await;
    let record: Record<TimeOffRequest> = update_time_off(&mut *persistence, id, &patch)?;
    drop(persistence);

    Ok(Json(record))
}

/// Handler for POST `/time_off/{id}/status`.
async fn handle_set_time_off_status(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
    Json(req): Json<SetTimeOffStatusRequest>,
) -> HttpResult<Json<Record<TimeOffRequest>>> {
    info!(user_id = user.id, request_id = id, status = %req.status, "Handling time-off decision");

    let mut persistence = app_state.persistence.lock().await;
    let record: Record<TimeOffRequest> = set_time_off_status(&mut *persistence, id, req.status)?;
    drop(persistence);

    Ok(Json(record))
}

// ============================================================================
// Custom databases
// ============================================================================

/// Handler for GET `/databases`.
async fn handle_list_databases(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
) -> HttpResult<Json<Vec<DatabaseListing>>> {
    let mut persistence = app_state.persistence.lock().await;
    let listings: Vec<DatabaseListing> = list_databases(&mut *persistence, &user)?;
    drop(persistence);

    Ok(Json(listings))
}

/// Handler for POST `/databases`.
async fn handle_create_database(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Json(req): Json<CreateDatabaseRequest>,
) -> HttpResult<(StatusCode, Json<Record<Database>>)> {
    let mut persistence = app_state.persistence.lock().await;
    let database: Record<Database> = create_database(&mut *persistence, &user, &req)?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(database)))
}

/// Handler for GET `/databases/{id}`.
async fn handle_get_database(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
) -> HttpResult<Json<DatabaseDetail>> {
    let mut persistence = app_state.persistence.lock().await;
    let detail: DatabaseDetail = get_database_detail(&mut *persistence, &user, id)?;
    drop(persistence);

    Ok(Json(detail))
}

/// Handler for PATCH `/databases/{id}`.
async fn handle_update_database(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
    Json(req): Json<UpdateDatabaseRequest>,
) -> HttpResult<Json<Record<Database>>> {
    let mut persistence = app_state.persistence.lock().await;
    let database: Record<Database> = update_database(&mut *persistence, &user, id, &req)?;
    drop(persistence);

    Ok(Json(database))
}

/// Handler for DELETE `/databases/{id}`.
///
/// Deletes the database with its tables and rows. A cascade that stops
/// part way answers with an error body carrying the progress made.
async fn handle_delete_database(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
) -> HttpResult<Json<CascadeDeleteReport>> {
    info!(user_id = user.id, database_id = id, "Handling delete_database request");

    let mut persistence = app_state.persistence.lock().await;
    let report: CascadeDeleteReport = delete_database(&mut *persistence, &user, id)?;
    drop(persistence);

    Ok(Json(report))
}

/// Handler for PUT `/databases/{id}/permissions`.
async fn handle_update_permissions(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
    Json(permissions): Json<DatabasePermissions>,
) -> HttpResult<Json<Record<Database>>> {
    let mut persistence = app_state.persistence.lock().await;
    let database: Record<Database> =
        update_database_permissions(&mut *persistence, &user, id, &permissions)?;
    drop(persistence);

    Ok(Json(database))
}

/// Handler for POST `/databases/{id}/tables`.
async fn handle_create_table(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(database_id): Path<RecordId>,
    Json(req): Json<CreateTableRequest>,
) -> HttpResult<(StatusCode, Json<Record<DatabaseTable>>)> {
    let mut persistence = app_state.persistence.lock().await;
    let table: Record<DatabaseTable> = create_table(&mut *persistence, &user, database_id, &req)?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(table)))
}

/// Handler for GET `/tables/{id}`.
async fn handle_get_table(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
) -> HttpResult<Json<TableDetail>> {
    let mut persistence = app_state.persistence.lock().await;
    let detail: TableDetail = get_table_detail(&mut *persistence, &user, id)?;
    drop(persistence);

    Ok(Json(detail))
}

/// Handler for PATCH `/tables/{id}`.
async fn handle_update_table(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
    Json(req): Json<UpdateTableRequest>,
) -> HttpResult<Json<Record<DatabaseTable>>> {
    let mut persistence = app_state.persistence.lock().await;
    let table: Record<DatabaseTable> = update_table(&mut *persistence, &user, id, &req)?;
    drop(persistence);

    Ok(Json(table))
}

/// Handler for DELETE `/tables/{id}`.
async fn handle_delete_table(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
) -> HttpResult<Json<TableDeleteReport>> {
    let mut persistence = app_state.persistence.lock().await;
    let report: TableDeleteReport = delete_table(&mut *persistence, &user, id)?;
    drop(persistence);

    Ok(Json(report))
}

/// Handler for POST `/tables/{id}/rows`.
async fn handle_create_row(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(table_id): Path<RecordId>,
    Json(req): Json<RowValuesRequest>,
) -> HttpResult<(StatusCode, Json<Record<DatabaseRow>>)> {
    let mut persistence = app_state.persistence.lock().await;
    let row: Record<DatabaseRow> = create_row(&mut *persistence, &user, table_id, req.values)?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(row)))
}

/// Handler for PATCH `/rows/{id}`.
async fn handle_update_row(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
    Json(req): Json<RowValuesRequest>,
) -> HttpResult<Json<Record<DatabaseRow>>> {
    let mut persistence = app_state.persistence.lock().await;
    let row: Record<DatabaseRow> = update_row(&mut *persistence, &user, id, req.values)?;
    drop(persistence);

    Ok(Json(row))
}

/// Handler for DELETE `/rows/{id}`.
async fn handle_delete_row(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
) -> HttpResult<Json<DeleteResponse>> {
    let mut persistence = app_state.persistence.lock().await;
    let response: DeleteResponse = delete_row(&mut *persistence, &user, id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/tables/{id}/csv`.
async fn handle_export_csv(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
) -> HttpResult<Response> {
    let mut persistence = app_state.persistence.lock().await;
    let csv: String = export_table_csv(&mut *persistence, &user, id)?;
    drop(persistence);

    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv).into_response())
}

/// Handler for POST `/tables/{id}/csv/preview`.
async fn handle_preview_csv(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
    Json(req): Json<CsvImportRequest>,
) -> HttpResult<Json<CsvPreviewResult>> {
    let mut persistence = app_state.persistence.lock().await;
    let preview: CsvPreviewResult = preview_table_csv(&mut *persistence, &user, id, &req.csv)?;
    drop(persistence);

    Ok(Json(preview))
}

/// Handler for POST `/tables/{id}/csv`.
async fn handle_import_csv(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<RecordId>,
    Json(req): Json<CsvImportRequest>,
) -> HttpResult<Json<CsvImportResult>> {
    let mut persistence = app_state.persistence.lock().await;
    let result: CsvImportResult = import_table_csv(&mut *persistence, &user, id, &req.csv)?;
    drop(persistence);

    Ok(Json(result))
}

// ============================================================================
// Page views
// ============================================================================

/// Query parameters for the databases page.
#[derive(Debug, Default, Deserialize)]
struct DatabasesViewQuery {
    /// The database to open.
    #[serde(default)]
    selected: Option<RecordId>,
}

/// Handler for GET `/views/dashboard`.
async fn handle_dashboard_view(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_user): SessionUser,
) -> HttpResult<Json<DashboardView>> {
    let today = OffsetDateTime::now_utc().date();

    let mut persistence = app_state.persistence.lock().await;
    let view: DashboardView = DashboardView::load(&mut *persistence, today)?;
    drop(persistence);

    Ok(Json(view))
}

/// Handler for GET `/views/staff`.
async fn handle_staff_view(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_user): SessionUser,
    Query(query): Query<StaffDirectoryQuery>,
) -> HttpResult<Json<StaffDirectoryView>> {
    let filters = query.filters()?;

    let mut persistence = app_state.persistence.lock().await;
    let view: StaffDirectoryView =
        StaffDirectoryView::load(&mut *persistence, filters, query.search_term())?;
    drop(persistence);

    Ok(Json(view))
}

/// Handler for GET `/views/departments`.
async fn handle_departments_view(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_user): SessionUser,
    Query(query): Query<SearchQuery>,
) -> HttpResult<Json<DepartmentsView>> {
    let mut persistence = app_state.persistence.lock().await;
    let view: DepartmentsView = DepartmentsView::load(&mut *persistence, query.search_term())?;
    drop(persistence);

    Ok(Json(view))
}

/// Handler for GET `/views/roles`.
async fn handle_roles_view(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_user): SessionUser,
) -> HttpResult<Json<RolesView>> {
    let mut persistence = app_state.persistence.lock().await;
    let view: RolesView = RolesView::load(&mut *persistence)?;
    drop(persistence);

    Ok(Json(view))
}

/// Handler for GET `/views/time_off`.
async fn handle_time_off_view(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_user): SessionUser,
    Query(query): Query<TimeOffQuery>,
) -> HttpResult<Json<TimeOffView>> {
    let filters = query.filters()?;

    let mut persistence = app_state.persistence.lock().await;
    let view: TimeOffView = TimeOffView::load(&mut *persistence, filters)?;
    drop(persistence);

    Ok(Json(view))
}

/// Handler for GET `/views/databases`.
async fn handle_databases_view(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user): SessionUser,
    Query(query): Query<DatabasesViewQuery>,
) -> HttpResult<Json<DatabasesView>> {
    let mut persistence = app_state.persistence.lock().await;
    let view: DatabasesView = DatabasesView::load(&mut *persistence, &user, query.selected)?;
    drop(persistence);

    Ok(Json(view))
}

// ============================================================================
// Router
// ============================================================================

/// Builds the application router with all endpoints.
#[allow(clippy::too_many_lines)]
fn build_router(app_state: AppState) -> Router {
    Router::new()
        // Authentication and accounts
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/me", get(handle_me))
        .route("/users", get(handle_list_users).post(handle_create_user))
        // Directory collections
        .route(
            "/staff",
            get(handle_list::<Staff>).post(handle_create::<Staff>),
        )
        .route(
            "/staff/{id}",
            get(handle_get::<Staff>)
                .patch(handle_update::<Staff>)
                .delete(handle_delete::<Staff>),
        )
        .route(
            "/roles",
            get(handle_list::<Role>).post(handle_create::<Role>),
        )
        .route(
            "/roles/{id}",
            get(handle_get::<Role>)
                .patch(handle_update::<Role>)
                .delete(handle_delete::<Role>),
        )
        .route(
            "/departments",
            get(handle_list::<Department>).post(handle_create::<Department>),
        )
        .route(
            "/departments/{id}",
            get(handle_get::<Department>)
                .patch(handle_update_department)
                .delete(handle_delete::<Department>),
        )
        .route(
            "/time_off",
            get(handle_list::<TimeOffRequest>).post(handle_create::<TimeOffRequest>),
        )
        .route(
            "/time_off/{id}",
            get(handle_get::<TimeOffRequest>)
                .patch(handle_update_time_off)
                .delete(handle_delete::<TimeOffRequest>),
        )
        .route("/time_off/{id}/status", post(handle_set_time_off_status))
        // Custom databases
        .route(
            "/databases",
            get(handle_list_databases).post(handle_create_database),
        )
        .route(
            "/databases/{id}",
            get(handle_get_database)
                .patch(handle_update_database)
                .delete(handle_delete_database),
        )
        .route(
            "/databases/{id}/permissions",
            put(handle_update_permissions),
        )
        .route("/databases/{id}/tables", post(handle_create_table))
        .route(
            "/tables/{id}",
            get(handle_get_table)
                .patch(handle_update_table)
                .delete(handle_delete_table),
        )
        .route("/tables/{id}/rows", post(handle_create_row))
        .route(
            "/tables/{id}/csv",
            get(handle_export_csv).post(handle_import_csv),
        )
        .route("/tables/{id}/csv/preview", post(handle_preview_csv))
        .route(
            "/rows/{id}",
            patch(handle_update_row).delete(handle_delete_row),
        )
        // Page views
        .route("/views/dashboard", get(handle_dashboard_view))
        .route("/views/staff", get(handle_staff_view))
        .route("/views/departments", get(handle_departments_view))
        .route("/views/roles", get(handle_roles_view))
        .route("/views/time_off", get(handle_time_off_view))
        .route("/views/databases", get(handle_databases_view))
        .with_state(app_state)
}

/// Creates the startup account when one is configured, and warns when the
/// server would otherwise have no way to sign in.
fn bootstrap_accounts(
    persistence: &mut Persistence,
    args: &Args,
    policy: &PasswordPolicy,
) -> Result<(), ApiError> {
    if let (Some(email), Some(password)) = (&args.admin_email, &args.admin_password) {
        match AuthenticationService::ensure_account(
            persistence,
            email,
            &args.admin_name,
            password,
            policy,
        )? {
            Some(user) => info!(user_id = user.id, email = %user.email, "Created startup account"),
            None => info!(email = %email, "Startup account already exists"),
        }
    }

    if AuthenticationService::list_accounts(persistence)?.is_empty() {
        warn!("No accounts exist; start with --admin-email and --admin-password to create one");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing StaffDesk Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let purged: usize = persistence.delete_expired_sessions(OffsetDateTime::now_utc())?;
    if purged > 0 {
        info!(purged, "Removed expired sessions");
    }

    let app_state: AppState = AppState::new(persistence);
    {
        let mut persistence = app_state.persistence.lock().await;
        bootstrap_accounts(&mut persistence, &args, &app_state.password_policy)?;
    }

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
