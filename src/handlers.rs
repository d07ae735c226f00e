use crate::{
    AppState,
    auth::token_from_headers,
    error::ApiError,
    extract::{JsonOrForm, PatchForm},
    models::{
        CreateEmployeeRequest, Credential, Employee, EmployeePatch, StatusResponse, TokenResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::{HeaderMap, StatusCode},
};

// --- Public Handlers ---

/// ping
///
/// [Public Route] Liveness check.
#[utoipa::path(
    get,
    path = "/ping",
    responses((status = 200, description = "Alive", body = String))
)]
pub async fn ping() -> &'static str {
    "pong"
}

/// get_status
///
/// [Public Route] Service health plus the number of live sessions. Read-only, never fails.
#[utoipa::path(
    get,
    path = "/status",
    responses((status = 200, description = "Status", body = StatusResponse))
)]
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        health: "OK".to_string(),
        sessions_count: state.sessions.count(),
    })
}

/// login
///
/// [Public Route] Exchanges a login/password pair for a bearer token.
///
/// The pair must match an entry of the credential store exactly. A failed login
/// creates no session.
#[utoipa::path(
    post,
    path = "/login",
    request_body = Credential,
    responses(
        (status = 200, description = "Logged in", body = TokenResponse),
        (status = 400, description = "Unparseable body"),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    JsonOrForm(credential): JsonOrForm<Credential>,
) -> Result<Json<TokenResponse>, ApiError> {
    if !state.config.credentials.contains(&credential) {
        tracing::warn!(login = %credential.login, "login rejected");
        return Err(ApiError::Unauthorized);
    }

    let token = state.sessions.create();
    tracing::info!(login = %credential.login, "login succeeded");
    Ok(Json(TokenResponse { token }))
}

/// logout
///
/// [Public Route] Revokes the bearer token from the `Authorization` header.
///
/// Not behind the auth middleware. Unknown and missing tokens still answer 200,
/// so logout is idempotent.
#[utoipa::path(
    delete,
    path = "/logout",
    responses((status = 200, description = "Logged out", body = String)),
    security(("bearer" = []))
)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> &'static str {
    if let Some(token) = token_from_headers(&headers) {
        state.sessions.revoke(token);
    }
    tracing::info!("logout");
    "You were logged out successfully"
}

// --- Authenticated Handlers ---

/// get_all_employees
///
/// [Authenticated Route] Every employee, in insertion order.
#[utoipa::path(
    get,
    path = "/employees",
    responses(
        (status = 200, description = "Employees", body = [Employee]),
        (status = 401, description = "Missing or unknown token")
    ),
    security(("bearer" = []))
)]
pub async fn get_all_employees(State(state): State<AppState>) -> Json<Vec<Employee>> {
    Json(state.repo.list())
}

/// get_employee
///
/// [Authenticated Route] A single employee by id.
#[utoipa::path(
    get,
    path = "/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Found", body = Employee),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn get_employee(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Employee>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.repo.get(id)?))
}

/// create_employee
///
/// [Authenticated Route] Adds an employee. The id is assigned by the registry and
/// any id in the body is ignored.
#[utoipa::path(
    post,
    path = "/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Created", body = Employee),
        (status = 400, description = "Unparseable body")
    ),
    security(("bearer" = []))
)]
pub async fn create_employee(
    State(state): State<AppState>,
    JsonOrForm(payload): JsonOrForm<CreateEmployeeRequest>,
) -> (StatusCode, Json<Employee>) {
    let employee = state.repo.create(payload);
    (StatusCode::CREATED, Json(employee))
}

/// update_employee
///
/// [Authenticated Route] Partial update from form fields. Only non-empty fields
/// overwrite; the rest of the record is left as it was.
///
/// An unknown id is a 404 even when the fields themselves would not parse.
#[utoipa::path(
    put,
    path = "/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID"), EmployeePatch),
    request_body(
        content(
            (EmployeePatch = "application/x-www-form-urlencoded"),
            (EmployeePatch = "multipart/form-data")
        )
    ),
    responses(
        (status = 201, description = "Updated", body = Employee),
        (status = 400, description = "Invalid age or unsupported body"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn update_employee(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    patch: Result<PatchForm, ApiError>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    let Path(id) = id?;
    state.repo.get(id)?;
    let PatchForm(patch) = patch?;
    let employee = state.repo.update(id, patch)?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// delete_employee
///
/// [Authenticated Route] Removes an employee. Removing an unknown (or already
/// removed) id is a 404.
#[utoipa::path(
    delete,
    path = "/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Deleted", body = String),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<&'static str, ApiError> {
    let Path(id) = id?;
    state.repo.remove(id)?;
    Ok("OK")
}
