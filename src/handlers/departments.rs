use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{auth::AuthUser, errors::ApiError, AppState};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DepartmentPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// List all departments
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses((status = 200, description = "Departments listed")),
    security(("bearer_auth" = [])),
    tag = "departments"
)]
pub async fn list_departments(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let departments = state
        .services
        .departments
        .list_departments()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(departments))
}

/// Fetch one department
#[utoipa::path(
    get,
    path = "/api/v1/departments/{id}",
    params(("id" = Uuid, Path, description = "Department id")),
    responses(
        (status = 200, description = "Department found"),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "departments"
)]
pub async fn get_department(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let department = state
        .services
        .departments
        .get_department(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(department))
}

/// Create a department (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = DepartmentPayload,
    responses(
        (status = 201, description = "Department created"),
        (status = 409, description = "Name already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "departments"
)]
pub async fn create_department(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<DepartmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin().map_err(map_service_error)?;
    validate_input(&payload)?;

    let department = state
        .services
        .departments
        .create_department(&payload.name)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(department))
}

/// Rename a department (admin only)
#[utoipa::path(
    put,
    path = "/api/v1/departments/{id}",
    params(("id" = Uuid, Path, description = "Department id")),
    request_body = DepartmentPayload,
    responses(
        (status = 200, description = "Department updated"),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "departments"
)]
pub async fn update_department(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DepartmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin().map_err(map_service_error)?;
    validate_input(&payload)?;

    let department = state
        .services
        .departments
        .update_department(id, &payload.name)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(department))
}

/// Delete a department and everything it owns (admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{id}",
    params(("id" = Uuid, Path, description = "Department id")),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "departments"
)]
pub async fn delete_department(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin().map_err(map_service_error)?;

    state
        .services
        .departments
        .delete_department(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}
