use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    auth::AuthUser,
    entities::asset_request::RequestStatus,
    errors::ApiError,
    services::requests::{RequestDecision, RequestWithContext},
    AppState,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitRequestPayload {
    /// Why the caller needs this asset
    #[validate(length(min = 1))]
    pub purpose: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRequestsQuery {
    pub status: Option<RequestStatus>,
}

/// Flattened view of a request for management screens.
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestView {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub asset_no: Option<String>,
    pub requested_by: Option<String>,
    pub purpose: Option<String>,
    pub status: RequestStatus,
    pub request_date: DateTime<Utc>,
    pub approval_date: Option<DateTime<Utc>>,
}

impl From<RequestWithContext> for RequestView {
    fn from(row: RequestWithContext) -> Self {
        Self {
            id: row.request.id,
            asset_id: row.request.asset_id,
            asset_no: row.asset.map(|a| a.asset_no),
            requested_by: row.requester.map(|u| u.username),
            purpose: row.request.purpose,
            status: row.request.status,
            request_date: row.request.request_date,
            approval_date: row.request.approval_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestQueues {
    pub pending: Vec<RequestView>,
    pub approved: Vec<RequestView>,
    pub rejected: Vec<RequestView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearHistoryResponse {
    pub removed: u64,
}

/// Submit an assignment request for an asset
#[utoipa::path(
    post,
    path = "/api/v1/assets/{id}/requests",
    params(("id" = Uuid, Path, description = "Asset id")),
    request_body = SubmitRequestPayload,
    responses(
        (status = 201, description = "Request submitted"),
        (status = 404, description = "Asset not found"),
        (status = 409, description = "A pending request already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "requests"
)]
pub async fn submit_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(asset_id): Path<Uuid>,
    Json(payload): Json<SubmitRequestPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let request = state
        .services
        .requests
        .submit(asset_id, user.user_id, Some(payload.purpose))
        .await
        .map_err(map_service_error)?;

    Ok(created_response(request))
}

/// List requests grouped by status, with asset and requester context (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/requests",
    params(ListRequestsQuery),
    responses((status = 200, description = "Requests listed", body = RequestQueues)),
    security(("bearer_auth" = [])),
    tag = "requests"
)]
pub async fn list_requests(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListRequestsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin().map_err(map_service_error)?;

    let rows = state
        .services
        .requests
        .list_with_context(query.status)
        .await
        .map_err(map_service_error)?;

    let mut queues = RequestQueues {
        pending: Vec::new(),
        approved: Vec::new(),
        rejected: Vec::new(),
    };

    for row in rows {
        let view = RequestView::from(row);
        match view.status {
            RequestStatus::Pending => queues.pending.push(view),
            RequestStatus::Approved => queues.approved.push(view),
            RequestStatus::Rejected => queues.rejected.push(view),
        }
    }

    Ok(success_response(queues))
}

/// Fetch one request
#[utoipa::path(
    get,
    path = "/api/v1/requests/{id}",
    params(("id" = Uuid, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request found"),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "requests"
)]
pub async fn get_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let request = state
        .services
        .requests
        .get_request(id)
        .await
        .map_err(map_service_error)?;

    // Staff may only inspect their own requests
    if !user.is_admin() && request.user_id != user.user_id {
        return Err(ApiError::ServiceError(crate::errors::ServiceError::Forbidden(
            "not your request".to_string(),
        )));
    }

    Ok(success_response(request))
}

/// Approve a pending request, assigning the asset to the requester (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/approve",
    params(("id" = Uuid, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request approved"),
        (status = 400, description = "Request already decided"),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "requests"
)]
pub async fn approve_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin().map_err(map_service_error)?;

    let request = state
        .services
        .requests
        .decide(id, RequestDecision::Approve)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(request))
}

/// Reject a pending request; the asset is untouched (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/reject",
    params(("id" = Uuid, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request rejected"),
        (status = 400, description = "Request already decided"),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "requests"
)]
pub async fn reject_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin().map_err(map_service_error)?;

    let request = state
        .services
        .requests
        .decide(id, RequestDecision::Reject)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(request))
}

/// Irreversibly delete all resolved requests (admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/requests/resolved",
    responses((status = 200, description = "History cleared", body = ClearHistoryResponse)),
    security(("bearer_auth" = [])),
    tag = "requests"
)]
pub async fn clear_request_history(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin().map_err(map_service_error)?;

    let removed = state
        .services
        .requests
        .clear_resolved()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ClearHistoryResponse { removed }))
}
