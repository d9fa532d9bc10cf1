use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{
    created_response, map_service_error, success_response, PaginatedResponse, PaginationParams,
};
use crate::{
    auth::AuthUser,
    entities::{stock_take, stock_take_item},
    errors::ApiError,
    services::stock_takes::{summarize, CountEntry, StockTakeSummary},
    AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStockTakePayload {
    pub department_id: Uuid,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordCountsPayload {
    pub counts: Vec<CountEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockTakeResponse {
    #[schema(value_type = Object)]
    pub stock_take: stock_take::Model,
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<stock_take_item::Model>,
    pub summary: StockTakeSummary,
}

impl StockTakeResponse {
    fn new(stock_take: stock_take::Model, items: Vec<stock_take_item::Model>) -> Self {
        let summary = summarize(&items);
        Self {
            stock_take,
            items,
            summary,
        }
    }
}

/// Open a stock-take session for a department, snapshotting its assets (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/stock-takes",
    request_body = CreateStockTakePayload,
    responses(
        (status = 201, description = "Stock take opened", body = StockTakeResponse),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "stock-takes"
)]
pub async fn create_stock_take(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateStockTakePayload>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin().map_err(map_service_error)?;

    let (stock_take, items) = state
        .services
        .stock_takes
        .open(payload.department_id, user.user_id, payload.notes)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(StockTakeResponse::new(stock_take, items)))
}

/// List stock-take sessions
#[utoipa::path(
    get,
    path = "/api/v1/stock-takes",
    params(PaginationParams),
    responses((status = 200, description = "Stock takes listed")),
    security(("bearer_auth" = [])),
    tag = "stock-takes"
)]
pub async fn list_stock_takes(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (stock_takes, total) = state
        .services
        .stock_takes
        .list(pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        stock_takes,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Fetch one stock-take session with its items and summary
#[utoipa::path(
    get,
    path = "/api/v1/stock-takes/{id}",
    params(("id" = Uuid, Path, description = "Stock take id")),
    responses(
        (status = 200, description = "Stock take found", body = StockTakeResponse),
        (status = 404, description = "Stock take not found")
    ),
    security(("bearer_auth" = [])),
    tag = "stock-takes"
)]
pub async fn get_stock_take(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let (stock_take, items) = state
        .services
        .stock_takes
        .get_with_items(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(StockTakeResponse::new(stock_take, items)))
}

/// Record a batch of counts; the session status is re-derived afterwards (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/stock-takes/{id}/counts",
    params(("id" = Uuid, Path, description = "Stock take id")),
    request_body = RecordCountsPayload,
    responses(
        (status = 200, description = "Counts recorded", body = StockTakeResponse),
        (status = 400, description = "Item does not belong to this stock take"),
        (status = 404, description = "Stock take or item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "stock-takes"
)]
pub async fn record_counts(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordCountsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin().map_err(map_service_error)?;

    let (stock_take, items) = state
        .services
        .stock_takes
        .record_counts(id, payload.counts)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(StockTakeResponse::new(stock_take, items)))
}
