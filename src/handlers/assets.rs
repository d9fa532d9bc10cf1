use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginatedResponse,
};
use crate::{
    auth::AuthUser,
    entities::asset,
    entities::asset::{AssetCategory, AssetStatus},
    errors::ApiError,
    services::assets::{AssetListFilter, CreateAssetInput, UpdateAssetInput},
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListAssetsQuery {
    /// Free-text search over asset number, serial number and description
    pub q: Option<String>,
    pub category: Option<AssetCategory>,
    pub status: Option<AssetStatus>,
    pub department_id: Option<Uuid>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetDetailResponse {
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub asset: asset::Model,
    /// Whether the caller may submit a new assignment request for this asset
    pub can_request: bool,
}

/// List assets with optional filters
#[utoipa::path(
    get,
    path = "/api/v1/assets",
    params(ListAssetsQuery),
    responses((status = 200, description = "Assets listed")),
    security(("bearer_auth" = [])),
    tag = "assets"
)]
pub async fn list_assets(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListAssetsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = AssetListFilter {
        q: query.q,
        category: query.category,
        status: query.status,
        department_id: query.department_id,
    };

    let (assets, total) = state
        .services
        .assets
        .list_assets(filter, query.page, query.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        assets,
        query.page,
        query.per_page,
        total,
    )))
}

/// Fetch one asset together with the caller's `can_request` flag
#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}",
    params(("id" = Uuid, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Asset found", body = AssetDetailResponse),
        (status = 404, description = "Asset not found")
    ),
    security(("bearer_auth" = [])),
    tag = "assets"
)]
pub async fn get_asset(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let asset = state
        .services
        .assets
        .get_asset(id)
        .await
        .map_err(map_service_error)?;

    let can_request = !state
        .services
        .requests
        .has_pending_request(asset.id, user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(AssetDetailResponse { asset, can_request }))
}

/// Create an asset, allocating its asset number (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/assets",
    request_body = CreateAssetInput,
    responses(
        (status = 201, description = "Asset created"),
        (status = 400, description = "Department or category missing"),
        (status = 409, description = "Asset number space exhausted")
    ),
    security(("bearer_auth" = [])),
    tag = "assets"
)]
pub async fn create_asset(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateAssetInput>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin().map_err(map_service_error)?;
    validate_input(&payload)?;

    let asset = state
        .services
        .assets
        .create_asset(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(asset))
}

/// Update an asset's descriptive fields (admin only; the asset number is immutable)
#[utoipa::path(
    put,
    path = "/api/v1/assets/{id}",
    params(("id" = Uuid, Path, description = "Asset id")),
    request_body = UpdateAssetInput,
    responses(
        (status = 200, description = "Asset updated"),
        (status = 404, description = "Asset not found")
    ),
    security(("bearer_auth" = [])),
    tag = "assets"
)]
pub async fn update_asset(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAssetInput>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin().map_err(map_service_error)?;
    validate_input(&payload)?;

    let asset = state
        .services
        .assets
        .update_asset(id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(asset))
}

/// Delete an asset and its dependent records (admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/assets/{id}",
    params(("id" = Uuid, Path, description = "Asset id")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 404, description = "Asset not found")
    ),
    security(("bearer_auth" = [])),
    tag = "assets"
)]
pub async fn delete_asset(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_admin().map_err(map_service_error)?;

    state
        .services
        .assets
        .delete_asset(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}
