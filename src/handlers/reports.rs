use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use super::common::{map_service_error, success_response};
use crate::{
    auth::AuthUser,
    entities::asset::{AssetCategory, AssetStatus},
    errors::ApiError,
    services::reports::{DistributionKey, ReportFilter},
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportFilterParams {
    pub department: Option<String>,
    pub category: Option<AssetCategory>,
    pub status: Option<AssetStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<ReportFilterParams> for ReportFilter {
    fn from(params: ReportFilterParams) -> Self {
        ReportFilter {
            department: params.department,
            category: params.category,
            status: params.status,
            start_date: params.start_date,
            end_date: params.end_date,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DistributionParams {
    pub group_by: DistributionKey,
    pub department: Option<String>,
    pub category: Option<AssetCategory>,
    pub status: Option<AssetStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Summary statistics over the filtered asset and request sets
#[utoipa::path(
    get,
    path = "/api/v1/reports/assets/summary",
    params(ReportFilterParams),
    responses((status = 200, description = "Summary report")),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn asset_summary(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ReportFilterParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = ReportFilter::from(params);

    let report = state
        .services
        .reports
        .asset_summary(&filter)
        .await
        .map_err(map_service_error)?;

    info!(total_assets = report.total_assets, "Generated asset summary report");

    Ok(success_response(report))
}

/// Asset counts grouped by category, status or department
#[utoipa::path(
    get,
    path = "/api/v1/reports/assets/distribution",
    params(DistributionParams),
    responses((status = 200, description = "Distribution report")),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn asset_distribution(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<DistributionParams>,
) -> Result<impl IntoResponse, ApiError> {
    let key = params.group_by;
    let filter = ReportFilter {
        department: params.department,
        category: params.category,
        status: params.status,
        start_date: params.start_date,
        end_date: params.end_date,
    };

    let buckets = state
        .services
        .reports
        .distribution(&filter, key)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(buckets))
}

/// Flat asset rows for external report renderers
#[utoipa::path(
    get,
    path = "/api/v1/reports/assets/rows",
    params(ReportFilterParams),
    responses((status = 200, description = "Report rows")),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn asset_rows(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ReportFilterParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = ReportFilter::from(params);

    let rows = state
        .services
        .reports
        .asset_rows(&filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(rows))
}

/// Headline numbers and recent activity
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses((status = 200, description = "Dashboard summary")),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .services
        .reports
        .dashboard()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(summary))
}
