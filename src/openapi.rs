use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GridSet API",
        version = "0.1.0",
        description = r#"
# GridSet Asset Inventory API

Backend for the GridSet internal asset inventory.

## Features

- **Asset Management**: Track organizational assets with generated asset numbers
- **Assignment Requests**: Staff request assets; administrators approve or reject
- **Stock Takes**: Per-department reconciliation sessions with derived statuses
- **Reports**: Filtered summaries, distributions and flat rows for external renderers

## Authentication

All endpoints except `/auth/login`, `/status` and `/health` require a JWT bearer token:

```
Authorization: Bearer <your-jwt-token>
```
"#
    ),
    paths(
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::departments::list_departments,
        crate::handlers::departments::get_department,
        crate::handlers::departments::create_department,
        crate::handlers::departments::update_department,
        crate::handlers::departments::delete_department,
        crate::handlers::assets::list_assets,
        crate::handlers::assets::get_asset,
        crate::handlers::assets::create_asset,
        crate::handlers::assets::update_asset,
        crate::handlers::assets::delete_asset,
        crate::handlers::requests::submit_request,
        crate::handlers::requests::list_requests,
        crate::handlers::requests::get_request,
        crate::handlers::requests::approve_request,
        crate::handlers::requests::reject_request,
        crate::handlers::requests::clear_request_history,
        crate::handlers::stock_takes::create_stock_take,
        crate::handlers::stock_takes::list_stock_takes,
        crate::handlers::stock_takes::get_stock_take,
        crate::handlers::stock_takes::record_counts,
        crate::handlers::reports::asset_summary,
        crate::handlers::reports::asset_distribution,
        crate::handlers::reports::asset_rows,
        crate::handlers::reports::dashboard,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::entities::asset::AssetCategory,
        crate::entities::asset::AssetStatus,
        crate::entities::asset_request::RequestStatus,
        crate::entities::stock_take::StockTakeStatus,
        crate::handlers::auth::LoginRequest,
        crate::handlers::auth::LoginResponse,
        crate::handlers::auth::UserProfile,
        crate::handlers::departments::DepartmentPayload,
        crate::handlers::assets::AssetDetailResponse,
        crate::handlers::requests::SubmitRequestPayload,
        crate::handlers::requests::RequestView,
        crate::handlers::requests::RequestQueues,
        crate::handlers::requests::ClearHistoryResponse,
        crate::handlers::stock_takes::CreateStockTakePayload,
        crate::handlers::stock_takes::RecordCountsPayload,
        crate::handlers::stock_takes::StockTakeResponse,
        crate::services::assets::CreateAssetInput,
        crate::services::assets::UpdateAssetInput,
        crate::services::requests::RequestDecision,
        crate::services::stock_takes::CountEntry,
        crate::services::stock_takes::StockTakeSummary,
        crate::services::reports::ReportFilter,
        crate::services::reports::AssetSummaryReport,
        crate::services::reports::DistributionKey,
        crate::services::reports::DistributionBucket,
        crate::services::reports::AssetReportRow,
        crate::services::reports::DashboardSummary,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "departments", description = "Department management"),
        (name = "assets", description = "Asset management"),
        (name = "requests", description = "Assignment request workflow"),
        (name = "stock-takes", description = "Stock-take reconciliation"),
        (name = "reports", description = "Reports and dashboard"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI mounted at `/docs`, serving the generated document.
pub fn swagger_router() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
