//! GridSet API Library
//!
//! Backend for the GridSet internal asset inventory: asset tracking,
//! assignment requests with an approval workflow, per-department stock-take
//! reconciliation, and report aggregation for external renderers.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth: Arc<auth::AuthService>,
    pub services: handlers::AppServices,
}

// Common response wrapper for status endpoints
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Builds the `/api/v1` router. Authentication is enforced per handler via
/// the `AuthUser` extractor; admin-only operations additionally check the
/// caller's role.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        // Auth
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
        // Departments
        .route(
            "/departments",
            get(handlers::departments::list_departments)
                .post(handlers::departments::create_department),
        )
        .route(
            "/departments/:id",
            get(handlers::departments::get_department)
                .put(handlers::departments::update_department)
                .delete(handlers::departments::delete_department),
        )
        // Assets
        .route(
            "/assets",
            get(handlers::assets::list_assets).post(handlers::assets::create_asset),
        )
        .route(
            "/assets/:id",
            get(handlers::assets::get_asset)
                .put(handlers::assets::update_asset)
                .delete(handlers::assets::delete_asset),
        )
        // Request workflow
        .route(
            "/assets/:id/requests",
            post(handlers::requests::submit_request),
        )
        .route("/requests", get(handlers::requests::list_requests))
        .route(
            "/requests/resolved",
            delete(handlers::requests::clear_request_history),
        )
        .route("/requests/:id", get(handlers::requests::get_request))
        .route(
            "/requests/:id/approve",
            post(handlers::requests::approve_request),
        )
        .route(
            "/requests/:id/reject",
            post(handlers::requests::reject_request),
        )
        // Stock takes
        .route(
            "/stock-takes",
            get(handlers::stock_takes::list_stock_takes)
                .post(handlers::stock_takes::create_stock_take),
        )
        .route("/stock-takes/:id", get(handlers::stock_takes::get_stock_take))
        .route(
            "/stock-takes/:id/counts",
            post(handlers::stock_takes::record_counts),
        )
        // Reports
        .route(
            "/reports/assets/summary",
            get(handlers::reports::asset_summary),
        )
        .route(
            "/reports/assets/distribution",
            get(handlers::reports::asset_distribution),
        )
        .route("/reports/assets/rows", get(handlers::reports::asset_rows))
        .route("/dashboard", get(handlers::reports::dashboard))
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "gridset-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
