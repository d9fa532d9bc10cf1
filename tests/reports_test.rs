//! Report aggregation endpoints.

mod common;

use axum::http::StatusCode;
use common::{json_number, TestApp};
use serde_json::{json, Value};
use uuid::Uuid;

async fn create_asset_with(
    app: &TestApp,
    dept: Uuid,
    category: &str,
    cost: &str,
    purchase_date: &str,
) -> Value {
    let (status, body) = app
        .request(
            "POST",
            "/api/v1/assets",
            Some(&app.admin_token),
            Some(json!({
                "department_id": dept,
                "category": category,
                "purchase_cost": cost,
                "purchase_date": purchase_date,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn utilization_is_zero_with_no_assets() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            "GET",
            "/api/v1/reports/assets/summary",
            Some(&app.admin_token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_assets"], 0);
    assert_eq!(json_number(&body["utilization_rate"]), 0.0);
    assert_eq!(json_number(&body["avg_decision_hours"]), 0.0);
}

#[tokio::test]
async fn summary_aggregates_counts_value_and_utilization() {
    let app = TestApp::new().await;
    let dept = app.create_department("IT").await;

    let asset = create_asset_with(&app, dept, "technology", "1000.00", "2026-01-10").await;
    create_asset_with(&app, dept, "furniture", "500.00", "2026-02-20").await;

    // Approve a request so one asset becomes in_use
    let asset_id = asset["id"].as_str().unwrap();
    let (_, request) = app
        .request(
            "POST",
            &format!("/api/v1/assets/{asset_id}/requests"),
            Some(&app.staff_token),
            Some(json!({ "purpose": "project work" })),
        )
        .await;
    let request_id = request["id"].as_str().unwrap();
    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/requests/{request_id}/approve"),
            Some(&app.admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            "GET",
            "/api/v1/reports/assets/summary",
            Some(&app.admin_token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["total_assets"], 2);
    assert!((json_number(&body["total_value"]) - 1500.0).abs() < 0.01);
    assert!((json_number(&body["utilization_rate"]) - 50.0).abs() < 0.01);
    assert_eq!(body["resolved_requests"], 1);
    assert!(json_number(&body["avg_decision_hours"]) >= 0.0);
}

#[tokio::test]
async fn summary_filters_are_anded() {
    let app = TestApp::new().await;
    let it = app.create_department("IT").await;
    let finance = app.create_department("Finance").await;

    create_asset_with(&app, it, "technology", "100.00", "2026-01-01").await;
    create_asset_with(&app, it, "furniture", "200.00", "2026-01-01").await;
    create_asset_with(&app, finance, "technology", "400.00", "2026-01-01").await;

    let (status, body) = app
        .request(
            "GET",
            "/api/v1/reports/assets/summary?department=IT&category=technology",
            Some(&app.admin_token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_assets"], 1);
    assert!((json_number(&body["total_value"]) - 100.0).abs() < 0.01);
}

#[tokio::test]
async fn date_range_filters_purchases() {
    let app = TestApp::new().await;
    let dept = app.create_department("IT").await;

    create_asset_with(&app, dept, "technology", "100.00", "2025-06-01").await;
    create_asset_with(&app, dept, "technology", "100.00", "2026-06-01").await;

    let (status, body) = app
        .request(
            "GET",
            "/api/v1/reports/assets/summary?start_date=2026-01-01&end_date=2026-12-31",
            Some(&app.admin_token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_assets"], 1);
}

#[tokio::test]
async fn distribution_groups_by_each_key() {
    let app = TestApp::new().await;
    let it = app.create_department("IT").await;
    let finance = app.create_department("Finance").await;

    create_asset_with(&app, it, "technology", "1.00", "2026-01-01").await;
    create_asset_with(&app, it, "technology", "1.00", "2026-01-01").await;
    create_asset_with(&app, finance, "furniture", "1.00", "2026-01-01").await;

    let (status, by_category) = app
        .request(
            "GET",
            "/api/v1/reports/assets/distribution?group_by=category",
            Some(&app.admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let buckets = by_category.as_array().unwrap();
    assert_eq!(buckets.len(), 2);
    assert!(buckets
        .iter()
        .any(|b| b["label"] == "Technology" && b["count"] == 2));
    assert!(buckets
        .iter()
        .any(|b| b["label"] == "Furniture" && b["count"] == 1));

    let (_, by_department) = app
        .request(
            "GET",
            "/api/v1/reports/assets/distribution?group_by=department",
            Some(&app.admin_token),
            None,
        )
        .await;
    let buckets = by_department.as_array().unwrap();
    assert!(buckets.iter().any(|b| b["label"] == "IT" && b["count"] == 2));
    assert!(buckets
        .iter()
        .any(|b| b["label"] == "Finance" && b["count"] == 1));

    let (_, by_status) = app
        .request(
            "GET",
            "/api/v1/reports/assets/distribution?group_by=status",
            Some(&app.admin_token),
            None,
        )
        .await;
    let buckets = by_status.as_array().unwrap();
    assert!(buckets
        .iter()
        .any(|b| b["label"] == "Available" && b["count"] == 3));
}

#[tokio::test]
async fn report_rows_carry_renderer_columns() {
    let app = TestApp::new().await;
    let dept = app.create_department("IT").await;
    create_asset_with(&app, dept, "technology", "750.00", "2026-03-15").await;

    let (status, rows) = app
        .request(
            "GET",
            "/api/v1/reports/assets/rows?department=IT",
            Some(&app.admin_token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["asset_no"], "IT-technology-KOTDA-0001");
    assert_eq!(row["category"], "Technology");
    assert_eq!(row["status"], "Available");
    assert_eq!(row["department"], "IT");
    assert!(row["assigned_to"].is_null());
    assert_eq!(row["purchase_date"], "2026-03-15");
}

#[tokio::test]
async fn dashboard_reports_headline_numbers() {
    let app = TestApp::new().await;
    let dept = app.create_department("IT").await;
    let asset = app.create_asset(dept, "technology").await;
    app.create_asset(dept, "furniture").await;

    let asset_id = asset["id"].as_str().unwrap();
    app.request(
        "POST",
        &format!("/api/v1/assets/{asset_id}/requests"),
        Some(&app.staff_token),
        Some(json!({ "purpose": "needs" })),
    )
    .await;

    let (status, body) = app
        .request("GET", "/api/v1/dashboard", Some(&app.staff_token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_assets"], 2);
    assert_eq!(body["available_assets"], 2);
    assert_eq!(body["assigned_assets"], 0);
    assert_eq!(body["pending_requests"], 1);
    assert_eq!(body["recent_assets"].as_array().unwrap().len(), 2);
    assert_eq!(body["recent_requests"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reports_require_authentication() {
    let app = TestApp::new().await;
    let (status, _) = app
        .request("GET", "/api/v1/reports/assets/summary", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
