//! Stock-take reconciliation sessions.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};
use uuid::Uuid;

async fn setup_department_with_assets(app: &TestApp, count: usize) -> Uuid {
    let dept = app.create_department("Logistics").await;
    for _ in 0..count {
        app.create_asset(dept, "machinery").await;
    }
    dept
}

async fn open_stock_take(app: &TestApp, dept: Uuid) -> Value {
    let (status, body) = app
        .request(
            "POST",
            "/api/v1/stock-takes",
            Some(&app.admin_token),
            Some(json!({ "department_id": dept, "notes": "quarterly count" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

fn item_ids(body: &Value) -> Vec<String> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

async fn record(app: &TestApp, stock_take_id: &str, counts: Value) -> (StatusCode, Value) {
    app.request(
        "POST",
        &format!("/api/v1/stock-takes/{stock_take_id}/counts"),
        Some(&app.admin_token),
        Some(json!({ "counts": counts })),
    )
    .await
}

#[tokio::test]
async fn opening_snapshots_every_department_asset() {
    let app = TestApp::new().await;
    let dept = setup_department_with_assets(&app, 3).await;

    let body = open_stock_take(&app, dept).await;

    assert_eq!(body["stock_take"]["status"], "in_progress");
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    for item in items {
        assert_eq!(item["expected_quantity"], 1);
        assert_eq!(item["actual_quantity"], 0);
        assert_eq!(item["counted"], false);
    }
    assert_eq!(body["summary"]["total_items"], 3);
    assert_eq!(body["summary"]["pending_items"], 3);
}

#[tokio::test]
async fn assets_from_other_departments_are_not_snapshotted() {
    let app = TestApp::new().await;
    let dept = setup_department_with_assets(&app, 2).await;
    let other = app.create_department("Elsewhere").await;
    app.create_asset(other, "furniture").await;

    let body = open_stock_take(&app, dept).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn matching_counts_complete_the_session() {
    let app = TestApp::new().await;
    let dept = setup_department_with_assets(&app, 2).await;
    let body = open_stock_take(&app, dept).await;
    let stock_take_id = body["stock_take"]["id"].as_str().unwrap().to_string();
    let ids = item_ids(&body);

    let counts: Vec<Value> = ids
        .iter()
        .map(|id| json!({ "item_id": id, "actual_quantity": 1 }))
        .collect();
    let (status, updated) = record(&app, &stock_take_id, json!(counts)).await;

    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["stock_take"]["status"], "completed");
    assert_eq!(updated["summary"]["counted_items"], 2);
    assert_eq!(updated["summary"]["mismatched_items"], 0);
}

#[tokio::test]
async fn counting_an_asset_as_missing_flags_discrepancy() {
    let app = TestApp::new().await;
    let dept = setup_department_with_assets(&app, 2).await;
    let body = open_stock_take(&app, dept).await;
    let stock_take_id = body["stock_take"]["id"].as_str().unwrap().to_string();
    let ids = item_ids(&body);

    // One asset present, one counted as missing (0 ≠ expected 1)
    let (status, updated) = record(
        &app,
        &stock_take_id,
        json!([
            { "item_id": ids[0], "actual_quantity": 1 },
            { "item_id": ids[1], "actual_quantity": 0, "notes": "not found on the floor" },
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["stock_take"]["status"], "discrepancy");
    assert_eq!(updated["summary"]["mismatched_items"], 1);
}

#[tokio::test]
async fn partial_counts_keep_the_session_in_progress() {
    let app = TestApp::new().await;
    let dept = setup_department_with_assets(&app, 3).await;
    let body = open_stock_take(&app, dept).await;
    let stock_take_id = body["stock_take"]["id"].as_str().unwrap().to_string();
    let ids = item_ids(&body);

    let (status, updated) = record(
        &app,
        &stock_take_id,
        json!([{ "item_id": ids[0], "actual_quantity": 1 }]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["stock_take"]["status"], "in_progress");
    assert_eq!(updated["summary"]["counted_items"], 1);
    assert_eq!(updated["summary"]["pending_items"], 2);
}

// Statuses are re-derived on every submission, so editing a mismatched count
// back to its expected value moves the session out of discrepancy again.
#[tokio::test]
async fn editing_counts_oscillates_the_status() {
    let app = TestApp::new().await;
    let dept = setup_department_with_assets(&app, 1).await;
    let body = open_stock_take(&app, dept).await;
    let stock_take_id = body["stock_take"]["id"].as_str().unwrap().to_string();
    let ids = item_ids(&body);

    let (_, updated) = record(
        &app,
        &stock_take_id,
        json!([{ "item_id": ids[0], "actual_quantity": 5 }]),
    )
    .await;
    assert_eq!(updated["stock_take"]["status"], "discrepancy");

    let (_, updated) = record(
        &app,
        &stock_take_id,
        json!([{ "item_id": ids[0], "actual_quantity": 1 }]),
    )
    .await;
    assert_eq!(updated["stock_take"]["status"], "completed");
}

#[tokio::test]
async fn items_from_another_session_are_rejected() {
    let app = TestApp::new().await;
    let dept_a = setup_department_with_assets(&app, 1).await;
    let dept_b = app.create_department("Other").await;
    app.create_asset(dept_b, "vehicles").await;

    let session_a = open_stock_take(&app, dept_a).await;
    let session_b = open_stock_take(&app, dept_b).await;

    let foreign_item = &item_ids(&session_b)[0];
    let stock_take_a = session_a["stock_take"]["id"].as_str().unwrap().to_string();

    let (status, body) = record(
        &app,
        &stock_take_a,
        json!([{ "item_id": foreign_item, "actual_quantity": 1 }]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"].as_str().unwrap_or("").contains("belong"),
        "unexpected message: {body}"
    );
}

#[tokio::test]
async fn negative_counts_are_rejected() {
    let app = TestApp::new().await;
    let dept = setup_department_with_assets(&app, 1).await;
    let body = open_stock_take(&app, dept).await;
    let stock_take_id = body["stock_take"]["id"].as_str().unwrap().to_string();
    let ids = item_ids(&body);

    let (status, _) = record(
        &app,
        &stock_take_id,
        json!([{ "item_id": ids[0], "actual_quantity": -1 }]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn staff_cannot_open_or_count() {
    let app = TestApp::new().await;
    let dept = setup_department_with_assets(&app, 1).await;

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/stock-takes",
            Some(&app.staff_token),
            Some(json!({ "department_id": dept })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // But they can inspect sessions
    let session = open_stock_take(&app, dept).await;
    let id = session["stock_take"]["id"].as_str().unwrap();
    let (status, _) = app
        .request(
            "GET",
            &format!("/api/v1/stock-takes/{id}"),
            Some(&app.staff_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_department_is_a_not_found() {
    let app = TestApp::new().await;
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/stock-takes",
            Some(&app.admin_token),
            Some(json!({ "department_id": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
