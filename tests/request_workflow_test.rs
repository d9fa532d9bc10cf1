//! Assignment request workflow: submit, decide, clear history.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

async fn setup_asset(app: &TestApp) -> (uuid::Uuid, String) {
    let dept = app.create_department("IT").await;
    let asset = app.create_asset(dept, "technology").await;
    let asset_id = common::parse_uuid(&asset["id"]);
    (asset_id, asset["asset_no"].as_str().unwrap().to_string())
}

async fn submit(app: &TestApp, asset_id: uuid::Uuid, token: &str) -> (StatusCode, serde_json::Value) {
    app.request(
        "POST",
        &format!("/api/v1/assets/{asset_id}/requests"),
        Some(token),
        Some(json!({ "purpose": "Laptop for field work" })),
    )
    .await
}

#[tokio::test]
async fn submit_creates_pending_request() {
    let app = TestApp::new().await;
    let (asset_id, _) = setup_asset(&app).await;

    let (status, body) = submit(&app, asset_id, &app.staff_token).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["status"], "pending");
    assert!(body["approval_date"].is_null());

    // The asset detail page now reports the caller cannot request again
    let (status, detail) = app
        .request(
            "GET",
            &format!("/api/v1/assets/{asset_id}"),
            Some(&app.staff_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["can_request"], false);
}

#[tokio::test]
async fn duplicate_pending_submission_is_rejected() {
    let app = TestApp::new().await;
    let (asset_id, _) = setup_asset(&app).await;

    let (status, _) = submit(&app, asset_id, &app.staff_token).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = submit(&app, asset_id, &app.staff_token).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(
        body["message"].as_str().unwrap_or("").contains("pending"),
        "unexpected message: {body}"
    );
}

#[tokio::test]
async fn different_users_may_request_the_same_asset() {
    let app = TestApp::new().await;
    let (asset_id, _) = setup_asset(&app).await;

    let (status, _) = submit(&app, asset_id, &app.staff_token).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = submit(&app, asset_id, &app.admin_token).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn approval_assigns_the_asset() {
    let app = TestApp::new().await;
    let (asset_id, _) = setup_asset(&app).await;

    let (_, request) = submit(&app, asset_id, &app.staff_token).await;
    let request_id = request["id"].as_str().unwrap();

    let (status, decided) = app
        .request(
            "POST",
            &format!("/api/v1/requests/{request_id}/approve"),
            Some(&app.admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{decided}");
    assert_eq!(decided["status"], "approved");
    assert!(!decided["approval_date"].is_null());

    let (_, detail) = app
        .request(
            "GET",
            &format!("/api/v1/assets/{asset_id}"),
            Some(&app.admin_token),
            None,
        )
        .await;
    assert_eq!(detail["status"], "in_use");
    assert_eq!(
        detail["assigned_to"].as_str().unwrap(),
        app.staff.id.to_string()
    );
}

#[tokio::test]
async fn rejection_never_touches_the_asset() {
    let app = TestApp::new().await;
    let (asset_id, _) = setup_asset(&app).await;

    let (_, request) = submit(&app, asset_id, &app.staff_token).await;
    let request_id = request["id"].as_str().unwrap();

    let (status, decided) = app
        .request(
            "POST",
            &format!("/api/v1/requests/{request_id}/reject"),
            Some(&app.admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decided["status"], "rejected");
    assert!(!decided["approval_date"].is_null());

    let (_, detail) = app
        .request(
            "GET",
            &format!("/api/v1/assets/{asset_id}"),
            Some(&app.admin_token),
            None,
        )
        .await;
    assert_eq!(detail["status"], "available");
    assert!(detail["assigned_to"].is_null());
}

#[tokio::test]
async fn terminal_requests_cannot_be_decided_again() {
    let app = TestApp::new().await;
    let (asset_id, _) = setup_asset(&app).await;

    let (_, request) = submit(&app, asset_id, &app.staff_token).await;
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
            "POST",
            &format!("/api/v1/requests/{request_id}/reject"),
            Some(&app.admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"].as_str().unwrap_or("").contains("already"),
        "unexpected message: {body}"
    );
}

#[tokio::test]
async fn staff_cannot_decide_requests() {
    let app = TestApp::new().await;
    let (asset_id, _) = setup_asset(&app).await;

    let (_, request) = submit(&app, asset_id, &app.staff_token).await;
    let request_id = request["id"].as_str().unwrap();

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/requests/{request_id}/approve"),
            Some(&app.staff_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn resubmission_is_allowed_after_resolution() {
    let app = TestApp::new().await;
    let (asset_id, _) = setup_asset(&app).await;

    let (_, request) = submit(&app, asset_id, &app.staff_token).await;
    let request_id = request["id"].as_str().unwrap();

    app.request(
        "POST",
        &format!("/api/v1/requests/{request_id}/reject"),
        Some(&app.admin_token),
        None,
    )
    .await;

    let (status, _) = submit(&app, asset_id, &app.staff_token).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn clearing_history_removes_only_resolved_requests() {
    let app = TestApp::new().await;
    let dept = app.create_department("IT").await;
    let asset_a = common::parse_uuid(&app.create_asset(dept, "technology").await["id"]);
    let asset_b = common::parse_uuid(&app.create_asset(dept, "technology").await["id"]);

    let (_, resolved) = submit(&app, asset_a, &app.staff_token).await;
    let resolved_id = resolved["id"].as_str().unwrap().to_string();
    app.request(
        "POST",
        &format!("/api/v1/requests/{resolved_id}/approve"),
        Some(&app.admin_token),
        None,
    )
    .await;

    let (_, pending) = submit(&app, asset_b, &app.admin_token).await;
    let pending_id = pending["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            "DELETE",
            "/api/v1/requests/resolved",
            Some(&app.admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);

    let (_, queues) = app
        .request("GET", "/api/v1/requests", Some(&app.admin_token), None)
        .await;
    assert_eq!(queues["approved"].as_array().unwrap().len(), 0);
    let pending_list = queues["pending"].as_array().unwrap();
    assert_eq!(pending_list.len(), 1);
    assert_eq!(pending_list[0]["id"].as_str().unwrap(), pending_id);
}

#[tokio::test]
async fn management_listing_groups_by_status() {
    let app = TestApp::new().await;
    let dept = app.create_department("IT").await;
    let asset_a = common::parse_uuid(&app.create_asset(dept, "technology").await["id"]);
    let asset_b = common::parse_uuid(&app.create_asset(dept, "furniture").await["id"]);

    let (_, r1) = submit(&app, asset_a, &app.staff_token).await;
    submit(&app, asset_b, &app.staff_token).await;

    app.request(
        "POST",
        &format!(
            "/api/v1/requests/{}/approve",
            r1["id"].as_str().unwrap()
        ),
        Some(&app.admin_token),
        None,
    )
    .await;

    let (status, queues) = app
        .request("GET", "/api/v1/requests", Some(&app.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queues["pending"].as_array().unwrap().len(), 1);
    assert_eq!(queues["approved"].as_array().unwrap().len(), 1);
    assert_eq!(queues["rejected"].as_array().unwrap().len(), 0);

    // Context is joined in for the management view
    let approved = &queues["approved"][0];
    assert_eq!(approved["requested_by"], "staff");
    assert!(approved["asset_no"].as_str().unwrap().starts_with("IT-"));

    // Staff are not allowed to see the management listing
    let (status, _) = app
        .request("GET", "/api/v1/requests", Some(&app.staff_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
