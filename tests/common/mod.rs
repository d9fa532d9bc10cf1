//! Test harness spinning up the full application state over an in-memory
//! SQLite database, with one admin and one staff account seeded.

// Not every test binary touches every helper.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use gridset_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::user,
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};

pub const ADMIN_PASSWORD: &str = "admin-password-1";
pub const STAFF_PASSWORD: &str = "staff-password-1";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub admin: user::Model,
    pub staff: user::Model,
    pub admin_token: String,
    pub staff_token: String,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_48chars".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single pooled connection keeps the in-memory database alive and
        // shared across the whole test.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool).await.expect("migrations failed");
        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        tokio::spawn(events::process_events(event_rx));

        let auth = Arc::new(AuthService::new(AuthConfig::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            cfg.auth_audience.clone(),
            Duration::from_secs(3600),
        )));

        let services = AppServices::new(
            db_arc.clone(),
            Arc::new(event_sender.clone()),
            &cfg.org_tag,
        );

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            auth: auth.clone(),
            services,
        };

        let admin = seed_user(&state, &auth, "admin", ADMIN_PASSWORD, true).await;
        let staff = seed_user(&state, &auth, "staff", STAFF_PASSWORD, false).await;

        let admin_token = auth.issue_token(&admin).expect("admin token");
        let staff_token = auth.issue_token(&staff).expect("staff token");

        let router = Router::new()
            .nest("/api/v1", gridset_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            admin,
            staff,
            admin_token,
            staff_token,
        }
    }

    /// Issue a request against the router and decode the JSON body.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request build"),
            None => builder.body(Body::empty()).expect("request build"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body read");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, value)
    }

    /// Create a department through the API, returning its id.
    pub async fn create_department(&self, name: &str) -> Uuid {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/departments",
                Some(&self.admin_token),
                Some(serde_json::json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "department create: {body}");
        parse_uuid(&body["id"])
    }

    /// Create an asset through the API, returning the full response body.
    pub async fn create_asset(&self, department_id: Uuid, category: &str) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/assets",
                Some(&self.admin_token),
                Some(serde_json::json!({
                    "department_id": department_id,
                    "category": category,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "asset create: {body}");
        body
    }
}

async fn seed_user(
    state: &AppState,
    auth: &AuthService,
    username: &str,
    password: &str,
    is_admin: bool,
) -> user::Model {
    let password_hash = auth.hash_password(password).expect("hash password");

    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        full_name: Set(Some(format!("{} user", username))),
        email: Set(Some(format!("{}@gridset.test", username))),
        password_hash: Set(password_hash),
        is_admin: Set(is_admin),
        created_at: Set(Utc::now()),
    }
    .insert(&*state.db)
    .await
    .expect("seed user")
}

pub fn parse_uuid(value: &Value) -> Uuid {
    value
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(|| panic!("expected uuid, got {value}"))
}

/// Decimal fields serialize as strings; numbers may come back as floats.
/// Normalize either into an f64 for comparisons.
pub fn json_number(value: &Value) -> f64 {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse::<f64>().ok()))
        .unwrap_or_else(|| panic!("expected number, got {value}"))
}
