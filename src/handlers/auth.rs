use axum::{extract::State, response::IntoResponse};
use axum::Json;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::common::{map_service_error, success_response, validate_input};
use crate::{
    auth::{AuthError, AuthUser},
    entities::user,
    errors::{ApiError, ServiceError},
    AppState,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub is_admin: bool,
}

impl From<user::Model> for UserProfile {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            full_name: model.full_name,
            email: model.email,
            is_admin: model.is_admin,
        }
    }
}

/// Authenticate with username and password, receiving a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Wrong credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let account = user::Entity::find()
        .filter(user::Column::Username.eq(payload.username.clone()))
        .one(&*state.db)
        .await
        .map_err(|e| map_service_error(ServiceError::DatabaseError(e)))?;

    let Some(account) = account else {
        warn!(username = %payload.username, "Login attempt for unknown user");
        return Err(ApiError::ServiceError(ServiceError::Unauthorized(
            "wrong credentials".to_string(),
        )));
    };

    let valid = state
        .auth
        .verify_password(&account.password_hash, &payload.password)
        .map_err(|e| {
            ApiError::ServiceError(ServiceError::InternalError(format!(
                "password verification failed: {}",
                e
            )))
        })?;

    if !valid {
        warn!(username = %payload.username, "Login attempt with wrong password");
        return Err(ApiError::ServiceError(ServiceError::Unauthorized(
            "wrong credentials".to_string(),
        )));
    }

    let token = state.auth.issue_token(&account).map_err(|e| match e {
        AuthError::Internal(msg) => ApiError::ServiceError(ServiceError::InternalError(msg)),
        other => ApiError::ServiceError(ServiceError::Unauthorized(other.to_string())),
    })?;

    info!(username = %account.username, "User logged in");

    Ok(success_response(LoginResponse {
        token,
        user: account.into(),
    }))
}

/// Profile of the authenticated caller
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user profile", body = UserProfile),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let account = user::Entity::find_by_id(user.user_id)
        .one(&*state.db)
        .await
        .map_err(|e| map_service_error(ServiceError::DatabaseError(e)))?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(success_response(UserProfile::from(account)))
}
