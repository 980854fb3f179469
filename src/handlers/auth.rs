use axum::extract::{Extension, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, Claims};
use crate::error::ApiError;
use crate::middleware::{require_user, ApiJson, ApiResponse, ApiResult};
use crate::server::AppState;
use crate::store::{Identity, Role};
use crate::users::{ProfileChanges, User};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

/// POST /api/auth/register - create a client account and issue a token
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<Value> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let display_name = payload
        .display_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| payload.username.clone());

    // Self-registration never grants admin or demo access.
    let user = state
        .users
        .create_user(&payload.username, &payload.password, &display_name, Role::Client)
        .await?;

    tracing::info!("Registered user '{}'", user.username);
    Ok(ApiResponse::created(session_payload(&user)?))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/auth/login - verify credentials and issue a token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Value> {
    let user = state
        .users
        .authenticate(&payload.username, &payload.password)
        .await?;

    Ok(ApiResponse::success(session_payload(&user)?))
}

/// GET /api/auth/me - current user profile
pub async fn me_get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Value> {
    let (user_id, _) = require_user(&identity)?;
    let user = state.users.find_by_id(&user_id).await?;
    Ok(ApiResponse::success(json!(user.profile())))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "currentPassword")]
    pub current_password: Option<String>,
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

/// PUT /api/auth/me - update display name and/or password, reissue the token
pub async fn me_put(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Value> {
    let (user_id, _) = require_user(&identity)?;

    if payload.new_password.is_some() && payload.current_password.is_none() {
        return Err(ApiError::bad_request(
            "Current password required to change password",
        ));
    }

    let user = state
        .users
        .update_profile(
            &user_id,
            ProfileChanges {
                display_name: payload.display_name,
                current_password: payload.current_password,
                new_password: payload.new_password,
            },
        )
        .await?;

    Ok(ApiResponse::success(session_payload(&user)?))
}

fn session_payload(user: &User) -> Result<Value, ApiError> {
    let claims = Claims::new(
        user.id.clone(),
        user.username.clone(),
        user.role,
        user.display_name.clone(),
    );
    let token = generate_jwt(&claims)?;

    Ok(json!({
        "user": user.profile(),
        "token": token,
    }))
}
