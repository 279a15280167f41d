/// Authentication endpoints
///
/// This module provides user authentication endpoints:
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token
/// - `GET /v1/auth/me` - Current user (requires an access token)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::user::{CreateUser, User},
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    /// Checked for strength separately
    pub password: String,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,

    #[serde(flatten)]
    pub tokens: jwt::TokenPair,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,

    #[serde(flatten)]
    pub tokens: jwt::TokenPair,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "jdoe",
///   "email": "jdoe@example.com",
///   "first_name": "John",
///   "last_name": "Doe",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the user and a token pair:
///
/// ```json
/// {
///   "user": { "id": "uuid", "username": "jdoe", ... },
///   "access_token": "eyJ...",
///   "refresh_token": "eyJ...",
///   "expires_in": 86400
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or username/email already taken
///   (`integrity_conflict`)
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    req.validate()?;

    password::validate_password_strength(&req.password)
        .map_err(|msg| ApiError::invalid("password", msg))?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
        },
    )
    .await?;

    let tokens = jwt::issue_token_pair(user.id, state.jwt_secret())?;

    info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(RegisterResponse { user, tokens })))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// { "username": "jdoe", "password": "SecureP@ss123" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials or inactive account
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let invalid_credentials = || ApiError::Unauthorized("Invalid username or password".to_string());

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(invalid_credentials());
    }

    if !user.is_active {
        return Err(ApiError::Unauthorized("Account is disabled".to_string()));
    }

    User::update_last_login(&state.db, user.id).await?;

    let tokens = jwt::issue_token_pair(user.id, state.jwt_secret())?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        user_id: user.id,
        tokens,
    }))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token. An access token sent
/// here is rejected with 401.
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse {
        access_token,
        expires_in: jwt::TokenType::Access.default_expiration().num_seconds(),
    }))
}

/// Returns the authenticated user
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request(email: &str, first_name: &str) -> RegisterRequest {
        RegisterRequest {
            username: "jdoe".to_string(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: "Doe".to_string(),
            password: "SecureP@ss123".to_string(),
        }
    }

    #[test]
    fn test_register_request_validation() {
        assert!(register_request("jdoe@example.com", "John").validate().is_ok());
        assert!(register_request("not-an-email", "John").validate().is_err());
        assert!(register_request("jdoe@example.com", "").validate().is_err());
    }

    #[test]
    fn test_login_response_flattens_tokens() {
        let user_id = Uuid::new_v4();
        let response = LoginResponse {
            user_id,
            tokens: jwt::TokenPair {
                access_token: "a".to_string(),
                refresh_token: "r".to_string(),
                expires_in: 86400,
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["user_id"], user_id.to_string());
        assert_eq!(json["access_token"], "a");
        assert_eq!(json["refresh_token"], "r");
        assert_eq!(json["expires_in"], 86400);
    }
}
