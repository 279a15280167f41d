/// Bearer-token authentication for Axum
///
/// [`jwt_auth_middleware`] validates the `Authorization: Bearer <token>`
/// header and inserts an [`AuthContext`] into the request extensions. Every
/// handler behind it receives the actor explicitly through
/// `Extension<AuthContext>`; there is no ambient "current user".
///
/// # Example
///
/// ```no_run
/// use axum::{extract::Request, middleware::{self, Next}, routing::get, Extension, Router};
/// use taskboard_shared::auth::middleware::{jwt_auth_middleware, AuthContext};
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
///     auth.user_id.to_string()
/// }
///
/// let secret = "an-example-secret-of-at-least-32-bytes".to_string();
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn(move |req: Request, next: Next| {
///         jwt_auth_middleware(secret.clone(), req, next)
///     }));
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};

/// The authenticated actor of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Authentication failures; all of them render as 401
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingCredentials,

    #[error("Expected Bearer token")]
    InvalidFormat,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::Expired,
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": "unauthorized",
            "message": self.to_string(),
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Extracts the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidFormat)
}

/// Validates the bearer access token in `headers`
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let claims = validate_access_token(token, secret)?;

    Ok(AuthContext::new(claims.sub))
}

/// JWT authentication middleware
///
/// # Errors
///
/// Responds 401 if the header is missing, is not a Bearer token, or the
/// token is invalid, expired, or a refresh token.
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth = authenticate(req.headers(), &secret).map_err(|e| {
        debug!(error = %e, path = %req.uri().path(), "Rejected unauthenticated request");
        e
    })?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
