/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`. Errors from the shared crate, sqlx,
/// request validation and JSON extraction all convert into [`ApiError`],
/// which renders as:
///
/// ```json
/// { "error": "validation_error", "message": "...", "details": [{ "field": "...", "message": "..." }] }
/// ```
///
/// # Status codes
///
/// | Variant | Status | `error` |
/// |---|---|---|
/// | `BadRequest` | 400 | `bad_request` |
/// | `ValidationError` | 400 | `validation_error` |
/// | `IntegrityConflict` | 400 | `integrity_conflict` |
/// | `Unauthorized` | 401 | `unauthorized` |
/// | `Forbidden` | 403 | `forbidden` |
/// | `NotFound` | 404 | `not_found` |
/// | `InternalError` | 500 | `internal_error` |

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::auth::{
    authorization::AuthzError, jwt::JwtError, middleware::AuthError, password::PasswordError,
};
use taskboard_shared::db;
use taskboard_shared::models::task::DoerListError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique, foreign key or restrict violation at the store
    #[error("Integrity conflict: {0}")]
    IntegrityConflict(String),

    /// Field-level validation failures, including cross-project references
    #[error("Validation failed: {} errors", .0.len())]
    ValidationError(Vec<ValidationErrorDetail>),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

impl ApiError {
    /// A validation error on a single field
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: field.into(),
            message: message.into(),
        }])
    }

    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{what} not found"))
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::IntegrityConflict(msg) => {
                (StatusCode::BAD_REQUEST, "integrity_conflict", msg, None)
            }
            ApiError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Logged here, never sent to the client
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if db::is_constraint_violation(&err) {
            let detail = match &err {
                sqlx::Error::Database(db_err) => match db_err.constraint() {
                    Some(constraint) => format!("Constraint violation: {constraint}"),
                    None => db_err.message().to_string(),
                },
                _ => err.to_string(),
            };
            return ApiError::IntegrityConflict(detail);
        }

        match err {
            sqlx::Error::RowNotFound => ApiError::not_found("Resource"),
            other => ApiError::InternalError(format!("Database error: {other}")),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| ValidationErrorDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {field}")),
                })
            })
            .collect();

        // field_errors() iterates a HashMap
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(details)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::ProjectNotFound(_) => ApiError::not_found("Project"),
            AuthzError::EmployeeNotFound(_) => ApiError::not_found("Employee"),
            AuthzError::Denied => {
                ApiError::Forbidden("You do not have permission to perform this action".to_string())
            }
            AuthzError::MissingTarget => {
                ApiError::InternalError("Chief check declared without a target".to_string())
            }
            AuthzError::Database(db_err) => ApiError::from(db_err),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {err}"))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => {
                ApiError::InternalError(format!("Token creation failed: {msg}"))
            }
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            other => ApiError::Unauthorized(format!("Invalid token: {other}")),
        }
    }
}

impl From<DoerListError> for ApiError {
    fn from(err: DoerListError) -> Self {
        ApiError::invalid("doers", err.to_string())
    }
}
