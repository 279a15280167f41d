/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, token refresh, current user
/// - `projects`: Projects managed by or involving the caller
/// - `positions`, `task_types`, `employees`, `tasks`, `task_files`:
///   resources scoped to one project
///
/// Every project-scoped handler first calls [`project_access`] (or
/// `authorize` directly for chief checks) with the access kind of its verb,
/// then works on ids scoped to the path project.

pub mod auth;
pub mod employees;
pub mod health;
pub mod positions;
pub mod projects;
pub mod task_files;
pub mod task_types;
pub mod tasks;

use serde::{Deserialize, Serialize};
use taskboard_shared::auth::{
    authorization::{authorize, AccessKind, AccessRequest, ProjectAccess, PARTICIPANT_OR_MANAGER},
    middleware::AuthContext,
};
use taskboard_shared::models::{is_hex_color, DEFAULT_COLOR};
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Body of every successful DELETE
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResponse {
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn ok() -> Self {
        Self { deleted: true }
    }
}

/// Authorizes the caller as participant or manager of `project_id`
pub(crate) async fn project_access(
    state: &AppState,
    auth: &AuthContext,
    project_id: Uuid,
    kind: AccessKind,
) -> ApiResult<ProjectAccess> {
    let request = AccessRequest::new(auth.user_id, project_id, kind).allow(PARTICIPANT_OR_MANAGER);

    Ok(authorize(&state.db, request, &state.authz).await?)
}

/// Validates an optional color, falling back to the default
pub(crate) fn color_or_default(color: Option<String>) -> ApiResult<String> {
    match color {
        Some(color) => checked_color(color),
        None => Ok(DEFAULT_COLOR.to_string()),
    }
}

/// Validates a color given in an update
pub(crate) fn checked_color(color: String) -> ApiResult<String> {
    if is_hex_color(&color) {
        Ok(color)
    } else {
        Err(ApiError::invalid(
            "color",
            "Color must be a hex triplet such as #1A2B3C",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_or_default() {
        assert_eq!(color_or_default(None).unwrap(), "#000000");
        assert_eq!(color_or_default(Some("#abcdef".into())).unwrap(), "#abcdef");
        assert!(matches!(
            color_or_default(Some("red".into())),
            Err(ApiError::ValidationError(_))
        ));
    }
}
