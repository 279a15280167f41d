/// Position endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects/:project_id/positions`
/// - `POST /v1/projects/:project_id/positions`
/// - `GET /v1/projects/:project_id/positions/:position_id`
/// - `PATCH /v1/projects/:project_id/positions/:position_id`
/// - `DELETE /v1/projects/:project_id/positions/:position_id`
///
/// Deleting a position still held by an employee fails with
/// `integrity_conflict`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    routes::{checked_color, color_or_default, project_access, DeleteResponse},
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::{
    auth::{authorization::AccessKind, middleware::AuthContext},
    models::position::{CreatePosition, Position, UpdatePosition},
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePositionRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    /// `#RRGGBB`, defaults to black
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePositionRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    pub color: Option<String>,
}

pub async fn list_positions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<Position>>> {
    project_access(&state, &auth, project_id, AccessKind::Read).await?;

    Ok(Json(Position::list_by_project(&state.db, project_id).await?))
}

pub async fn create_position(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreatePositionRequest>,
) -> ApiResult<(StatusCode, Json<Position>)> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;
    req.validate()?;

    let position = Position::create(
        &state.db,
        CreatePosition {
            project_id,
            title: req.title,
            color: color_or_default(req.color)?,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(position)))
}

pub async fn get_position(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, position_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Position>> {
    project_access(&state, &auth, project_id, AccessKind::Read).await?;

    let position = Position::find_in_project(&state.db, project_id, position_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Position"))?;

    Ok(Json(position))
}

pub async fn update_position(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, position_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<UpdatePositionRequest>,
) -> ApiResult<(StatusCode, Json<Position>)> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;
    req.validate()?;

    let color = req.color.map(checked_color).transpose()?;

    let position = Position::update(
        &state.db,
        project_id,
        position_id,
        UpdatePosition {
            title: req.title,
            color,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Position"))?;

    Ok((StatusCode::CREATED, Json(position)))
}

pub async fn delete_position(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, position_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<DeleteResponse>> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;

    if !Position::delete(&state.db, project_id, position_id).await? {
        return Err(ApiError::not_found("Position"));
    }

    Ok(Json(DeleteResponse::ok()))
}
