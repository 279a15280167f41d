/// Task type endpoints, mounted under `/v1/projects/:project_id/task-types`
///
/// Same shape as positions: list/create on the collection, get/patch/delete
/// on the item. A task type still used by tasks cannot be deleted.

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
    models::task_type::{CreateTaskType, TaskType, UpdateTaskType},
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskTypeRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskTypeRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    pub color: Option<String>,
}

pub async fn list_task_types(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<TaskType>>> {
    project_access(&state, &auth, project_id, AccessKind::Read).await?;

    Ok(Json(TaskType::list_by_project(&state.db, project_id).await?))
}

pub async fn create_task_type(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateTaskTypeRequest>,
) -> ApiResult<(StatusCode, Json<TaskType>)> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;
    req.validate()?;

    let task_type = TaskType::create(
        &state.db,
        CreateTaskType {
            project_id,
            title: req.title,
            color: color_or_default(req.color)?,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task_type)))
}

pub async fn get_task_type(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, task_type_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<TaskType>> {
    project_access(&state, &auth, project_id, AccessKind::Read).await?;

    let task_type = TaskType::find_in_project(&state.db, project_id, task_type_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task type"))?;

    Ok(Json(task_type))
}

pub async fn update_task_type(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, task_type_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<UpdateTaskTypeRequest>,
) -> ApiResult<(StatusCode, Json<TaskType>)> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;
    req.validate()?;

    let color = req.color.map(checked_color).transpose()?;

    let task_type = TaskType::update(
        &state.db,
        project_id,
        task_type_id,
        UpdateTaskType {
            title: req.title,
            color,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Task type"))?;

    Ok((StatusCode::CREATED, Json(task_type)))
}

pub async fn delete_task_type(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, task_type_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<DeleteResponse>> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;

    if !TaskType::delete(&state.db, project_id, task_type_id).await? {
        return Err(ApiError::not_found("Task type"));
    }

    Ok(Json(DeleteResponse::ok()))
}
