/// Task file endpoints, mounted under
/// `/v1/projects/:project_id/tasks/:task_id/files`
///
/// Files are recorded by path only. A bare file name is stored under
/// `files/YYYY/MM/DD/`; blank names, absolute paths and `..` segments are
/// rejected.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    routes::{project_access, DeleteResponse},
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use taskboard_shared::{
    auth::{authorization::AccessKind, middleware::AuthContext},
    models::{
        task::Task,
        task_file::{storage_path, TaskFile},
    },
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskFileRequest {
    #[validate(length(min = 1, max = 255, message = "File name must be 1-255 characters"))]
    pub file: String,
}

/// The task must exist in the path project
async fn task_in_project(state: &AppState, project_id: Uuid, task_id: Uuid) -> ApiResult<Task> {
    Task::find_in_project(&state.db, project_id, task_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))
}

pub async fn list_files(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, task_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<TaskFile>>> {
    project_access(&state, &auth, project_id, AccessKind::Read).await?;
    let task = task_in_project(&state, project_id, task_id).await?;

    Ok(Json(TaskFile::list_by_task(&state.db, task.id).await?))
}

pub async fn create_file(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, task_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<CreateTaskFileRequest>,
) -> ApiResult<(StatusCode, Json<TaskFile>)> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;
    req.validate()?;
    let task = task_in_project(&state, project_id, task_id).await?;

    let path = storage_path(&req.file, Utc::now())
        .map_err(|err| ApiError::invalid("file", err.to_string()))?;

    let file = TaskFile::create(&state.db, task.id, path).await?;

    Ok((StatusCode::CREATED, Json(file)))
}

pub async fn delete_file(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, task_id, file_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> ApiResult<Json<DeleteResponse>> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;
    let task = task_in_project(&state, project_id, task_id).await?;

    if !TaskFile::delete(&state.db, task.id, file_id).await? {
        return Err(ApiError::not_found("File"));
    }

    Ok(Json(DeleteResponse::ok()))
}
