/// Task endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects/:project_id/tasks` - Newest first, with doers
/// - `POST /v1/projects/:project_id/tasks`
/// - `GET /v1/projects/:project_id/tasks/:task_id`
/// - `PATCH /v1/projects/:project_id/tasks/:task_id`
/// - `DELETE /v1/projects/:project_id/tasks/:task_id`
/// - `PATCH /v1/projects/:project_id/tasks/:task_id/doers` - Assign a doer
/// - `DELETE /v1/projects/:project_id/tasks/:task_id/doers` - Unassign a doer
///
/// # Doers
///
/// Create and update take doers as a comma-separated string of employee ids:
///
/// ```json
/// { "doers": "67e55044-10b1-426f-9247-bb680e5fe0c8,a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8" }
/// ```
///
/// Omitting `doers` on create leaves the task unassigned; on update it keeps
/// the current set. An empty string is rejected.
///
/// Assigning or unassigning a single doer needs authority over that
/// employee: the project manager, or the employee's chief.

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
use chrono::{DateTime, Utc};
use serde::Deserialize;
use taskboard_shared::{
    auth::{
        authorization::{authorize, AccessKind, AccessRequest, Permission},
        middleware::AuthContext,
    },
    models::{
        employee::Employee,
        task::{parse_doer_ids, CreateTask, Task, TaskWithDoers, UpdateTask},
        task_type::TaskType,
    },
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    pub task_type_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[serde(default)]
    pub content: String,

    #[validate(range(min = 0, message = "Weight must not be negative"))]
    pub weight: i32,

    pub dead_line: DateTime<Utc>,

    #[serde(default)]
    pub is_done: bool,

    /// Comma-separated employee ids
    pub doers: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    pub task_type_id: Option<Uuid>,

    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    pub content: Option<String>,

    #[validate(range(min = 0, message = "Weight must not be negative"))]
    pub weight: Option<i32>,

    pub dead_line: Option<DateTime<Utc>>,
    pub is_done: Option<bool>,

    /// Replaces the doer set when present
    pub doers: Option<String>,
}

/// Body of the doer assign/unassign endpoints
#[derive(Debug, Deserialize)]
pub struct DoerRequest {
    pub doer_id: Uuid,
}

async fn ensure_task_type_in_project(
    state: &AppState,
    project_id: Uuid,
    task_type_id: Uuid,
) -> ApiResult<()> {
    if TaskType::find_in_project(&state.db, project_id, task_type_id)
        .await?
        .is_none()
    {
        return Err(ApiError::invalid(
            "task_type_id",
            "Task type does not belong to this project",
        ));
    }
    Ok(())
}

/// Parses a doer list and checks every id against the project's employees
async fn resolve_doers(state: &AppState, project_id: Uuid, raw: &str) -> ApiResult<Vec<Uuid>> {
    let ids = parse_doer_ids(raw)?;

    let employees = Employee::list_by_project(&state.db, project_id).await?;
    if let Some(stranger) = ids
        .iter()
        .find(|id| !employees.iter().any(|e| e.id == **id))
    {
        return Err(ApiError::invalid(
            "doers",
            format!("Employee {stranger} is not part of this project"),
        ));
    }

    Ok(ids)
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<TaskWithDoers>>> {
    project_access(&state, &auth, project_id, AccessKind::Read).await?;

    Ok(Json(Task::list_by_project(&state.db, project_id).await?))
}

/// Creates a task, optionally with doers
///
/// The task and its doer rows are written in one transaction.
///
/// # Errors
///
/// - `400 Bad Request`: Field validation failed, the task type or a doer
///   belongs to another project, or the doer list is malformed
/// - `403 Forbidden`: Caller is not the manager
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskWithDoers>)> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;
    req.validate()?;

    ensure_task_type_in_project(&state, project_id, req.task_type_id).await?;

    let doers = match req.doers.as_deref() {
        Some(raw) => resolve_doers(&state, project_id, raw).await?,
        None => Vec::new(),
    };

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id,
            task_type_id: req.task_type_id,
            title: req.title,
            content: req.content,
            weight: req.weight,
            dead_line: req.dead_line,
            is_done: req.is_done,
            doers,
        },
    )
    .await?;

    info!(
        project_id = %project_id,
        task_id = %task.task.id,
        doers = task.doers.len(),
        "Task created"
    );

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, task_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<TaskWithDoers>> {
    project_access(&state, &auth, project_id, AccessKind::Read).await?;

    let task = Task::find_in_project(&state.db, project_id, task_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))?;
    let doers = Task::doers(&state.db, task.id).await?;

    Ok(Json(TaskWithDoers { task, doers }))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, task_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskWithDoers>)> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;
    req.validate()?;

    if let Some(task_type_id) = req.task_type_id {
        ensure_task_type_in_project(&state, project_id, task_type_id).await?;
    }

    let doers = match req.doers.as_deref() {
        Some(raw) => Some(resolve_doers(&state, project_id, raw).await?),
        None => None,
    };

    let task = Task::update(
        &state.db,
        project_id,
        task_id,
        UpdateTask {
            task_type_id: req.task_type_id,
            title: req.title,
            content: req.content,
            weight: req.weight,
            dead_line: req.dead_line,
            is_done: req.is_done,
            doers,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Task"))?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Deletes a task together with its doer assignments and files
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, task_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<DeleteResponse>> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;

    if !Task::delete(&state.db, project_id, task_id).await? {
        return Err(ApiError::not_found("Task"));
    }

    Ok(Json(DeleteResponse::ok()))
}

/// Authorizes a chief check on `doer_id` and loads the task
async fn doer_target(
    state: &AppState,
    auth: &AuthContext,
    project_id: Uuid,
    task_id: Uuid,
    doer_id: Uuid,
) -> ApiResult<Task> {
    let request = AccessRequest::new(auth.user_id, project_id, AccessKind::Write)
        .allow(&[Permission::ChiefOfEmployee])
        .target(doer_id);
    authorize(&state.db, request, &state.authz).await?;

    Task::find_in_project(&state.db, project_id, task_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))
}

/// Assigns one doer to a task
///
/// # Endpoint
///
/// ```text
/// PATCH /v1/projects/:project_id/tasks/:task_id/doers
/// Content-Type: application/json
///
/// { "doer_id": "uuid" }
/// ```
///
/// Responds `201 Created` with the task and its full doer list. Assigning an
/// existing doer is accepted and changes nothing.
///
/// # Errors
///
/// - `400 Bad Request`: Missing or malformed `doer_id`
/// - `403 Forbidden`: Caller is neither the manager nor the doer's chief
/// - `404 Not Found`: Project, task or employee does not exist in the project
pub async fn add_doer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, task_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<DoerRequest>,
) -> ApiResult<(StatusCode, Json<TaskWithDoers>)> {
    let task = doer_target(&state, &auth, project_id, task_id, req.doer_id).await?;

    Task::add_doer(&state.db, task.id, req.doer_id).await?;
    let doers = Task::doers(&state.db, task.id).await?;

    info!(task_id = %task.id, doer_id = %req.doer_id, actor = %auth.user_id, "Doer assigned");

    Ok((StatusCode::CREATED, Json(TaskWithDoers { task, doers })))
}

/// Unassigns one doer from a task
///
/// Same body and permissions as [`add_doer`]; responds `200 OK` with the
/// remaining doers, or 404 if the employee was not a doer of the task.
pub async fn remove_doer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, task_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<DoerRequest>,
) -> ApiResult<Json<TaskWithDoers>> {
    let task = doer_target(&state, &auth, project_id, task_id, req.doer_id).await?;

    if !Task::remove_doer(&state.db, task.id, req.doer_id).await? {
        return Err(ApiError::NotFound("Doer not assigned to task".to_string()));
    }
    let doers = Task::doers(&state.db, task.id).await?;

    info!(task_id = %task.id, doer_id = %req.doer_id, actor = %auth.user_id, "Doer unassigned");

    Ok(Json(TaskWithDoers { task, doers }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() {
        let req: CreateTaskRequest = serde_json::from_str(&format!(
            r#"{{
                "task_type_id": "{}",
                "title": "Write docs",
                "weight": 2,
                "dead_line": "2021-11-20T00:00:00Z"
            }}"#,
            Uuid::new_v4()
        ))
        .unwrap();

        assert_eq!(req.content, "");
        assert!(!req.is_done);
        assert!(req.doers.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_negative_weight_is_invalid() {
        let req = UpdateTaskRequest {
            task_type_id: None,
            title: None,
            content: None,
            weight: Some(-1),
            dead_line: None,
            is_done: None,
            doers: None,
        };

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("weight"));
    }

    #[test]
    fn test_doer_request_rejects_empty_id() {
        assert!(serde_json::from_str::<DoerRequest>(r#"{"doer_id": ""}"#).is_err());
    }
}
