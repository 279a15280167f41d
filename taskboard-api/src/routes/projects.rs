/// Project endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects` - Projects managed by the caller
/// - `POST /v1/projects` - Create a project (caller becomes manager)
/// - `GET /v1/projects/participating` - Projects where the caller is an employee
/// - `GET /v1/projects/:project_id` - Project detail with nested collections
/// - `PATCH /v1/projects/:project_id` - Rename
/// - `DELETE /v1/projects/:project_id` - Delete with everything it owns
///
/// Detail, update and delete accept participants (reads only) or the
/// manager; the listings only need an authenticated caller.

use std::collections::HashMap;

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
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{authorization::AccessKind, middleware::AuthContext},
    models::{
        employee::Employee,
        position::Position,
        project::{CreateProject, Project, UpdateProject},
        task::{Task, TaskWithDoers},
        task_type::TaskType,
        user::{User, UserSummary},
    },
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// A project with its manager's public profile
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub project_name: String,
    pub manager: UserSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectResponse {
    fn new(project: Project, manager: UserSummary) -> Self {
        Self {
            id: project.id,
            project_name: project.project_name,
            manager,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

/// Project detail payload
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: ProjectResponse,

    pub employees: Vec<Employee>,
    pub task_types: Vec<TaskType>,
    pub tasks: Vec<TaskWithDoers>,
    pub positions: Vec<Position>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 100, message = "Project name must be 1-100 characters"))]
    pub project_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 100, message = "Project name must be 1-100 characters"))]
    pub project_name: Option<String>,
}

/// Attaches manager summaries to a batch of projects
async fn with_managers(
    state: &AppState,
    projects: Vec<Project>,
) -> ApiResult<Vec<ProjectResponse>> {
    let mut manager_ids: Vec<Uuid> = projects.iter().map(|p| p.manager_id).collect();
    manager_ids.sort_unstable();
    manager_ids.dedup();

    let managers: HashMap<Uuid, UserSummary> = User::find_summaries(&state.db, &manager_ids)
        .await?
        .into_iter()
        .map(|summary| (summary.id, summary))
        .collect();

    projects
        .into_iter()
        .map(|project| {
            let manager = managers.get(&project.manager_id).cloned().ok_or_else(|| {
                ApiError::InternalError(format!("Manager of project {} is missing", project.id))
            })?;
            Ok(ProjectResponse::new(project, manager))
        })
        .collect()
}

async fn with_manager(state: &AppState, project: Project) -> ApiResult<ProjectResponse> {
    let mut responses = with_managers(state, vec![project]).await?;
    responses
        .pop()
        .ok_or_else(|| ApiError::InternalError("Project response missing".to_string()))
}

/// Lists the projects the caller manages, ordered by name
pub async fn list_managed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = Project::list_managed_by(&state.db, auth.user_id).await?;
    Ok(Json(with_managers(&state, projects).await?))
}

/// Creates a project managed by the caller
///
/// # Endpoint
///
/// ```text
/// POST /v1/projects
/// Content-Type: application/json
///
/// { "project_name": "Apollo" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Name empty or longer than 100 characters
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    req.validate()?;

    let project = Project::create(
        &state.db,
        CreateProject {
            project_name: req.project_name,
            manager_id: auth.user_id,
        },
    )
    .await?;

    info!(project_id = %project.id, manager_id = %auth.user_id, "Project created");

    Ok((StatusCode::CREATED, Json(with_manager(&state, project).await?)))
}

/// Lists the projects in which the caller holds an employee record
pub async fn list_participating(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = Project::list_participating(&state.db, auth.user_id).await?;
    Ok(Json(with_managers(&state, projects).await?))
}

/// Project detail with employees, task types, tasks and positions
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<ProjectDetail>> {
    let access = project_access(&state, &auth, project_id, AccessKind::Read).await?;

    let employees = Employee::list_by_project(&state.db, project_id).await?;
    let task_types = TaskType::list_by_project(&state.db, project_id).await?;
    let tasks = Task::list_by_project(&state.db, project_id).await?;
    let positions = Position::list_by_project(&state.db, project_id).await?;

    Ok(Json(ProjectDetail {
        project: with_manager(&state, access.project).await?,
        employees,
        task_types,
        tasks,
        positions,
    }))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;
    req.validate()?;

    let project = Project::update(
        &state.db,
        project_id,
        UpdateProject {
            project_name: req.project_name,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Project"))?;

    Ok((StatusCode::CREATED, Json(with_manager(&state, project).await?)))
}

/// Deletes a project together with its positions, task types, employees,
/// tasks and files
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;

    if !Project::delete(&state.db, project_id).await? {
        return Err(ApiError::not_found("Project"));
    }

    info!(project_id = %project_id, user_id = %auth.user_id, "Project deleted");

    Ok(Json(DeleteResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_name_bounds() {
        let ok = CreateProjectRequest {
            project_name: "Apollo".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty = CreateProjectRequest {
            project_name: String::new(),
        };
        assert!(empty.validate().is_err());

        let long = CreateProjectRequest {
            project_name: "x".repeat(101),
        };
        assert!(long.validate().is_err());

        let untouched = UpdateProjectRequest { project_name: None };
        assert!(untouched.validate().is_ok());
    }

    #[test]
    fn test_detail_flattens_project() {
        let manager = UserSummary {
            id: Uuid::new_v4(),
            username: "boss".to_string(),
            first_name: "Big".to_string(),
            last_name: "Boss".to_string(),
        };
        let project = Project {
            id: Uuid::new_v4(),
            project_name: "Apollo".to_string(),
            manager_id: manager.id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let detail = ProjectDetail {
            project: ProjectResponse::new(project.clone(), manager),
            employees: vec![],
            task_types: vec![],
            tasks: vec![],
            positions: vec![],
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], project.id.to_string());
        assert_eq!(json["project_name"], "Apollo");
        assert_eq!(json["manager"]["username"], "boss");
        assert!(json["employees"].as_array().unwrap().is_empty());
        assert!(json.get("manager_id").is_none());
    }
}
