/// Employee endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects/:project_id/employees` - Roster in creation order
/// - `POST /v1/projects/:project_id/employees` - Add a user to the project
/// - `GET /v1/projects/:project_id/employees/:employee_id`
/// - `PATCH /v1/projects/:project_id/employees/:employee_id` - Change position or chief
/// - `DELETE /v1/projects/:project_id/employees/:employee_id`
///
/// The position and chief of an employee must belong to the path project.
/// A chief assignment that would make the hierarchy cyclic is rejected.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{double_option, ApiJson, ApiPath},
    routes::{project_access, DeleteResponse},
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::{
    auth::{authorization::AccessKind, hierarchy::Roster, middleware::AuthContext},
    models::{
        employee::{CreateEmployee, Employee, UpdateEmployee},
        position::Position,
        user::User,
    },
};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub user_id: Uuid,
    pub position_id: Uuid,
    pub chief_id: Option<Uuid>,
}

/// `chief_id: null` clears the chief, an absent `chief_id` keeps it
#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub position_id: Option<Uuid>,

    #[serde(default, deserialize_with = "double_option")]
    pub chief_id: Option<Option<Uuid>>,
}

async fn ensure_position_in_project(
    state: &AppState,
    project_id: Uuid,
    position_id: Uuid,
) -> ApiResult<()> {
    if Position::find_in_project(&state.db, project_id, position_id)
        .await?
        .is_none()
    {
        return Err(ApiError::invalid(
            "position_id",
            "Position does not belong to this project",
        ));
    }
    Ok(())
}

/// Checks a new chief for `employee_id` against the project roster
fn check_chief(roster: &Roster, employee_id: Uuid, chief_id: Uuid) -> ApiResult<()> {
    if !roster.contains(chief_id) {
        return Err(ApiError::invalid(
            "chief_id",
            "Chief is not an employee of this project",
        ));
    }

    if chief_id == employee_id {
        return Err(ApiError::invalid(
            "chief_id",
            "An employee cannot be their own chief",
        ));
    }

    if roster.would_create_cycle(employee_id, chief_id) {
        return Err(ApiError::invalid(
            "chief_id",
            "Chief assignment would create a cycle in the hierarchy",
        ));
    }

    Ok(())
}

pub async fn list_employees(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<Employee>>> {
    project_access(&state, &auth, project_id, AccessKind::Read).await?;

    Ok(Json(Employee::list_by_project(&state.db, project_id).await?))
}

/// Adds a user to the project
///
/// # Errors
///
/// - `400 Bad Request`: Unknown user, position or chief from another project
///   (`validation_error`), or the user is already an employee
///   (`integrity_conflict`)
/// - `403 Forbidden`: Caller is not the manager
pub async fn create_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateEmployeeRequest>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;

    if !User::exists(&state.db, req.user_id).await? {
        return Err(ApiError::invalid("user_id", "User does not exist"));
    }

    ensure_position_in_project(&state, project_id, req.position_id).await?;

    if let Some(chief_id) = req.chief_id {
        if Employee::find_in_project(&state.db, project_id, chief_id)
            .await?
            .is_none()
        {
            return Err(ApiError::invalid(
                "chief_id",
                "Chief is not an employee of this project",
            ));
        }
    }

    let employee = Employee::create(
        &state.db,
        CreateEmployee {
            project_id,
            user_id: req.user_id,
            position_id: req.position_id,
            chief_id: req.chief_id,
        },
    )
    .await?;

    info!(
        project_id = %project_id,
        employee_id = %employee.id,
        user_id = %employee.user_id,
        "Employee added"
    );

    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, employee_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Employee>> {
    project_access(&state, &auth, project_id, AccessKind::Read).await?;

    let employee = Employee::find_in_project(&state.db, project_id, employee_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee"))?;

    Ok(Json(employee))
}

/// Changes an employee's position and/or chief
///
/// The chief is validated against the project roster: it must be another
/// employee of the project, and the employee must not already be above it in
/// the hierarchy. The roster rows stay locked from the check until the
/// update commits.
pub async fn update_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, employee_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<UpdateEmployeeRequest>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;

    if let Some(position_id) = req.position_id {
        ensure_position_in_project(&state, project_id, position_id).await?;
    }

    let mut tx = state.db.begin().await?;

    let roster = Roster::new(Employee::lock_project_roster(&mut *tx, project_id).await?);
    if !roster.contains(employee_id) {
        return Err(ApiError::not_found("Employee"));
    }

    if let Some(Some(chief_id)) = req.chief_id {
        check_chief(&roster, employee_id, chief_id)?;
    }

    let employee = Employee::update(
        &mut *tx,
        project_id,
        employee_id,
        UpdateEmployee {
            position_id: req.position_id,
            chief_id: req.chief_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Employee"))?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(employee)))
}

/// Removes an employee; its subordinates are left without a chief
pub async fn delete_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, employee_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<DeleteResponse>> {
    project_access(&state, &auth, project_id, AccessKind::Write).await?;

    if !Employee::delete(&state.db, project_id, employee_id).await? {
        return Err(ApiError::not_found("Employee"));
    }

    info!(project_id = %project_id, employee_id = %employee_id, "Employee removed");

    Ok(Json(DeleteResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn employee(id: Uuid, chief_id: Option<Uuid>) -> Employee {
        Employee {
            id,
            project_id: Uuid::nil(),
            user_id: Uuid::new_v4(),
            position_id: Uuid::nil(),
            chief_id,
            created_at: Utc::now(),
        }
    }

    fn rejected_field(result: ApiResult<()>) -> String {
        match result {
            Err(ApiError::ValidationError(details)) => details[0].field.clone(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_check_chief() {
        // top <- middle <- bottom
        let (top, middle, bottom) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let roster = Roster::new(vec![
            employee(top, None),
            employee(middle, Some(top)),
            employee(bottom, Some(middle)),
        ]);

        assert!(check_chief(&roster, bottom, top).is_ok());
        assert_eq!(rejected_field(check_chief(&roster, bottom, bottom)), "chief_id");
        assert_eq!(rejected_field(check_chief(&roster, top, bottom)), "chief_id");
        assert_eq!(rejected_field(check_chief(&roster, top, Uuid::new_v4())), "chief_id");
    }

    #[test]
    fn test_update_request_chief_states() {
        let keep: UpdateEmployeeRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(keep.chief_id, None);

        let clear: UpdateEmployeeRequest = serde_json::from_str(r#"{"chief_id": null}"#).unwrap();
        assert_eq!(clear.chief_id, Some(None));
    }
}
