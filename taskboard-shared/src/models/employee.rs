/// Employee model and database operations
///
/// An employee binds a user to a project with a position and an optional
/// chief. The chief is another employee of the same project; the link is a
/// plain parent id resolved through lookups, never an owning reference.
///
/// # Invariants
///
/// - A user holds at most one employee record per project (unique index)
/// - An employee is never its own chief (check constraint)
/// - The chief chain is acyclic. Callers check it with
///   [`crate::auth::hierarchy::Roster::would_create_cycle`] against a roster
///   read by [`Employee::lock_project_roster`], and write with
///   [`Employee::update`] in the same transaction
/// - Deleting a chief nulls the `chief_id` of its subordinates
///
/// # Schema
///
/// ```sql
/// CREATE TABLE employees (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     position_id UUID NOT NULL REFERENCES positions(id),
///     chief_id UUID REFERENCES employees(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (project_id, user_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::employee::{CreateEmployee, Employee};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid, position_id: Uuid) -> Result<(), sqlx::Error> {
/// let employee = Employee::create(&pool, CreateEmployee {
///     project_id,
///     user_id,
///     position_id,
///     chief_id: None,
/// }).await?;
///
/// let roster = Employee::list_by_project(&pool, project_id).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const EMPLOYEE_COLUMNS: &str = "id, project_id, user_id, position_id, chief_id, created_at";

/// Employee model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    /// Unique employee ID
    pub id: Uuid,

    /// Project this record belongs to
    pub project_id: Uuid,

    /// The user this record represents
    pub user_id: Uuid,

    /// Staffing role (same project)
    pub position_id: Uuid,

    /// Supervising employee (same project), None at the top of the hierarchy
    pub chief_id: Option<Uuid>,

    /// Creation time; employees are listed in creation order
    pub created_at: DateTime<Utc>,
}

/// Input for creating an employee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmployee {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub position_id: Uuid,
    pub chief_id: Option<Uuid>,
}

/// Input for updating an employee
///
/// `chief_id` distinguishes "leave unchanged" (`None`) from "clear the chief"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEmployee {
    pub position_id: Option<Uuid>,
    pub chief_id: Option<Option<Uuid>>,
}

impl Employee {
    /// Creates an employee record
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The user already has a record in this project (unique violation)
    /// - The user, position or chief does not exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateEmployee) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO employees (project_id, user_id, position_id, chief_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {EMPLOYEE_COLUMNS}"
        );

        sqlx::query_as::<_, Employee>(&query)
            .bind(data.project_id)
            .bind(data.user_id)
            .bind(data.position_id)
            .bind(data.chief_id)
            .fetch_one(pool)
            .await
    }

    /// Finds an employee by ID within a project
    ///
    /// # Returns
    ///
    /// The employee if it exists and belongs to `project_id`, None otherwise
    pub async fn find_in_project(
        pool: &PgPool,
        project_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE project_id = $1 AND id = $2"
        );

        sqlx::query_as::<_, Employee>(&query)
            .bind(project_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds the employee record of a user in a project
    ///
    /// # Returns
    ///
    /// The record if the user participates in the project, None otherwise
    pub async fn find_by_user(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE project_id = $1 AND user_id = $2"
        );

        sqlx::query_as::<_, Employee>(&query)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Lists all employees of a project in creation order
    ///
    /// This is the snapshot used to build a
    /// [`Roster`](crate::auth::hierarchy::Roster) for chain walks.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees
             WHERE project_id = $1
             ORDER BY created_at ASC, id ASC"
        );

        sqlx::query_as::<_, Employee>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Lists a project's employees and locks their rows until the
    /// surrounding transaction ends
    ///
    /// Concurrent chief reassignments in the same project queue up behind
    /// this lock, so each one checks for cycles against the committed result
    /// of the previous one. Rows are locked in roster order.
    pub async fn lock_project_roster<'c, E>(
        executor: E,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'c>,
    {
        let query = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees
             WHERE project_id = $1
             ORDER BY created_at ASC, id ASC
             FOR UPDATE"
        );

        sqlx::query_as::<_, Employee>(&query)
            .bind(project_id)
            .fetch_all(executor)
            .await
    }

    /// Updates an employee's position and/or chief
    ///
    /// Takes a pool or a transaction; chief changes go through the
    /// transaction holding [`Employee::lock_project_roster`].
    ///
    /// # Returns
    ///
    /// The updated employee, or None if it does not exist in `project_id`
    pub async fn update<'c, E>(
        executor: E,
        project_id: Uuid,
        id: Uuid,
        data: UpdateEmployee,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'c>,
    {
        let (set_chief, chief_id) = match data.chief_id {
            Some(chief_id) => (true, chief_id),
            None => (false, None),
        };

        let query = format!(
            "UPDATE employees
             SET position_id = COALESCE($3, position_id),
                 chief_id = CASE WHEN $4 THEN $5 ELSE chief_id END
             WHERE project_id = $1 AND id = $2
             RETURNING {EMPLOYEE_COLUMNS}"
        );

        sqlx::query_as::<_, Employee>(&query)
            .bind(project_id)
            .bind(id)
            .bind(data.position_id)
            .bind(set_chief)
            .bind(chief_id)
            .fetch_optional(executor)
            .await
    }

    /// Deletes an employee
    ///
    /// Subordinates keep their records with `chief_id` set to NULL; doer
    /// assignments of the employee are removed.
    ///
    /// # Returns
    ///
    /// True if a row was deleted
    pub async fn delete(pool: &PgPool, project_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM employees WHERE project_id = $1 AND id = $2")
            .bind(project_id)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_employee_distinguishes_clear_from_unchanged() {
        let unchanged: UpdateEmployee = serde_json::from_str("{}").unwrap();
        assert_eq!(unchanged.chief_id, None);

        let cleared = UpdateEmployee {
            position_id: None,
            chief_id: Some(None),
        };
        assert_eq!(cleared.chief_id, Some(None));
    }
}
