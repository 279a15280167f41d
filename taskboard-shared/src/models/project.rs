/// Project model and database operations
///
/// A project is the top-level workspace. It has exactly one manager (a user)
/// and owns positions, task types, employees and tasks, all of which are
/// removed with it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_name VARCHAR(100) NOT NULL,
///     manager_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const PROJECT_COLUMNS: &str = "id, project_name, manager_id, created_at, updated_at";

/// Project model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Display name (1-100 characters)
    pub project_name: String,

    /// The user with full authority over the project
    pub manager_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub project_name: String,
    pub manager_id: Uuid,
}

/// Input for updating a project (only provided fields change)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    pub project_name: Option<String>,
}

impl Project {
    /// Returns true if `user_id` is this project's manager
    pub fn is_managed_by(&self, user_id: Uuid) -> bool {
        self.manager_id == user_id
    }

    /// Creates a new project
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation if the manager does not exist.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (project_name, manager_id)
             VALUES ($1, $2)
             RETURNING {PROJECT_COLUMNS}"
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(data.project_name)
            .bind(data.manager_id)
            .fetch_one(pool)
            .await
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");

        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists the projects managed by a user, ordered by name
    pub async fn list_managed_by(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE manager_id = $1
             ORDER BY project_name ASC, id ASC"
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Lists the projects in which a user holds an employee record, ordered by name
    pub async fn list_participating(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.project_name, p.manager_id, p.created_at, p.updated_at
            FROM projects p
            INNER JOIN employees e ON e.project_id = p.id
            WHERE e.user_id = $1
            ORDER BY p.project_name ASC, p.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Updates a project
    ///
    /// # Returns
    ///
    /// The updated project, or None if it no longer exists
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE projects
             SET project_name = COALESCE($2, project_name),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {PROJECT_COLUMNS}"
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(data.project_name)
            .fetch_optional(pool)
            .await
    }

    /// Deletes a project and everything it owns
    ///
    /// # Returns
    ///
    /// True if a row was deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
