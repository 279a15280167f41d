/// Position model: a named staffing role scoped to one project
///
/// Deleting a position is restricted while employees still hold it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const POSITION_COLUMNS: &str = "id, project_id, title, color, created_at";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Position {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,

    /// `#RRGGBB`
    pub color: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePosition {
    pub project_id: Uuid,
    pub title: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePosition {
    pub title: Option<String>,
    pub color: Option<String>,
}

impl Position {
    pub async fn create(pool: &PgPool, data: CreatePosition) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO positions (project_id, title, color)
             VALUES ($1, $2, $3)
             RETURNING {POSITION_COLUMNS}"
        );

        sqlx::query_as::<_, Position>(&query)
            .bind(data.project_id)
            .bind(data.title)
            .bind(data.color)
            .fetch_one(pool)
            .await
    }

    /// Finds a position by ID within a project
    ///
    /// A position that exists in a different project yields None.
    pub async fn find_in_project(
        pool: &PgPool,
        project_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {POSITION_COLUMNS} FROM positions WHERE project_id = $1 AND id = $2"
        );

        sqlx::query_as::<_, Position>(&query)
            .bind(project_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists a project's positions ordered by title
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {POSITION_COLUMNS} FROM positions
             WHERE project_id = $1
             ORDER BY title ASC, id ASC"
        );

        sqlx::query_as::<_, Position>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        project_id: Uuid,
        id: Uuid,
        data: UpdatePosition,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE positions
             SET title = COALESCE($3, title),
                 color = COALESCE($4, color)
             WHERE project_id = $1 AND id = $2
             RETURNING {POSITION_COLUMNS}"
        );

        sqlx::query_as::<_, Position>(&query)
            .bind(project_id)
            .bind(id)
            .bind(data.title)
            .bind(data.color)
            .fetch_optional(pool)
            .await
    }

    /// Deletes a position
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation while employees hold the position.
    pub async fn delete(pool: &PgPool, project_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM positions WHERE project_id = $1 AND id = $2")
            .bind(project_id)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
