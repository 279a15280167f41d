/// Task type model: a task category scoped to one project

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const TASK_TYPE_COLUMNS: &str = "id, project_id, title, color, created_at";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskType {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskType {
    pub project_id: Uuid,
    pub title: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskType {
    pub title: Option<String>,
    pub color: Option<String>,
}

impl TaskType {
    pub async fn create(pool: &PgPool, data: CreateTaskType) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_types (project_id, title, color)
             VALUES ($1, $2, $3)
             RETURNING {TASK_TYPE_COLUMNS}"
        );

        sqlx::query_as::<_, TaskType>(&query)
            .bind(data.project_id)
            .bind(data.title)
            .bind(data.color)
            .fetch_one(pool)
            .await
    }

    pub async fn find_in_project(
        pool: &PgPool,
        project_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_TYPE_COLUMNS} FROM task_types WHERE project_id = $1 AND id = $2"
        );

        sqlx::query_as::<_, TaskType>(&query)
            .bind(project_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_TYPE_COLUMNS} FROM task_types
             WHERE project_id = $1
             ORDER BY title ASC, id ASC"
        );

        sqlx::query_as::<_, TaskType>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        project_id: Uuid,
        id: Uuid,
        data: UpdateTaskType,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE task_types
             SET title = COALESCE($3, title),
                 color = COALESCE($4, color)
             WHERE project_id = $1 AND id = $2
             RETURNING {TASK_TYPE_COLUMNS}"
        );

        sqlx::query_as::<_, TaskType>(&query)
            .bind(project_id)
            .bind(id)
            .bind(data.title)
            .bind(data.color)
            .fetch_optional(pool)
            .await
    }

    /// Deletes a task type; restricted while tasks reference it
    pub async fn delete(pool: &PgPool, project_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_types WHERE project_id = $1 AND id = $2")
            .bind(project_id)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
