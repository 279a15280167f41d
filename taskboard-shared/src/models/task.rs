/// Task model and database operations
///
/// A task belongs to one project and one task type of that project, and has a
/// set of doers: employees of the same project assigned to complete it.
///
/// Creating or updating a task together with its doer set runs in a single
/// transaction; a constraint violation on any doer rolls back the task write.
///
/// # Doer lists
///
/// Clients send doers as a comma-separated list of employee ids
/// (`"id1,id2"`). [`parse_doer_ids`] turns that into a de-duplicated list; the
/// caller must still check each id belongs to the project.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{parse_doer_ids, CreateTask, Task};
/// use chrono::Utc;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, task_type_id: Uuid, raw: &str) -> Result<(), Box<dyn std::error::Error>> {
/// let doers = parse_doer_ids(raw)?;
/// let task = Task::create(&pool, CreateTask {
///     project_id,
///     task_type_id,
///     title: "Write release notes".to_string(),
///     content: String::new(),
///     weight: 3,
///     dead_line: Utc::now(),
///     is_done: false,
///     doers,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

const TASK_COLUMNS: &str =
    "id, project_id, task_type_id, title, content, weight, dead_line, is_done, creation_date, updated_at";

/// Task model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,

    /// Category (same project)
    pub task_type_id: Uuid,

    pub title: String,
    pub content: String,

    /// Non-negative effort estimate
    pub weight: i32,

    pub dead_line: DateTime<Utc>,
    pub is_done: bool,

    /// Set by the server on insert; tasks are listed newest first
    pub creation_date: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// A task together with its doer ids, as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskWithDoers {
    #[serde(flatten)]
    pub task: Task,

    /// Employee ids in employee creation order
    pub doers: Vec<Uuid>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub task_type_id: Uuid,
    pub title: String,
    pub content: String,
    pub weight: i32,
    pub dead_line: DateTime<Utc>,
    pub is_done: bool,
    pub doers: Vec<Uuid>,
}

/// Input for updating a task; `doers: Some(..)` replaces the whole doer set
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub task_type_id: Option<Uuid>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub weight: Option<i32>,
    pub dead_line: Option<DateTime<Utc>>,
    pub is_done: Option<bool>,
    pub doers: Option<Vec<Uuid>>,
}

/// Errors from parsing a comma-separated doer list
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DoerListError {
    #[error("Doer list is empty")]
    Empty,

    #[error("Invalid doer id: '{0}'")]
    InvalidId(String),
}

/// Parses a comma-separated list of employee ids
///
/// Whitespace around entries is ignored and duplicates are dropped (first
/// occurrence wins). An empty list, or an empty entry such as `"a,,b"`, is
/// rejected.
///
/// # Examples
///
/// ```
/// use taskboard_shared::models::task::{parse_doer_ids, DoerListError};
///
/// let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
/// assert_eq!(parse_doer_ids(&format!("{id}, {id}")).unwrap().len(), 1);
/// assert_eq!(parse_doer_ids(""), Err(DoerListError::Empty));
/// ```
pub fn parse_doer_ids(raw: &str) -> Result<Vec<Uuid>, DoerListError> {
    if raw.trim().is_empty() {
        return Err(DoerListError::Empty);
    }

    let mut ids: Vec<Uuid> = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        let id = Uuid::parse_str(entry).map_err(|_| DoerListError::InvalidId(entry.to_string()))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    Ok(ids)
}

async fn insert_doers(
    tx: &mut Transaction<'_, Postgres>,
    task_id: Uuid,
    doers: &[Uuid],
) -> Result<(), sqlx::Error> {
    if doers.is_empty() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO task_doers (task_id, employee_id)
         SELECT $1, unnest($2::uuid[])
         ON CONFLICT DO NOTHING",
    )
    .bind(task_id)
    .bind(doers)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

impl Task {
    /// Creates a task and its doer assignments in one transaction
    ///
    /// # Errors
    ///
    /// Returns an error (and persists nothing) if:
    /// - The task type or a doer does not exist (foreign key violation)
    /// - The weight is negative (check violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<TaskWithDoers, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO tasks (project_id, task_type_id, title, content, weight, dead_line, is_done)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {TASK_COLUMNS}"
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.project_id)
            .bind(data.task_type_id)
            .bind(data.title)
            .bind(data.content)
            .bind(data.weight)
            .bind(data.dead_line)
            .bind(data.is_done)
            .fetch_one(&mut *tx)
            .await?;

        insert_doers(&mut tx, task.id, &data.doers).await?;

        tx.commit().await?;

        let doers = Self::doers(pool, task.id).await?;
        Ok(TaskWithDoers { task, doers })
    }

    /// Finds a task by ID within a project
    pub async fn find_in_project(
        pool: &PgPool,
        project_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = $1 AND id = $2");

        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists a project's tasks, newest first, with their doers
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<TaskWithDoers>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE project_id = $1
             ORDER BY creation_date DESC, id ASC"
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await?;

        let ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
        let mut doers = Self::doers_for_tasks(pool, &ids).await?;

        Ok(tasks
            .into_iter()
            .map(|task| {
                let task_doers = doers.remove(&task.id).unwrap_or_default();
                TaskWithDoers {
                    task,
                    doers: task_doers,
                }
            })
            .collect())
    }

    /// Returns the doer ids of a task in employee creation order
    pub async fn doers(pool: &PgPool, task_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT td.employee_id
            FROM task_doers td
            INNER JOIN employees e ON e.id = td.employee_id
            WHERE td.task_id = $1
            ORDER BY e.created_at ASC, e.id ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }

    /// Returns the doers of several tasks keyed by task id
    pub async fn doers_for_tasks(
        pool: &PgPool,
        task_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Uuid>>, sqlx::Error> {
        if task_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            SELECT td.task_id, td.employee_id
            FROM task_doers td
            INNER JOIN employees e ON e.id = td.employee_id
            WHERE td.task_id = ANY($1)
            ORDER BY e.created_at ASC, e.id ASC
            "#,
        )
        .bind(task_ids)
        .fetch_all(pool)
        .await?;

        let mut map: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (task_id, employee_id) in rows {
            map.entry(task_id).or_default().push(employee_id);
        }

        Ok(map)
    }

    /// Updates a task, replacing its doer set when `doers` is provided
    ///
    /// # Returns
    ///
    /// The updated task, or None if it does not exist in `project_id`
    pub async fn update(
        pool: &PgPool,
        project_id: Uuid,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<TaskWithDoers>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE tasks
             SET task_type_id = COALESCE($3, task_type_id),
                 title = COALESCE($4, title),
                 content = COALESCE($5, content),
                 weight = COALESCE($6, weight),
                 dead_line = COALESCE($7, dead_line),
                 is_done = COALESCE($8, is_done),
                 updated_at = NOW()
             WHERE project_id = $1 AND id = $2
             RETURNING {TASK_COLUMNS}"
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .bind(id)
            .bind(data.task_type_id)
            .bind(data.title)
            .bind(data.content)
            .bind(data.weight)
            .bind(data.dead_line)
            .bind(data.is_done)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(task) = task else {
            tx.rollback().await?;
            return Ok(None);
        };

        if let Some(doers) = data.doers {
            sqlx::query("DELETE FROM task_doers WHERE task_id = $1")
                .bind(task.id)
                .execute(&mut *tx)
                .await?;

            insert_doers(&mut tx, task.id, &doers).await?;
        }

        tx.commit().await?;

        let doers = Self::doers(pool, task.id).await?;
        Ok(Some(TaskWithDoers { task, doers }))
    }

    /// Deletes a task with its doer assignments and files
    pub async fn delete(pool: &PgPool, project_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE project_id = $1 AND id = $2")
            .bind(project_id)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Assigns a doer; assigning an existing doer is a no-op
    pub async fn add_doer(
        pool: &PgPool,
        task_id: Uuid,
        employee_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO task_doers (task_id, employee_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(task_id)
        .bind(employee_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Unassigns a doer
    ///
    /// # Returns
    ///
    /// True if the employee was a doer of the task
    pub async fn remove_doer(
        pool: &PgPool,
        task_id: Uuid,
        employee_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_doers WHERE task_id = $1 AND employee_id = $2")
            .bind(task_id)
            .bind(employee_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
