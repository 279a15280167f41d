/// Database models for Taskboard
///
/// This module contains all database models and their store operations.
/// Every project-scoped lookup takes the project id alongside the item id so a
/// record from another project is indistinguishable from a missing one.
///
/// # Models
///
/// - `user`: Login identities
/// - `project`: Projects and their manager
/// - `position`: Staffing roles scoped to a project
/// - `task_type`: Task categories scoped to a project
/// - `employee`: A user's membership in a project, with optional chief
/// - `task`: Tasks and their doers
/// - `task_file`: File attachments on tasks
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::project::{CreateProject, Project};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, CreateProject {
///     project_name: "Website relaunch".to_string(),
///     manager_id: user_id,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod employee;
pub mod position;
pub mod project;
pub mod task;
pub mod task_file;
pub mod task_type;
pub mod user;

/// Color assigned to positions and task types when none is given
pub const DEFAULT_COLOR: &str = "#000000";

/// Checks that `color` is a `#RRGGBB` hex triplet
pub fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}
