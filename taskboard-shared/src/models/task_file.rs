/// Task file attachments
///
/// Only the stored path is tracked here; the file body lives in whatever
/// storage the deployment mounts under `files/`.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

const TASK_FILE_COLUMNS: &str = "id, task_id, file, uploaded_at";

/// Maximum length of a stored file path
pub const MAX_FILE_PATH_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskFile {
    pub id: Uuid,
    pub task_id: Uuid,

    /// Stored path, e.g. `files/2025/01/31/spec.pdf`
    pub file: String,

    pub uploaded_at: DateTime<Utc>,
}

/// Reasons an uploaded file name cannot be stored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilePathError {
    #[error("File name is empty")]
    Empty,

    #[error("File path must be relative")]
    Absolute,

    #[error("File path must not contain empty, '.' or '..' segments")]
    InvalidSegment,

    #[error("Stored path must be at most {MAX_FILE_PATH_LEN} characters")]
    TooLong,
}

/// Resolves the stored path for an uploaded file name
///
/// A bare name is placed under the date-partitioned `files/YYYY/MM/DD/`
/// prefix; a relative path that already contains a `/` is kept as given.
/// Surrounding whitespace is trimmed first. Length is counted in characters.
///
/// # Errors
///
/// Rejects names that are blank, absolute, contain empty, `.` or `..`
/// segments, or resolve to more than [`MAX_FILE_PATH_LEN`] characters.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use taskboard_shared::models::task_file::{storage_path, FilePathError};
///
/// let at = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
/// assert_eq!(storage_path("notes.txt", at).unwrap(), "files/2025/03/07/notes.txt");
/// assert_eq!(storage_path("docs/notes.txt", at).unwrap(), "docs/notes.txt");
/// assert_eq!(storage_path("../notes.txt", at), Err(FilePathError::InvalidSegment));
/// ```
pub fn storage_path(name: &str, at: DateTime<Utc>) -> Result<String, FilePathError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FilePathError::Empty);
    }
    if name.starts_with('/') || name.starts_with('\\') {
        return Err(FilePathError::Absolute);
    }
    if name
        .split(['/', '\\'])
        .any(|segment| segment.trim().is_empty() || segment == "." || segment == "..")
    {
        return Err(FilePathError::InvalidSegment);
    }

    let path = if name.contains('/') {
        name.to_string()
    } else {
        format!(
            "files/{:04}/{:02}/{:02}/{}",
            at.year(),
            at.month(),
            at.day(),
            name
        )
    };

    if path.chars().count() > MAX_FILE_PATH_LEN {
        return Err(FilePathError::TooLong);
    }

    Ok(path)
}

impl TaskFile {
    /// Records an attachment on a task
    pub async fn create(pool: &PgPool, task_id: Uuid, file: String) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_files (task_id, file)
             VALUES ($1, $2)
             RETURNING {TASK_FILE_COLUMNS}"
        );

        sqlx::query_as::<_, TaskFile>(&query)
            .bind(task_id)
            .bind(file)
            .fetch_one(pool)
            .await
    }

    /// Lists a task's files, oldest first
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_FILE_COLUMNS} FROM task_files
             WHERE task_id = $1
             ORDER BY uploaded_at ASC, id ASC"
        );

        sqlx::query_as::<_, TaskFile>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, task_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_files WHERE task_id = $1 AND id = $2")
            .bind(task_id)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_storage_path_partitions_bare_names_by_date() {
        let at = Utc.with_ymd_and_hms(2024, 12, 1, 23, 59, 0).unwrap();
        assert_eq!(storage_path("report.pdf", at).unwrap(), "files/2024/12/01/report.pdf");
        assert_eq!(storage_path("  report.pdf ", at).unwrap(), "files/2024/12/01/report.pdf");
    }

    #[test]
    fn test_storage_path_keeps_explicit_paths() {
        let at = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
        assert_eq!(
            storage_path("files/2020/01/01/old.pdf", at).unwrap(),
            "files/2020/01/01/old.pdf"
        );
    }

    #[test]
    fn test_storage_path_rejects_unsafe_names() {
        let at = Utc::now();

        assert_eq!(storage_path("", at), Err(FilePathError::Empty));
        assert_eq!(storage_path("   ", at), Err(FilePathError::Empty));
        assert_eq!(storage_path("/etc/passwd", at), Err(FilePathError::Absolute));
        assert_eq!(storage_path("\\server\\share", at), Err(FilePathError::Absolute));
        assert_eq!(storage_path("../../x", at), Err(FilePathError::InvalidSegment));
        assert_eq!(storage_path("docs/../x", at), Err(FilePathError::InvalidSegment));
        assert_eq!(storage_path("docs/./x", at), Err(FilePathError::InvalidSegment));
        assert_eq!(storage_path("docs//x", at), Err(FilePathError::InvalidSegment));
        assert_eq!(storage_path("..", at), Err(FilePathError::InvalidSegment));
    }

    #[test]
    fn test_storage_path_counts_characters_not_bytes() {
        let at = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();

        // 17 characters of prefix, 2 bytes per letter
        let name = "ж".repeat(200);
        let path = storage_path(&name, at).unwrap();
        assert_eq!(path.chars().count(), 217);
        assert!(path.len() > MAX_FILE_PATH_LEN);

        let name = "ж".repeat(MAX_FILE_PATH_LEN - 16);
        assert_eq!(storage_path(&name, at), Err(FilePathError::TooLong));

        let name = "ж".repeat(MAX_FILE_PATH_LEN - 17);
        assert_eq!(storage_path(&name, at).unwrap().chars().count(), MAX_FILE_PATH_LEN);
    }
}
