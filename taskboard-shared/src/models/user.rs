/// User model and database operations
///
/// Users are login identities. A user takes part in projects either as the
/// project's manager or through an Employee record.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(255) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{User, CreateUser};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     username: "jdoe".to_string(),
///     email: "jdoe@example.com".to_string(),
///     first_name: "John".to_string(),
///     last_name: "Doe".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let found = User::find_by_username(&pool, "jdoe").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, password_hash, \
                            is_active, created_at, updated_at, last_login_at";

/// User model representing a login identity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Login name, unique across all users
    pub username: String,

    /// Email address, unique across all users
    pub email: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Argon2id password hash, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Inactive users cannot log in
    pub is_active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Public view of a user, embedded in project payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Username or email already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, first_name, last_name, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.username)
            .bind(data.email)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Finds a user by ID
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by login name
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Loads the public summaries of several users
    ///
    /// Unknown ids are skipped; the order of the result is unspecified.
    pub async fn find_summaries(
        pool: &PgPool,
        ids: &[Uuid],
    ) -> Result<Vec<UserSummary>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, UserSummary>(
            "SELECT id, username, first_name, last_name FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Checks whether a user with this ID exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Records a successful login
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Deletes a user by ID
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation while the user still manages a
    /// project. Employee records of the user are removed with it.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Full display name ("First Last")
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "test1".to_string(),
            email: "test1@email.com".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "test1");
    }

    #[test]
    fn test_summary_from_user() {
        let user = sample_user();
        let summary = UserSummary::from(&user);

        assert_eq!(summary.id, user.id);
        assert_eq!(summary.username, "test1");
        assert_eq!(summary.first_name, "Test");
        assert_eq!(summary.last_name, "User");
    }

    #[test]
    fn test_full_name() {
        assert_eq!(sample_user().full_name(), "Test User");
    }
}
