/// Database migration runner
///
/// The schema lives in `migrations/` at the workspace root and is embedded at
/// compile time with `sqlx::migrate!`. Migrations are reversible
/// (`*.up.sql` / `*.down.sql`).
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskboard_shared::db::migrations::{run_migrations, get_migration_status};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig::with_url(std::env::var("DATABASE_URL")?)).await?;
///
///     run_migrations(&pool).await?;
///
///     let status = get_migration_status(&pool).await?;
///     println!("Applied {} migrations", status.applied_migrations);
///     Ok(())
/// }
/// ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Migration status information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Number of migrations that have been applied
    pub applied_migrations: usize,

    /// Latest applied migration version (timestamp)
    pub latest_version: Option<i64>,
}

/// Runs all pending database migrations
///
/// Each migration runs in its own transaction; a failing migration is rolled
/// back and returned as an error.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("../migrations").run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Returns the number and latest version of successfully applied migrations
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    debug!("Checking migration status");

    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        debug!("Migrations table does not exist yet");
        return Ok(MigrationStatus {
            applied_migrations: 0,
            latest_version: None,
        });
    }

    let (count, latest_version): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success = true",
    )
    .fetch_one(pool)
    .await?;

    debug!(
        applied_migrations = count,
        latest_version = ?latest_version,
        "Migration status retrieved"
    );

    Ok(MigrationStatus {
        applied_migrations: count as usize,
        latest_version,
    })
}

/// Creates the database if it doesn't exist (development and tests)
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    } else {
        debug!("Database already exists");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_migrations_are_reversible() {
        let migrator = sqlx::migrate!("../migrations");
        assert!(migrator.iter().count() >= 2);
        assert!(migrator.iter().any(|m| m.migration_type.is_down_migration()));
    }
}
