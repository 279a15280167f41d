/// Database layer for Taskboard
///
/// This module provides database connection pooling and the embedded schema
/// migrations.
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Embedded migration runner and status queries
/// - Models are in the `models` module at crate root level
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;

/// Returns true if the error is a Postgres constraint violation
///
/// Covers unique (23505), foreign key (23503), check (23514) and
/// restrict-on-delete violations, which Postgres also reports as 23503.
pub fn is_constraint_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => matches!(
            db_err.code().as_deref(),
            Some("23505") | Some("23503") | Some("23514") | Some("23001")
        ),
        _ => false,
    }
}
