//! # Taskboard API Server
//!
//! Loads configuration from the environment, connects to PostgreSQL, runs
//! pending migrations and serves the HTTP API until Ctrl+C.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/taskboard \
//! JWT_SECRET=change-me-to-at-least-32-characters \
//! cargo run -p taskboard-api
//! ```

use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskboard_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let addr = config.bind_address();

    let db = pool::create_pool(config.pool_config()).await?;
    migrations::run_migrations(&db).await?;

    let state = AppState::new(db.clone(), config);
    tracing::info!(chief_scope = ?state.authz.chief_scope, "Authorization policy loaded");

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, closing database pool...");
    pool::close_pool(db).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
