use anyhow::Context;
use helpdesk::bootstrap;
use helpdesk::config::Config;
use helpdesk::infrastructure::http::router::build_router;
use helpdesk::infrastructure::observability;
use helpdesk::infrastructure::persistence::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing and metrics
    let _observability = observability::init(&config)
        .map_err(|e| anyhow::anyhow!("failed to initialize observability: {}", e))?;
    tracing::info!("Configuration loaded");

    // Initialize database connection
    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    tracing::info!("Database connection established");

    // Run migrations
    db.run_migrations()
        .await
        .context("failed to apply migrations")?;
    tracing::info!("Database migrations applied");

    let state = bootstrap::build_app_state(db, &config);
    let app = build_router(state);

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
