use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use api::{AppState, config::AppConfig, db, routes};
use common::database::{health_check, init_pool};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_new(&config.log_level)?)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install the tracing subscriber")?;

    info!("Starting roster API service");

    // Initialize database connection pool
    let pool = init_pool(&config.database()).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    db::migrate(&pool)
        .await
        .context("Failed to run database migrations")?;

    let address = config.bind_address();
    let app = routes::create_router(AppState::new(pool, config));

    let listener = TcpListener::bind(address).await?;
    info!("API service listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
