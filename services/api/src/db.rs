//! Schema migrations

use common::error::DatabaseResult;
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use tracing::info;

/// Migrations embedded from `services/api/migrations`
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Bring the schema up to date
pub async fn migrate(pool: &SqlitePool) -> DatabaseResult<()> {
    info!("Running database migrations");
    MIGRATOR.run(pool).await?;
    Ok(())
}
