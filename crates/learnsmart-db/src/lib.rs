//! # LearnSmart DB
//!
//! PostgreSQL connection pool and schema migrations.
//!
//! The schema lives in the workspace `migrations/` directory and is embedded
//! into the binary, so a fresh database only needs `DATABASE_URL`.
//!
//! # Example
//!
//! ```ignore
//! use learnsmart_db::{init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(10).await?;
//! run_migrations(&pool).await?;
//! ```

use std::env;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub use sqlx::PgPool;

/// Embedded copy of `migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Connects to `DATABASE_URL` with at most `max_connections` pooled connections.
///
/// # Errors
///
/// Fails if `DATABASE_URL` is unset or the first connection cannot be opened.
pub async fn init_db_pool(max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| sqlx::Error::Configuration("DATABASE_URL must be set".into()))?;

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    info!(max_connections, "Database pool initialized");
    Ok(pool)
}

/// Applies any pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
