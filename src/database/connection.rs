use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};
use crate::utils::{CancelToken, RetryError, RetryPolicy, retry_with_backoff};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

pub type DbPool = DatabaseConnection;

/// Connects with backoff so the service survives starting before the
/// database is reachable.
pub async fn create_pool(config: &DatabaseConfig, cancel: &CancelToken) -> AppResult<DbPool> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let policy = RetryPolicy::new(
        config.connect_attempts,
        Duration::from_secs(1),
        Duration::from_secs(30),
    );

    retry_with_backoff(&policy, cancel, |attempt| {
        let options = options.clone();
        async move {
            log::info!("Connecting to database (attempt {attempt})");
            Database::connect(options).await
        }
    })
    .await
    .map_err(|e| match e {
        RetryError::Exhausted { attempts, last } => {
            log::error!("Database unreachable after {attempts} attempts");
            AppError::DatabaseError(last)
        }
        RetryError::Cancelled => {
            AppError::InternalError("Database connection cancelled".to_string())
        }
    })
}

pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    Migrator::up(pool, None).await?;
    Ok(())
}
