use diesel::{
    PgConnection,
    r2d2::{self, ConnectionManager},
};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::env;
use thiserror::Error;
use tracing::info;

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    ConnectionError(String),
    #[error("Pool error: {0}")]
    PoolError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Query error: {0}")]
    QueryError(#[from] diesel::result::Error),
    #[error("Database task failed: {0}")]
    TaskError(String),
}

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/");

pub fn create_connection_pool(database_url: &str) -> Result<DbPool, DatabaseError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    r2d2::Pool::builder()
        .max_size(10)
        .min_idle(Some(1))
        .build(manager)
        .map_err(|e| DatabaseError::PoolError(e.to_string()))
}

/// Builds the pool from `DATABASE_URL`.
pub fn create_connection_pool_from_env() -> Result<DbPool, DatabaseError> {
    dotenv::dotenv().ok();
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| DatabaseError::ConfigurationError("DATABASE_URL not set".to_string()))?;

    create_connection_pool(&database_url)
}

pub fn get_connection_from_pool(pool: &DbPool) -> Result<DbConnection, DatabaseError> {
    pool.get()
        .map_err(|e| DatabaseError::PoolError(e.to_string()))
}

pub fn run_migrations(pool: &DbPool) -> Result<(), DatabaseError> {
    let mut pooled = get_connection_from_pool(pool)?;
    let conn: &mut PgConnection = &mut pooled;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    info!(applied = applied.len(), "database migrations applied");
    Ok(())
}

/// Runs a diesel closure on a pooled connection without blocking the async
/// runtime.
pub async fn run_blocking<T, F>(pool: &DbPool, query: F) -> Result<T, DatabaseError>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> Result<T, diesel::result::Error> + Send + 'static,
{
    let pool = pool.clone();

    tokio::task::spawn_blocking(move || {
        let mut conn = get_connection_from_pool(&pool)?;
        query(&mut conn).map_err(DatabaseError::from)
    })
    .await
    .map_err(|e| DatabaseError::TaskError(e.to_string()))?
}
