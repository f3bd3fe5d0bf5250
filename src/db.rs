use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use thiserror::Error;

use crate::config::{CatalogConfig, DEFAULT_BUSY_TIMEOUT_MS};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while preparing the database.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migrations: {0}")]
    Migration(String),
}

/// Per-connection SQLite settings applied whenever the pool opens a connection.
#[derive(Debug)]
struct SqlitePragmas {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; \
             PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL; \
             PRAGMA foreign_keys = ON;",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Build an r2d2 pool for `database_url` with the default busy timeout.
pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, DbError> {
    establish_connection_pool_with(
        database_url,
        Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
    )
}

/// Build an r2d2 pool for the configured database.
pub fn establish_pool_from_config(config: &CatalogConfig) -> Result<DbPool, DbError> {
    establish_connection_pool_with(&config.database_url, config.busy_timeout)
}

pub fn establish_connection_pool_with(
    database_url: &str,
    busy_timeout: Duration,
) -> Result<DbPool, DbError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas { busy_timeout }))
        .build(manager)?;
    Ok(pool)
}

/// Apply every embedded migration that has not run yet and return how many ran.
pub fn run_pending_migrations(pool: &DbPool) -> Result<usize, DbError> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| DbError::Migration(err.to_string()))?;

    for version in &applied {
        log::info!("Applied migration {version}");
    }

    Ok(applied.len())
}
