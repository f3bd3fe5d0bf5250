use std::env;
use std::time::Duration;

/// Database file used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "app.db";
/// How long a connection waits for the SQLite write lock before failing.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Runtime configuration of the catalog store, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub database_url: String,
    pub busy_timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }
}

impl CatalogConfig {
    /// Build the configuration from `DATABASE_URL` and `SQLITE_BUSY_TIMEOUT_MS`.
    ///
    /// Call `dotenvy::dotenv()` beforehand to pick up a local `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let busy_timeout_ms = match lookup("SQLITE_BUSY_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                log::warn!(
                    "Ignoring invalid SQLITE_BUSY_TIMEOUT_MS `{raw}`, using {DEFAULT_BUSY_TIMEOUT_MS}"
                );
                DEFAULT_BUSY_TIMEOUT_MS
            }),
            None => DEFAULT_BUSY_TIMEOUT_MS,
        };

        Self {
            database_url,
            busy_timeout: Duration::from_millis(busy_timeout_ms),
        }
    }
}
