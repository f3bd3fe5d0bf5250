//! Helpers for integration tests.
#![allow(dead_code)]

use tempfile::TempDir;

use pushkind_catalog::db::{DbPool, establish_connection_pool, run_pending_migrations};
use pushkind_catalog::domain::path::PathScheme;
use pushkind_catalog::repository::DieselRepository;

/// Temporary database used in integration tests. The file lives in its own
/// directory, so WAL side files are removed together with it.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory.");
        let path = dir.path().join(filename);
        let url = path.to_str().expect("Temporary path is not valid UTF-8.");

        let pool = establish_connection_pool(url).expect("Failed to establish SQLite connection.");
        run_pending_migrations(&pool).expect("Migrations failed");

        TestDb { _dir: dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }

    pub fn repo_with_scheme(&self, scheme: PathScheme) -> DieselRepository {
        DieselRepository::with_path_scheme(self.pool(), scheme)
    }
}
