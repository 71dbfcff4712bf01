use diesel::prelude::*;
use dualstore::adapter::outbound::sqlite::database::connection::{open, DbPool};
use tempfile::TempDir;

/// Temporary SQLite database for integration tests.
///
/// The directory and the file are removed on drop.
pub struct TempDb {
    _dir: TempDir,
    url: String,
    pool: DbPool,
}

impl TempDb {
    pub fn create(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(format!("dualstore-{name}.db"));
        let url = path.display().to_string();
        let pool = open(&url).expect("open sqlite database");

        // WAL mode improves concurrent writer behavior in tests.
        {
            let mut conn = pool.get().expect("get sqlite connection");
            diesel::sql_query("PRAGMA journal_mode=WAL")
                .execute(&mut conn)
                .expect("enable WAL mode");
        }

        Self {
            _dir: dir,
            url,
            pool,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}
