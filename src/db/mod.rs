//! Database layer for the task board.
//!
//! The store is an SQLite database reached through an `r2d2` connection
//! pool. Handles are constructed explicitly and passed to the service; there
//! is no process-wide connection.

pub mod tasks;

use crate::config::DatabaseConfig;
use crate::error::StorageResult;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use tracing::debug;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// A connection checked out of the pool; returned when dropped.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Pragmas applied to every new file-backed connection.
#[derive(Debug)]
struct ConnectionSetup;

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionSetup {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        // busy_timeout first so a concurrent journal_mode switch waits
        conn.execute_batch(
            "PRAGMA busy_timeout=5000;
             PRAGMA journal_mode=WAL;",
        )
    }
}

/// Database handle wrapping a pool of SQLite connections.
#[derive(Clone)]
pub struct Database {
    pool: r2d2::Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open or create the database described by `config`.
    pub fn open(config: &DatabaseConfig) -> StorageResult<Self> {
        let path = config.db_path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::open_path(&path, config.pool_size)
    }

    /// Open or create the database file at `path` with `pool_size` connections.
    pub fn open_path<P: AsRef<Path>>(path: P, pool_size: usize) -> StorageResult<Self> {
        let path = path.as_ref();
        let pool = r2d2::Pool::builder()
            .max_size(pool_size.max(1) as u32)
            .connection_customizer(Box::new(ConnectionSetup))
            .build(SqliteConnectionManager::file(path))?;

        let db = Self { pool };
        db.run_migrations()?;

        debug!(path = %path.display(), pool_size = db.pool_size(), "Database opened");
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    ///
    /// Every in-memory SQLite connection is its own database, so the pool
    /// holds exactly one connection and never retires it.
    pub fn open_in_memory() -> StorageResult<Self> {
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(SqliteConnectionManager::memory())?;

        let db = Self { pool };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run database migrations.
    fn run_migrations(&self) -> StorageResult<()> {
        let mut conn = self.acquire()?;
        embedded::migrations::runner().run(&mut *conn)?;
        Ok(())
    }

    /// Number of connections in the pool.
    pub fn pool_size(&self) -> usize {
        self.pool.max_size() as usize
    }

    /// Check out a connection for the duration of the returned guard.
    ///
    /// Blocks while every connection is in use; call from blocking contexts.
    pub fn acquire(&self) -> StorageResult<PooledConnection> {
        Ok(self.pool.get()?)
    }

    /// Execute a function with exclusive access to a pooled connection.
    pub fn with_conn<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        let conn = self.acquire()?;
        f(&conn)
    }
}

/// Get the current timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn in_memory_pool_has_single_connection() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.pool_size(), 1);
    }

    #[test]
    fn file_database_opens_requested_pool_size() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_path(dir.path().join("tasks.db"), 3).unwrap();
        assert_eq!(db.pool_size(), 3);

        // All connections see the migrated schema and run in WAL mode.
        let a = db.acquire().unwrap();
        let b = db.acquire().unwrap();
        let c = db.acquire().unwrap();
        for conn in [&a, &b, &c] {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM task", [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 0);
            let mode: String = conn
                .query_row("PRAGMA journal_mode", [], |row| row.get(0))
                .unwrap();
            assert_eq!(mode.to_lowercase(), "wal");
        }
    }

    #[test]
    fn acquire_waits_for_release() {
        let db = Database::open_in_memory().unwrap();
        let held = db.acquire().unwrap();

        let db2 = db.clone();
        let waiter = thread::spawn(move || {
            let conn = db2.acquire().unwrap();
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .unwrap()
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());
        drop(held);
        assert_eq!(waiter.join().unwrap(), 1);
    }

    #[test]
    fn file_pool_caps_checked_out_connections() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_path(dir.path().join("tasks.db"), 2).unwrap();
        let first = db.acquire().unwrap();
        let _second = db.acquire().unwrap();

        let db2 = db.clone();
        let waiter = thread::spawn(move || db2.with_conn(|conn| Ok(conn.is_autocommit())).unwrap());

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());
        drop(first);
        assert!(waiter.join().unwrap());
    }
}
