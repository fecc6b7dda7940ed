//! Process-wide shared SQLite connection.
//!
//! # Responsibility
//! - Open the storage connection lazily on first use.
//! - Reuse that one connection for every caller for the process lifetime.
//!
//! # Invariants
//! - The connection is opened (and migrated) at most once.
//! - A failed open is not cached; the next caller retries.
//! - Callers hold the connection only for the duration of one closure.

use super::{open_db, open_db_in_memory, DbError, DbResult};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Mutex;

/// Storage location for a [`SharedDb`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    Memory,
}

/// Lazily opened, mutex-guarded connection shared across requests.
#[derive(Debug)]
pub struct SharedDb {
    location: DbLocation,
    conn: OnceCell<Mutex<Connection>>,
}

impl SharedDb {
    pub fn new(location: DbLocation) -> Self {
        Self {
            location,
            conn: OnceCell::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(DbLocation::Memory)
    }

    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    /// Runs `f` with exclusive access to the shared connection.
    ///
    /// Opens the connection on first call. Errors from opening are converted
    /// into the caller's error type.
    pub fn with_conn<T, E>(&self, f: impl FnOnce(&mut Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let cell = self
            .conn
            .get_or_try_init(|| self.open().map(Mutex::new))
            .map_err(E::from)?;
        let mut guard = cell
            .lock()
            .map_err(|_| E::from(DbError::ConnectionPoisoned))?;
        f(&mut guard)
    }

    fn open(&self) -> DbResult<Connection> {
        match &self.location {
            DbLocation::File(path) => open_db(path),
            DbLocation::Memory => open_db_in_memory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DbLocation, SharedDb};
    use crate::db::DbError;

    #[test]
    fn shared_connection_is_reused_between_calls() {
        let db = SharedDb::in_memory();

        db.with_conn(|conn| {
            conn.execute_batch("CREATE TABLE scratch (value INTEGER);")
                .map_err(DbError::from)
        })
        .unwrap();
        let count: i64 = db
            .with_conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM scratch;", [], |row| row.get(0))
                    .map_err(DbError::from)
            })
            .unwrap();

        assert_eq!(count, 0);
    }

    #[test]
    fn failed_open_surfaces_error_and_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let db = SharedDb::new(DbLocation::File(dir.path().join("missing").join("db.sqlite3")));

        let first = db.with_conn(|_| Ok::<_, DbError>(()));
        assert!(matches!(first, Err(DbError::Sqlite(_))));

        std::fs::create_dir_all(dir.path().join("missing")).unwrap();
        db.with_conn(|_| Ok::<_, DbError>(())).unwrap();
    }
}
