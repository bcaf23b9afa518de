//! SQLite connection shared by the DAO and its live queries.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use tokio::sync::watch;
use tracing::debug;

use super::error::StoreResult;

/// Create the `store` table.
fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS store (
            id           INTEGER PRIMARY KEY NOT NULL,
            name         TEXT NOT NULL,
            external     INTEGER NOT NULL DEFAULT 0,
            initialized  INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_store_name ON store(name);
        "#,
    )
}

/// Counter SQLite bumps when another connection commits to the file.
pub(crate) fn data_version(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("PRAGMA data_version", [], |row| row.get(0))
}

pub(crate) struct DbInner {
    conn: Mutex<Connection>,
    /// Bumped after every committed write to `store`.
    changes: watch::Sender<u64>,
}

impl DbInner {
    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    pub(crate) fn notify_changed(&self) {
        self.changes.send_modify(|version| *version = version.wrapping_add(1));
    }
}

/// Handle to the store database. Cheap to clone.
///
/// Live queries hold a weak reference, so they end once every handle
/// (and every DAO built from one) is dropped.
#[derive(Clone)]
pub struct StoreDatabase {
    pub(crate) inner: Arc<DbInner>,
}

impl StoreDatabase {
    /// Opens (or creates) the database at `path` and migrates it.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        debug!("Opening store database {:?}", path);
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        migrate(&conn)?;
        let (changes, _) = watch::channel(0);
        Ok(Self {
            inner: Arc::new(DbInner {
                conn: Mutex::new(conn),
                changes,
            }),
        })
    }

    /// Number of committed writes seen since opening.
    pub fn version(&self) -> u64 {
        *self.inner.changes.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='store'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_open_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stores.sqlite");

        let db = StoreDatabase::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(db.version(), 0);
    }

    #[test]
    fn test_data_version_tracks_other_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stores.sqlite");
        let reader = StoreDatabase::open(&path).unwrap();
        let writer = StoreDatabase::open(&path).unwrap();

        let before = data_version(&reader.inner.conn()).unwrap();
        writer
            .inner
            .conn()
            .execute("INSERT INTO store (id, name) VALUES (1, 'a')", [])
            .unwrap();

        assert_ne!(data_version(&reader.inner.conn()).unwrap(), before);
    }

    #[test]
    fn test_notify_bumps_version() {
        let db = StoreDatabase::open_in_memory().unwrap();
        db.inner.notify_changed();
        db.inner.notify_changed();
        assert_eq!(db.version(), 2);
    }
}
