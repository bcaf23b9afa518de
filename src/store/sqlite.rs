//! rusqlite implementation of [`StoreDao`].

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::db::StoreDatabase;
use super::error::StoreResult;
use super::live::LiveQuery;
use super::{Store, StoreDao};

const SELECT_STORE: &str = "SELECT id, name, external, initialized FROM store";

fn map_row(row: &Row) -> rusqlite::Result<Store> {
    Ok(Store {
        id: row.get("id")?,
        name: row.get("name")?,
        external: row.get("external")?,
        initialized: row.get("initialized")?,
    })
}

fn query_stores<P>(conn: &Connection, sql: &str, params: P) -> StoreResult<Vec<Store>>
where
    P: rusqlite::Params,
{
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(params, map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn insert(conn: &Connection, store: &Store) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO store (id, name, external, initialized) VALUES (?1, ?2, ?3, ?4)",
        params![store.id, store.name, store.external, store.initialized],
    )
}

fn update(conn: &Connection, store: &Store) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE store SET name = ?2, external = ?3, initialized = ?4 WHERE id = ?1",
        params![store.id, store.name, store.external, store.initialized],
    )
}

fn delete(conn: &Connection, store: &Store) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM store WHERE id = ?1", [store.id])
}

/// [`StoreDao`] backed by a [`StoreDatabase`].
#[derive(Clone)]
pub struct SqliteStoreDao {
    db: StoreDatabase,
}

impl SqliteStoreDao {
    pub fn new(db: StoreDatabase) -> Self {
        Self { db }
    }

    /// Runs `op` on every store inside one transaction and announces the
    /// change after commit.
    fn write_all<F>(&self, stores: &[Store], op: F) -> StoreResult<usize>
    where
        F: Fn(&Connection, &Store) -> rusqlite::Result<usize>,
    {
        let affected = {
            let mut conn = self.db.inner.conn();
            let tx = conn.transaction()?;
            let mut affected = 0;
            for store in stores {
                affected += op(&tx, store)?;
            }
            tx.commit()?;
            affected
        };
        debug!("Store write committed ({} rows)", affected);
        self.db.inner.notify_changed();
        Ok(affected)
    }

    fn live_list<F>(&self, query: F) -> LiveQuery<Vec<Store>>
    where
        F: Fn(&Connection) -> StoreResult<Vec<Store>> + Send + Sync + 'static,
    {
        LiveQuery::new(&self.db, query)
    }
}

impl StoreDao for SqliteStoreDao {
    fn insert_store(&self, store: &Store) -> StoreResult<()> {
        self.insert_stores(std::slice::from_ref(store))
    }

    fn insert_stores(&self, stores: &[Store]) -> StoreResult<()> {
        self.write_all(stores, insert)?;
        Ok(())
    }

    fn update_store(&self, store: &Store) -> StoreResult<usize> {
        self.update_stores(std::slice::from_ref(store))
    }

    fn update_stores(&self, stores: &[Store]) -> StoreResult<usize> {
        self.write_all(stores, update)
    }

    fn delete_store(&self, store: &Store) -> StoreResult<usize> {
        self.delete_stores(std::slice::from_ref(store))
    }

    fn delete_stores(&self, stores: &[Store]) -> StoreResult<usize> {
        self.write_all(stores, delete)
    }

    fn get_all_stores(&self) -> LiveQuery<Vec<Store>> {
        self.live_list(|conn| query_stores(conn, &format!("{SELECT_STORE} ORDER BY id"), []))
    }

    fn get_store_by_name(&self, pattern: &str) -> LiveQuery<Vec<Store>> {
        let pattern = pattern.to_string();
        self.live_list(move |conn| {
            query_stores(
                conn,
                &format!("{SELECT_STORE} WHERE name LIKE ?1 ORDER BY id"),
                [&pattern],
            )
        })
    }

    fn get_store_by_id(&self, id: i64) -> LiveQuery<Option<Store>> {
        LiveQuery::new(&self.db, move |conn| {
            let mut stmt = conn.prepare_cached(&format!("{SELECT_STORE} WHERE id = ?1"))?;
            Ok(stmt.query_row([id], map_row).optional()?)
        })
    }

    fn get_all_external_stores(&self) -> LiveQuery<Vec<Store>> {
        self.live_list(|conn| {
            query_stores(
                conn,
                &format!("{SELECT_STORE} WHERE external = 1 ORDER BY id"),
                [],
            )
        })
    }

    fn get_all_initialized_stores(&self) -> LiveQuery<Vec<Store>> {
        self.live_list(|conn| {
            query_stores(
                conn,
                &format!("{SELECT_STORE} WHERE initialized = 1 ORDER BY id"),
                [],
            )
        })
    }
}
