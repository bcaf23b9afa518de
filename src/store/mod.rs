//! Registry of password stores.
//!
//! A [`Store`] is a named credential-storage root. The [`StoreDao`] trait
//! covers single and batch writes plus live queries that re-emit whenever
//! the table changes. [`SqliteStoreDao`] implements it on rusqlite.

pub mod db;
pub mod error;
pub mod live;
pub mod sqlite;

pub use db::StoreDatabase;
pub use error::{StoreError, StoreResult};
pub use live::LiveQuery;
pub use sqlite::SqliteStoreDao;

/// A registered password store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    /// Primary key
    pub id: i64,
    /// Display name, not necessarily unique
    pub name: String,
    /// Lives outside the app's managed storage
    pub external: bool,
    /// Setup has completed
    pub initialized: bool,
}

impl Store {
    /// A managed, not yet initialized store.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            external: false,
            initialized: false,
        }
    }
}

/// Data access for [`Store`] records.
///
/// Writes match rows by `id`. Batch writes run in one transaction.
pub trait StoreDao: Send + Sync {
    /// Inserts one store. A duplicate id fails with [`StoreError::Constraint`].
    fn insert_store(&self, store: &Store) -> StoreResult<()>;

    /// Inserts all stores or none.
    fn insert_stores(&self, stores: &[Store]) -> StoreResult<()>;

    /// Overwrites the row with the same id. Returns rows affected.
    fn update_store(&self, store: &Store) -> StoreResult<usize>;

    /// Batch form of [`update_store`](StoreDao::update_store).
    fn update_stores(&self, stores: &[Store]) -> StoreResult<usize>;

    /// Deletes the row with the same id. Returns rows affected.
    fn delete_store(&self, store: &Store) -> StoreResult<usize>;

    /// Batch form of [`delete_store`](StoreDao::delete_store).
    fn delete_stores(&self, stores: &[Store]) -> StoreResult<usize>;

    /// Every store, ordered by id.
    fn get_all_stores(&self) -> LiveQuery<Vec<Store>>;

    /// Stores whose name matches a SQL `LIKE` pattern.
    fn get_store_by_name(&self, pattern: &str) -> LiveQuery<Vec<Store>>;

    /// The store with `id`, or `None` while there is none.
    fn get_store_by_id(&self, id: i64) -> LiveQuery<Option<Store>>;

    /// Stores kept outside managed storage.
    fn get_all_external_stores(&self) -> LiveQuery<Vec<Store>>;

    /// Stores that have been set up.
    fn get_all_initialized_stores(&self) -> LiveQuery<Vec<Store>>;
}
