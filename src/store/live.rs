//! Observable query results.

use std::fmt;
use std::sync::Weak;

use rusqlite::Connection;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::debug;

use super::db::{data_version, DbInner, StoreDatabase};
use super::error::StoreResult;

/// How often to look for commits made by other connections.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

type QueryFn<T> = Box<dyn Fn(&Connection) -> StoreResult<T> + Send + Sync>;

/// A query that re-runs whenever the `store` table changes.
///
/// The first [`next`](LiveQuery::next) yields the current result. Each later
/// call waits for a committed write and yields the new result, skipping
/// writes that leave this query's result unchanged. Writes through the same
/// [`StoreDatabase`] wake the query at once; commits from other connections
/// or processes are picked up by polling `PRAGMA data_version`. Returns
/// `None` once the database is closed.
pub struct LiveQuery<T> {
    db: Weak<DbInner>,
    changes: watch::Receiver<u64>,
    query: QueryFn<T>,
    last: Option<T>,
    primed: bool,
    /// `data_version` seen when the query last ran.
    seen_version: Option<i64>,
}

impl<T> fmt::Debug for LiveQuery<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveQuery")
            .field("last", &self.last)
            .field("primed", &self.primed)
            .finish()
    }
}

impl<T> LiveQuery<T>
where
    T: Clone + PartialEq,
{
    pub(crate) fn new<F>(db: &StoreDatabase, query: F) -> Self
    where
        F: Fn(&Connection) -> StoreResult<T> + Send + Sync + 'static,
    {
        Self {
            db: std::sync::Arc::downgrade(&db.inner),
            changes: db.inner.subscribe(),
            query: Box::new(query),
            last: None,
            primed: false,
            seen_version: None,
        }
    }

    /// Waits for the next distinct result.
    pub async fn next(&mut self) -> Option<StoreResult<T>> {
        loop {
            if self.primed {
                tokio::select! {
                    changed = self.changes.changed() => {
                        // Err means the database handle was dropped
                        changed.ok()?;
                    }
                    committed = external_commit(&self.db, self.seen_version) => committed?,
                }
            }
            self.primed = true;

            let result = {
                let db = self.db.upgrade()?;
                let conn = db.conn();
                self.seen_version = data_version(&conn).ok();
                (self.query)(&conn)
            };

            match result {
                Ok(value) if self.last.as_ref() == Some(&value) => continue,
                Ok(value) => {
                    self.last = Some(value.clone());
                    return Some(Ok(value));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }

    /// Runs the query once without waiting or recording the result.
    pub fn current(&self) -> Option<StoreResult<T>> {
        let db = self.db.upgrade()?;
        let conn = db.conn();
        Some((self.query)(&conn))
    }

    /// The most recent result handed out by [`next`](LiveQuery::next).
    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }
}

/// Resolves once another connection has committed since `seen`, or with
/// `None` when the database is closed.
async fn external_commit(db: &Weak<DbInner>, mut seen: Option<i64>) -> Option<()> {
    let mut ticker = interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let version = {
            let db = db.upgrade()?;
            let conn = db.conn();
            data_version(&conn)
        };
        match version {
            Ok(version) if seen.is_some_and(|prev| prev != version) => return Some(()),
            Ok(version) => seen = Some(version),
            Err(e) => debug!("Failed to read data_version: {}", e),
        }
    }
}
