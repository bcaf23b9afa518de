//! `passclip store` subcommands.

use anyhow::{bail, Context, Result};

use crate::store::{LiveQuery, Store, StoreDao, StoreError};

use super::commands::{AddStoreArgs, ListStoresArgs, StoreCommand};
use super::display::Display;

/// First snapshot of a live query.
async fn snapshot<T>(mut query: LiveQuery<T>) -> Result<T>
where
    T: Clone + PartialEq,
{
    Ok(query.next().await.context("Store database closed")??)
}

/// Registers a new store.
pub fn add_store(dao: &dyn StoreDao, args: &AddStoreArgs) -> Result<Store> {
    let store = Store {
        id: args.id,
        name: args.name.clone(),
        external: args.external,
        initialized: args.initialized,
    };
    match dao.insert_store(&store) {
        Ok(()) => Ok(store),
        Err(StoreError::Constraint(_)) => bail!("A store with id {} already exists", args.id),
        Err(e) => Err(e.into()),
    }
}

/// Lists stores matching at most one filter.
pub async fn list_stores(dao: &dyn StoreDao, args: &ListStoresArgs) -> Result<Vec<Store>> {
    let query = if args.external {
        dao.get_all_external_stores()
    } else if args.initialized {
        dao.get_all_initialized_stores()
    } else if let Some(pattern) = &args.name {
        dao.get_store_by_name(pattern)
    } else {
        dao.get_all_stores()
    };
    snapshot(query).await
}

/// Looks up a store by id.
pub async fn find_store(dao: &dyn StoreDao, id: i64) -> Result<Store> {
    snapshot(dao.get_store_by_id(id))
        .await?
        .with_context(|| format!("No store with id {}", id))
}

pub async fn rename_store(dao: &dyn StoreDao, id: i64, name: &str) -> Result<Store> {
    let mut store = find_store(dao, id).await?;
    store.name = name.to_string();
    dao.update_store(&store)?;
    Ok(store)
}

pub async fn set_initialized(dao: &dyn StoreDao, id: i64, initialized: bool) -> Result<Store> {
    let mut store = find_store(dao, id).await?;
    store.initialized = initialized;
    dao.update_store(&store)?;
    Ok(store)
}

/// Removes a store. Fails if no store has `id`.
pub fn remove_store(dao: &dyn StoreDao, id: i64) -> Result<()> {
    if dao.delete_store(&Store::new(id, ""))? == 0 {
        bail!("No store with id {}", id);
    }
    Ok(())
}

/// Prints the store list on every change until Ctrl-C.
async fn watch_stores(dao: &dyn StoreDao) -> Result<()> {
    let mut query = dao.get_all_stores();
    loop {
        tokio::select! {
            next = query.next() => match next {
                Some(stores) => {
                    Display::show_stores(&stores?);
                    println!();
                }
                None => return Ok(()),
            },
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

/// Executes a store subcommand and prints its result.
pub async fn run(dao: &dyn StoreDao, command: StoreCommand) -> Result<()> {
    match command {
        StoreCommand::Add(args) => {
            let store = add_store(dao, &args)?;
            Display::show_done(&format!("Added store {} ({})", store.id, store.name));
        }
        StoreCommand::List(args) => {
            Display::show_stores(&list_stores(dao, &args).await?);
        }
        StoreCommand::Show { id } => {
            Display::show_store(&find_store(dao, id).await?);
        }
        StoreCommand::Rename { id, name } => {
            let store = rename_store(dao, id, &name).await?;
            Display::show_done(&format!("Renamed store {} to {}", store.id, store.name));
        }
        StoreCommand::SetInitialized { id, initialized } => {
            set_initialized(dao, id, initialized).await?;
            Display::show_done(&format!("Store {} initialized: {}", id, initialized));
        }
        StoreCommand::Remove { id } => {
            remove_store(dao, id)?;
            Display::show_done(&format!("Removed store {}", id));
        }
        StoreCommand::Watch => watch_stores(dao).await?,
    }
    Ok(())
}
