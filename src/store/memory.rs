//! In-memory item store
//!
//! Items and the id counter live behind a single reader/writer lock. Reads
//! (`get`, `list`) share the lock, writes (`create`, `update`, `delete`)
//! hold it exclusively. No I/O happens while the lock is held.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::model::{Item, ItemPatch};
use crate::store::{ItemStore, StoreError, StoreResult};

const ID_PREFIX: &str = "item-";

#[derive(Debug)]
struct Entry {
    /// Creation sequence number, used for list ordering
    seq: u64,
    item: Item,
}

#[derive(Debug, Default)]
struct Inner {
    items: HashMap<String, Entry>,
    /// Last issued sequence number; ids are never reused
    counter: u64,
}

/// Process-local store. Create a fresh one per test or per server.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    inner: RwLock<Inner>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items
    pub fn len(&self) -> StoreResult<usize> {
        self.read().map(|inner| inner.items.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        self.len().map(|len| len == 0)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Internal("item store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Internal("item store lock poisoned".to_string()))
    }
}

impl ItemStore for MemoryItemStore {
    fn create(&self, name: String) -> StoreResult<Item> {
        let mut inner = self.write()?;

        inner.counter += 1;
        let seq = inner.counter;
        let id = format!("{ID_PREFIX}{seq}");
        let now = Utc::now();

        let item = Item {
            id: id.clone(),
            name,
            done: false,
            created_at: now,
            updated_at: now,
        };

        inner.items.insert(
            id,
            Entry {
                seq,
                item: item.clone(),
            },
        );

        tracing::trace!(id = %item.id, "Item created");
        Ok(item)
    }

    fn get(&self, id: &str) -> StoreResult<Item> {
        let inner = self.read()?;

        inner
            .items
            .get(id)
            .map(|entry| entry.item.clone())
            .ok_or(StoreError::NotFound)
    }

    fn list(&self) -> StoreResult<Vec<Item>> {
        let inner = self.read()?;

        let mut entries: Vec<&Entry> = inner.items.values().collect();
        entries.sort_by_key(|entry| entry.seq);

        Ok(entries.into_iter().map(|entry| entry.item.clone()).collect())
    }

    fn update(&self, id: &str, patch: ItemPatch) -> StoreResult<Item> {
        let mut inner = self.write()?;

        let entry = inner.items.get_mut(id).ok_or(StoreError::NotFound)?;
        let item = &mut entry.item;

        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(done) = patch.done {
            item.done = done;
        }
        // Wall clock may step backwards; keep updated_at >= created_at.
        item.updated_at = Utc::now().max(item.created_at);

        Ok(item.clone())
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.write()?;

        inner
            .items
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
