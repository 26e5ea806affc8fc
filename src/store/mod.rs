//! Item storage
//!
//! This module defines the storage contract used by the API layer and the
//! in-memory implementation backing the service.

pub mod memory;

pub use memory::MemoryItemStore;

use crate::model::{Item, ItemPatch};
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors a store can report.
///
/// `NotFound` is an expected outcome; `Internal` covers everything else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No item with the requested id
    #[error("item not found")]
    NotFound,

    /// The store could not complete the operation
    #[error("internal store error: {0}")]
    Internal(String),
}

/// Concurrency-safe CRUD over items.
///
/// Callers validate item names before calling `create` or `update`; the
/// store does not re-check them.
pub trait ItemStore: Send + Sync {
    /// Insert a new item with a freshly assigned id
    fn create(&self, name: String) -> StoreResult<Item>;

    /// Fetch a copy of one item
    fn get(&self, id: &str) -> StoreResult<Item>;

    /// Snapshot of every item
    fn list(&self) -> StoreResult<Vec<Item>>;

    /// Apply a partial update and refresh `updated_at`
    fn update(&self, id: &str, patch: ItemPatch) -> StoreResult<Item>;

    /// Remove an item
    fn delete(&self, id: &str) -> StoreResult<()>;
}
