//! Item entity and the JSON payloads exchanged over the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single item owned by the store.
///
/// Values handed out by the store are clones; mutating one never touches the
/// stored copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Store-assigned identifier (e.g. "item-1"), immutable
    pub id: String,
    /// Trimmed, non-empty display name
    pub name: String,
    /// Completion flag, false at creation
    pub done: bool,
    /// Set once at creation
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful update, never earlier than `created_at`
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied by [`crate::store::ItemStore::update`].
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub done: Option<bool>,
}

impl ItemPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn done(mut self, done: bool) -> Self {
        self.done = Some(done);
        self
    }
}

/// Body of `POST /items`.
///
/// A missing `name` decodes as an empty string and is rejected by validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateItemRequest {
    #[serde(default)]
    pub name: String,
}

/// Body of `PUT /items/{id}`. `null` and an absent key both mean "unchanged".
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateItemRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

/// Body of `GET /items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemList {
    pub items: Vec<Item>,
    pub count: usize,
}

impl From<Vec<Item>> for ItemList {
    fn from(items: Vec<Item>) -> Self {
        let count = items.len();
        Self { items, count }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
