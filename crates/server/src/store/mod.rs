//! Document store collaborator.
//!
//! The hosted backend is an external collaborator providing keyed documents
//! under named collections with real-time change notification. This module
//! is the in-process realization of that contract, with exactly the
//! operation set the application uses: get, set (full replace), add,
//! update-fields, delete, query-by-field-equality, and a per-collection
//! change feed.
//!
//! # Collections
//!
//! - `users` - directory documents, keyed by user identifier
//! - `bookings/<year>` - one ledger document per year (full overwrite)
//! - `mail_queue` - notification outbox, append-only
//!
//! Writes are last-write-wins: `set` replaces the whole document, and two
//! racing writers serialize only on the store's own lock, so the later one
//! silently wins. That is the accepted contract of the booking protocol.
//!
//! When constructed with a snapshot path the whole store is re-serialized
//! to that file after every mutation, and loaded from it on startup.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::{RwLock, broadcast};

/// Document id of the single ledger document inside a `bookings/<year>`
/// collection.
pub const LEDGER_DOC_ID: &str = "days";

/// Users collection name.
pub const USERS_COLLECTION: &str = "users";

/// Outbox collection name.
pub const MAIL_QUEUE_COLLECTION: &str = "mail_queue";

/// Capacity of each collection's change-feed channel.
const CHANGE_FEED_CAPACITY: usize = 64;

/// Errors raised by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A document that was expected to exist is missing.
    #[error("document not found: {collection}/{id}")]
    NotFound {
        /// Collection name.
        collection: String,
        /// Document id.
        id: String,
    },

    /// A document or the snapshot file failed to (de)serialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The snapshot file could not be read or written.
    #[error("snapshot i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// A change notification for one document.
///
/// `doc` carries the new document state, or `None` when the document was
/// deleted. Subscribers render whatever the latest event says; there is no
/// diffing at this layer.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Collection the change happened in.
    pub collection: String,
    /// Document id.
    pub id: String,
    /// New document state, `None` on delete.
    pub doc: Option<Value>,
}

type Collections = BTreeMap<String, BTreeMap<String, Value>>;

struct StoreInner {
    collections: Collections,
    feeds: HashMap<String, broadcast::Sender<ChangeEvent>>,
}

/// In-process document store with change feeds and an optional JSON
/// snapshot file.
///
/// Cheaply cloneable; all clones share the same state.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreInner>>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryStore {
    /// Create an empty store with no snapshot file.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                collections: BTreeMap::new(),
                feeds: HashMap::new(),
            })),
            snapshot_path: None,
        }
    }

    /// Open a store backed by a snapshot file, loading it if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read, or
    /// [`StoreError::Serialization`] if its contents are not a valid
    /// snapshot.
    pub async fn open(path: PathBuf) -> Result<Self, StoreError> {
        let collections: Collections = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(StoreInner {
                collections,
                feeds: HashMap::new(),
            })),
            snapshot_path: Some(path),
        })
    }

    /// Get a document by id.
    pub async fn get(&self, collection: &str, id: &str) -> Option<Value> {
        let inner = self.inner.read().await;
        inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    /// Set a document, replacing any previous content entirely.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the snapshot file cannot be written.
    pub async fn set(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        let snapshot = {
            let mut inner = self.inner.write().await;
            inner
                .collections
                .entry(collection.to_owned())
                .or_default()
                .insert(id.to_owned(), doc.clone());
            publish(&inner, collection, id, Some(doc));
            self.render_snapshot(&inner)?
        };
        self.persist(snapshot).await
    }

    /// Add a document with a generated id. Returns the id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the snapshot file cannot be written.
    pub async fn add(&self, collection: &str, doc: Value) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.set(collection, &id, doc).await?;
        Ok(id)
    }

    /// Shallow-merge fields into an existing document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the document does not exist, and
    /// [`StoreError::Io`] if the snapshot file cannot be written.
    pub async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: serde_json::Map<String, Value>,
    ) -> Result<(), StoreError> {
        let snapshot = {
            let mut inner = self.inner.write().await;
            let doc = inner
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_owned(),
                    id: id.to_owned(),
                })?;

            if let Value::Object(map) = doc {
                for (k, v) in fields {
                    map.insert(k, v);
                }
            }
            let updated = doc.clone();
            publish(&inner, collection, id, Some(updated));
            self.render_snapshot(&inner)?
        };
        self.persist(snapshot).await
    }

    /// Delete a document. Missing documents are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the snapshot file cannot be written.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let snapshot = {
            let mut inner = self.inner.write().await;
            let existed = inner
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.remove(id))
                .is_some();
            if existed {
                publish(&inner, collection, id, None);
            }
            self.render_snapshot(&inner)?
        };
        self.persist(snapshot).await
    }

    /// All documents in a collection, as `(id, doc)` pairs in id order.
    pub async fn list(&self, collection: &str) -> Vec<(String, Value)> {
        let inner = self.inner.read().await;
        inner
            .collections
            .get(collection)
            .map(|docs| docs.iter().map(|(id, doc)| (id.clone(), doc.clone())).collect())
            .unwrap_or_default()
    }

    /// Documents whose top-level `field` equals `value`.
    pub async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Vec<(String, Value)> {
        let inner = self.inner.read().await;
        inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| doc.get(field) == Some(value))
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Subscribe to changes in one collection.
    ///
    /// Every mutation in the collection produces a [`ChangeEvent`] with the
    /// new document state. Slow subscribers may observe lag; they should
    /// treat each event as "re-read the latest state".
    pub async fn watch(&self, collection: &str) -> broadcast::Receiver<ChangeEvent> {
        let mut inner = self.inner.write().await;
        inner
            .feeds
            .entry(collection.to_owned())
            .or_insert_with(|| broadcast::channel(CHANGE_FEED_CAPACITY).0)
            .subscribe()
    }

    /// Serialize the current collections for the snapshot file, if any.
    fn render_snapshot(&self, inner: &StoreInner) -> Result<Option<Vec<u8>>, StoreError> {
        if self.snapshot_path.is_none() {
            return Ok(None);
        }
        Ok(Some(serde_json::to_vec_pretty(&inner.collections)?))
    }

    /// Write a rendered snapshot to disk, outside the store lock.
    async fn persist(&self, snapshot: Option<Vec<u8>>) -> Result<(), StoreError> {
        if let (Some(path), Some(bytes)) = (&self.snapshot_path, snapshot) {
            tokio::fs::write(path, bytes).await?;
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Send a change event to the collection's feed, if anyone is listening.
fn publish(inner: &StoreInner, collection: &str, id: &str, doc: Option<Value>) {
    if let Some(sender) = inner.feeds.get(collection) {
        // A send error only means there are no live receivers.
        let _ = sender.send(ChangeEvent {
            collection: collection.to_owned(),
            id: id.to_owned(),
            doc,
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryStore::new();
        store
            .set(USERS_COLLECTION, "me", json!({"name": "Me"}))
            .await
            .unwrap();

        assert_eq!(
            store.get(USERS_COLLECTION, "me").await,
            Some(json!({"name": "Me"}))
        );
        assert_eq!(store.get(USERS_COLLECTION, "sarah").await, None);
    }

    #[tokio::test]
    async fn test_set_replaces_whole_document() {
        let store = MemoryStore::new();
        store
            .set(USERS_COLLECTION, "me", json!({"name": "Me", "role": "user"}))
            .await
            .unwrap();
        store
            .set(USERS_COLLECTION, "me", json!({"name": "Someone"}))
            .await
            .unwrap();

        // No merge: the old "role" field is gone.
        assert_eq!(
            store.get(USERS_COLLECTION, "me").await,
            Some(json!({"name": "Someone"}))
        );
    }

    #[tokio::test]
    async fn test_update_fields_merges() {
        let store = MemoryStore::new();
        store
            .set(USERS_COLLECTION, "me", json!({"name": "Me", "role": "user"}))
            .await
            .unwrap();

        let mut fields = serde_json::Map::new();
        fields.insert("color".to_owned(), json!("#1E88E5"));
        store
            .update_fields(USERS_COLLECTION, "me", fields)
            .await
            .unwrap();

        assert_eq!(
            store.get(USERS_COLLECTION, "me").await,
            Some(json!({"name": "Me", "role": "user", "color": "#1E88E5"}))
        );
    }

    #[tokio::test]
    async fn test_update_fields_missing_doc() {
        let store = MemoryStore::new();
        let result = store
            .update_fields(USERS_COLLECTION, "ghost", serde_json::Map::new())
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_query_by_field() {
        let store = MemoryStore::new();
        store
            .set(USERS_COLLECTION, "me", json!({"role": "user"}))
            .await
            .unwrap();
        store
            .set(USERS_COLLECTION, "admin", json!({"role": "admin"}))
            .await
            .unwrap();

        let admins = store
            .query_by_field(USERS_COLLECTION, "role", &json!("admin"))
            .await;
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].0, "admin");
    }

    #[tokio::test]
    async fn test_watch_receives_changes() {
        let store = MemoryStore::new();
        let mut feed = store.watch("bookings/2026").await;

        store
            .set("bookings/2026", LEDGER_DOC_ID, json!({"2026-07-15": []}))
            .await
            .unwrap();

        let event = feed.recv().await.unwrap();
        assert_eq!(event.collection, "bookings/2026");
        assert_eq!(event.id, LEDGER_DOC_ID);
        assert!(event.doc.is_some());
    }

    #[tokio::test]
    async fn test_watch_sees_deletes() {
        let store = MemoryStore::new();
        store
            .set(USERS_COLLECTION, "me", json!({"name": "Me"}))
            .await
            .unwrap();

        let mut feed = store.watch(USERS_COLLECTION).await;
        store.delete(USERS_COLLECTION, "me").await.unwrap();

        let event = feed.recv().await.unwrap();
        assert_eq!(event.id, "me");
        assert!(event.doc.is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        // Two writers read the same state and write back divergent
        // documents; the second replaces the first wholesale. This is the
        // accepted overwrite race of the booking protocol.
        let store = MemoryStore::new();

        store
            .set("bookings/2026", LEDGER_DOC_ID, json!({"2026-07-01": [{"user": "a"}]}))
            .await
            .unwrap();
        store
            .set("bookings/2026", LEDGER_DOC_ID, json!({"2026-07-02": [{"user": "b"}]}))
            .await
            .unwrap();

        let doc = store.get("bookings/2026", LEDGER_DOC_ID).await.unwrap();
        assert!(doc.get("2026-07-01").is_none());
        assert!(doc.get("2026-07-02").is_some());
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip() {
        let dir = std::env::temp_dir().join(format!("maison-store-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("store.json");

        let store = MemoryStore::open(path.clone()).await.unwrap();
        store
            .set(USERS_COLLECTION, "me", json!({"name": "Me"}))
            .await
            .unwrap();

        let reopened = MemoryStore::open(path).await.unwrap();
        assert_eq!(
            reopened.get(USERS_COLLECTION, "me").await,
            Some(json!({"name": "Me"}))
        );
    }
}
