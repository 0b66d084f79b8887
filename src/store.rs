use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, trace};
use uuid::Uuid;

/// A stored record: a JSON object carrying its generated `id` field.
pub type Document = serde_json::Map<String, Value>;

/// Errors surfaced by the document store. All of them map to HTTP 500 at the
/// handler boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is not connected")]
    NotConnected,
    #[error("no document with id {0} in collection {1}")]
    MissingDocument(String, String),
}

/// Opaque document store contract: one collection per resource type,
/// equality-filtered lookups, insert/save/delete. Handlers receive an
/// explicitly constructed instance through `AppState` rather than reaching
/// for ambient module state.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in `collection` matching every `(field, value)` pair.
    async fn find(
        &self,
        collection: &str,
        filters: &[(String, Value)],
    ) -> Result<Vec<Document>, StoreError>;

    async fn find_by_id(&self, collection: &str, id: &str)
        -> Result<Option<Document>, StoreError>;

    /// Insert `doc`, assigning a fresh `id`. Returns the stored document.
    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError>;

    /// Replace the document with the given `id` wholesale.
    async fn save(&self, collection: &str, id: &str, doc: Document)
        -> Result<Document, StoreError>;

    /// Remove one document; `Ok(false)` when no document had that id.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Remove every document matching the filters; returns how many went.
    async fn delete_many(
        &self,
        collection: &str,
        filters: &[(String, Value)],
    ) -> Result<u64, StoreError>;

    /// Cheap liveness probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release the store. Later calls fail with `NotConnected`.
    async fn close(&self) -> Result<(), StoreError>;
}

/// In-memory store: a map of collection name to documents in insertion
/// order. Writes are last-write-wins behind a single async lock; there is no
/// cross-collection transaction.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    open: AtomicBool,
}

impl MemoryStore {
    pub fn connect() -> Self {
        debug!("Opening in-memory document store");
        Self {
            collections: RwLock::new(HashMap::new()),
            open: AtomicBool::new(true),
        }
    }

    fn check_open(&self) -> Result<(), StoreError> {
        if self.open.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::NotConnected)
        }
    }
}

/// Equality used by filters. Query parameters arrive as strings, so a string
/// filter also matches a numeric field with the same rendering.
fn value_eq(stored: &Value, filter: &Value) -> bool {
    if stored == filter {
        return true;
    }
    match (stored, filter) {
        (Value::Number(n), Value::String(s)) => n.to_string() == *s,
        (Value::Bool(b), Value::String(s)) => b.to_string() == *s,
        _ => false,
    }
}

fn matches(doc: &Document, filters: &[(String, Value)]) -> bool {
    filters
        .iter()
        .all(|(field, value)| doc.get(field).is_some_and(|stored| value_eq(stored, value)))
}

fn doc_id(doc: &Document) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filters: &[(String, Value)],
    ) -> Result<Vec<Document>, StoreError> {
        self.check_open()?;
        let collections = self.collections.read().await;
        let docs = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches(doc, filters))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        trace!(collection, count = docs.len(), "find");
        Ok(docs)
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.check_open()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc_id(doc) == Some(id)))
            .cloned())
    }

    async fn insert(&self, collection: &str, mut doc: Document) -> Result<Document, StoreError> {
        self.check_open()?;
        let id = Uuid::new_v4().to_string();
        doc.insert("id".to_string(), Value::String(id.clone()));
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        trace!(collection, %id, "insert");
        Ok(doc)
    }

    async fn save(
        &self,
        collection: &str,
        id: &str,
        mut doc: Document,
    ) -> Result<Document, StoreError> {
        self.check_open()?;
        doc.insert("id".to_string(), Value::String(id.to_string()));
        let mut collections = self.collections.write().await;
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::MissingDocument(id.to_string(), collection.to_string()))?;
        let slot = docs
            .iter_mut()
            .find(|existing| doc_id(existing) == Some(id))
            .ok_or_else(|| StoreError::MissingDocument(id.to_string(), collection.to_string()))?;
        *slot = doc.clone();
        trace!(collection, id, "save");
        Ok(doc)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        self.check_open()?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|doc| doc_id(doc) != Some(id));
        Ok(docs.len() < before)
    }

    async fn delete_many(
        &self,
        collection: &str,
        filters: &[(String, Value)],
    ) -> Result<u64, StoreError> {
        self.check_open()?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|doc| !matches(doc, filters));
        let removed = (before - docs.len()) as u64;
        trace!(collection, removed, "delete_many");
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_open()
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.check_open()?;
        self.open.store(false, Ordering::SeqCst);
        debug!("In-memory document store closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(pairs: &[(&str, Value)]) -> Document {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn insert_assigns_id_and_find_returns_in_order() {
        let store = MemoryStore::connect();
        let first = store
            .insert("wallets", doc(&[("name", json!("a"))]))
            .await
            .unwrap();
        store
            .insert("wallets", doc(&[("name", json!("b"))]))
            .await
            .unwrap();

        assert!(first.get("id").and_then(Value::as_str).is_some());
        let all = store.find("wallets", &[]).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0]["name"], json!("a"));
        assert_eq!(all[1]["name"], json!("b"));
    }

    #[tokio::test]
    async fn string_filter_matches_numeric_field() {
        let store = MemoryStore::connect();
        store
            .insert("transactions", doc(&[("amount", json!(100))]))
            .await
            .unwrap();

        let hits = store
            .find(
                "transactions",
                &[("amount".to_string(), json!("100"))],
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn delete_many_removes_only_matches() {
        let store = MemoryStore::connect();
        store
            .insert("transactions", doc(&[("user", json!("u1"))]))
            .await
            .unwrap();
        store
            .insert("transactions", doc(&[("user", json!("u2"))]))
            .await
            .unwrap();

        let removed = store
            .delete_many("transactions", &[("user".to_string(), json!("u1"))])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.find("transactions", &[]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn closed_store_refuses_operations() {
        let store = MemoryStore::connect();
        store.close().await.unwrap();
        let err = store.find("users", &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::NotConnected));
    }
}
