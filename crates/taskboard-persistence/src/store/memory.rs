use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use taskboard_core::{TaskboardError, TaskboardResult};

use crate::backend::StorageBackend;
use crate::query::{document_id, Filter, Update};

pub type Collections = BTreeMap<String, Vec<Value>>;

/// In-process backend. Collections are vectors in insertion order behind one
/// lock, so every operation is trivially atomic.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: RwLock<Collections>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_collections(collections: Collections) -> Self {
        Self {
            collections: RwLock::new(collections),
        }
    }

    /// Copy of every collection, for persisting elsewhere.
    pub fn snapshot(&self) -> Collections {
        self.collections.read().clone()
    }

    /// Swap in a whole new set of collections.
    pub fn replace(&self, collections: Collections) {
        *self.collections.write() = collections;
    }

    pub fn into_collections(self) -> Collections {
        self.collections.into_inner()
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, Vec::len)
    }

    pub(crate) fn insert_sync(&self, collection: &str, doc: Value) -> TaskboardResult<()> {
        let id = document_id(&doc)?.to_string();
        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| document_id(d).is_ok_and(|existing| existing == id)) {
            return Err(TaskboardError::Conflict(format!(
                "{collection} already holds a document with _id {id}"
            )));
        }
        docs.push(doc);
        Ok(())
    }

    pub(crate) fn find_sync(&self, collection: &str, filter: &Filter) -> Vec<Value> {
        self.collections
            .read()
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn find_one_and_update_sync(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> TaskboardResult<Option<Value>> {
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(slot) = docs.iter_mut().find(|d| filter.matches(d)) else {
            return Ok(None);
        };
        let mut updated = slot.clone();
        update.apply(&mut updated)?;
        *slot = updated.clone();
        Ok(Some(updated))
    }

    pub(crate) fn update_many_sync(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> TaskboardResult<u64> {
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let mut staged = Vec::new();
        for (index, doc) in docs.iter().enumerate() {
            if filter.matches(doc) {
                let mut updated = doc.clone();
                update.apply(&mut updated)?;
                staged.push((index, updated));
            }
        }
        let matched = staged.len() as u64;
        for (index, updated) in staged {
            docs[index] = updated;
        }
        Ok(matched)
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn insert_one(&self, collection: &str, doc: Value) -> TaskboardResult<()> {
        self.insert_sync(collection, doc)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> TaskboardResult<Vec<Value>> {
        Ok(self.find_sync(collection, filter))
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> TaskboardResult<Option<Value>> {
        self.find_one_and_update_sync(collection, filter, update)
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> TaskboardResult<u64> {
        self.update_many_sync(collection, filter, update)
    }

    async fn ping(&self) -> TaskboardResult<()> {
        Ok(())
    }

    async fn close(&self) -> TaskboardResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let backend = MemoryBackend::new();
        backend.insert_one("boards", json!({"_id": "b1"})).await.unwrap();
        backend.insert_one("columns", json!({"_id": "b1"})).await.unwrap();

        let err = backend
            .insert_one("boards", json!({"_id": "b1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskboardError::Conflict(_)));
        assert_eq!(backend.document_count("boards"), 1);
    }

    #[tokio::test]
    async fn test_insert_requires_id() {
        let backend = MemoryBackend::new();
        assert!(backend.insert_one("boards", json!({"title": "x"})).await.is_err());
    }

    #[tokio::test]
    async fn test_find_keeps_insertion_order() {
        let backend = MemoryBackend::new();
        for id in ["z", "a", "m"] {
            backend.insert_one("cards", json!({"_id": id})).await.unwrap();
        }
        let ids: Vec<Value> = backend
            .find("cards", &Filter::All)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d["_id"].clone())
            .collect();
        assert_eq!(ids, vec![json!("z"), json!("a"), json!("m")]);
        assert!(backend.find("nothing", &Filter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_one_and_update_returns_after_image() {
        let backend = MemoryBackend::new();
        backend
            .insert_one("boards", json!({"_id": "b1", "columnOrderIds": []}))
            .await
            .unwrap();

        let after = backend
            .find_one_and_update(
                "boards",
                &Filter::eq("_id", "b1"),
                &Update::new().push("columnOrderIds", "c1"),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after["columnOrderIds"], json!(["c1"]));

        let none = backend
            .find_one_and_update(
                "boards",
                &Filter::eq("_id", "b2"),
                &Update::new().push("columnOrderIds", "c1"),
            )
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_failed_update_leaves_document_untouched() {
        let backend = MemoryBackend::new();
        backend
            .insert_one("boards", json!({"_id": "b1", "title": "x"}))
            .await
            .unwrap();
        let result = backend
            .find_one_and_update(
                "boards",
                &Filter::eq("_id", "b1"),
                &Update::new().set("slug", "x").push("title", "y"),
            )
            .await;
        assert!(result.is_err());
        let stored = backend.find("boards", &Filter::All).await.unwrap();
        assert_eq!(stored, vec![json!({"_id": "b1", "title": "x"})]);
    }

    #[tokio::test]
    async fn test_update_many_counts_matches() {
        let backend = MemoryBackend::new();
        for (id, column) in [("k1", "c1"), ("k2", "c1"), ("k3", "c2")] {
            backend
                .insert_one("cards", json!({"_id": id, "columnId": column, "_destroy": false}))
                .await
                .unwrap();
        }
        let matched = backend
            .update_many(
                "cards",
                &Filter::eq("columnId", "c1"),
                &Update::new().set("_destroy", true),
            )
            .await
            .unwrap();
        assert_eq!(matched, 2);
        let destroyed = backend
            .find("cards", &Filter::eq("_destroy", true))
            .await
            .unwrap();
        assert_eq!(destroyed.len(), 2);
    }
}
