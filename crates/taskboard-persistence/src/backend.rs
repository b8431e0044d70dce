use async_trait::async_trait;
use serde_json::Value;
use taskboard_core::TaskboardResult;

use crate::query::{Filter, Update};

/// Document storage primitive behind the gateway.
///
/// Documents are JSON objects keyed by a string `_id`, unique per collection.
/// `find` returns documents in insertion order. Each single-document operation
/// is atomic with respect to every other operation on the same backend.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Fails with `Conflict` when `_id` already exists in the collection.
    async fn insert_one(&self, collection: &str, doc: Value) -> TaskboardResult<()>;

    async fn find(&self, collection: &str, filter: &Filter) -> TaskboardResult<Vec<Value>>;

    /// Apply `update` to the first matching document and return it as it is
    /// after the update, or `None` when nothing matched.
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> TaskboardResult<Option<Value>>;

    /// Apply `update` to every matching document; returns how many matched.
    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> TaskboardResult<u64>;

    async fn ping(&self) -> TaskboardResult<()>;

    async fn close(&self) -> TaskboardResult<()>;

    fn name(&self) -> &'static str;
}
