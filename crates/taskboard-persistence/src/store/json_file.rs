use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskboard_core::{TaskboardError, TaskboardResult};
use uuid::Uuid;

use crate::backend::StorageBackend;
use crate::query::{Filter, Update};
use crate::store::atomic_writer::AtomicWriter;
use crate::store::memory::{Collections, MemoryBackend};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub instance_id: Uuid,
    pub saved_at: DateTime<Utc>,
}

/// On-disk layout of the JSON store.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub version: u32,
    pub metadata: FileMetadata,
    pub collections: Collections,
}

/// Single-file backend: documents live in memory and the whole file is
/// rewritten atomically after every successful write.
///
/// Writes are serialized by an async mutex so the file always reflects a
/// prefix of the acknowledged operations. Only one process should own a file.
pub struct JsonFileBackend {
    path: PathBuf,
    instance_id: Uuid,
    documents: MemoryBackend,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileBackend {
    /// Load `path`, or start empty when it does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> TaskboardResult<Self> {
        let path = path.as_ref().to_path_buf();
        let collections = match AtomicWriter::read_if_exists(&path).await? {
            Some(bytes) => {
                let envelope: JsonEnvelope = serde_json::from_slice(&bytes)?;
                if envelope.version != FORMAT_VERSION {
                    return Err(TaskboardError::Serialization(format!(
                        "Unsupported format version: {}",
                        envelope.version
                    )));
                }
                tracing::info!(
                    "Loaded {} collections from {}",
                    envelope.collections.len(),
                    path.display()
                );
                envelope.collections
            }
            None => {
                tracing::info!("No store at {}, starting empty", path.display());
                Collections::new()
            }
        };

        Ok(Self {
            path,
            instance_id: Uuid::new_v4(),
            documents: MemoryBackend::from_collections(collections),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, collections: Collections) -> TaskboardResult<Collections> {
        let envelope = JsonEnvelope {
            version: FORMAT_VERSION,
            metadata: FileMetadata {
                instance_id: self.instance_id,
                saved_at: Utc::now(),
            },
            collections,
        };
        let bytes = serde_json::to_vec_pretty(&envelope)?;
        AtomicWriter::write_atomic(&self.path, &bytes)
            .await
            .map_err(|e| {
                tracing::error!("Failed to flush {}: {}", self.path.display(), e);
                TaskboardError::Storage(format!("flush to {} failed: {e}", self.path.display()))
            })?;
        Ok(envelope.collections)
    }

    /// Run `op` against a staged copy and publish it only once it is on disk.
    /// A failed flush leaves the visible documents untouched.
    async fn write_through<R>(
        &self,
        op: impl FnOnce(&MemoryBackend) -> TaskboardResult<R>,
        changed: impl FnOnce(&R) -> bool,
    ) -> TaskboardResult<R> {
        let _guard = self.write_lock.lock().await;
        let staged = MemoryBackend::from_collections(self.documents.snapshot());
        let result = op(&staged)?;
        if changed(&result) {
            let written = self.flush(staged.into_collections()).await?;
            self.documents.replace(written);
        }
        Ok(result)
    }
}

#[async_trait]
impl StorageBackend for JsonFileBackend {
    async fn insert_one(&self, collection: &str, doc: Value) -> TaskboardResult<()> {
        self.write_through(|staged| staged.insert_sync(collection, doc), |_| true)
            .await
    }

    async fn find(&self, collection: &str, filter: &Filter) -> TaskboardResult<Vec<Value>> {
        Ok(self.documents.find_sync(collection, filter))
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> TaskboardResult<Option<Value>> {
        self.write_through(
            |staged| staged.find_one_and_update_sync(collection, filter, update),
            Option::is_some,
        )
        .await
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> TaskboardResult<u64> {
        self.write_through(
            |staged| staged.update_many_sync(collection, filter, update),
            |matched| *matched > 0,
        )
        .await
    }

    async fn ping(&self) -> TaskboardResult<()> {
        Ok(())
    }

    async fn close(&self) -> TaskboardResult<()> {
        let _guard = self.write_lock.lock().await;
        tracing::debug!("Closing JSON store at {}", self.path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
