//! Connection lifecycle and typed collection handles.
//!
//! A [`Database`] owns at most one backend. Handles are only available between
//! [`Database::connect`] and [`Database::close`]; asking earlier is an error,
//! never a panic.

use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use taskboard_core::{StorageConfig, TaskboardError, TaskboardResult};

use crate::backend::StorageBackend;
use crate::query::pipeline::execute;
use crate::query::{Filter, Pipeline, Update};
use crate::store::open_backend;

pub struct Database {
    config: StorageConfig,
    backend: RwLock<Option<Arc<dyn StorageBackend>>>,
}

impl Database {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            backend: RwLock::new(None),
        }
    }

    /// A database already connected to `backend`.
    pub fn with_backend(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            config: StorageConfig::memory(),
            backend: RwLock::new(Some(backend)),
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Open and ping the configured backend. Connecting twice is a no-op.
    pub async fn connect(&self) -> TaskboardResult<()> {
        if self.is_connected() {
            return Ok(());
        }

        let backend = open_backend(&self.config).await.map_err(|e| match e {
            TaskboardError::Config(_) | TaskboardError::Connection(_) => e,
            other => TaskboardError::Connection(other.to_string()),
        })?;
        backend.ping().await?;

        let mut slot = self.backend.write();
        if slot.is_none() {
            tracing::info!("Connected to {} storage", backend.name());
            *slot = Some(backend);
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.backend.read().is_some()
    }

    /// The connected backend, or `NotConnected`.
    pub fn backend(&self) -> TaskboardResult<Arc<dyn StorageBackend>> {
        self.backend
            .read()
            .as_ref()
            .cloned()
            .ok_or(TaskboardError::NotConnected)
    }

    pub fn collection<T>(&self, name: &str) -> TaskboardResult<Collection<T>> {
        Ok(Collection {
            name: name.to_string(),
            backend: self.backend()?,
            _marker: PhantomData,
        })
    }

    /// Release the backend. Handles obtained earlier keep working until dropped;
    /// new handles fail with `NotConnected`.
    pub async fn close(&self) -> TaskboardResult<()> {
        let backend = self.backend.write().take();
        if let Some(backend) = backend {
            backend.close().await?;
            tracing::info!("Closed {} storage", backend.name());
        }
        Ok(())
    }
}

/// Typed handle to one collection. Documents are (de)serialized through serde.
pub struct Collection<T> {
    name: String,
    backend: Arc<dyn StorageBackend>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            backend: Arc::clone(&self.backend),
            _marker: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn insert_one(&self, doc: &T) -> TaskboardResult<()> {
        let value = serde_json::to_value(doc)?;
        self.backend.insert_one(&self.name, value).await
    }

    pub async fn find(&self, filter: &Filter) -> TaskboardResult<Vec<T>> {
        self.backend
            .find(&self.name, filter)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn find_one(&self, filter: &Filter) -> TaskboardResult<Option<T>> {
        let first = self.backend.find(&self.name, filter).await?.into_iter().next();
        first.map(decode).transpose()
    }

    /// Atomically update the first match and return it after the update.
    pub async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> TaskboardResult<Option<T>> {
        self.backend
            .find_one_and_update(&self.name, filter, update)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn update_many(&self, filter: &Filter, update: &Update) -> TaskboardResult<u64> {
        self.backend.update_many(&self.name, filter, update).await
    }

    /// Run `pipeline` over this collection. Output documents are untyped since
    /// stages like `Lookup` and `Facet` reshape them.
    pub async fn aggregate(&self, pipeline: &Pipeline) -> TaskboardResult<Vec<Value>> {
        execute(self.backend.as_ref(), &self.name, pipeline).await
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> TaskboardResult<T> {
    serde_json::from_value(value).map_err(|e| {
        tracing::error!("Stored document does not match its schema: {}", e);
        TaskboardError::Serialization(e.to_string())
    })
}
