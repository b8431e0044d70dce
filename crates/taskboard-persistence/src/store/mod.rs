pub mod atomic_writer;
pub mod json_file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::sync::Arc;

use taskboard_core::{StorageBackendKind, StorageConfig, TaskboardError, TaskboardResult};

use crate::backend::StorageBackend;

pub use atomic_writer::AtomicWriter;
pub use json_file::{JsonEnvelope, JsonFileBackend};
pub use memory::MemoryBackend;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;

/// Build the backend named by `config`. File backends need a resolvable path.
pub async fn open_backend(config: &StorageConfig) -> TaskboardResult<Arc<dyn StorageBackend>> {
    let missing_path = || {
        TaskboardError::Config(format!(
            "no path configured for the {} backend and no data directory available",
            config.backend
        ))
    };

    match config.backend {
        StorageBackendKind::Memory => Ok(Arc::new(MemoryBackend::new())),
        StorageBackendKind::Json => {
            let path = config.effective_path().ok_or_else(missing_path)?;
            Ok(Arc::new(JsonFileBackend::open(path).await?))
        }
        #[cfg(feature = "sqlite")]
        StorageBackendKind::Sqlite => {
            let path = config.effective_path().ok_or_else(missing_path)?;
            Ok(Arc::new(SqliteBackend::new(path)))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageBackendKind::Sqlite => Err(TaskboardError::Config(
            "the sqlite backend requires building with the `sqlite` feature".to_string(),
        )),
    }
}
