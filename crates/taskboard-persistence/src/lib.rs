//! Persistence gateway: a small document-store model (filters, updates,
//! aggregation pipelines) over pluggable backends.

pub mod backend;
pub mod gateway;
pub mod query;
pub mod store;

pub use backend::StorageBackend;
pub use gateway::{Collection, Database};
pub use query::{Collation, Filter, Lookup, Pipeline, SortDirection, Stage, Update, UpdateOp};
pub use store::{open_backend, AtomicWriter, JsonFileBackend, MemoryBackend};
#[cfg(feature = "sqlite")]
pub use store::SqliteBackend;
