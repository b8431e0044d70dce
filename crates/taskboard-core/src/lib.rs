pub mod config;
pub mod error;
pub mod pagination;
pub mod result;
pub mod traits;

pub use config::{AppConfig, ListingConfig, OrderingConfig, StorageBackendKind, StorageConfig};
pub use error::{FieldError, TaskboardError, ValidationErrors};
pub use pagination::{PageRequest, Paginated};
pub use result::TaskboardResult;
pub use traits::{fields, Entity};
