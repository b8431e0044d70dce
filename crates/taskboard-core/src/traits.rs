use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// A document kept in its own store collection and soft-deleted rather than removed.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Name of the collection holding documents of this type.
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;

    fn is_destroyed(&self) -> bool;
}

/// Stored field names shared by every entity.
pub mod fields {
    pub const ID: &str = "_id";
    pub const DESTROYED: &str = "_destroy";
    pub const CREATED_AT: &str = "createdAt";
    pub const UPDATED_AT: &str = "updatedAt";
}
