//! Typed access to the three entity collections.
//!
//! Every read that feeds an order array filters on `_destroy == false`.

pub mod board_model;
pub mod card_model;
pub mod column_model;

use serde_json::Value;
use taskboard_core::{fields, Entity, TaskboardError, TaskboardResult};
use taskboard_domain::ids::now_millis;
use taskboard_persistence::{Collection, Database, Filter, Update};
use uuid::Uuid;

pub use board_model::BoardModel;
pub use card_model::CardModel;
pub use column_model::ColumnModel;

pub fn by_id(id: Uuid) -> Filter {
    Filter::eq(fields::ID, id)
}

pub fn active() -> Filter {
    Filter::eq(fields::DESTROYED, false)
}

pub fn active_by_id(id: Uuid) -> Filter {
    by_id(id).and(active())
}

/// Stamp `updatedAt` onto an update.
pub fn touched(update: Update) -> Update {
    update.set(fields::UPDATED_AT, now_millis().timestamp_millis())
}

pub fn not_found<T: Entity>(id: Uuid) -> TaskboardError {
    TaskboardError::NotFound(format!("{id} in {}", T::COLLECTION))
}

/// Collection handle plus the operations shared by every entity.
pub struct Repository<T> {
    collection: Collection<T>,
}

impl<T: Entity> Repository<T> {
    /// Fails with `NotConnected` when the database is not connected.
    pub fn open(db: &Database) -> TaskboardResult<Self> {
        Ok(Self {
            collection: db.collection(T::COLLECTION)?,
        })
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    async fn insert(&self, entity: T) -> TaskboardResult<T> {
        self.collection.insert_one(&entity).await?;
        tracing::debug!("Inserted {} into {}", entity.id(), T::COLLECTION);
        Ok(entity)
    }

    /// Regardless of `_destroy`.
    pub async fn find_by_id(&self, id: Uuid) -> TaskboardResult<Option<T>> {
        self.collection.find_one(&by_id(id)).await
    }

    pub async fn find_active(&self, id: Uuid) -> TaskboardResult<Option<T>> {
        self.collection.find_one(&active_by_id(id)).await
    }

    pub async fn require_active(&self, id: Uuid) -> TaskboardResult<T> {
        self.find_active(id).await?.ok_or_else(|| not_found::<T>(id))
    }

    /// `$set` the given pairs and `updatedAt` on an active document.
    pub async fn update_fields(
        &self,
        id: Uuid,
        sets: Vec<(&'static str, Value)>,
    ) -> TaskboardResult<Option<T>> {
        let update = sets
            .into_iter()
            .fold(Update::new(), |update, (field, value)| update.set(field, value));
        let updated = self
            .collection
            .find_one_and_update(&active_by_id(id), &touched(update))
            .await?;
        if updated.is_some() {
            tracing::debug!("Updated {} in {}", id, T::COLLECTION);
        }
        Ok(updated)
    }

    pub async fn soft_delete(&self, id: Uuid) -> TaskboardResult<Option<T>> {
        let deleted = self
            .collection
            .find_one_and_update(
                &active_by_id(id),
                &touched(Update::new().set(fields::DESTROYED, true)),
            )
            .await?;
        if let Some(entity) = &deleted {
            tracing::debug!("Soft-deleted {} in {}", entity.id(), T::COLLECTION);
        }
        Ok(deleted)
    }
}
