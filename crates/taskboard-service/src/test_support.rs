use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use taskboard_core::{StorageConfig, TaskboardError, TaskboardResult};
use taskboard_domain::{
    Board, BoardOperations, Card, Column, CreateBoardRequest, CreateCardRequest,
    CreateColumnRequest,
};
use taskboard_persistence::{Database, Filter, MemoryBackend, StorageBackend, Update};
use uuid::Uuid;

use crate::service::{ServiceSettings, TaskboardService};

pub async fn memory_db() -> Arc<Database> {
    let db = Database::new(StorageConfig::memory());
    db.connect().await.unwrap();
    Arc::new(db)
}

pub async fn memory_service() -> TaskboardService {
    TaskboardService::new(memory_db().await, ServiceSettings::default())
}

pub async fn board(service: &TaskboardService, owner: Uuid, title: &str) -> Board {
    service
        .create_board(
            owner,
            CreateBoardRequest {
                title: Some(title.to_string()),
                description: Some("Board used in tests".to_string()),
                board_type: Some("public".to_string()),
            },
        )
        .await
        .unwrap()
}

pub async fn column(service: &TaskboardService, board_id: Uuid, title: &str) -> Column {
    service
        .create_column(CreateColumnRequest {
            board_id: Some(board_id.to_string()),
            title: Some(title.to_string()),
        })
        .await
        .unwrap()
}

pub async fn card(service: &TaskboardService, column: &Column, title: &str) -> Card {
    service
        .create_card(CreateCardRequest {
            board_id: Some(column.board_id.to_string()),
            column_id: Some(column.id.to_string()),
            title: Some(title.to_string()),
            description: None,
        })
        .await
        .unwrap()
}

/// Memory backend whose `find_one_and_update` can be made to fail once.
pub struct FailingBackend {
    inner: MemoryBackend,
    remaining: AtomicUsize,
    armed: AtomicBool,
}

impl FailingBackend {
    pub fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
            remaining: AtomicUsize::new(0),
            armed: AtomicBool::new(false),
        }
    }

    /// Let `successes` more updates through, then fail the next one.
    pub fn fail_after(&self, successes: usize) {
        self.remaining.store(successes, Ordering::SeqCst);
        self.armed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorageBackend for FailingBackend {
    async fn insert_one(&self, collection: &str, doc: Value) -> TaskboardResult<()> {
        self.inner.insert_one(collection, doc).await
    }

    async fn find(&self, collection: &str, filter: &Filter) -> TaskboardResult<Vec<Value>> {
        self.inner.find(collection, filter).await
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> TaskboardResult<Option<Value>> {
        if self.armed.load(Ordering::SeqCst) {
            if self.remaining.load(Ordering::SeqCst) == 0 {
                self.armed.store(false, Ordering::SeqCst);
                return Err(TaskboardError::Storage("injected write failure".to_string()));
            }
            self.remaining.fetch_sub(1, Ordering::SeqCst);
        }
        self.inner.find_one_and_update(collection, filter, update).await
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> TaskboardResult<u64> {
        self.inner.update_many(collection, filter, update).await
    }

    async fn ping(&self) -> TaskboardResult<()> {
        Ok(())
    }

    async fn close(&self) -> TaskboardResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
