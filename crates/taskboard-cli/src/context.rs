use std::sync::Arc;

use taskboard_core::{AppConfig, TaskboardError, TaskboardResult};
use taskboard_persistence::Database;
use taskboard_service::{ServiceSettings, TaskboardService};
use uuid::Uuid;

use crate::cli::Cli;

pub struct CliContext {
    pub service: TaskboardService,
    user: Option<Uuid>,
}

impl CliContext {
    /// Merge config file and flags, then open the store.
    pub async fn connect(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => AppConfig::load_from(path)?,
            None => AppConfig::load(),
        };
        if let Some(backend) = cli.backend {
            config.storage.backend = backend;
        }
        if let Some(path) = &cli.store {
            config.storage.path = Some(path.clone());
        }
        tracing::debug!("Using {} storage at {:?}", config.storage.backend, config.storage.effective_path());

        let db = Arc::new(Database::new(config.storage.clone()));
        db.connect().await?;

        Ok(Self {
            service: TaskboardService::new(db, ServiceSettings::from(&config)),
            user: cli.user,
        })
    }

    pub fn require_user(&self) -> TaskboardResult<Uuid> {
        self.user.ok_or_else(|| {
            TaskboardError::validation("user", "is required; pass --user or set TASKBOARD_USER")
        })
    }

    pub async fn close(&self) -> TaskboardResult<()> {
        self.service.database().close().await
    }
}
