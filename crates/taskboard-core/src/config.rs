use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::TaskboardError;
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::result::TaskboardResult;

/// Which document-store backend the gateway opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    Memory,
    #[default]
    Json,
    Sqlite,
}

impl fmt::Display for StorageBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Memory => "memory",
            Self::Json => "json",
            Self::Sqlite => "sqlite",
        };
        f.write_str(name)
    }
}

impl FromStr for StorageBackendKind {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "json" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(TaskboardError::Config(format!(
                "unknown storage backend '{}', expected memory, json or sqlite",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackendKind,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn memory() -> Self {
        Self {
            backend: StorageBackendKind::Memory,
            path: None,
        }
    }

    pub fn json(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackendKind::Json,
            path: Some(path.into()),
        }
    }

    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackendKind::Sqlite,
            path: Some(path.into()),
        }
    }

    /// Configured path, or the platform data directory when none is set.
    pub fn effective_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(|| {
            let file = match self.backend {
                StorageBackendKind::Memory => return None,
                StorageBackendKind::Json => "taskboard.json",
                StorageBackendKind::Sqlite => "taskboard.db",
            };
            dirs::data_dir().map(|dir| dir.join("taskboard").join(file))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

fn default_items_per_page() -> u32 {
    DEFAULT_ITEMS_PER_PAGE
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderingConfig {
    /// Check client-submitted card orders against the stored columns before a move.
    #[serde(default)]
    pub strict_move_validation: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub ordering: OrderingConfig,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/taskboard/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("taskboard/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("taskboard\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Load from the platform config location, falling back to defaults when the
    /// file is absent or unreadable.
    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                if let Ok(config) = Self::load_from(&config_path) {
                    return config;
                }
            }
        }
        Self::default()
    }

    /// Load from an explicit file. Unlike [`AppConfig::load`] this reports errors.
    pub fn load_from(path: &Path) -> TaskboardResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> TaskboardResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| TaskboardError::Config(e.to_string()))?;
        if config.listing.items_per_page == 0 {
            return Err(TaskboardError::Config(
                "listing.items_per_page must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }
}
