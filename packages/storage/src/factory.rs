use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::{
    JsonStorage, SqliteStorage, StorageConfig, StorageError, StorageProvider, StorageResult,
    TodoStorage,
};

/// Factory for creating storage instances based on configuration
pub struct StorageFactory;

impl StorageFactory {
    /// Create a storage instance for the given configuration.
    ///
    /// When `auto_provision` is set the backend's idempotent
    /// provisioning (schema migrations or snapshot file creation) runs
    /// before the instance is returned.
    pub async fn create_storage(config: StorageConfig) -> StorageResult<Box<dyn TodoStorage>> {
        let storage: Box<dyn TodoStorage> = match &config.provider {
            StorageProvider::Sqlite { path } => {
                info!("Creating SQLite storage at {:?}", path);
                Box::new(SqliteStorage::new(config.clone()).await?)
            }
            StorageProvider::Json { path } => {
                info!("Creating JSON snapshot storage at {:?}", path);
                Box::new(JsonStorage::from_config(&config)?)
            }
        };

        if config.auto_provision {
            storage.initialize().await?;
        }

        Ok(storage)
    }

    /// Build a configuration from a URL-style connection string.
    ///
    /// Supported forms: `sqlite:/path/to.db` and `json:/path/to.json`.
    pub fn config_from_url(url: &str, auto_provision: bool) -> StorageResult<StorageConfig> {
        let provider = if let Some(path) = url.strip_prefix("sqlite:") {
            if path.is_empty() {
                return Err(StorageError::InvalidFormat);
            }
            StorageProvider::Sqlite {
                path: PathBuf::from(path),
            }
        } else if let Some(path) = url.strip_prefix("json:") {
            if path.is_empty() {
                return Err(StorageError::InvalidFormat);
            }
            StorageProvider::Json {
                path: PathBuf::from(path),
            }
        } else {
            return Err(StorageError::InvalidFormat);
        };

        Ok(StorageConfig {
            provider,
            auto_provision,
            ..StorageConfig::default()
        })
    }

    /// Create a storage instance from a URL-style connection string
    pub async fn from_url(url: &str, auto_provision: bool) -> StorageResult<Box<dyn TodoStorage>> {
        let config = Self::config_from_url(url, auto_provision)?;
        Self::create_storage(config).await
    }
}

/// Holds the active storage backend alongside the configuration that
/// produced it
#[derive(Clone)]
pub struct StorageManager {
    storage: Arc<Box<dyn TodoStorage>>,
    config: StorageConfig,
}

impl StorageManager {
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        let storage = StorageFactory::create_storage(config.clone()).await?;
        Ok(Self {
            storage: Arc::new(storage),
            config,
        })
    }

    pub fn storage(&self) -> &dyn TodoStorage {
        self.storage.as_ref().as_ref()
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}
