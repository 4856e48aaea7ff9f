// ABOUTME: Persistence backends for Taskpad todos
// ABOUTME: SQLite row store and JSON snapshot store behind one trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use taskpad_core::{NewTodo, Todo, TodoChanges, TodoStats};

// Re-export modules
pub mod factory;
pub mod json;
pub mod migrate;
pub mod sqlite;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Todo not found")]
    NotFound,
    #[error("Invalid storage configuration")]
    InvalidFormat,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    /// Run idempotent schema/file provisioning when the backend is created
    pub auto_provision: bool,
    pub enable_wal: bool,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::Sqlite {
                path: taskpad_core::database_file(),
            },
            auto_provision: true,
            enable_wal: true,
            max_connections: 10,
            busy_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StorageProvider {
    Sqlite { path: PathBuf },
    Json { path: PathBuf },
}

/// Main storage trait that all storage implementations must implement
#[async_trait]
pub trait TodoStorage: Send + Sync {
    /// Idempotent provisioning, safe to run on every startup
    async fn initialize(&self) -> StorageResult<()>;

    // Core CRUD operations
    async fn create_todo(&self, input: NewTodo) -> StorageResult<Todo>;
    async fn get_todo(&self, id: i64) -> StorageResult<Option<Todo>>;
    async fn list_todos(&self) -> StorageResult<Vec<Todo>>;
    async fn update_todo(&self, id: i64, changes: TodoChanges) -> StorageResult<Todo>;
    async fn delete_todo(&self, id: i64) -> StorageResult<Todo>;

    // Bulk and aggregate operations
    async fn clear_completed(&self) -> StorageResult<u64>;
    async fn stats(&self) -> StorageResult<TodoStats>;
}

// Re-export the concrete backends and factory types
pub use factory::{StorageFactory, StorageManager};
pub use json::JsonStorage;
pub use migrate::import_legacy_snapshot;
pub use sqlite::SqliteStorage;
