use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use taskpad_core::{
    validate_todo_create, validate_todo_update, Todo, TodoCreateInput, TodoStats, TodoUpdateInput,
    ValidationError,
};
use taskpad_storage::{StorageConfig, StorageError, StorageManager};

/// Errors surfaced by todo operations
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Validation failed")]
    Validation(Vec<ValidationError>),
    #[error("Todo with ID {0} not found")]
    NotFound(i64),
}

/// Coordinates validation and persistence for todo operations
pub struct TodosManager {
    storage_manager: Arc<StorageManager>,
}

impl TodosManager {
    pub fn with_storage(storage_manager: Arc<StorageManager>) -> Self {
        Self { storage_manager }
    }

    pub async fn new(config: StorageConfig) -> Result<Self, ManagerError> {
        let storage_manager = StorageManager::new(config).await?;
        Ok(Self::with_storage(Arc::new(storage_manager)))
    }

    pub fn storage_manager(&self) -> &StorageManager {
        &self.storage_manager
    }

    pub async fn list_todos(&self) -> Result<Vec<Todo>, ManagerError> {
        Ok(self.storage_manager.storage().list_todos().await?)
    }

    pub async fn create_todo(&self, input: TodoCreateInput) -> Result<Todo, ManagerError> {
        let new_todo = validate_todo_create(&input).map_err(ManagerError::Validation)?;

        let todo = self.storage_manager.storage().create_todo(new_todo).await?;
        info!("Created todo '{}' with ID {}", todo.text, todo.id);
        Ok(todo)
    }

    pub async fn update_todo(
        &self,
        id: i64,
        input: TodoUpdateInput,
    ) -> Result<Todo, ManagerError> {
        let changes = validate_todo_update(&input).map_err(ManagerError::Validation)?;

        let todo = self
            .storage_manager
            .storage()
            .update_todo(id, changes)
            .await
            .map_err(|e| match e {
                StorageError::NotFound => ManagerError::NotFound(id),
                other => ManagerError::Storage(other),
            })?;

        debug!("Updated todo with ID {}", id);
        Ok(todo)
    }

    pub async fn delete_todo(&self, id: i64) -> Result<Todo, ManagerError> {
        let todo = self
            .storage_manager
            .storage()
            .delete_todo(id)
            .await
            .map_err(|e| match e {
                StorageError::NotFound => ManagerError::NotFound(id),
                other => ManagerError::Storage(other),
            })?;

        info!("Deleted todo with ID {}", id);
        Ok(todo)
    }

    pub async fn clear_completed(&self) -> Result<u64, ManagerError> {
        let removed = self.storage_manager.storage().clear_completed().await?;
        info!("Cleared {} completed todos", removed);
        Ok(removed)
    }

    pub async fn stats(&self) -> Result<TodoStats, ManagerError> {
        Ok(self.storage_manager.storage().stats().await?)
    }
}
