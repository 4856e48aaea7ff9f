use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use super::{
    NewTodo, StorageConfig, StorageError, StorageProvider, StorageResult, Todo, TodoChanges,
    TodoStorage, TodoStats,
};
use taskpad_core::{Priority, PriorityCounts};

/// JSON snapshot implementation of TodoStorage.
///
/// The whole collection is the unit of durability: every mutation reads
/// the file, applies the change in memory, and rewrites the file. A
/// mutex serializes all file access, so concurrent mutations cannot
/// overwrite each other's snapshot and readers never observe a
/// half-written file.
pub struct JsonStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonStorage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &StorageConfig) -> StorageResult<Self> {
        match &config.provider {
            StorageProvider::Json { path } => Ok(Self::new(path.clone())),
            _ => Err(StorageError::InvalidFormat),
        }
    }

    /// Reads the whole snapshot; missing or malformed files degrade to
    /// an empty collection rather than failing the read. Callers must
    /// hold the lock.
    async fn read_all(&self) -> Vec<Todo> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str::<Vec<Todo>>(&content) {
                Ok(todos) => {
                    debug!("Loaded {} todos from {:?}", todos.len(), self.path);
                    todos
                }
                Err(e) => {
                    error!("Failed to parse {:?}: {}", self.path, e);
                    warn!("Using empty todo list");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                error!("Failed to read {:?}: {}", self.path, e);
                warn!("Using empty todo list");
                Vec::new()
            }
        }
    }

    /// Rewrites the whole snapshot
    async fn write_all(&self, todos: &[Todo]) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json_content = serde_json::to_string_pretty(todos)?;
        fs::write(&self.path, json_content).await?;

        debug!("Wrote {} todos to {:?}", todos.len(), self.path);
        Ok(())
    }

    /// Next available ID: one more than the current maximum, or 1 when empty
    fn next_id(todos: &[Todo]) -> i64 {
        todos.iter().map(|t| t.id).max().map_or(1, |max| max + 1)
    }
}

#[async_trait]
impl TodoStorage for JsonStorage {
    async fn initialize(&self) -> StorageResult<()> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating data directory: {:?}", parent);
                fs::create_dir_all(parent).await?;
            }
        }

        if fs::metadata(&self.path).await.is_err() {
            debug!("Creating todos snapshot: {:?}", self.path);
            self.write_all(&[]).await?;
        }

        Ok(())
    }

    async fn create_todo(&self, input: NewTodo) -> StorageResult<Todo> {
        let _guard = self.lock.lock().await;

        let mut todos = self.read_all().await;
        let todo = Todo {
            id: Self::next_id(&todos),
            text: input.text,
            completed: false,
            priority: input.priority,
            created_at: Utc::now(),
            updated_at: None,
        };

        todos.push(todo.clone());
        self.write_all(&todos).await?;

        debug!("Created todo '{}' with ID {}", todo.text, todo.id);
        Ok(todo)
    }

    async fn get_todo(&self, id: i64) -> StorageResult<Option<Todo>> {
        let _guard = self.lock.lock().await;

        Ok(self.read_all().await.into_iter().find(|t| t.id == id))
    }

    async fn list_todos(&self) -> StorageResult<Vec<Todo>> {
        let _guard = self.lock.lock().await;

        // Insertion order, as persisted
        Ok(self.read_all().await)
    }

    async fn update_todo(&self, id: i64, changes: TodoChanges) -> StorageResult<Todo> {
        let _guard = self.lock.lock().await;

        let mut todos = self.read_all().await;
        let todo = todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StorageError::NotFound)?;

        if let Some(text) = changes.text {
            todo.text = text;
        }
        if let Some(completed) = changes.completed {
            todo.completed = completed;
        }
        if let Some(priority) = changes.priority {
            todo.priority = priority;
        }

        // Refreshed on every update call, even an empty one
        todo.updated_at = Some(Utc::now());
        let updated = todo.clone();

        self.write_all(&todos).await?;

        debug!("Updated todo with ID {}", id);
        Ok(updated)
    }

    async fn delete_todo(&self, id: i64) -> StorageResult<Todo> {
        let _guard = self.lock.lock().await;

        let mut todos = self.read_all().await;
        let index = todos
            .iter()
            .position(|t| t.id == id)
            .ok_or(StorageError::NotFound)?;

        let removed = todos.remove(index);
        self.write_all(&todos).await?;

        debug!("Deleted todo with ID {}", id);
        Ok(removed)
    }

    async fn clear_completed(&self) -> StorageResult<u64> {
        let _guard = self.lock.lock().await;

        let mut todos = self.read_all().await;
        let before = todos.len();
        todos.retain(|t| !t.completed);
        let removed = (before - todos.len()) as u64;

        self.write_all(&todos).await?;

        debug!("Cleared {} completed todos", removed);
        Ok(removed)
    }

    async fn stats(&self) -> StorageResult<TodoStats> {
        let _guard = self.lock.lock().await;

        let todos = self.read_all().await;

        let total = todos.len() as u64;
        let completed = todos.iter().filter(|t| t.completed).count() as u64;

        let mut priority_counts = PriorityCounts::default();
        for todo in &todos {
            match todo.priority {
                Priority::High => priority_counts.high += 1,
                Priority::Medium => priority_counts.medium += 1,
                Priority::Low => priority_counts.low += 1,
            }
        }

        Ok(TodoStats {
            total,
            completed,
            active: total - completed,
            priority_counts,
        })
    }
}
