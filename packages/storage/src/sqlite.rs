use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{migrate::MigrateDatabase, Row};
use tracing::{debug, info};

use super::{
    NewTodo, StorageConfig, StorageError, StorageProvider, StorageResult, Todo, TodoChanges,
    TodoStorage, TodoStats,
};
use taskpad_core::PriorityCounts;

/// SQLite implementation of TodoStorage
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SqliteStorage instance
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        let database_path = match &config.provider {
            StorageProvider::Sqlite { path } => path,
            _ => return Err(StorageError::InvalidFormat),
        };

        // Ensure parent directory exists
        if let Some(parent) = database_path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }

        let database_url = format!("sqlite:{}", database_path.display());

        // Create database if it doesn't exist
        if !sqlx::Sqlite::database_exists(&database_url)
            .await
            .map_err(StorageError::Sqlx)?
        {
            debug!("Creating database at: {}", database_url);
            sqlx::Sqlite::create_database(&database_url)
                .await
                .map_err(StorageError::Sqlx)?;
        }

        // Configure connection pool
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.busy_timeout_seconds))
            .connect(&database_url)
            .await
            .map_err(StorageError::Sqlx)?;

        // Configure SQLite settings (after pool creation, before migrations)
        if config.enable_wal {
            sqlx::query("PRAGMA journal_mode = WAL")
                .execute(&pool)
                .await
                .map_err(StorageError::Sqlx)?;
        }

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(Self { pool })
    }

    /// Access to the underlying pool, used by the legacy import
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Convert a database row to a Todo
    fn row_to_todo(row: &SqliteRow) -> StorageResult<Todo> {
        let priority_str: String = row.try_get("priority")?;
        // The CHECK constraint keeps this in-enum; fall back to Medium anyway
        let priority = priority_str.parse().unwrap_or_default();

        let created_at_str: String = row.try_get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|_| StorageError::Database("Invalid created_at timestamp".to_string()))?
            .with_timezone(&Utc);

        let updated_at_str: Option<String> = row.try_get("updated_at")?;
        let updated_at = match updated_at_str {
            Some(s) => Some(
                DateTime::parse_from_rfc3339(&s)
                    .map_err(|_| {
                        StorageError::Database("Invalid updated_at timestamp".to_string())
                    })?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        Ok(Todo {
            id: row.try_get("id")?,
            text: row.try_get("text")?,
            completed: row.try_get("completed")?,
            priority,
            created_at,
            updated_at,
        })
    }
}

#[async_trait]
impl TodoStorage for SqliteStorage {
    async fn initialize(&self) -> StorageResult<()> {
        info!("Initializing SQLite storage with migrations");

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;

        // Run post-migration optimizations
        sqlx::query("ANALYZE")
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        info!("SQLite storage initialized successfully");
        Ok(())
    }

    async fn create_todo(&self, input: NewTodo) -> StorageResult<Todo> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO todos (text, completed, priority, created_at) VALUES (?, 0, ?, ?)",
        )
        .bind(&input.text)
        .bind(input.priority.as_str())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let id = result.last_insert_rowid();
        debug!("Created todo '{}' with ID {}", input.text, id);

        self.get_todo(id).await?.ok_or(StorageError::NotFound)
    }

    async fn get_todo(&self, id: i64) -> StorageResult<Option<Todo>> {
        let row = sqlx::query("SELECT * FROM todos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(row) => Ok(Some(Self::row_to_todo(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_todos(&self) -> StorageResult<Vec<Todo>> {
        // Newest first so recently added items lead the list
        let rows = sqlx::query("SELECT * FROM todos ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut todos = Vec::new();
        for row in rows {
            todos.push(Self::row_to_todo(&row)?);
        }

        debug!("Retrieved {} todos", todos.len());
        Ok(todos)
    }

    async fn update_todo(&self, id: i64, changes: TodoChanges) -> StorageResult<Todo> {
        let mut query_parts = Vec::new();

        if changes.text.is_some() {
            query_parts.push("text = ?");
        }
        if changes.completed.is_some() {
            query_parts.push("completed = ?");
        }
        if changes.priority.is_some() {
            query_parts.push("priority = ?");
        }

        // updated_at is refreshed on every update call, even an empty one
        query_parts.push("updated_at = ?");

        let query_str = format!("UPDATE todos SET {} WHERE id = ?", query_parts.join(", "));

        let mut query = sqlx::query(&query_str);

        if let Some(ref text) = changes.text {
            query = query.bind(text);
        }
        if let Some(completed) = changes.completed {
            query = query.bind(completed);
        }
        if let Some(ref priority) = changes.priority {
            query = query.bind(priority.as_str());
        }

        query = query.bind(Utc::now().to_rfc3339()).bind(id);

        let result = query.execute(&self.pool).await.map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        debug!("Updated todo with ID {}", id);
        self.get_todo(id).await?.ok_or(StorageError::NotFound)
    }

    async fn delete_todo(&self, id: i64) -> StorageResult<Todo> {
        // Single statement so a concurrent delete of the same row cannot
        // slip in between a lookup and the removal
        let row = sqlx::query("DELETE FROM todos WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let todo = match row {
            Some(row) => Self::row_to_todo(&row)?,
            None => return Err(StorageError::NotFound),
        };

        debug!("Deleted todo with ID {}", id);
        Ok(todo)
    }

    async fn clear_completed(&self) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM todos WHERE completed = 1")
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let removed = result.rows_affected();
        debug!("Cleared {} completed todos", removed);
        Ok(removed)
    }

    async fn stats(&self) -> StorageResult<TodoStats> {
        let totals =
            sqlx::query("SELECT COUNT(*) AS total, COALESCE(SUM(completed), 0) AS completed FROM todos")
                .fetch_one(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;

        let total: i64 = totals.try_get("total")?;
        let completed: i64 = totals.try_get("completed")?;

        let rows = sqlx::query("SELECT priority, COUNT(*) AS count FROM todos GROUP BY priority")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut priority_counts = PriorityCounts::default();
        for row in rows {
            let priority: String = row.try_get("priority")?;
            let count: i64 = row.try_get("count")?;
            match priority.as_str() {
                "high" => priority_counts.high = count as u64,
                "medium" => priority_counts.medium = count as u64,
                "low" => priority_counts.low = count as u64,
                _ => {}
            }
        }

        Ok(TodoStats {
            total: total as u64,
            completed: completed as u64,
            active: (total - completed) as u64,
            priority_counts,
        })
    }
}
