use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use super::{SqliteStorage, StorageResult};
use taskpad_core::Priority;

/// One entry as it appears in a legacy snapshot file. Everything except
/// the text is optional so that hand-edited or older snapshots still
/// import.
#[derive(Debug, Deserialize)]
struct LegacyTodo {
    text: Option<String>,
    title: Option<String>,
    #[serde(default)]
    completed: bool,
    priority: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

impl LegacyTodo {
    fn effective_text(&self) -> Option<&str> {
        self.text.as_deref().or(self.title.as_deref())
    }
}

/// Legacy snapshots were written without timezone designators, so fall
/// back to naive parsing interpreted as UTC.
fn parse_legacy_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    None
}

/// Import todos from a legacy JSON snapshot into SQLite storage.
///
/// The import is idempotent: an entry whose (text, created_at) pair is
/// already present in the database is skipped, so re-running after a
/// partial import only inserts what is missing. Returns the number of
/// rows inserted.
pub async fn import_legacy_snapshot(
    path: &Path,
    storage: &SqliteStorage,
) -> StorageResult<u64> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No legacy snapshot at {:?}, nothing to import", path);
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    let entries: Vec<LegacyTodo> = match serde_json::from_str(&content) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Legacy snapshot {:?} is not valid JSON ({}), skipping import", path, e);
            return Ok(0);
        }
    };

    info!("Importing {} entries from legacy snapshot {:?}", entries.len(), path);

    let pool = storage.pool();
    let mut inserted = 0u64;

    for entry in &entries {
        let text = match entry.effective_text().map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => {
                warn!("Skipping legacy entry without text: {:?}", entry);
                continue;
            }
        };

        let priority = entry
            .priority
            .as_deref()
            .and_then(|p| p.parse::<Priority>().ok())
            .unwrap_or_default();

        let created_at = entry
            .created_at
            .as_deref()
            .and_then(parse_legacy_timestamp)
            .unwrap_or_else(Utc::now);
        let updated_at = entry.updated_at.as_deref().and_then(parse_legacy_timestamp);

        let created_at_str = created_at.to_rfc3339();

        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM todos WHERE text = ? AND created_at = ?")
                .bind(text)
                .bind(&created_at_str)
                .fetch_optional(pool)
                .await?;

        if existing.is_some() {
            continue;
        }

        sqlx::query(
            "INSERT INTO todos (text, completed, priority, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(text)
        .bind(entry.completed)
        .bind(priority.as_str())
        .bind(&created_at_str)
        .bind(updated_at.map(|ts| ts.to_rfc3339()))
        .execute(pool)
        .await?;

        inserted += 1;
    }

    info!(
        "Legacy import finished: {} inserted, {} skipped",
        inserted,
        entries.len() as u64 - inserted
    );

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339_timestamp() {
        let ts = parse_legacy_timestamp("2023-06-01T12:00:00+00:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2023-06-01T12:00:00+00:00");
    }

    #[test]
    fn test_parse_naive_timestamp_assumed_utc() {
        // Python's datetime.isoformat() output has no timezone
        let ts = parse_legacy_timestamp("2023-06-01T12:00:00.123456").unwrap();
        assert_eq!(ts.timezone(), Utc);
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2023-06-01 12:00:00");
    }

    #[test]
    fn test_parse_garbage_timestamp_is_none() {
        assert!(parse_legacy_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_effective_text_prefers_text_over_title() {
        let entry = LegacyTodo {
            text: Some("from text".to_string()),
            title: Some("from title".to_string()),
            completed: false,
            priority: None,
            created_at: None,
            updated_at: None,
        };
        assert_eq!(entry.effective_text(), Some("from text"));

        let entry = LegacyTodo {
            text: None,
            title: Some("from title".to_string()),
            completed: false,
            priority: None,
            created_at: None,
            updated_at: None,
        };
        assert_eq!(entry.effective_text(), Some("from title"));
    }
}
