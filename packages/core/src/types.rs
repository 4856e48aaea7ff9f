use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Priority levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an out-of-enum priority value
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Invalid priority '{0}' (expected low, medium or high)")]
pub struct InvalidPriority(pub String);

impl FromStr for Priority {
    type Err = InvalidPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(InvalidPriority(s.to_string())),
        }
    }
}

/// A todo record
#[derive(Debug, Clone, PartialEq)]
pub struct Todo {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Serialize for Todo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // `title` mirrors `text` for clients still reading the old field name
        let mut state = serializer.serialize_struct("Todo", 7)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("text", &self.text)?;
        state.serialize_field("title", &self.text)?;
        state.serialize_field("completed", &self.completed)?;
        state.serialize_field("priority", &self.priority)?;
        state.serialize_field("created_at", &self.created_at)?;
        state.serialize_field("updated_at", &self.updated_at)?;
        state.end()
    }
}

/// Wire form of a persisted todo; tolerates the `title` alias and
/// free-text priorities found in legacy snapshots.
#[derive(Deserialize)]
struct TodoRecord {
    id: i64,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    completed: bool,
    #[serde(default, deserialize_with = "lenient_priority")]
    priority: Priority,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl<'de> Deserialize<'de> for Todo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = TodoRecord::deserialize(deserializer)?;
        let text = record
            .text
            .or(record.title)
            .ok_or_else(|| serde::de::Error::missing_field("text"))?;

        Ok(Todo {
            id: record.id,
            text,
            completed: record.completed,
            priority: record.priority,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Unknown priority strings in persisted data read as Medium, matching
/// the legacy import's normalization rule.
fn lenient_priority<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

/// Input for creating a new todo
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoCreateInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl TodoCreateInput {
    /// Effective text, honoring the legacy `title` alias
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().or(self.title.as_deref())
    }
}

/// Input for updating an existing todo
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoUpdateInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl TodoUpdateInput {
    /// Effective text, honoring the legacy `title` alias
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().or(self.title.as_deref())
    }
}

/// A validated create request, ready for the storage layer
#[derive(Debug, Clone, PartialEq)]
pub struct NewTodo {
    pub text: String,
    pub priority: Priority,
}

/// A validated partial update, ready for the storage layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoChanges {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

impl TodoChanges {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none() && self.priority.is_none()
    }
}

/// Counts per priority level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

/// Aggregate statistics over the whole collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoStats {
    pub total: u64,
    pub completed: u64,
    pub active: u64,
    pub priority_counts: PriorityCounts,
}
