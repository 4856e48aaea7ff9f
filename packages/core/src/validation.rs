use crate::types::{NewTodo, Priority, TodoChanges, TodoCreateInput, TodoUpdateInput};

/// Validation errors for todo data
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validates a create request, producing the storage-ready form
pub fn validate_todo_create(data: &TodoCreateInput) -> Result<NewTodo, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let text = data.text().unwrap_or("").trim().to_string();
    if text.is_empty() {
        errors.push(ValidationError::new("text", "Todo text is required"));
    }

    let priority = match data.priority.as_deref() {
        None => Priority::default(),
        Some(raw) => match raw.parse() {
            Ok(priority) => priority,
            Err(e) => {
                errors.push(ValidationError::new("priority", format!("{}", e)));
                Priority::default()
            }
        },
    };

    if errors.is_empty() {
        Ok(NewTodo { text, priority })
    } else {
        Err(errors)
    }
}

/// Validates an update request, producing the storage-ready partial form
pub fn validate_todo_update(data: &TodoUpdateInput) -> Result<TodoChanges, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut changes = TodoChanges {
        completed: data.completed,
        ..TodoChanges::default()
    };

    if let Some(text) = data.text() {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            errors.push(ValidationError::new("text", "Todo text cannot be empty"));
        } else {
            changes.text = Some(trimmed.to_string());
        }
    }

    if let Some(raw) = data.priority.as_deref() {
        match raw.parse() {
            Ok(priority) => changes.priority = Some(priority),
            Err(e) => errors.push(ValidationError::new("priority", format!("{}", e))),
        }
    }

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(errors)
    }
}
