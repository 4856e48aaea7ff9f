// ABOUTME: Core types, constants, and validation for Taskpad
// ABOUTME: Foundational package shared across all Taskpad packages

pub mod constants;
pub mod types;
pub mod validation;

// Re-export main types
pub use types::{
    InvalidPriority, NewTodo, Priority, PriorityCounts, Todo, TodoChanges, TodoCreateInput,
    TodoStats, TodoUpdateInput,
};

// Re-export constants
pub use constants::{database_file, taskpad_dir, todos_file};

// Re-export validation
pub use validation::{validate_todo_create, validate_todo_update, ValidationError};
