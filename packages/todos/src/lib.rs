// ABOUTME: Todo management layer and HTTP API for Taskpad
// ABOUTME: Wraps the storage backends with validation and axum routes

pub mod api;
pub mod manager;

pub use api::{create_todos_router, AppState};
pub use manager::{ManagerError, TodosManager};
