// ABOUTME: HTTP API for todos, built on axum
// ABOUTME: Routes, handlers, and error-to-response mapping

pub mod handlers;
pub mod response;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::manager::TodosManager;

/// Shared state for the todos API
#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<TodosManager>,
}

/// Build the todos router. The caller nests this under its API prefix.
pub fn create_todos_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_todos).post(handlers::create_todo))
        .route(
            "/{id}",
            put(handlers::update_todo).delete(handlers::delete_todo),
        )
        .route("/clear-completed", post(handlers::clear_completed))
        .route("/stats", get(handlers::get_stats))
}
