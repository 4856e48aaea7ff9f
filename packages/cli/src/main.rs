// ABOUTME: Taskpad server binary
// ABOUTME: Wires config, storage, and the todos API into an axum server

use axum::http::Method;
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;
use taskpad_core::todos_file;
use taskpad_storage::{
    import_legacy_snapshot, SqliteStorage, StorageFactory, StorageManager, StorageProvider,
    TodoStorage,
};
use taskpad_todos::{create_todos_router, AppState, TodosManager};

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!("Starting Taskpad server on port {}", config.port);

    let storage_config =
        StorageFactory::config_from_url(&config.database_url, config.auto_provision)?;

    // One-time legacy snapshot import, only meaningful for the SQLite backend
    if config.import_legacy {
        match &storage_config.provider {
            StorageProvider::Sqlite { .. } => {
                let sqlite = SqliteStorage::new(storage_config.clone()).await?;
                sqlite.initialize().await?;
                let imported = import_legacy_snapshot(&todos_file(), &sqlite).await?;
                info!("Imported {} todos from legacy snapshot", imported);
            }
            StorageProvider::Json { .. } => {
                warn!("IMPORT_LEGACY is set but the backend is JSON, skipping import");
            }
        }
    }

    let storage_manager = StorageManager::new(storage_config).await?;
    info!("Storage ready: {:?}", storage_manager.config().provider);

    let todos = TodosManager::with_storage(Arc::new(storage_manager));
    let state = AppState {
        todos: Arc::new(todos),
    };

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<axum::http::HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/health", get(health))
        .nest("/api/todos", create_todos_router())
        .with_state(state)
        .layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
