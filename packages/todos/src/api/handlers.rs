use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use taskpad_core::{Todo, TodoCreateInput, TodoStats, TodoUpdateInput};

use super::AppState;
use crate::manager::ManagerError;

/// Response for the clear-completed endpoint
#[derive(Debug, Serialize)]
pub struct ClearCompletedResponse {
    #[serde(rename = "deletedCount")]
    pub deleted_count: u64,
}

/// GET / - list all todos
pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ManagerError> {
    let todos = state.todos.list_todos().await?;
    Ok(Json(todos))
}

/// POST / - create a new todo
pub async fn create_todo(
    State(state): State<AppState>,
    Json(input): Json<TodoCreateInput>,
) -> Result<(StatusCode, Json<Todo>), ManagerError> {
    let todo = state.todos.create_todo(input).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// PUT /{id} - update an existing todo
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<TodoUpdateInput>,
) -> Result<Json<Todo>, ManagerError> {
    let todo = state.todos.update_todo(id, input).await?;
    Ok(Json(todo))
}

/// DELETE /{id} - delete a todo, echoing the removed record
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Todo>, ManagerError> {
    let todo = state.todos.delete_todo(id).await?;
    Ok(Json(todo))
}

/// POST /clear-completed - remove all completed todos
pub async fn clear_completed(
    State(state): State<AppState>,
) -> Result<Json<ClearCompletedResponse>, ManagerError> {
    let deleted_count = state.todos.clear_completed().await?;
    Ok(Json(ClearCompletedResponse { deleted_count }))
}

/// GET /stats - aggregate statistics
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<TodoStats>, ManagerError> {
    let stats = state.todos.stats().await?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::create_todos_router;
    use crate::manager::TodosManager;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use taskpad_storage::{StorageConfig, StorageProvider};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let config = StorageConfig {
            provider: StorageProvider::Sqlite {
                path: ":memory:".into(),
            },
            auto_provision: true,
            enable_wal: false,
            max_connections: 1,
            busy_timeout_seconds: 30,
        };
        let manager = TodosManager::new(config).await.unwrap();
        let state = AppState {
            todos: Arc::new(manager),
        };
        create_todos_router().with_state(state)
    }

    fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_empty() {
        let router = test_router().await;

        let response = router
            .oneshot(request(Method::GET, "/", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_create_returns_201_with_both_text_keys() {
        let router = test_router().await;

        let response = router
            .oneshot(request(
                Method::POST,
                "/",
                Some(json!({"text": "  buy milk  ", "priority": "high"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["text"], "buy milk");
        assert_eq!(body["title"], "buy milk");
        assert_eq!(body["completed"], false);
        assert_eq!(body["priority"], "high");
        assert!(body["created_at"].is_string());
        assert!(body["updated_at"].is_null());
    }

    #[tokio::test]
    async fn test_create_accepts_title_alias() {
        let router = test_router().await;

        let response = router
            .oneshot(request(
                Method::POST,
                "/",
                Some(json!({"title": "from title"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["text"], "from title");
        assert_eq!(body["priority"], "medium");
    }

    #[tokio::test]
    async fn test_create_blank_text_is_400() {
        let router = test_router().await;

        let response = router
            .oneshot(request(Method::POST, "/", Some(json!({"text": "   "}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_create_invalid_priority_is_400() {
        let router = test_router().await;

        let response = router
            .oneshot(request(
                Method::POST,
                "/",
                Some(json!({"text": "a task", "priority": "urgent"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("urgent"));
    }

    #[tokio::test]
    async fn test_update_sets_fields_and_updated_at() {
        let router = test_router().await;

        let created = router
            .clone()
            .oneshot(request(Method::POST, "/", Some(json!({"text": "task"}))))
            .await
            .unwrap();
        let id = body_json(created).await["id"].as_i64().unwrap();

        let response = router
            .oneshot(request(
                Method::PUT,
                &format!("/{}", id),
                Some(json!({"completed": true, "priority": "low"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["completed"], true);
        assert_eq!(body["priority"], "low");
        assert!(body["updated_at"].is_string());
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_404() {
        let router = test_router().await;

        let response = router
            .oneshot(request(
                Method::PUT,
                "/999",
                Some(json!({"completed": true})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Todo with ID 999 not found");
    }

    #[tokio::test]
    async fn test_delete_echoes_removed_todo() {
        let router = test_router().await;

        let created = router
            .clone()
            .oneshot(request(Method::POST, "/", Some(json!({"text": "gone"}))))
            .await
            .unwrap();
        let id = body_json(created).await["id"].as_i64().unwrap();

        let response = router
            .clone()
            .oneshot(request(Method::DELETE, &format!("/{}", id), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["text"], "gone");

        let repeat = router
            .oneshot(request(Method::DELETE, &format!("/{}", id), None))
            .await
            .unwrap();
        assert_eq!(repeat.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_clear_completed_reports_deleted_count() {
        let router = test_router().await;

        for text in ["a", "b", "c"] {
            router
                .clone()
                .oneshot(request(Method::POST, "/", Some(json!({"text": text}))))
                .await
                .unwrap();
        }
        for id in [1, 2] {
            router
                .clone()
                .oneshot(request(
                    Method::PUT,
                    &format!("/{}", id),
                    Some(json!({"completed": true})),
                ))
                .await
                .unwrap();
        }

        let response = router
            .clone()
            .oneshot(request(Method::POST, "/clear-completed", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"deletedCount": 2}));

        let remaining = router
            .oneshot(request(Method::GET, "/", None))
            .await
            .unwrap();
        let body = body_json(remaining).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stats_shape_and_values() {
        let router = test_router().await;

        let inputs = [
            json!({"text": "one", "priority": "high"}),
            json!({"text": "two", "priority": "high"}),
            json!({"text": "three", "priority": "low"}),
            json!({"text": "four"}),
        ];
        for input in inputs {
            router
                .clone()
                .oneshot(request(Method::POST, "/", Some(input)))
                .await
                .unwrap();
        }
        router
            .clone()
            .oneshot(request(Method::PUT, "/1", Some(json!({"completed": true}))))
            .await
            .unwrap();

        let response = router
            .oneshot(request(Method::GET, "/stats", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({
                "total": 4,
                "completed": 1,
                "active": 3,
                "priority_counts": {"high": 2, "medium": 1, "low": 1}
            })
        );
    }
}
