use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::manager::ManagerError;

/// Error payload returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl IntoResponse for ManagerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ManagerError::Validation(errors) => {
                let message = errors
                    .iter()
                    .map(|e| e.message.clone())
                    .collect::<Vec<_>>()
                    .join("; ");
                (StatusCode::BAD_REQUEST, message)
            }
            ManagerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ManagerError::Storage(e) => {
                error!("Storage error while handling request: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
