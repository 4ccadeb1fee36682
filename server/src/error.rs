//! Service errors and their HTTP rendering.
//!
//! Every variant renders as `{"error": "<message>"}` with the status code the
//! API contract assigns to it.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum TodoError {
    /// Missing, mistyped or empty input.
    #[error("{0}")]
    Validation(String),

    #[error("Todo not found")]
    NotFound,

    /// The backing store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// The blocking store call panicked or was cancelled.
    #[error("Storage task failed: {0}")]
    Task(#[from] JoinError),
}

impl TodoError {
    pub fn validation(message: impl Into<String>) -> Self {
        TodoError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            TodoError::Validation(_) => StatusCode::BAD_REQUEST,
            TodoError::NotFound => StatusCode::NOT_FOUND,
            TodoError::Storage(_) | TodoError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A body that is not JSON at all is bad input like any other.
impl From<JsonRejection> for TodoError {
    fn from(rejection: JsonRejection) -> Self {
        TodoError::Validation(rejection.body_text())
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "todo store failure");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
