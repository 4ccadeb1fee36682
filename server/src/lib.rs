//! HTTP service for a flat-file todo list.
//!
//! # Overview
//! Routes live under `/api`. Every handler delegates to [`TodoService`],
//! which re-reads the whole collection from its [`TodoStore`] on each call.
//!
//! # Design
//! - The store is injected, so tests run against [`MemoryStore`] while the
//!   binary uses [`FileStore`].
//! - Errors render as `{"error": ...}` through [`TodoError`]; malformed JSON
//!   bodies are folded into the same 400 path. An empty body reads as `{}`.
//! - A query string that does not parse lists everything.
//! - CORS is wide open because the browser client is served elsewhere.

pub mod config;
pub mod error;
pub mod service;
pub mod store;
pub mod types;

use std::{path::Path, sync::Arc};

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path as UrlPath, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::TodoError;
pub use service::TodoService;
pub use store::{FileStore, MemoryStore, StoreError, TodoStore};
pub use types::{Cleared, CreateTodo, Health, StatusFilter, Todo, UpdateTodo};

type Shared = Arc<TodoService>;

pub fn app(service: TodoService) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route(
            "/todos",
            get(list_todos).post(create_todo).delete(clear_completed),
        )
        .route("/todos/{id}", put(update_todo).delete(delete_todo))
        .with_state(Arc::new(service));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Router backed by the JSON file at `path`.
pub fn app_with_file(path: impl AsRef<Path>) -> Router {
    app(TodoService::new(FileStore::new(path.as_ref())))
}

pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

/// Parse a JSON request body, reading an empty one as `{}`. The content type
/// is not checked.
fn json_or_empty<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, TodoError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    let Json(value) = Json::<T>::from_bytes(body)?;
    Ok(value)
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn list_todos(
    State(service): State<Shared>,
    query: Result<Query<types::ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Todo>>, TodoError> {
    let query = query.map(|Query(query)| query).unwrap_or_default();
    let filter = StatusFilter::parse(query.status.as_deref());
    Ok(Json(service.list(filter).await?))
}

async fn create_todo(
    State(service): State<Shared>,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>), TodoError> {
    let input: CreateTodo = json_or_empty(&body)?;
    let todo = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(service): State<Shared>,
    UrlPath(id): UrlPath<String>,
    body: Bytes,
) -> Result<Json<Todo>, TodoError> {
    let input: UpdateTodo = json_or_empty(&body)?;
    Ok(Json(service.update(&id, input).await?))
}

async fn delete_todo(
    State(service): State<Shared>,
    UrlPath(id): UrlPath<String>,
) -> Result<StatusCode, TodoError> {
    service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_completed(State(service): State<Shared>) -> Result<Json<Cleared>, TodoError> {
    let removed = service.clear_completed().await?;
    Ok(Json(Cleared { removed }))
}
