//! Todo CRUD operations over an injected store.
//!
//! # Design
//! Each operation is one read-modify-write cycle over the full collection:
//! `load`, change, `save`. Nothing is cached between calls, so the store is
//! the single source of truth. A per-service mutex serialises the cycles so
//! two overlapping requests in this process cannot overwrite each other's
//! changes. Writers in other processes can still race; last writer wins.
//! Store calls are blocking file I/O and run on tokio's blocking pool.

use std::sync::Arc;

use serde_json::Value;
use tokio::{sync::Mutex, task};
use tracing::{debug, info};

use crate::error::TodoError;
use crate::store::TodoStore;
use crate::types::{CreateTodo, StatusFilter, Todo, UpdateTodo};

const TITLE_REQUIRED: &str = "Title is required";
const TITLE_INVALID: &str = "Title must be a non-empty string";
const COMPLETED_INVALID: &str = "Completed must be boolean";

pub struct TodoService {
    store: Arc<dyn TodoStore>,
    lock: Mutex<()>,
}

impl TodoService {
    pub fn new(store: impl TodoStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<Todo>, TodoError> {
        let store = Arc::clone(&self.store);
        Ok(task::spawn_blocking(move || store.load()).await??)
    }

    async fn save(&self, todos: Vec<Todo>) -> Result<(), TodoError> {
        let store = Arc::clone(&self.store);
        Ok(task::spawn_blocking(move || store.save(&todos)).await??)
    }

    /// Todos matching `filter`, in stored order.
    pub async fn list(&self, filter: StatusFilter) -> Result<Vec<Todo>, TodoError> {
        let _guard = self.lock.lock().await;
        let mut todos = self.load().await?;
        todos.retain(|todo| filter.matches(todo));
        Ok(todos)
    }

    /// Validate the title, then insert a new active todo at the front.
    pub async fn create(&self, input: CreateTodo) -> Result<Todo, TodoError> {
        let title = trimmed_title(input.title).ok_or_else(|| TodoError::validation(TITLE_REQUIRED))?;

        let _guard = self.lock.lock().await;
        let mut todos = self.load().await?;
        let todo = Todo::new(title);
        todos.insert(0, todo.clone());
        self.save(todos).await?;

        info!(id = %todo.id, "created todo");
        Ok(todo)
    }

    /// Apply the fields present in `input`. The id is resolved first, then
    /// every provided field is validated before anything changes.
    pub async fn update(&self, id: &str, input: UpdateTodo) -> Result<Todo, TodoError> {
        let _guard = self.lock.lock().await;
        let mut todos = self.load().await?;
        let todo = todos
            .iter_mut()
            .find(|todo| todo.id == id)
            .ok_or(TodoError::NotFound)?;

        let title = match input.title {
            Some(value) => Some(trimmed_title(Some(value)).ok_or_else(|| TodoError::validation(TITLE_INVALID))?),
            None => None,
        };
        let completed = match input.completed {
            Some(Value::Bool(flag)) => Some(flag),
            Some(_) => return Err(TodoError::validation(COMPLETED_INVALID)),
            None => None,
        };

        if let Some(title) = title {
            todo.title = title;
        }
        if let Some(completed) = completed {
            todo.completed = completed;
        }
        todo.touch();
        let updated = todo.clone();
        self.save(todos).await?;

        debug!(id = %updated.id, completed = updated.completed, "updated todo");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), TodoError> {
        let _guard = self.lock.lock().await;
        let mut todos = self.load().await?;
        let before = todos.len();
        todos.retain(|todo| todo.id != id);
        if todos.len() == before {
            return Err(TodoError::NotFound);
        }
        self.save(todos).await?;

        info!(%id, "deleted todo");
        Ok(())
    }

    /// Drop every completed todo and report how many went.
    pub async fn clear_completed(&self) -> Result<usize, TodoError> {
        let _guard = self.lock.lock().await;
        let mut todos = self.load().await?;
        let before = todos.len();
        todos.retain(|todo| !todo.completed);
        let removed = before - todos.len();
        self.save(todos).await?;

        info!(removed, "cleared completed todos");
        Ok(removed)
    }
}

fn trimmed_title(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(title)) => {
            let title = title.trim();
            (!title.is_empty()).then(|| title.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    fn service() -> TodoService {
        TodoService::new(MemoryStore::new())
    }

    fn create_input(title: Value) -> CreateTodo {
        CreateTodo { title: Some(title) }
    }

    fn update_input(value: Value) -> UpdateTodo {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn create_trims_title_and_starts_active() {
        let svc = service();
        let todo = svc.create(create_input(json!("  Buy milk  "))).await.unwrap();

        assert_eq!(todo.title, "Buy milk");
        assert!(!todo.completed);
        assert_eq!(todo.created_at, todo.updated_at);

        let all = svc.list(StatusFilter::All).await.unwrap();
        assert_eq!(all, vec![todo]);
    }

    #[tokio::test]
    async fn create_rejects_blank_and_mistyped_titles_without_writing() {
        let store = Arc::new(MemoryStore::new());
        let svc = TodoService::new(store.clone());

        for bad in [json!(""), json!("   \t\n"), json!(42), json!(null), json!(["x"])] {
            let err = svc.create(create_input(bad)).await.unwrap_err();
            assert!(matches!(err, TodoError::Validation(ref msg) if msg == TITLE_REQUIRED));
        }
        let err = svc.create(CreateTodo { title: None }).await.unwrap_err();
        assert!(matches!(err, TodoError::Validation(_)));

        assert_eq!(store.raw(), "[]");
    }

    #[tokio::test]
    async fn create_inserts_newest_first() {
        let svc = service();
        svc.create(create_input(json!("first"))).await.unwrap();
        svc.create(create_input(json!("second"))).await.unwrap();

        let titles: Vec<_> = svc
            .list(StatusFilter::All)
            .await
            .unwrap()
            .into_iter()
            .map(|todo| todo.title)
            .collect();
        assert_eq!(titles, ["second", "first"]);
    }

    #[tokio::test]
    async fn completing_moves_todo_between_filters() {
        let svc = service();
        let todo = svc.create(create_input(json!("Walk dog"))).await.unwrap();

        let updated = svc.update(&todo.id, update_input(json!({"completed": true}))).await.unwrap();
        assert!(updated.completed);
        assert_eq!(updated.title, "Walk dog");
        assert!(updated.updated_at >= updated.created_at);

        let completed = svc.list(StatusFilter::Completed).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, todo.id);
        assert!(svc.list(StatusFilter::Active).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_title_is_trimmed_and_partial() {
        let svc = service();
        let todo = svc.create(create_input(json!("Walk dog"))).await.unwrap();
        svc.update(&todo.id, update_input(json!({"completed": true}))).await.unwrap();

        let updated = svc.update(&todo.id, update_input(json!({"title": " Walk cat "}))).await.unwrap();

        assert_eq!(updated.title, "Walk cat");
        assert!(updated.completed);
        assert_eq!(updated.created_at, todo.created_at);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found_even_with_bad_fields() {
        let svc = service();
        let err = svc
            .update("missing", update_input(json!({"completed": "yes"})))
            .await
            .unwrap_err();
        assert!(matches!(err, TodoError::NotFound));
    }

    #[tokio::test]
    async fn update_rejects_invalid_fields_without_applying_any() {
        let svc = service();
        let todo = svc.create(create_input(json!("Keep me"))).await.unwrap();

        let cases = [
            (json!({"title": ""}), TITLE_INVALID),
            (json!({"title": "   "}), TITLE_INVALID),
            (json!({"title": null}), TITLE_INVALID),
            (json!({"title": 7}), TITLE_INVALID),
            (json!({"completed": "true"}), COMPLETED_INVALID),
            (json!({"completed": null}), COMPLETED_INVALID),
            (json!({"title": "New", "completed": 1}), COMPLETED_INVALID),
        ];
        for (body, expected) in cases {
            let err = svc.update(&todo.id, update_input(body)).await.unwrap_err();
            assert!(matches!(err, TodoError::Validation(ref msg) if msg == expected));
        }

        let stored = svc.list(StatusFilter::All).await.unwrap();
        assert_eq!(stored, vec![todo]);
    }

    #[tokio::test]
    async fn delete_removes_only_the_match() {
        let svc = service();
        let keep = svc.create(create_input(json!("keep"))).await.unwrap();
        let gone = svc.create(create_input(json!("gone"))).await.unwrap();

        svc.delete(&gone.id).await.unwrap();

        assert_eq!(svc.list(StatusFilter::All).await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn delete_unknown_id_leaves_collection_unchanged() {
        let svc = service();
        svc.create(create_input(json!("a"))).await.unwrap();
        svc.create(create_input(json!("b"))).await.unwrap();
        let before = svc.list(StatusFilter::All).await.unwrap();

        let err = svc.delete("not-an-id").await.unwrap_err();

        assert!(matches!(err, TodoError::NotFound));
        assert_eq!(svc.list(StatusFilter::All).await.unwrap(), before);
    }

    #[tokio::test]
    async fn clear_completed_counts_and_is_idempotent() {
        let svc = service();
        let a = svc.create(create_input(json!("a"))).await.unwrap();
        let b = svc.create(create_input(json!("b"))).await.unwrap();
        let c = svc.create(create_input(json!("c"))).await.unwrap();
        svc.update(&a.id, update_input(json!({"completed": true}))).await.unwrap();
        svc.update(&c.id, update_input(json!({"completed": true}))).await.unwrap();

        assert_eq!(svc.clear_completed().await.unwrap(), 2);
        assert_eq!(svc.clear_completed().await.unwrap(), 0);

        let left = svc.list(StatusFilter::All).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, b.id);
    }

    // Documents the lossy read policy: corrupt storage looks empty and the
    // next write replaces it.
    #[tokio::test]
    async fn corrupt_store_reads_as_empty_and_is_overwritten() {
        let store = Arc::new(MemoryStore::with_raw("garbage"));
        let svc = TodoService::new(store.clone());

        assert!(svc.list(StatusFilter::All).await.unwrap().is_empty());

        svc.create(create_input(json!("fresh"))).await.unwrap();
        assert!(store.raw().contains("fresh"));
        assert!(!store.raw().contains("garbage"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_are_not_lost() {
        let svc = Arc::new(service());
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.create(create_input(json!(format!("todo {i}")))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(svc.list(StatusFilter::All).await.unwrap().len(), 32);
    }

    #[tokio::test]
    async fn update_moves_updated_at_forward() {
        let raw = r#"[{"id":"old","title":"Old","completed":false,
            "createdAt":"2020-01-01T00:00:00.000Z","updatedAt":"2020-01-02T00:00:00.000Z"}]"#;
        let svc = TodoService::new(MemoryStore::with_raw(raw));
        let before = svc.list(StatusFilter::All).await.unwrap().remove(0);

        let renamed = svc.update("old", update_input(json!({"title": "New"}))).await.unwrap();
        assert!(renamed.updated_at > before.updated_at);
        assert_eq!(renamed.created_at, before.created_at);

        let touched = svc.update("old", update_input(json!({}))).await.unwrap();
        assert!(touched.updated_at >= renamed.updated_at);
        assert_eq!(svc.list(StatusFilter::All).await.unwrap(), vec![touched]);
    }

    #[tokio::test]
    async fn malformed_record_does_not_take_valid_ones_with_it() {
        let keep = Todo::new("Keep me".to_string());
        let raw = format!(
            r#"[{}, {{"id":"broken","title":"No updatedAt","completed":false,"createdAt":"2025-01-01T00:00:00.000Z"}}]"#,
            serde_json::to_string(&keep).unwrap()
        );
        let store = Arc::new(MemoryStore::with_raw(raw));
        let svc = TodoService::new(store.clone());

        assert_eq!(svc.list(StatusFilter::All).await.unwrap(), vec![keep.clone()]);

        let fresh = svc.create(create_input(json!("fresh"))).await.unwrap();
        assert_eq!(svc.list(StatusFilter::All).await.unwrap(), vec![fresh, keep]);
        assert!(store.raw().contains("Keep me"));
    }

    #[tokio::test]
    async fn store_calls_run_off_the_async_thread() {
        let store = Arc::new(ThreadRecordingStore::default());
        let svc = TodoService::new(store.clone());

        svc.create(create_input(json!("x"))).await.unwrap();

        let here = std::thread::current().id();
        let threads = store.threads.lock().unwrap();
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|id| *id != here));
    }

    #[derive(Default)]
    struct ThreadRecordingStore {
        inner: MemoryStore,
        threads: std::sync::Mutex<Vec<std::thread::ThreadId>>,
    }

    impl ThreadRecordingStore {
        fn record(&self) {
            self.threads.lock().unwrap().push(std::thread::current().id());
        }
    }

    impl TodoStore for ThreadRecordingStore {
        fn load(&self) -> Result<Vec<Todo>, crate::store::StoreError> {
            self.record();
            self.inner.load()
        }

        fn save(&self, todos: &[Todo]) -> Result<(), crate::store::StoreError> {
            self.record();
            self.inner.save(todos)
        }
    }
}
