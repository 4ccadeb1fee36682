//! Runtime configuration, read from environment variables with defaults.

use std::{env, path::PathBuf};

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_DATA_FILE: &str = "data/todos.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub host: String,
    /// JSON file holding the todo collection.
    pub data_file: PathBuf,
}

impl Config {
    /// Reads `PORT`, `HOST` and `TODO_DATA_FILE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unparsable or missing values use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: lookup("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            data_file: lookup("TODO_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
