//! Wire and storage types for the todo service.
//!
//! `Todo` is both the persisted record and the response body, so the JSON
//! shape written to disk is exactly what clients receive. Request payloads
//! keep their fields as raw JSON values; type checking happens in the service
//! so that a wrong type becomes a 400 with a readable message instead of an
//! extractor rejection.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A single todo item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub completed: bool,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Build a fresh, not yet completed todo. `title` must already be trimmed.
    pub fn new(title: String) -> Self {
        let now = now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now().max(self.created_at);
    }
}

/// Current time truncated to the millisecond precision used on the wire.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Which slice of the collection a list request wants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    /// Unknown or missing values fall back to `All`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("active") => StatusFilter::Active,
            Some("completed") => StatusFilter::Completed,
            _ => StatusFilter::All,
        }
    }

    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !todo.completed,
            StatusFilter::Completed => todo.completed,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// Body of `POST /api/todos`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodo {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,
}

/// Body of `PUT /api/todos/{id}`. A field is `Some` whenever the key was
/// sent, even with a `null` value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodo {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub completed: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cleared {
    pub removed: usize,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
