//! Generic record store used by the panels.
//!
//! Panels never touch SQL. They speak in collections, filters and loosely
//! typed records, and convert records to their models with
//! [`to_record`] / [`from_record`].

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

mod sqlite;

pub use sqlite::SqliteStore;

/// A single row as a JSON object keyed by field name
pub type Record = serde_json::Map<String, Value>;

/// Named logical tables in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Notes,
    Tasks,
    PomodoroSessions,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Tasks => "tasks",
            Self::PomodoroSessions => "pomodoro_sessions",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(String, Value),
    /// Inclusive lower bound
    Gte(String, Value),
    /// Exclusive upper bound
    Lt(String, Value),
}

impl Predicate {
    pub fn field(&self) -> &str {
        match self {
            Self::Eq(f, _) | Self::Gte(f, _) | Self::Lt(f, _) => f,
        }
    }
}

/// Conjunction of predicates. An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Eq(field.to_string(), value.into()));
        self
    }

    pub fn gte(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Gte(field.to_string(), value.into()));
        self
    }

    pub fn lt(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Lt(field.to_string(), value.into()));
        self
    }

    /// `[start, end)` on a timestamp field
    pub fn between(self, field: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.gte(field, timestamp(start)).lt(field, timestamp(end))
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub descending: bool,
}

impl Order {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: false,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }
}

/// Remote-style create/read/update/delete over named collections.
///
/// Implementations assign `id` and `created_at` on insert; values supplied
/// for those fields are ignored.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn query(
        &self,
        collection: Collection,
        filter: &Filter,
        order: Option<&Order>,
    ) -> StoreResult<Vec<Record>>;

    async fn insert(&self, collection: Collection, record: Record) -> StoreResult<Record>;

    async fn update(&self, collection: Collection, id: Uuid, partial: Record) -> StoreResult<()>;

    async fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()>;
}

/// Canonical timestamp text: UTC, microseconds, `Z` suffix
pub fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Serialize a model (or an insert payload) into a record
pub fn to_record<T: Serialize>(value: &T) -> StoreResult<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidValue {
            field: "<record>".to_string(),
            reason: format!("expected an object, got {}", other),
        }),
    }
}

pub fn from_record<T: DeserializeOwned>(record: Record) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Build a one-field partial record for updates
pub fn patch(field: &str, value: impl Into<Value>) -> Record {
    let mut record = Record::new();
    record.insert(field.to_string(), value.into());
    record
}
