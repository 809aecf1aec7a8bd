//! `RecordStore` backed by the local SQLite database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::params_from_iter;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{timestamp, Collection, Filter, Order, Predicate, Record, RecordStore};
use crate::db::Database;
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Integer,
    Bool,
    Timestamp,
}

#[derive(Debug, Clone, Copy)]
struct Column {
    name: &'static str,
    kind: ColumnKind,
}

const fn col(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

const NOTE_COLUMNS: &[Column] = &[
    col("id", ColumnKind::Text),
    col("owner", ColumnKind::Text),
    col("content", ColumnKind::Text),
    col("kind", ColumnKind::Text),
    col("created_at", ColumnKind::Timestamp),
];

const TASK_COLUMNS: &[Column] = &[
    col("id", ColumnKind::Text),
    col("owner", ColumnKind::Text),
    col("description", ColumnKind::Text),
    col("completed", ColumnKind::Bool),
    col("estimated_minutes", ColumnKind::Integer),
    col("due_date", ColumnKind::Timestamp),
    col("created_at", ColumnKind::Timestamp),
];

const SESSION_COLUMNS: &[Column] = &[
    col("id", ColumnKind::Text),
    col("owner", ColumnKind::Text),
    col("duration_seconds", ColumnKind::Integer),
    col("completed_at", ColumnKind::Timestamp),
    col("created_at", ColumnKind::Timestamp),
];

/// Fields the store owns; callers cannot write them.
const ASSIGNED: &[&str] = &["id", "created_at"];

fn columns(collection: Collection) -> &'static [Column] {
    match collection {
        Collection::Notes => NOTE_COLUMNS,
        Collection::Tasks => TASK_COLUMNS,
        Collection::PomodoroSessions => SESSION_COLUMNS,
    }
}

fn column(collection: Collection, field: &str) -> StoreResult<Column> {
    columns(collection)
        .iter()
        .find(|c| c.name == field)
        .copied()
        .ok_or_else(|| StoreError::UnknownField {
            collection: collection.as_str(),
            field: field.to_string(),
        })
}

fn invalid(column: Column, reason: &str) -> StoreError {
    StoreError::InvalidValue {
        field: column.name.to_string(),
        reason: reason.to_string(),
    }
}

fn to_sql(column: Column, value: &Value) -> StoreResult<SqlValue> {
    if value.is_null() {
        return Ok(SqlValue::Null);
    }

    match column.kind {
        ColumnKind::Text => value
            .as_str()
            .map(|s| SqlValue::Text(s.to_string()))
            .ok_or_else(|| invalid(column, "expected a string")),
        ColumnKind::Integer => {
            if let Some(n) = value.as_i64() {
                return Ok(SqlValue::Integer(n));
            }
            match value.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(SqlValue::Integer(f as i64)),
                _ => Err(invalid(column, "expected an integer")),
            }
        }
        ColumnKind::Bool => value
            .as_bool()
            .map(|b| SqlValue::Integer(b as i64))
            .ok_or_else(|| invalid(column, "expected a boolean")),
        ColumnKind::Timestamp => {
            let text = value
                .as_str()
                .ok_or_else(|| invalid(column, "expected an RFC 3339 timestamp"))?;
            let parsed = DateTime::parse_from_rfc3339(text)
                .map_err(|e| invalid(column, &e.to_string()))?;
            Ok(SqlValue::Text(timestamp(parsed.with_timezone(&Utc))))
        }
    }
}

fn from_sql(column: Column, value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) if column.kind == ColumnKind::Bool => Value::Bool(i != 0),
        SqlValue::Integer(i) => Value::from(i),
        SqlValue::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        SqlValue::Text(s) => Value::String(s),
        SqlValue::Blob(_) => Value::Null,
    }
}

fn column_list(cols: &[Column]) -> String {
    cols.iter().map(|c| c.name).collect::<Vec<_>>().join(", ")
}

pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Fresh in-memory store for tests
    pub fn open_memory() -> anyhow::Result<Self> {
        Ok(Self::new(Database::open_memory()?))
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|_| StoreError::Unavailable("database lock poisoned".to_string()))
    }

    /// Run a closure against the underlying database (settings, stats)
    pub fn with_db<T>(&self, f: impl FnOnce(&Database) -> T) -> StoreResult<T> {
        let db = self.lock()?;
        Ok(f(&db))
    }

    fn select(
        db: &Database,
        collection: Collection,
        filter: &Filter,
        order: Option<&Order>,
    ) -> StoreResult<Vec<Record>> {
        let cols = columns(collection);
        let mut sql = format!("SELECT {} FROM {}", column_list(cols), collection.as_str());
        let mut params = Vec::new();
        let mut clauses = Vec::new();

        for predicate in filter.predicates() {
            let c = column(collection, predicate.field())?;
            match predicate {
                Predicate::Eq(_, v) if v.is_null() => clauses.push(format!("{} IS NULL", c.name)),
                Predicate::Eq(_, v) => {
                    clauses.push(format!("{} = ?", c.name));
                    params.push(to_sql(c, v)?);
                }
                Predicate::Gte(_, v) => {
                    clauses.push(format!("{} >= ?", c.name));
                    params.push(to_sql(c, v)?);
                }
                Predicate::Lt(_, v) => {
                    clauses.push(format!("{} < ?", c.name));
                    params.push(to_sql(c, v)?);
                }
            }
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if let Some(order) = order {
            let c = column(collection, &order.field)?;
            let dir = if order.descending { "DESC" } else { "ASC" };
            // rowid breaks ties between rows written in the same microsecond
            sql.push_str(&format!(" ORDER BY {} {}, rowid {}", c.name, dir, dir));
        }

        let conn = db.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                let mut record = Record::new();
                for (idx, c) in cols.iter().enumerate() {
                    let value: SqlValue = row.get(idx)?;
                    record.insert(c.name.to_string(), from_sql(*c, value));
                }
                Ok(record)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn query(
        &self,
        collection: Collection,
        filter: &Filter,
        order: Option<&Order>,
    ) -> StoreResult<Vec<Record>> {
        let db = self.lock()?;
        let rows = Self::select(&db, collection, filter, order)?;
        tracing::debug!(%collection, rows = rows.len(), "query");
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, record: Record) -> StoreResult<Record> {
        for field in record.keys() {
            column(collection, field)?;
        }

        let id = Uuid::new_v4();
        let cols = columns(collection);
        let mut params = Vec::with_capacity(cols.len());
        for c in cols {
            let value = match c.name {
                "id" => SqlValue::Text(id.to_string()),
                "created_at" => SqlValue::Text(timestamp(Utc::now())),
                name => to_sql(*c, record.get(name).unwrap_or(&Value::Null))?,
            };
            params.push(value);
        }

        let placeholders = vec!["?"; cols.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            collection.as_str(),
            column_list(cols),
            placeholders
        );

        let db = self.lock()?;
        db.conn().execute(&sql, params_from_iter(params.iter()))?;
        tracing::debug!(%collection, %id, "insert");

        let created = Self::select(&db, collection, &Filter::new().eq("id", id.to_string()), None)?;
        created.into_iter().next().ok_or_else(|| {
            StoreError::Unavailable(format!("inserted row {} in {} vanished", id, collection))
        })
    }

    async fn update(&self, collection: Collection, id: Uuid, partial: Record) -> StoreResult<()> {
        if partial.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }

        let mut sets = Vec::with_capacity(partial.len());
        let mut params = Vec::with_capacity(partial.len() + 1);
        for (field, value) in &partial {
            let c = column(collection, field)?;
            if ASSIGNED.contains(&c.name) {
                return Err(invalid(c, "assigned by the store"));
            }
            sets.push(format!("{} = ?", c.name));
            params.push(to_sql(c, value)?);
        }
        params.push(SqlValue::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?",
            collection.as_str(),
            sets.join(", ")
        );

        let db = self.lock()?;
        let changed = db.conn().execute(&sql, params_from_iter(params.iter()))?;
        if changed == 0 {
            tracing::debug!(%collection, %id, "update matched no rows");
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", collection.as_str());

        let db = self.lock()?;
        let removed = db.conn().execute(&sql, [id.to_string()])?;
        if removed == 0 {
            tracing::debug!(%collection, %id, "delete matched no rows");
        }
        Ok(())
    }
}
