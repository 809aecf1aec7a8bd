//! Library error types.
//!
//! `StoreError` covers every failed store operation; panels treat all of its
//! variants the same way. `InputError` is raised before a store call is made.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("unknown field `{field}` in collection `{collection}`")]
    UnknownField {
        collection: &'static str,
        field: String,
    },

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("nothing to update")]
    EmptyUpdate,

    #[error("malformed record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Input rejected on the client before reaching the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter a task description")]
    EmptyDescription,

    #[error("Please enter a valid duration")]
    InvalidDuration(String),
}
