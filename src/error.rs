use std::io;

use thiserror::Error;

/// Bad numeric or coordinate input at workout construction.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be a whole number, got {value}")]
    NotWhole { field: &'static str, value: f64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("a workout with id {0} already exists")]
    DuplicateId(String),

    #[error("no workout with id {0}")]
    NotFound(String),
}

/// Why a persisted record could not be turned back into a workout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordFault {
    #[error("record is not an object")]
    NotAnObject,

    #[error("unknown workout type {0:?}")]
    UnknownKind(String),

    #[error("missing or malformed field `{0}`")]
    BadField(&'static str),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("id {0} already restored")]
    DuplicateId(String),
}

/// One record skipped during restore.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("record #{index}{}: {fault}", .id.as_deref().map(|id| format!(" (id {id})")).unwrap_or_default())]
pub struct CorruptRecordError {
    pub index: usize,
    pub id: Option<String>,
    pub fault: RecordFault,
}

/// Failure of a durable key-value backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("encoding snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PositionError {
    #[error("position unavailable: {0}")]
    Unavailable(String),

    #[error("reading GPX: {0}")]
    Io(#[from] io::Error),

    #[error("GPX XML parse error: {0}")]
    Xml(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
