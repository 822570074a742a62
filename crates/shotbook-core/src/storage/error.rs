//! Storage error handling
//!
//! Provides typed errors for the record codec and the preset store, with
//! descriptive messages and recovery suggestions.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors converting between a stored row and a `PresetRecord`
#[derive(Error, Debug)]
pub enum CodecError {
    /// A JSON column could not be parsed
    #[error("Column '{column}' of preset '{id}' is not valid JSON: {source}")]
    InvalidJson {
        id: String,
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Camera settings parsed as JSON but match neither settings shape
    #[error("Camera settings of preset '{id}' are invalid: {details}")]
    InvalidSettings { id: String, details: String },

    /// The created_at column is not an RFC 3339 timestamp
    #[error("Invalid created_at '{value}' for preset '{id}': {source}")]
    InvalidTimestamp {
        id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A field could not be serialized
    #[error("Failed to serialize column '{column}' of preset '{id}': {source}")]
    Encode {
        id: String,
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl CodecError {
    /// Id of the preset whose row failed
    pub fn preset_id(&self) -> &str {
        match self {
            CodecError::InvalidJson { id, .. }
            | CodecError::InvalidSettings { id, .. }
            | CodecError::InvalidTimestamp { id, .. }
            | CodecError::Encode { id, .. } => id,
        }
    }
}

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Opening the database, creating the schema or seeding failed
    #[error("Failed to initialize preset database at '{path}': {source}")]
    Initialization {
        path: PathBuf,
        #[source]
        source: Box<StoreError>,
    },

    /// Failed to create data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A preset with this id already exists
    #[error("A preset with id '{id}' already exists")]
    DuplicateKey { id: String },

    /// A stored row could not be decoded
    #[error("Corrupt preset row: {0}")]
    Codec(#[from] CodecError),

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The blocking database task panicked or was cancelled
    #[error("Database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A previous database task panicked while holding the connection
    #[error("Database connection lock is poisoned")]
    LockPoisoned,

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    /// Wrap an error raised while opening the database at `path`
    pub fn initialization(path: PathBuf, source: impl Into<StoreError>) -> Self {
        StoreError::Initialization {
            path,
            source: Box::new(source.into()),
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the store usable; the caller may retry or
    /// pick different input.
    pub fn is_recoverable(&self) -> bool {
        match self {
            StoreError::DuplicateKey { .. } | StoreError::Codec(_) => true,
            StoreError::Database(err) => is_busy(err),
            _ => false,
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::Initialization { .. } => {
                Some("Check that the data directory is writable and the database file is not locked by another process.")
            }
            StoreError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            StoreError::DuplicateKey { .. } => {
                Some("Generate a new id for the preset and submit it again.")
            }
            StoreError::Codec(_) => {
                Some("The row was written by an incompatible version. Delete it, or enable skip_corrupt_rows to list the remaining presets.")
            }
            StoreError::Database(err) if is_busy(err) => {
                Some("The database is busy. Try again in a moment.")
            }
            _ => None,
        }
    }
}

/// Whether a SQLite error reports a primary key collision
pub(crate) fn is_primary_key_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

fn is_busy(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(err, _)
            if matches!(err.code, rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
    )
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
