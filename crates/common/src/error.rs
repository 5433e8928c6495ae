//! Error types for the Amy store

use thiserror::Error;

/// Result type alias using the store Error
pub type Result<T> = std::result::Result<T, Error>;

/// Store error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Resource not found: {kind} with id {id}")]
    NotFound { kind: String, id: String },

    #[error("Resource already exists: {kind} with id {id}")]
    AlreadyExists { kind: String, id: String },

    #[error("Invalid record in {table}: {reason}")]
    InvalidRecord { table: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Translate a failed insert into the constraint it violated.
    ///
    /// `kind` names the record being written and `id` the key the caller
    /// identifies it by (slug, IATA code, domain, ...).
    pub fn from_insert(err: rusqlite::Error, kind: &str, id: &str) -> Self {
        if let rusqlite::Error::SqliteFailure(code, Some(msg)) = &err {
            if code.code == rusqlite::ErrorCode::ConstraintViolation {
                if msg.starts_with("UNIQUE") {
                    return Error::AlreadyExists {
                        kind: kind.to_string(),
                        id: id.to_string(),
                    };
                }
                if msg.starts_with("FOREIGN KEY") {
                    return Error::NotFound {
                        kind: format!("reference from {}", kind),
                        id: id.to_string(),
                    };
                }
            }
        }
        Error::Database(err)
    }
}
