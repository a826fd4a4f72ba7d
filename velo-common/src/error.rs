//! Common error types for Velo

use thiserror::Error;

/// Common result type for Velo operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Velo services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unparseable or incomplete row in an input stream
    #[error("Malformed row at line {line}: {message}")]
    MalformedRow { line: u64, message: String },

    /// Internal invariant breach
    #[error("Internal error: {0}")]
    Internal(String),
}
