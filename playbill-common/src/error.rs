//! Common error types for Playbill

use thiserror::Error;

/// Common result type for Playbill operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Playbill crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    ///
    /// Store-level conflicts and constraint violations mid-transaction land
    /// here; the transaction has been rolled back by the time it surfaces.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unrecognised value, such as an unknown stored label
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Not-found error for an entity of the given label
    pub fn not_found(label: crate::Label, uuid: &str) -> Self {
        Error::NotFound(format!("{} {}", label, uuid))
    }
}
