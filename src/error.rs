//! Error types for sqlbridge.
//!
//! Translation itself never fails. These errors only surface at the
//! boundaries: parsing a dialect name and loading configuration.

use thiserror::Error;

/// The main error type for sqlbridge operations.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Dialect name not recognised.
    #[error("Unknown dialect: '{0}'. Expected: presto, hive, or vertica")]
    UnknownDialect(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranslateError {
    /// Create an unknown dialect error.
    pub fn unknown_dialect(name: impl Into<String>) -> Self {
        Self::UnknownDialect(name.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type alias for sqlbridge operations.
pub type TranslateResult<T> = Result<T, TranslateError>;
