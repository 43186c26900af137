//! Error types for the scout application layer.

use scout_search::SearchError;

/// Top-level error type for the scout application.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Configuration file could not be parsed or is inconsistent.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The search pipeline rejected the request or its configuration.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Search input is not a valid context document.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ScoutError>;
