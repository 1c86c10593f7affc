//! Error types for Dataport

use thiserror::Error;

/// Result type alias for Dataport operations
pub type Result<T> = std::result::Result<T, DataportError>;

/// Main error type for Dataport
#[derive(Error, Debug)]
pub enum DataportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
