//! Error types for the printer library

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Malformed or incomplete printer configuration, detected before any I/O
    #[error("Invalid config: {0}")]
    Configuration(String),

    /// Could not establish a session (device not found, refused, port busy)
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The printer did not answer in time
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Failure while rendering or writing a formatted job
    #[error("Formatting failed: {0}")]
    Formatting(String),

    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PrintError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PrintError::Timeout(_))
    }
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
