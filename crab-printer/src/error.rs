//! Error types for the printer library

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Network connection error
    #[error("Connection failed: {0}")]
    Connection(String),

    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Timeout waiting for printer
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid printer configuration (address, device profile)
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A driver call was given a value the device cannot accept
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Image could not be loaded or rendered
    #[error("Image error: {0}")]
    Image(String),

    /// Barcode payload rejected for the selected symbology
    #[error("Barcode error: {0}")]
    Barcode(String),

    /// Write attempted on a closed connection
    #[error("Printer not connected")]
    NotConnected,
}

impl PrintError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
