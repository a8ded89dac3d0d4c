//! Error types for the print relay
//!
//! | Type | Raised by | Effect on the job |
//! |------|-----------|-------------------|
//! | [`ParamError`] | compound parameter accessors | wrapped in [`DispatchError`] |
//! | [`FetchError`] | image download | wrapped in [`DispatchError`] |
//! | [`DispatchError`] | one command | stops the job |
//! | [`JobError`] | job orchestration | returned to the caller |
//! | [`CleanupError`] | teardown | logged, never returned |

use crab_printer::PrintError;
use thiserror::Error;

/// A compound string parameter could not be used
#[derive(Debug, Error)]
pub enum ParamError {
    #[error("Parameter '{key}' must be a {expected}, got {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: String,
    },

    #[error("Parameter '{key}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: String,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Image download failure
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Downloaded bytes could not be written to a temporary file
    #[error("Temporary file error: {0}")]
    Io(#[from] std::io::Error),
}

/// A recognized command failed
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Driver(#[from] PrintError),

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Bad formatting mapping for `set`
    #[error("Invalid style: {0}")]
    Style(String),
}

/// Why a print job failed
#[derive(Debug, Error)]
pub enum JobError {
    /// Connecting or the initial handshake failed; no command was attempted
    #[error("Cannot connect to printer {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: PrintError,
    },

    #[error("Command #{index} ({command}) failed: {source}")]
    Dispatch {
        index: usize,
        command: String,
        #[source]
        source: DispatchError,
    },

    #[error("Final flush failed: {0}")]
    Finalize(#[source] PrintError),
}

/// Failure while releasing a resource
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("Closing printer connection failed: {0}")]
    Close(#[source] PrintError),

    #[error("Removing temporary file failed: {0}")]
    TempFile(#[source] std::io::Error),
}
