//! Error types for the terminal core
//!
//! Stream processing itself never fails. These errors surface only at the
//! edges that touch the outside world: printer sinks, URIs, options files
//! and the reader loop.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Terminal core error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading the byte stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A print job could not be written to its destination
    #[error("Failed to print to {path}: {source}")]
    Printer {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A working-directory report did not carry a usable file URI
    #[error("Invalid file URI: {0}")]
    InvalidUri(String),

    /// Options file could not be parsed or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for terminal core operations
pub type Result<T> = std::result::Result<T, Error>;
