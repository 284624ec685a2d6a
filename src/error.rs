//! Error types for the enhancer library.
//!
//! Only fatal conditions surface as [`Error`]. Per-file parse failures and
//! per-case resolution misses are recoverable and are reported through
//! `tracing` instead.

use std::path::{Path, PathBuf};

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid configuration (bad config file, bad CLI combination).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A value failed a structural check.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Reading or writing a file failed.
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source tree could not be enumerated.
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),

    /// A Go source file could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The report bytes are not a decodable JUnit document.
    #[error("Failed to decode JUnit report: {0}")]
    Decode(String),

    /// The report could not be serialized.
    #[error("Failed to encode JUnit report: {0}")]
    Encode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
