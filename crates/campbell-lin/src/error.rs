//! Error types for campbell-lin.

use std::path::PathBuf;

use thiserror::Error;

/// Label used for input that did not come from a file.
pub const INLINE_SOURCE: &str = "<inline>";

#[derive(Debug, Error)]
pub enum Error {
    #[error("{file}:{line}: {message}")]
    Format {
        file: String,
        line: usize,
        message: String,
    },

    #[error("{file}: missing required header field '{field}'")]
    MissingField { file: String, field: &'static str },

    #[error("{file}: missing '{category}' table ({expected} rows declared)")]
    MissingTable {
        file: String,
        category: String,
        expected: usize,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn format(file: &str, line: usize, message: impl Into<String>) -> Self {
        Error::Format {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
