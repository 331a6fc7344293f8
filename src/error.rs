//! Error types for bibnote.
//!
//! Every error is fatal to the call that produced it. Nothing is retried and
//! no partially-resolved tree is handed back.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Required configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A file could not be read or written.
    #[error("error accessing the file {}: {source}", .path.to_string_lossy())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bibliography source is malformed.
    #[error("error parsing the bibliography (line {line}): {message}")]
    Parse { line: usize, message: String },

    /// A cited key has no record in the bibliography.
    #[error("no bibliography entry for the citation key \"{key}\"")]
    Format { key: String },

    /// The document tree could not be read or written as JSON.
    #[error("document tree error: {0}")]
    Tree(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}
