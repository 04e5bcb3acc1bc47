//! Error types for the article editor.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by editor commands.
#[derive(Error, Debug)]
pub enum EditorError {
    /// A required field is missing or inconsistent.
    #[error("{0}")]
    Validation(String),

    /// The local article file does not exist yet.
    #[error("file '{}' not found", path.display())]
    NotFound { path: PathBuf },

    /// The local article file exists but is not a valid article list.
    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A command needs a selected article and none is selected.
    #[error("no article selected")]
    NoSelection,

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("upload failed: {0}")]
    Sync(#[from] SyncError),
}

impl EditorError {
    pub fn validation(message: impl Into<String>) -> Self {
        EditorError::Validation(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EditorError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures talking to the remote contents API.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The remote file changed since its revision marker was read.
    #[error("remote file changed since it was read (revision {revision:?}): {message}")]
    Conflict {
        revision: Option<String>,
        message: String,
    },

    /// The API answered with a non-success status.
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body was not what the API documents.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Result type alias for editor operations.
pub type EditorResult<T> = std::result::Result<T, EditorError>;
