//! Error types for graph files and reports

use std::path::PathBuf;

use agora_core::DebateError;
use thiserror::Error;

/// Errors that can occur while reading or writing debate artifacts
#[derive(Debug, Error)]
pub enum IoError {
    /// The loaded data violates a graph invariant
    #[error(transparent)]
    Debate(#[from] DebateError),

    /// Underlying filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Refused to overwrite a file that already holds data
    #[error("File already exists and is not empty: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// A graph file could not be parsed
    #[error("{}:{line}: {reason}", path.display())]
    Format {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IoError {
    /// Attach a file path to a parse error coming from [`crate::apx::parse_graph`]
    pub(crate) fn at_path(self, path: &std::path::Path) -> Self {
        match self {
            IoError::Debate(DebateError::MalformedGraphFormat { line, reason }) => IoError::Format {
                path: path.to_path_buf(),
                line,
                reason,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, IoError>;
