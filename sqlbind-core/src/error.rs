//! Error types for the SQL-side core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlbindError {
    /// A statement is missing its `-- name:` line, or the annotation itself
    /// is malformed (bad name, unrecognized kind).
    #[error("{file}:{line}: invalid query annotation: {message}")]
    InvalidAnnotation {
        file: String,
        line: usize,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SqlbindError {
    /// Create an annotation error for a given source location.
    pub fn annotation(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidAnnotation {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}
