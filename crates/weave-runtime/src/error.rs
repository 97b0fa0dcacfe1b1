//! Runtime error types

use thiserror::Error;

/// Errors raised while executing a generated host program
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("{file}: generated program does not compile: {message}")]
    Compile {
        file: String,
        message: String,
        line: Option<usize>,
    },

    #[error("{file}: {message}")]
    Script {
        file: String,
        message: String,
        /// Source line the failing generated line came from
        line: Option<usize>,
    },

    #[error("{file}: exported binding '{name}' is not defined")]
    MissingExport {
        file: String,
        name: String,
        line: usize,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RuntimeError {
    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            RuntimeError::Compile { .. } => "E-RT-001",
            RuntimeError::Script { .. } => "E-RT-002",
            RuntimeError::MissingExport { .. } => "E-RT-003",
            RuntimeError::Internal(_) => "E-RT-999",
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            RuntimeError::Compile { line, .. } | RuntimeError::Script { line, .. } => *line,
            RuntimeError::MissingExport { line, .. } => Some(*line),
            RuntimeError::Internal(_) => None,
        }
    }
}
