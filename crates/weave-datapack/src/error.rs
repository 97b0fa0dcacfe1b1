//! Error types for datapack I/O

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatapackError>;

#[derive(Debug, Error)]
pub enum DatapackError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid tag file {path}: {source}")]
    InvalidTag {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File watcher error: {0}")]
    FileWatcher(#[from] notify::Error),

    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    #[error("File watcher disconnected")]
    Disconnected,
}
