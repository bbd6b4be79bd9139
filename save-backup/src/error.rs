//! Error types for the save-backup crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("source save file not found: {0}")]
    SourceNotFound(std::path::PathBuf),

    #[error("snapshot could not be created: {0}")]
    SnapshotError(String),

    #[error("backup file not found: {0}")]
    BackupNotFound(std::path::PathBuf),

    #[error("restore failed: {0}")]
    RestoreError(String),

    #[error("backup verification failed for {0}")]
    VerificationFailed(std::path::PathBuf),

    #[error("checksum mismatch restoring {path}: manifest recorded {expected}, backup file is {actual}")]
    ChecksumMismatch {
        path: std::path::PathBuf,
        expected: String,
        actual: String,
    },

    #[error("manifest error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("operation cancelled")]
    Cancelled,
}
