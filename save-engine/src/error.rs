//! Error types for the save-engine facade.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(#[from] save_codec::Error),

    #[error("model error: {0}")]
    Model(#[from] save_model::Error),

    #[error("backup error: {0}")]
    Backup(#[from] save_backup::Error),

    #[error("save file not found: {0}")]
    FileNotFound(std::path::PathBuf),

    #[error("integrity verification failed after write: {0}")]
    SaveWriteError(String),

    #[error("refusing to write: validation reported {0} error(s)")]
    ValidationFailed(usize),

    #[error("operation cancelled")]
    Cancelled,
}
