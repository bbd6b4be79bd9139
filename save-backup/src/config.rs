//! Backup engine configuration: storage root, compression, and retention.

use std::path::PathBuf;

/// Compression applied to a snapshot's payload. Selects both the encoder
/// and the file extension appended to the snapshot's basename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    None,
    #[default]
    GZip,
    Lz4,
    Lzma,
}

impl Compression {
    pub fn extension(self) -> &'static str {
        match self {
            Compression::None => "",
            Compression::GZip => ".gz",
            Compression::Lz4 => ".lz4",
            Compression::Lzma => ".lzma",
        }
    }
}

/// Governs which snapshots `BackupEngine::prune` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Snapshots older than this are deletable, in seconds.
    pub max_age_secs: u64,
    /// Newest-first cap on snapshots kept per original save path.
    pub max_per_save: usize,
    /// Total snapshot bytes allowed across every group; `0` disables the check.
    pub max_total_size: u64,
    /// Never delete the last remaining snapshot in a group.
    pub keep_at_least_one: bool,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age_secs: 30 * 24 * 60 * 60,
            max_per_save: 10,
            max_total_size: 10 * 1024 * 1024 * 1024,
            keep_at_least_one: true,
        }
    }
}

/// Top-level configuration for a [`crate::BackupEngine`] instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    pub backup_directory: PathBuf,
    pub compression: Compression,
    pub retention_policy: RetentionPolicy,
    pub compute_checksums: bool,
    pub create_manifests: bool,
}

impl BackupConfig {
    pub fn new(backup_directory: impl Into<PathBuf>) -> Self {
        Self {
            backup_directory: backup_directory.into(),
            compression: Compression::default(),
            retention_policy: RetentionPolicy::default(),
            compute_checksums: true,
            create_manifests: true,
        }
    }
}

/// What prompted a snapshot to be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Manual,
    PreEdit,
    Scheduled,
    OnClose,
    BeforeRestore,
}

impl Trigger {
    /// Subdirectory a snapshot with this trigger is stored under.
    pub fn subdirectory(self) -> &'static str {
        match self {
            Trigger::PreEdit => "pre-edit",
            _ => "snapshots",
        }
    }
}
