//! JSON manifest written alongside each snapshot, and the in-memory
//! `BackupInfo` handed back from `create_snapshot`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{Compression, Trigger};

/// Snapshot metadata pulled from the source save's frame and metadata block,
/// carried into the manifest for quick inspection without decoding the
/// backup payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SaveSummary {
    pub character: String,
    pub level: i64,
    pub day: i64,
    pub game_version: String,
    pub modules: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OriginalFile {
    pub path: PathBuf,
    pub size: u64,
    pub sha256: Option<String>,
    pub last_modified: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupFile {
    pub path: PathBuf,
    pub size: u64,
    pub compression: CompressionTag,
    pub sha256: Option<String>,
}

/// Serializable mirror of [`Compression`]; `Compression` itself has no
/// serde impls since it also carries behavior (`extension`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionTag {
    None,
    Gzip,
    Lz4,
    Lzma,
}

impl From<Compression> for CompressionTag {
    fn from(value: Compression) -> Self {
        match value {
            Compression::None => CompressionTag::None,
            Compression::GZip => CompressionTag::Gzip,
            Compression::Lz4 => CompressionTag::Lz4,
            Compression::Lzma => CompressionTag::Lzma,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TriggerTag {
    Manual,
    PreEdit,
    Scheduled,
    OnClose,
    BeforeRestore,
}

impl From<Trigger> for TriggerTag {
    fn from(value: Trigger) -> Self {
        match value {
            Trigger::Manual => TriggerTag::Manual,
            Trigger::PreEdit => TriggerTag::PreEdit,
            Trigger::Scheduled => TriggerTag::Scheduled,
            Trigger::OnClose => TriggerTag::OnClose,
            Trigger::BeforeRestore => TriggerTag::BeforeRestore,
        }
    }
}

/// On-disk manifest schema, one per snapshot when manifests are enabled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub version: u32,
    pub created: String,
    pub trigger: TriggerTag,
    pub original: OriginalFile,
    pub backup: BackupFile,
    pub metadata: SaveSummary,
}

pub const MANIFEST_VERSION: u32 = 1;

/// Metadata returned to the caller after a successful snapshot, independent
/// of whether a manifest file was written.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupInfo {
    pub backup_path: PathBuf,
    pub original_path: PathBuf,
    pub created_at: u64,
    pub original_size: u64,
    pub backup_size: u64,
    pub checksum: Option<String>,
    pub trigger: Trigger,
}
