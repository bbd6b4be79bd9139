//! Snapshot, manifest, and retention engine for Bannerlord `.sav` backups.
//!
//! [`BackupEngine`] owns a backup root and exposes snapshot creation,
//! restore, listing, verification, and retention pruning. `save-engine`
//! calls into this crate for its `save.create_backup` option; this crate
//! has no dependency in the other direction.

mod cancellation;
mod config;
mod engine;
mod error;
mod manifest;
mod timestamp;

pub use cancellation::CancellationToken;
pub use config::{BackupConfig, Compression, RetentionPolicy, Trigger};
pub use engine::BackupEngine;
pub use error::{Error, Result};
pub use manifest::{BackupInfo, Manifest, SaveSummary};
pub use timestamp::{format_iso8601, now_unix_secs};
