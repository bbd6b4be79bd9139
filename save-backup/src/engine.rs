//! The backup engine: snapshot creation, restore, listing, verification,
//! and retention pruning.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::cancellation::CancellationToken;
use crate::config::{BackupConfig, Compression, Trigger};
use crate::error::{Error, Result};
use crate::manifest::{BackupFile, BackupInfo, Manifest, OriginalFile, SaveSummary, MANIFEST_VERSION};
use crate::timestamp::{format_for_filename, now_unix_secs, parse_iso8601};

const RESTORE_SAFETY_SUFFIX: &str = ".restore-backup";
const MANIFEST_SUFFIX: &str = ".manifest.json";

/// Snapshot, restore, and retention operations rooted at a single backup
/// directory. `create_snapshot` and `restore` are serialized by an
/// in-process mutex so their filesystem steps never interleave.
pub struct BackupEngine {
    config: BackupConfig,
    lock: tokio::sync::Mutex<()>,
}

impl BackupEngine {
    pub fn new(config: BackupConfig) -> Self {
        Self {
            config,
            lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    /// Takes a snapshot of `source`, compressing and checksumming it per
    /// configuration, and returns the resulting [`BackupInfo`].
    pub async fn create_snapshot(
        &self,
        source: &Path,
        trigger: Trigger,
        summary: SaveSummary,
        cancellation: &CancellationToken,
    ) -> Result<BackupInfo> {
        cancellation.check()?;
        let _guard = self.lock.lock().await;

        let source_metadata = tokio::fs::metadata(source)
            .await
            .map_err(|_| Error::SourceNotFound(source.to_path_buf()))?;
        let source_bytes = tokio::fs::read(source).await?;
        let source_checksum = self.config.compute_checksums.then(|| checksum_of(&source_bytes));
        let last_modified = source_metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        cancellation.check()?;

        let dest_dir = self.config.backup_directory.join(trigger.subdirectory());
        ensure_dir(&dest_dir).await?;

        let created_at = now_unix_secs();
        let basename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "save".to_string());
        let backup_path = unique_backup_path(&dest_dir, created_at, &basename, self.config.compression).await;

        let compressed_bytes = compress(&source_bytes, self.config.compression)
            .map_err(|err| Error::SnapshotError(err.to_string()))?;
        tokio::fs::write(&backup_path, &compressed_bytes).await?;
        debug!(path = %backup_path.display(), bytes = compressed_bytes.len(), "wrote snapshot");

        let backup_checksum = self.config.compute_checksums.then(|| checksum_of(&compressed_bytes));

        if self.config.create_manifests {
            let manifest_dir = self.config.backup_directory.join("manifests");
            ensure_dir(&manifest_dir).await?;
            let manifest_path = manifest_dir.join(format!(
                "{}_{basename}{MANIFEST_SUFFIX}",
                format_for_filename(created_at)
            ));
            let manifest = Manifest {
                version: MANIFEST_VERSION,
                created: crate::timestamp::format_iso8601(created_at),
                trigger: trigger.into(),
                original: OriginalFile {
                    path: source.to_path_buf(),
                    size: source_bytes.len() as u64,
                    sha256: source_checksum.clone(),
                    last_modified,
                },
                backup: BackupFile {
                    path: backup_path.clone(),
                    size: compressed_bytes.len() as u64,
                    compression: self.config.compression.into(),
                    sha256: backup_checksum.clone(),
                },
                metadata: summary,
            };
            let json = serde_json::to_vec_pretty(&manifest)?;
            tokio::fs::write(&manifest_path, json).await?;
        }

        info!(
            source = %source.display(),
            backup = %backup_path.display(),
            trigger = ?trigger,
            "snapshot created"
        );

        Ok(BackupInfo {
            backup_path,
            original_path: source.to_path_buf(),
            created_at,
            original_size: source_bytes.len() as u64,
            backup_size: compressed_bytes.len() as u64,
            checksum: backup_checksum,
            trigger,
        })
    }

    /// Restores `backup_path` over `target_path`, keeping a `.restore-backup`
    /// safety copy of any existing file until the restore succeeds.
    pub async fn restore(
        &self,
        backup_path: &Path,
        target_path: &Path,
        cancellation: &CancellationToken,
    ) -> Result<()> {
        cancellation.check()?;
        let _guard = self.lock.lock().await;

        if tokio::fs::metadata(backup_path).await.is_err() {
            return Err(Error::BackupNotFound(backup_path.to_path_buf()));
        }

        if !self.verify(backup_path).await? {
            return Err(Error::VerificationFailed(backup_path.to_path_buf()));
        }

        let compressed = tokio::fs::read(backup_path).await?;
        if let Some(manifest) = self.manifest_for_snapshot(backup_path).await {
            if let Some(expected) = manifest.backup.sha256 {
                let actual = checksum_of(&compressed);
                if actual != expected {
                    return Err(Error::ChecksumMismatch {
                        path: backup_path.to_path_buf(),
                        expected,
                        actual,
                    });
                }
            }
        }

        cancellation.check()?;

        let safety_path = safety_path(target_path);
        let had_previous = tokio::fs::metadata(target_path).await.is_ok();
        if had_previous {
            tokio::fs::copy(target_path, &safety_path).await?;
        }

        let restore_result = async {
            let compression = compression_from_extension(backup_path);
            let restored = decompress(&compressed, compression)
                .map_err(|err| Error::RestoreError(err.to_string()))?;
            tokio::fs::write(target_path, restored).await?;
            Ok::<(), Error>(())
        }
        .await;

        match restore_result {
            Ok(()) => {
                if had_previous {
                    let _ = tokio::fs::remove_file(&safety_path).await;
                }
                info!(backup = %backup_path.display(), target = %target_path.display(), "restore complete");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "restore failed, rolling back");
                if had_previous {
                    if let Err(restore_err) = tokio::fs::copy(&safety_path, target_path).await {
                        warn!(error = %restore_err, "failed to restore safety copy after a failed restore");
                    }
                    let _ = tokio::fs::remove_file(&safety_path).await;
                }
                Err(err)
            }
        }
    }

    /// Enumerates `snapshots/` and `pre-edit/`, excluding manifest files,
    /// optionally filtered by a basename substring, sorted newest-first.
    pub async fn list(&self, filter: Option<&str>) -> Result<Vec<BackupInfo>> {
        let mut infos = Vec::new();
        for subdir in ["snapshots", "pre-edit"] {
            let dir = self.config.backup_directory.join(subdir);
            let Ok(mut entries) = tokio::fs::read_dir(&dir).await else {
                continue;
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let name = path.file_name().unwrap_or_default().to_string_lossy().into_owned();
                if let Some(needle) = filter {
                    if !name.contains(needle) {
                        continue;
                    }
                }
                if let Some(info) = self.info_for_snapshot(&path).await {
                    infos.push(info);
                }
            }
        }
        infos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(infos)
    }

    pub async fn latest(&self, filter: Option<&str>) -> Result<Option<BackupInfo>> {
        Ok(self.list(filter).await?.into_iter().next())
    }

    /// Reads the whole backup file and, if compressed, stream-decompresses
    /// it to completion. Returns `false` rather than erroring on failure.
    pub async fn verify(&self, backup_path: &Path) -> Result<bool> {
        let Ok(bytes) = tokio::fs::read(backup_path).await else {
            return Ok(false);
        };
        let compression = compression_from_extension(backup_path);
        Ok(decompress(&bytes, compression).is_ok())
    }

    /// Applies the configured retention policy and returns the number of
    /// snapshots deleted. Never fails on an individual delete error.
    pub async fn prune(&self) -> Result<usize> {
        let policy = self.config.retention_policy;
        let now = now_unix_secs();

        let mut entries = Vec::new();
        for subdir in ["snapshots", "pre-edit"] {
            let dir = self.config.backup_directory.join(subdir);
            let Ok(mut read_dir) = tokio::fs::read_dir(&dir).await else {
                continue;
            };
            while let Ok(Some(entry)) = read_dir.next_entry().await {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                if let Some(manifest) = self.manifest_for_snapshot(&path).await {
                    let size = tokio::fs::metadata(&path).await.map(|m| m.len()).unwrap_or(0);
                    let created_at = parse_iso8601(&manifest.created).unwrap_or(0);
                    entries.push(PruneEntry {
                        path,
                        manifest_path: manifest_path_for(&self.config.backup_directory, &manifest),
                        original_path: manifest.original.path.clone(),
                        created_at,
                        size,
                    });
                }
            }
        }

        let mut groups: HashMap<PathBuf, Vec<usize>> = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            groups.entry(entry.original_path.clone()).or_default().push(idx);
        }

        let mut deletable: Vec<bool> = vec![false; entries.len()];
        for indices in groups.values() {
            let mut sorted = indices.clone();
            sorted.sort_by_key(|&i| std::cmp::Reverse(entries[i].created_at));

            for (rank, &idx) in sorted.iter().enumerate() {
                let age = now.saturating_sub(entries[idx].created_at);
                if age > policy.max_age_secs || rank >= policy.max_per_save {
                    deletable[idx] = true;
                }
            }

            if policy.keep_at_least_one && sorted.iter().all(|&i| deletable[i]) {
                if let Some(&newest) = sorted.first() {
                    deletable[newest] = false;
                }
            }
        }

        let mut deleted = 0usize;
        let mut remaining: Vec<usize> = Vec::new();
        for (idx, entry) in entries.iter().enumerate() {
            if deletable[idx] {
                self.delete_snapshot(entry).await;
                deleted += 1;
            } else {
                remaining.push(idx);
            }
        }

        if policy.max_total_size > 0 {
            remaining.sort_by_key(|&i| entries[i].created_at);
            let mut total: u64 = remaining.iter().map(|&i| entries[i].size).sum();
            let mut group_counts: HashMap<PathBuf, usize> = HashMap::new();
            for &idx in &remaining {
                *group_counts.entry(entries[idx].original_path.clone()).or_insert(0) += 1;
            }

            for &idx in &remaining {
                if total <= policy.max_total_size {
                    break;
                }
                let count = group_counts.get_mut(&entries[idx].original_path).unwrap();
                if policy.keep_at_least_one && *count <= 1 {
                    continue;
                }
                self.delete_snapshot(&entries[idx]).await;
                total = total.saturating_sub(entries[idx].size);
                *count -= 1;
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    async fn delete_snapshot(&self, entry: &PruneEntry) {
        if let Err(err) = tokio::fs::remove_file(&entry.path).await {
            warn!(path = %entry.path.display(), error = %err, "failed to delete snapshot during prune");
        }
        if let Some(manifest_path) = &entry.manifest_path {
            let _ = tokio::fs::remove_file(manifest_path).await;
        }
    }

    async fn info_for_snapshot(&self, path: &Path) -> Option<BackupInfo> {
        let manifest = self.manifest_for_snapshot(path).await;
        let size = tokio::fs::metadata(path).await.ok()?.len();
        match manifest {
            Some(manifest) => Some(BackupInfo {
                backup_path: path.to_path_buf(),
                original_path: manifest.original.path,
                created_at: parse_iso8601(&manifest.created).unwrap_or(0),
                original_size: manifest.original.size,
                backup_size: manifest.backup.size,
                checksum: manifest.backup.sha256,
                trigger: trigger_from_subdir(path),
            }),
            None => {
                let modified = tokio::fs::metadata(path)
                    .await
                    .ok()?
                    .modified()
                    .ok()?
                    .duration_since(std::time::UNIX_EPOCH)
                    .ok()?
                    .as_secs();
                Some(BackupInfo {
                    backup_path: path.to_path_buf(),
                    original_path: PathBuf::new(),
                    created_at: modified,
                    original_size: 0,
                    backup_size: size,
                    checksum: None,
                    trigger: trigger_from_subdir(path),
                })
            }
        }
    }

    async fn manifest_for_snapshot(&self, path: &Path) -> Option<Manifest> {
        let basename = path.file_name()?.to_string_lossy().into_owned();
        let manifest_dir = self.config.backup_directory.join("manifests");
        let mut read_dir = tokio::fs::read_dir(&manifest_dir).await.ok()?;
        while let Ok(Some(entry)) = read_dir.next_entry().await {
            let candidate = entry.path();
            let Some(name) = candidate.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if name.ends_with(MANIFEST_SUFFIX) && name.contains(&basename) {
                let bytes = tokio::fs::read(&candidate).await.ok()?;
                if let Ok(manifest) = serde_json::from_slice::<Manifest>(&bytes) {
                    if manifest.backup.path == path {
                        return Some(manifest);
                    }
                }
            }
        }
        None
    }
}

struct PruneEntry {
    path: PathBuf,
    manifest_path: Option<PathBuf>,
    original_path: PathBuf,
    created_at: u64,
    size: u64,
}

fn manifest_path_for(root: &Path, manifest: &Manifest) -> Option<PathBuf> {
    let basename = manifest.backup.path.file_name()?.to_string_lossy().into_owned();
    let manifest_dir = root.join("manifests");
    Some(manifest_dir.join(format!("{}_{basename}{MANIFEST_SUFFIX}", manifest.created.replace(':', "-"))))
}

fn trigger_from_subdir(path: &Path) -> Trigger {
    let in_pre_edit = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n == "pre-edit")
        .unwrap_or(false);
    if in_pre_edit {
        Trigger::PreEdit
    } else {
        Trigger::Manual
    }
}

fn safety_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(RESTORE_SAFETY_SUFFIX);
    PathBuf::from(s)
}

async fn unique_backup_path(dir: &Path, created_at: u64, basename: &str, compression: Compression) -> PathBuf {
    let ts = format_for_filename(created_at);
    let ext = compression.extension();
    let mut candidate = dir.join(format!("{ts}_{basename}{ext}"));
    let mut suffix = 1;
    while tokio::fs::metadata(&candidate).await.is_ok() {
        candidate = dir.join(format!("{ts}-{suffix}_{basename}{ext}"));
        suffix += 1;
    }
    candidate
}

fn checksum_of(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    format!("sha256:{digest:x}")
}

fn compression_from_extension(path: &Path) -> Compression {
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => Compression::GZip,
        Some("lz4") => Compression::Lz4,
        Some("lzma") => Compression::Lzma,
        _ => Compression::None,
    }
}

fn compress(data: &[u8], compression: Compression) -> std::io::Result<Vec<u8>> {
    match compression {
        Compression::None => Ok(data.to_vec()),
        Compression::GZip => {
            let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
        Compression::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
        Compression::Lzma => {
            let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
            encoder.write_all(data)?;
            encoder.finish()
        }
    }
}

fn decompress(data: &[u8], compression: Compression) -> std::io::Result<Vec<u8>> {
    match compression {
        Compression::None => Ok(data.to_vec()),
        Compression::GZip => {
            let mut decoder = flate2::read::GzDecoder::new(data);
            let mut out = Vec::new();
            decoder.read_to_end(&mut out)?;
            Ok(out)
        }
        Compression::Lz4 => lz4_flex::decompress_size_prepended(data)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err)),
        Compression::Lzma => {
            let mut decoder = xz2::read::XzDecoder::new(data);
            let mut out = Vec::new();
            decoder.read_to_end(&mut out)?;
            Ok(out)
        }
    }
}

async fn ensure_dir(path: &Path) -> Result<()> {
    if tokio::fs::metadata(path).await.is_err() {
        tokio::fs::create_dir_all(path).await?;
    }
    Ok(())
}
