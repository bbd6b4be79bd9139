//! The top-level load/save facade tying the codec, model, and backup
//! engine together behind [`SaveEngineConfig`].

use std::path::Path;

use save_codec::{inflate, read_frame};
use save_model::{Header, Metadata, ModuleRecord, SaveFile};
use save_backup::{BackupEngine, SaveSummary, Trigger};
use tracing::warn;

use crate::cancellation::CancellationToken;
use crate::config::SaveEngineConfig;
use crate::error::{Error, Result};
use crate::validation::{validate, ValidationReport};

/// Owns engine configuration and, optionally, a backup engine used for the
/// `save.create_backup` option.
pub struct SaveEngine {
    config: SaveEngineConfig,
    backup: Option<BackupEngine>,
}

impl SaveEngine {
    pub fn new(config: SaveEngineConfig, backup: Option<BackupEngine>) -> Self {
        Self { config, backup }
    }

    pub fn config(&self) -> &SaveEngineConfig {
        &self.config
    }

    /// Loads and decodes `path`, returning the `SaveFile` plus a validation
    /// report unless `load.skip_validation` is set.
    pub async fn load(
        &self,
        path: &Path,
        cancellation: &CancellationToken,
    ) -> Result<(SaveFile, Option<ValidationReport>)> {
        cancellation.check()?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
                _ => Error::Io(err),
            })?;
        let frame = read_frame(&bytes)?;

        cancellation.check()?;

        let modules: Vec<ModuleRecord> = frame
            .modules
            .into_iter()
            .map(|m| ModuleRecord {
                id: m.id,
                version: m.version,
                official: m.official,
            })
            .collect();
        let metadata = Metadata::from_json(&frame.metadata_json)?;

        let payload = if self.config.load.metadata_only {
            Vec::new()
        } else {
            let (decompressed, warnings) = inflate(&frame.compressed_payload, None)?;
            for warning in warnings {
                warn!(?warning, "non-fatal warning decoding save payload");
            }
            decompressed
        };

        cancellation.check()?;

        let header = Header {
            version: frame.version,
            game_version: frame.game_version,
            compressed_size: frame.compressed_payload.len(),
            uncompressed_size: payload.len(),
        };

        let mut save = SaveFile::decode_payload(header, modules, metadata, &payload, self.config.load.permissive)?;
        if self.config.load.keep_raw_data && !self.config.load.metadata_only {
            save.raw_payload = Some(payload);
        }

        let report = if self.config.load.skip_validation {
            None
        } else {
            Some(validate(&save))
        };

        Ok((save, report))
    }

    /// Validates (if configured), optionally snapshots the existing file,
    /// then atomically writes `save` to `path`.
    pub async fn save(
        &self,
        path: &Path,
        save: &mut SaveFile,
        cancellation: &CancellationToken,
    ) -> Result<Option<ValidationReport>> {
        cancellation.check()?;

        let report = if self.config.save.validate_before_save {
            let report = validate(save);
            if !report.errors.is_empty() {
                return Err(Error::ValidationFailed(report.errors.len()));
            }
            Some(report)
        } else {
            None
        };

        if self.config.save.create_backup {
            if let Some(backup) = &self.backup {
                if tokio::fs::metadata(path).await.is_ok() {
                    let summary = SaveSummary {
                        character: save.metadata.character_name.clone(),
                        level: save.metadata.main_hero_level,
                        day: save.metadata.day_long,
                        game_version: save.header.game_version.clone(),
                        modules: save.modules.iter().map(|m| m.id.clone()).collect(),
                    };
                    backup
                        .create_snapshot(path, Trigger::PreEdit, summary, &save_backup::CancellationToken::new())
                        .await?;
                }
            }
        }

        cancellation.check()?;

        crate::atomic_writer::write_atomic(
            path,
            save,
            self.config.save.compression_level,
            self.config.save.verify_after_save,
            cancellation,
        )
        .await?;

        save.clear_dirty();

        Ok(report)
    }
}
