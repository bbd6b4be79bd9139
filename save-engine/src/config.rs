//! Engine configuration for load and save operations.

use save_codec::CompressionLevel;

/// Options controlling how a save file is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Skip segments that fail to decode instead of failing the whole load.
    pub permissive: bool,
    /// Stop after the frame and metadata block; do not decompress or walk
    /// the payload. `SaveFile::heroes` and friends are left empty.
    pub metadata_only: bool,
    /// Do not run the validation reporter after decode.
    pub skip_validation: bool,
    /// Retain the decompressed payload buffer on the returned `SaveFile`.
    pub keep_raw_data: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            permissive: false,
            metadata_only: false,
            skip_validation: false,
            keep_raw_data: false,
        }
    }
}

/// Options controlling how a save file is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Call the backup engine with `Trigger::PreEdit` before writing.
    pub create_backup: bool,
    /// Refuse to write if validation reports any error-severity finding.
    pub validate_before_save: bool,
    /// Compression effort used when deflating the payload.
    pub compression_level: CompressionLevel,
    /// Run integrity verification on the written temp file.
    pub verify_after_save: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            create_backup: false,
            validate_before_save: false,
            compression_level: CompressionLevel::Optimal,
            verify_after_save: true,
        }
    }
}

/// Top-level engine configuration, combining load and save options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveEngineConfig {
    pub load: LoadOptions,
    pub save: SaveOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_behavior() {
        let config = SaveEngineConfig::default();
        assert!(!config.load.permissive);
        assert!(!config.load.metadata_only);
        assert!(config.save.verify_after_save);
        assert_eq!(config.save.compression_level, CompressionLevel::Optimal);
    }
}
