//! Atomic writer: temp-file write, integrity verification, and a
//! backup-swap-rename sequence that leaves `path` holding either the prior
//! contents or the new ones at every instant, with rollback on failure.

use std::path::{Path, PathBuf};

use save_codec::{deflate, read_frame, write_frame, CompressionLevel, Frame};
use save_model::SaveFile;
use tracing::{error, warn};

use crate::cancellation::CancellationToken;
use crate::error::{Error, Result};

/// Serializes `save`, deflates it at `level`, and atomically installs the
/// result at `path`.
///
/// Steps, matching the procedure the backup engine's restore path also
/// follows for its own safety copy:
/// 1. Serialize the payload and deflate it.
/// 2. Write `path.tmp`.
/// 3. Re-open the temp file and verify its integrity.
/// 4. Move any existing `path` to `path.bak`.
/// 5. Move the temp file to `path`.
/// 6. Delete `path.bak`.
///
/// Any failure during steps 4-6 restores `.bak` back to `path`, deletes the
/// temp file, and surfaces the original error.
pub async fn write_atomic(
    path: &Path,
    save: &SaveFile,
    level: CompressionLevel,
    verify_after_save: bool,
    cancellation: &CancellationToken,
) -> Result<()> {
    cancellation.check()?;

    let payload = save.encode_payload();
    let compressed = deflate(&payload, level)?;
    let frame = Frame {
        version: save.header.version,
        game_version: save.header.game_version.clone(),
        modules: save
            .modules
            .iter()
            .map(|m| save_codec::ModuleRecord {
                id: m.id.clone(),
                version: m.version.clone(),
                official: m.official,
            })
            .collect(),
        metadata_json: save.metadata.to_json()?,
        compressed_payload: compressed,
    };
    let bytes = write_frame(&frame);

    cancellation.check()?;
    let tmp_path = temp_path(path);
    tokio::fs::write(&tmp_path, &bytes).await?;

    if verify_after_save {
        if let Err(err) = verify_integrity(&tmp_path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(Error::SaveWriteError(err.to_string()));
        }
    }

    cancellation.check()?;

    let bak_path = backup_path(path);
    let had_previous = tokio::fs::metadata(path).await.is_ok();
    if had_previous {
        if let Err(err) = tokio::fs::rename(path, &bak_path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(Error::Io(err));
        }
    }

    match tokio::fs::rename(&tmp_path, path).await {
        Ok(()) => {
            if had_previous {
                let _ = tokio::fs::remove_file(&bak_path).await;
            }
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "atomic rename into place failed, rolling back");
            if had_previous {
                if let Err(restore_err) = tokio::fs::rename(&bak_path, path).await {
                    warn!(error = %restore_err, "failed to restore backup after a failed atomic swap");
                }
            }
            let _ = tokio::fs::remove_file(&tmp_path).await;
            Err(Error::Io(err))
        }
    }
}

/// Re-opens a written frame and checks magic, version range, game-version
/// string length, and ZLIB header validity without decompressing the full
/// payload.
async fn verify_integrity(path: &Path) -> Result<()> {
    let bytes = tokio::fs::read(path).await?;
    let frame = read_frame(&bytes)?;

    if !(1..=100).contains(&frame.game_version.len()) {
        return Err(Error::SaveWriteError(format!(
            "game-version string length {} outside [1, 100]",
            frame.game_version.len()
        )));
    }

    if frame.compressed_payload.len() >= 2 {
        let cmf = frame.compressed_payload[0];
        let flg = frame.compressed_payload[1];
        if (u16::from(cmf) * 256 + u16::from(flg)) % 31 != 0 {
            return Err(Error::SaveWriteError(
                "zlib header check failed on written payload".to_string(),
            ));
        }
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".bak");
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use save_model::{Header, Metadata};
    use tempfile::tempdir;

    fn empty_save() -> SaveFile {
        let header = Header {
            version: 7,
            game_version: "v1.3.10.12".to_string(),
            compressed_size: 0,
            uncompressed_size: 0,
        };
        SaveFile::decode_payload(header, vec![], Metadata::default(), &[], false).unwrap()
    }

    #[tokio::test]
    async fn writes_a_verifiable_file_and_cleans_up_temp_artifacts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("campaign.sav");
        let save = empty_save();
        let token = CancellationToken::new();

        write_atomic(&path, &save, CompressionLevel::Optimal, true, &token)
            .await
            .unwrap();

        assert!(path.exists());
        assert!(!temp_path(&path).exists());
        assert!(!backup_path(&path).exists());
    }

    #[tokio::test]
    async fn overwriting_an_existing_file_leaves_no_backup_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("campaign.sav");
        let save = empty_save();
        let token = CancellationToken::new();

        write_atomic(&path, &save, CompressionLevel::Optimal, true, &token)
            .await
            .unwrap();
        write_atomic(&path, &save, CompressionLevel::Optimal, true, &token)
            .await
            .unwrap();

        assert!(path.exists());
        assert!(!backup_path(&path).exists());
    }

    #[tokio::test]
    async fn cancellation_before_write_yields_cancelled_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("campaign.sav");
        let save = empty_save();
        let token = CancellationToken::new();
        token.cancel();

        let err = write_atomic(&path, &save, CompressionLevel::Optimal, true, &token)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert!(!path.exists());
    }
}
