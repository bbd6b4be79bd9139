//! ZLIB (RFC 1950) wrapping around raw deflate, with Adler-32 verification.
//!
//! `flate2`'s own `ZlibEncoder`/`ZlibDecoder` already speak this format, but
//! the engine needs to control the FLG level bits and treat a trailer
//! mismatch as a warning rather than an error on load, so this module
//! drives `flate2`'s raw deflate streams directly and builds the two-byte
//! header and four-byte trailer itself.

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use tracing::warn;

use crate::adler32::adler32;
use crate::error::{Error, Result, Warning};

const CM_DEFLATE: u8 = 8;

/// Requested compression effort for [`deflate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    NoCompression,
    Fastest,
    Optimal,
    SmallestSize,
}

impl CompressionLevel {
    fn to_flate2(self) -> Compression {
        match self {
            Self::NoCompression => Compression::none(),
            Self::Fastest => Compression::fast(),
            Self::Optimal => Compression::default(),
            Self::SmallestSize => Compression::best(),
        }
    }

    /// The two-bit FLEVEL field encoded into the ZLIB header's FLG byte.
    fn flevel_bits(self) -> u8 {
        match self {
            Self::NoCompression => 0,
            Self::Fastest => 1,
            Self::Optimal => 2,
            Self::SmallestSize => 3,
        }
    }
}

/// Decompresses a ZLIB-wrapped deflate stream.
///
/// Returns the decompressed bytes plus any non-fatal [`Warning`]s observed
/// (checksum mismatch, length mismatch against `expected_size`). A
/// [`Error::CorruptHeader`] or [`Error::DeflateStreamError`] is returned only
/// for failures that make the payload unrecoverable.
pub fn inflate(compressed: &[u8], expected_size: Option<usize>) -> Result<(Vec<u8>, Vec<Warning>)> {
    let mut warnings = Vec::new();

    if compressed.is_empty() {
        warnings.push(Warning::EmptyInput);
        return Ok((Vec::new(), warnings));
    }

    if compressed.len() < 6 {
        return Err(Error::CorruptHeader(format!(
            "stream of {} bytes is too short for a zlib header and trailer",
            compressed.len()
        )));
    }

    let cmf = compressed[0];
    let flg = compressed[1];
    if (u16::from(cmf) * 256 + u16::from(flg)) % 31 != 0 {
        return Err(Error::CorruptHeader(format!(
            "header check failed: cmf={cmf:#04x} flg={flg:#04x}"
        )));
    }
    let cm = cmf & 0x0F;
    if cm != CM_DEFLATE {
        return Err(Error::CorruptHeader(format!(
            "unsupported compression method {cm} (expected deflate=8)"
        )));
    }

    let deflate_body = &compressed[2..compressed.len() - 4];
    let stored_adler = u32::from_be_bytes([
        compressed[compressed.len() - 4],
        compressed[compressed.len() - 3],
        compressed[compressed.len() - 2],
        compressed[compressed.len() - 1],
    ]);

    let mut decoder = DeflateDecoder::new(deflate_body);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::DeflateStreamError(e.to_string()))?;

    let computed_adler = adler32(&decompressed);
    if computed_adler != stored_adler {
        warn!(
            expected = stored_adler,
            actual = computed_adler,
            "zlib adler-32 trailer mismatch (treated as warning)"
        );
        warnings.push(Warning::ChecksumMismatch {
            expected: stored_adler,
            actual: computed_adler,
        });
    }

    if let Some(expected) = expected_size {
        if expected != decompressed.len() {
            warn!(
                expected,
                actual = decompressed.len(),
                "decompressed size does not match announced size"
            );
            warnings.push(Warning::LengthMismatch {
                expected,
                actual: decompressed.len(),
            });
        }
    }

    Ok((decompressed, warnings))
}

/// Compresses `data` into a ZLIB-wrapped deflate stream at `level`.
///
/// The emitted header always satisfies `(CMF*256+FLG) mod 31 == 0`, and the
/// trailer is always a correct Adler-32 over `data`, regardless of the
/// mismatch-tolerant behavior of [`inflate`] on load.
pub fn deflate(data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    let cmf: u8 = 0x78; // CM=8 (deflate), CINFO=7 (32K window) — standard zlib default.
    let flevel = level.flevel_bits();
    let mut flg = flevel << 6;
    let remainder = (u16::from(cmf) * 256 + u16::from(flg)) % 31;
    if remainder != 0 {
        flg += (31 - remainder) as u8;
    }

    let mut encoder = DeflateEncoder::new(Vec::new(), level.to_flate2());
    encoder.write_all(data).map_err(Error::Io)?;
    let deflated = encoder.finish().map_err(Error::Io)?;

    let mut out = Vec::with_capacity(deflated.len() + 6);
    out.push(cmf);
    out.push(flg);
    out.extend_from_slice(&deflated);
    out.extend_from_slice(&adler32(data).to_be_bytes());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_bytes() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let compressed = deflate(&data, CompressionLevel::Optimal).unwrap();
        let (decompressed, warnings) = inflate(&compressed, Some(data.len())).unwrap();
        assert_eq!(decompressed, data);
        assert!(warnings.is_empty());
    }

    #[test]
    fn emitted_header_satisfies_check_for_every_level() {
        for level in [
            CompressionLevel::NoCompression,
            CompressionLevel::Fastest,
            CompressionLevel::Optimal,
            CompressionLevel::SmallestSize,
        ] {
            let compressed = deflate(b"hello, bannerlord", level).unwrap();
            let cmf = compressed[0];
            let flg = compressed[1];
            assert_eq!((u16::from(cmf) * 256 + u16::from(flg)) % 31, 0);
            assert_eq!(cmf & 0x0F, CM_DEFLATE);
        }
    }

    #[test]
    fn empty_input_warns_but_does_not_error() {
        let (data, warnings) = inflate(&[], None).unwrap();
        assert!(data.is_empty());
        assert_eq!(warnings, vec![Warning::EmptyInput]);
    }

    #[test]
    fn corrupt_header_is_fatal() {
        let err = inflate(&[0x00, 0x00, 0, 0, 0, 0], None).unwrap_err();
        assert!(matches!(err, Error::CorruptHeader(_)));
    }

    #[test]
    fn checksum_mismatch_is_a_warning_not_an_error() {
        let mut compressed = deflate(b"payload", CompressionLevel::Optimal).unwrap();
        let last = compressed.len() - 1;
        compressed[last] ^= 0xFF;
        let (decompressed, warnings) = inflate(&compressed, None).unwrap();
        assert_eq!(decompressed, b"payload");
        assert!(matches!(
            warnings[0],
            Warning::ChecksumMismatch { .. }
        ));
    }
}
