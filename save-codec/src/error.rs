//! Error types for frame parsing, ZLIB decoding, and segment walking

use thiserror::Error;

/// Result type for save-codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// save-codec error types
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Outer frame did not start with the `TWSV` magic tag, or a length
    /// prefix was negative or exceeded the remaining bytes in the file.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// The two-byte ZLIB header failed the `(CMF*256+FLG) mod 31 == 0`
    /// check, or the compression method in CMF was not 8 (deflate).
    #[error("corrupt zlib header: {0}")]
    CorruptHeader(String),

    /// The deflate bitstream itself could not be decoded.
    #[error("deflate stream error: {0}")]
    DeflateStreamError(String),

    /// A segment's content ran past its declared length.
    #[error("segment {segment_id:#06x} truncated: expected {expected} bytes, got {actual}")]
    TruncatedSegment {
        segment_id: u16,
        expected: usize,
        actual: usize,
    },

    /// A known segment's content failed to decode in strict mode.
    #[error("segment {0:#06x} failed to decode")]
    SegmentDecodeError(u16),

    /// Cooperative cancellation observed at an I/O step or segment boundary.
    #[error("operation cancelled")]
    Cancelled,
}

/// Non-fatal findings surfaced by the codec that callers may want to log
/// or fold into a [`crate::ValidationReport`]-shaped structure upstream.
///
/// These never cause [`Error`] to be returned; `inflate` and the frame
/// reader return them out of band alongside the successfully decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The trailing Adler-32 in a ZLIB stream did not match the recomputed
    /// checksum over the decompressed bytes. Some production saves ship
    /// incorrect trailers; this is logged, not fatal.
    ChecksumMismatch { expected: u32, actual: u32 },

    /// The decompressed size did not match the size announced by the
    /// caller (when one was given).
    LengthMismatch { expected: usize, actual: usize },

    /// `inflate` was called with zero compressed bytes.
    EmptyInput,
}
