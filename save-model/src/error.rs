//! Error types for the campaign object graph and its entity codecs.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A lower-layer framing/segment error surfaced from `save-codec`.
    #[error("codec error: {0}")]
    Codec(#[from] save_codec::Error),

    /// A known segment's content did not decode into the entity layout
    /// expected for its id. Under permissive mode the caller downgrades
    /// this to a skipped segment instead of propagating it.
    #[error("segment {0:#06x} failed to decode: {1}")]
    SegmentDecodeError(u16, String),

    /// The metadata block's bytes were not valid JSON.
    #[error("metadata block is not valid JSON: {0}")]
    InvalidMetadataJson(#[from] serde_json::Error),

    /// A field value set through the edit API fell outside its allowed
    /// range and was rejected rather than clamped.
    #[error("field {field} rejected value {value}: out of range {min}..={max}")]
    FieldOutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// The reference resolver found an entity id with no matching entity
    /// in the graph once all segments were loaded.
    #[error("dangling reference: {referrer:#06x} -> {target:#018x}")]
    DanglingReference { referrer: u16, target: u64 },

    /// Cooperative cancellation observed at a segment boundary.
    #[error("operation cancelled")]
    Cancelled,
}
