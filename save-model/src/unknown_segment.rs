//! Segments the decoder does not (or deliberately does not) interpret,
//! preserved verbatim so they are re-emitted byte-for-byte on save.

/// A segment recorded without field-level decoding: either its id is not
/// in the known-segment table, or it is a recognized-but-opaque id
/// (Quests/Workshops/Caravans) this engine does not schema-decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSegment {
    pub id: u16,
    pub bytes: Vec<u8>,
    pub original_offset: usize,
}
