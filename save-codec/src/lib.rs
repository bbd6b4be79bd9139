//! Binary codec for Mount & Blade II: Bannerlord `.sav` files.
//!
//! This crate owns the wire format only: the Adler-32/ZLIB layer,
//! the outer frame, and the segment walker plus the entity-framing
//! primitives every segment codec is built on. It has no knowledge
//! of heroes, parties, or any other campaign entity — that belongs to
//! `save-model`, which decodes segment content using the primitives here.

mod adler32;
mod error;
mod frame;
mod segment;
mod zlib;

pub use adler32::adler32;
pub use error::{Error, Result, Warning};
pub use frame::{read_frame, write_frame, Frame, ModuleRecord, MAGIC, VERSION_RANGE};
pub use segment::{walk_segments, write_segment, EntityReader, EntityWriter, RawSegment};
pub use zlib::{deflate, inflate, CompressionLevel};
