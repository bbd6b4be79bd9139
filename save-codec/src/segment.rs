//! Segment walker and entity-framing primitives.
//!
//! The decompressed payload is a flat sequence of `(id: u16, length: u32,
//! content: [u8; length])` segments. This module only knows how to walk
//! that envelope and read/write the scalar primitives every entity codec
//! is built from (strings, nullable strings, nullable/plain entity ids);
//! it has no knowledge of which segment ids are "known" — that dispatch
//! table lives in `save-model`.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read};

use crate::error::{Error, Result};

/// A single `(id, content)` pair read off the payload, plus the byte offset
/// (from the start of the payload) its header began at. The offset is kept
/// so unknown segments can be reported with provenance if ever needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSegment {
    pub id: u16,
    pub offset: usize,
    pub content: Vec<u8>,
}

/// Walks `payload` into its constituent segments.
///
/// Stops once fewer than six bytes remain (not enough for another header),
/// matching production saves that pad the final segment's trailing bytes.
pub fn walk_segments(payload: &[u8]) -> Result<Vec<RawSegment>> {
    let mut segments = Vec::new();
    let mut cursor = Cursor::new(payload);

    while (payload.len() as u64 - cursor.position()) >= 6 {
        let offset = cursor.position() as usize;
        let id = cursor
            .read_u16::<LittleEndian>()
            .map_err(|e| Error::MalformedFrame(e.to_string()))?;
        let len = cursor
            .read_u32::<LittleEndian>()
            .map_err(|e| Error::MalformedFrame(e.to_string()))? as usize;

        let remaining = payload.len() as u64 - cursor.position();
        if len as u64 > remaining {
            return Err(Error::TruncatedSegment {
                segment_id: id,
                expected: len,
                actual: remaining as usize,
            });
        }

        let start = cursor.position() as usize;
        let content = payload[start..start + len].to_vec();
        cursor.set_position((start + len) as u64);

        segments.push(RawSegment {
            id,
            offset,
            content,
        });
    }

    Ok(segments)
}

/// Appends one segment (`id` + `content`) to `out`, with the four-byte
/// length backfilled after the content is written.
pub fn write_segment(out: &mut Vec<u8>, id: u16, content: &[u8]) {
    out.write_u16::<LittleEndian>(id)
        .expect("writing to a Vec<u8> cannot fail");
    let len_pos = out.len();
    out.extend_from_slice(&[0u8; 4]);
    let content_start = out.len();
    out.extend_from_slice(content);
    let written = (out.len() - content_start) as u32;
    out[len_pos..len_pos + 4].copy_from_slice(&written.to_le_bytes());
}

/// Cursor-based reader for entity field primitives within a single
/// segment's content. Bounds violations are reported as
/// [`Error::TruncatedSegment`] tagged with `segment_id` for diagnostics.
pub struct EntityReader<'a> {
    cursor: Cursor<&'a [u8]>,
    segment_id: u16,
    total_len: usize,
}

impl<'a> EntityReader<'a> {
    pub fn new(segment_id: u16, content: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(content),
            segment_id,
            total_len: content.len(),
        }
    }

    fn remaining(&self) -> usize {
        self.total_len - self.cursor.position() as usize
    }

    fn truncated(&self, expected: usize) -> Error {
        Error::TruncatedSegment {
            segment_id: self.segment_id,
            expected,
            actual: self.remaining(),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.cursor.read_u8().map_err(|_| self.truncated(1))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.cursor
            .read_i32::<LittleEndian>()
            .map_err(|_| self.truncated(4))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| self.truncated(4))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.cursor
            .read_u64::<LittleEndian>()
            .map_err(|_| self.truncated(8))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.cursor
            .read_i64::<LittleEndian>()
            .map_err(|_| self.truncated(8))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.cursor
            .read_f32::<LittleEndian>()
            .map_err(|_| self.truncated(4))
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        if n > self.remaining() {
            return Err(self.truncated(n));
        }
        let mut buf = vec![0u8; n];
        self.cursor
            .read_exact(&mut buf)
            .map_err(|_| self.truncated(n))?;
        Ok(buf)
    }

    /// String primitive: `i32` length + UTF-8 bytes (length 0 is empty).
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(self.truncated(0));
        }
        let bytes = self.read_bytes(len as usize)?;
        String::from_utf8(bytes).map_err(|_| self.truncated(len as usize))
    }

    /// Nullable string primitive: one-byte present flag + string if set.
    pub fn read_nullable_string(&mut self) -> Result<Option<String>> {
        if self.read_bool()? {
            Ok(Some(self.read_string()?))
        } else {
            Ok(None)
        }
    }

    /// Entity id primitive: a plain `u64`.
    pub fn read_entity_id(&mut self) -> Result<u64> {
        self.read_u64()
    }

    /// Nullable entity id primitive: one-byte present flag + `u64` if set.
    pub fn read_nullable_entity_id(&mut self) -> Result<Option<u64>> {
        if self.read_bool()? {
            Ok(Some(self.read_entity_id()?))
        } else {
            Ok(None)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

/// Buffer-based writer mirroring [`EntityReader`]'s primitives.
#[derive(Default)]
pub struct EntityWriter {
    buf: Vec<u8>,
}

impl EntityWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf
            .write_i32::<LittleEndian>(v)
            .expect("writing to a Vec<u8> cannot fail");
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf
            .write_u32::<LittleEndian>(v)
            .expect("writing to a Vec<u8> cannot fail");
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf
            .write_u64::<LittleEndian>(v)
            .expect("writing to a Vec<u8> cannot fail");
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf
            .write_i64::<LittleEndian>(v)
            .expect("writing to a Vec<u8> cannot fail");
    }

    pub fn write_f32(&mut self, v: f32) {
        self.buf
            .write_f32::<LittleEndian>(v)
            .expect("writing to a Vec<u8> cannot fail");
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_string(&mut self, s: &str) {
        self.write_i32(s.len() as i32);
        self.write_bytes(s.as_bytes());
    }

    pub fn write_nullable_string(&mut self, s: Option<&str>) {
        match s {
            Some(s) => {
                self.write_bool(true);
                self.write_string(s);
            }
            None => self.write_bool(false),
        }
    }

    pub fn write_entity_id(&mut self, id: u64) {
        self.write_u64(id);
    }

    pub fn write_nullable_entity_id(&mut self, id: Option<u64>) {
        match id {
            Some(id) => {
                self.write_bool(true);
                self.write_entity_id(id);
            }
            None => self.write_bool(false),
        }
    }
}
