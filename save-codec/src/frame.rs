//! Outer frame reader/writer.
//!
//! Layout, in order, all integers little-endian:
//! magic(4) | version(i32) | game_version(string) | module_count(i32) |
//! modules[(id: string, version: string, official: u8)] |
//! metadata_len(i32) + metadata(utf8 json) |
//! payload_len(i32) + payload(zlib bytes)

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read};

use crate::error::{Error, Result};

/// The fixed four-byte tag every `.sav` file begins with.
pub const MAGIC: [u8; 4] = *b"TWSV";

/// Valid range for the frame's version field after decode.
pub const VERSION_RANGE: std::ops::RangeInclusive<i32> = 1..=20;

/// A single entry in the frame's module list. Order is significant — it
/// reflects the mod load order active when the save was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub id: String,
    pub version: String,
    pub official: bool,
}

/// The fully parsed outer frame: everything outside the compressed payload,
/// plus the payload bytes themselves (still ZLIB-wrapped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub version: i32,
    pub game_version: String,
    pub modules: Vec<ModuleRecord>,
    /// Raw UTF-8 JSON text of the metadata block, unparsed. `save-model`
    /// owns interpreting this into a `Metadata` struct.
    pub metadata_json: String,
    pub compressed_payload: Vec<u8>,
}

struct FrameReader<'a> {
    cursor: Cursor<&'a [u8]>,
    total_len: usize,
}

impl<'a> FrameReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
            total_len: bytes.len(),
        }
    }

    fn remaining(&self) -> usize {
        self.total_len - self.cursor.position() as usize
    }

    fn read_exact_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        if n > self.remaining() {
            return Err(Error::MalformedFrame(format!(
                "expected {n} bytes but only {} remain",
                self.remaining()
            )));
        }
        let mut buf = vec![0u8; n];
        self.cursor
            .read_exact(&mut buf)
            .map_err(|e| Error::MalformedFrame(e.to_string()))?;
        Ok(buf)
    }

    fn read_i32(&mut self) -> Result<i32> {
        self.cursor
            .read_i32::<LittleEndian>()
            .map_err(|e| Error::MalformedFrame(e.to_string()))
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.cursor
            .read_u8()
            .map_err(|e| Error::MalformedFrame(e.to_string()))
    }

    /// Length-prefixed UTF-8 string, used here for
    /// every outer-frame string field too).
    fn read_length_prefixed_string(&mut self) -> Result<String> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(Error::MalformedFrame(format!(
                "negative string length prefix: {len}"
            )));
        }
        let bytes = self.read_exact_bytes(len as usize)?;
        String::from_utf8(bytes).map_err(|e| Error::MalformedFrame(e.to_string()))
    }

    fn read_length_prefixed_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(Error::MalformedFrame(format!(
                "negative length prefix: {len}"
            )));
        }
        self.read_exact_bytes(len as usize)
    }
}

/// Parses the outer frame from a complete `.sav` file's bytes.
///
/// Returns [`Error::MalformedFrame`] on the first bad magic tag, version
/// out of range, or length prefix that is negative or exceeds the
/// remaining bytes in the file.
pub fn read_frame(bytes: &[u8]) -> Result<Frame> {
    let mut r = FrameReader::new(bytes);

    let magic = r.read_exact_bytes(4)?;
    if magic != MAGIC {
        return Err(Error::MalformedFrame(format!(
            "bad magic tag: {magic:02x?}"
        )));
    }

    let version = r.read_i32()?;
    if !VERSION_RANGE.contains(&version) {
        return Err(Error::MalformedFrame(format!(
            "version {version} outside supported range {VERSION_RANGE:?}"
        )));
    }

    let game_version = r.read_length_prefixed_string()?;

    let module_count = r.read_i32()?;
    if module_count < 0 {
        return Err(Error::MalformedFrame(format!(
            "negative module count: {module_count}"
        )));
    }
    let mut modules = Vec::with_capacity(module_count as usize);
    for _ in 0..module_count {
        let id = r.read_length_prefixed_string()?;
        let version = r.read_length_prefixed_string()?;
        let official = r.read_u8()? != 0;
        modules.push(ModuleRecord {
            id,
            version,
            official,
        });
    }

    let metadata_bytes = r.read_length_prefixed_bytes()?;
    let metadata_json =
        String::from_utf8(metadata_bytes).map_err(|e| Error::MalformedFrame(e.to_string()))?;

    let compressed_payload = r.read_length_prefixed_bytes()?;

    Ok(Frame {
        version,
        game_version,
        modules,
        metadata_json,
        compressed_payload,
    })
}

/// Serializes `frame` back into the outer-frame byte layout. Appends no trailing
/// bytes beyond the compressed payload.
pub fn write_frame(frame: &Frame) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC);
    out.write_i32::<LittleEndian>(frame.version)
        .expect("writing to a Vec<u8> cannot fail");
    write_length_prefixed_string(&mut out, &frame.game_version);

    out.write_i32::<LittleEndian>(frame.modules.len() as i32)
        .expect("writing to a Vec<u8> cannot fail");
    for module in &frame.modules {
        write_length_prefixed_string(&mut out, &module.id);
        write_length_prefixed_string(&mut out, &module.version);
        out.push(u8::from(module.official));
    }

    write_length_prefixed_bytes(&mut out, frame.metadata_json.as_bytes());
    write_length_prefixed_bytes(&mut out, &frame.compressed_payload);

    out
}

fn write_length_prefixed_string(out: &mut Vec<u8>, s: &str) {
    write_length_prefixed_bytes(out, s.as_bytes());
}

fn write_length_prefixed_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.write_i32::<LittleEndian>(bytes.len() as i32)
        .expect("writing to a Vec<u8> cannot fail");
    out.extend_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> Frame {
        Frame {
            version: 7,
            game_version: "v1.3.10.12".to_string(),
            modules: vec![ModuleRecord {
                id: "Native".to_string(),
                version: "e1.3.10".to_string(),
                official: true,
            }],
            metadata_json: "{}".to_string(),
            compressed_payload: vec![0x78, 0x01, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01],
        }
    }

    #[test]
    fn roundtrips_through_write_and_read() {
        let frame = sample_frame();
        let bytes = write_frame(&frame);
        let parsed = read_frame(&bytes).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = write_frame(&sample_frame());
        bytes[0] = 0x00;
        let err = read_frame(&bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedFrame(_)));
    }

    #[test]
    fn rejects_version_out_of_range() {
        let mut frame = sample_frame();
        frame.version = 99;
        let bytes = write_frame(&frame);
        let err = read_frame(&bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedFrame(_)));
    }

    #[test]
    fn rejects_length_prefix_exceeding_remaining_bytes() {
        let frame = sample_frame();
        let mut bytes = write_frame(&frame);
        // Corrupt the game-version length prefix to claim more bytes than exist.
        bytes[4..8].copy_from_slice(&500_000i32.to_le_bytes());
        let err = read_frame(&bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedFrame(_)));
    }

    #[test]
    fn minimal_frame_matches_s1_scenario_layout() {
        // S1: version=7, game_version="v1.3.10.12", no modules, empty metadata `{}`.
        let frame = Frame {
            version: 7,
            game_version: "v1.3.10.12".to_string(),
            modules: vec![],
            metadata_json: "{}".to_string(),
            compressed_payload: vec![0x78, 0x01, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01],
        };
        let bytes = write_frame(&frame);
        assert_eq!(&bytes[0..4], b"TWSV");
        assert_eq!(&bytes[4..8], &7i32.to_le_bytes());
        let parsed = read_frame(&bytes).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn empty_modules_and_metadata_roundtrip() {
        let frame = Frame {
            version: 1,
            game_version: String::new(),
            modules: vec![],
            metadata_json: String::new(),
            compressed_payload: vec![],
        };
        let bytes = write_frame(&frame);
        let parsed = read_frame(&bytes).unwrap();
        assert_eq!(parsed, frame);
    }
}
