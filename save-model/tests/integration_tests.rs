//! Exercises `SaveFile` decode/encode against the full `save-codec` stack,
//! as the engine's loader and writer do. Hero bytes are hand-assembled in
//! the field order the decoder expects, the same way the codec crate's
//! own tests build segments field-by-field.

use save_codec::{deflate, inflate, write_frame, write_segment, CompressionLevel, EntityWriter, Frame};
use save_model::{Header, Metadata, SaveFile};

fn build_frame_bytes(payload: &[u8], metadata_json: &str) -> Vec<u8> {
    let compressed = deflate(payload, CompressionLevel::Optimal).unwrap();
    let frame = Frame {
        version: 7,
        game_version: "v1.3.10.12".to_string(),
        modules: vec![],
        metadata_json: metadata_json.to_string(),
        compressed_payload: compressed,
    };
    write_frame(&frame)
}

fn write_hero_bytes(w: &mut EntityWriter, id: u64, gold: i32) {
    w.write_entity_id(id);
    w.write_string("hero_player");
    w.write_string("Player");
    w.write_nullable_string(None);
    w.write_u8(0); // Gender::Male
    w.write_i32(28);
    w.write_i32(15);
    w.write_i32(5_000);
    w.write_i32(0);
    w.write_i32(3);
    w.write_i32(gold);
    w.write_f32(1.0);
    w.write_u8(0); // HeroState::Active
    for _ in 0..6 {
        w.write_i32(5); // attributes
    }
    for _ in 0..18 {
        w.write_i32(50); // skills
    }
    w.write_bool(false); // no naval block
    w.write_u32(0); // no perks
    w.write_bool(false); // no clan id
    w.write_bool(false); // no party id
    w.write_bool(false); // no fleet id
}

fn build_heroes_payload(gold: i32) -> Vec<u8> {
    let mut content = EntityWriter::new();
    content.write_u32(1);
    write_hero_bytes(&mut content, 0x0000_0001_0000_0001, gold);

    let mut payload = Vec::new();
    write_segment(&mut payload, 0x0010, &content.into_bytes());
    payload
}

fn decode(bytes: &[u8]) -> SaveFile {
    let frame = save_codec::read_frame(bytes).unwrap();
    let (payload, _) = inflate(&frame.compressed_payload, None).unwrap();
    let header = Header {
        version: frame.version,
        game_version: frame.game_version.clone(),
        compressed_size: frame.compressed_payload.len(),
        uncompressed_size: payload.len(),
    };
    let metadata = Metadata::from_json(&frame.metadata_json).unwrap();
    SaveFile::decode_payload(header, vec![], metadata, &payload, false).unwrap()
}

#[test]
fn s1_minimal_load_produces_an_empty_save_with_no_errors() {
    let bytes = build_frame_bytes(&[], "{}");
    let save = decode(&bytes);

    assert_eq!(save.header.version, 7);
    assert_eq!(save.header.game_version, "v1.3.10.12");
    assert!(save.heroes.is_empty());
    assert!(!save.is_dirty());
}

#[test]
fn s2_gold_edit_persists_through_a_full_save_and_reload() {
    let payload = build_heroes_payload(1_000);
    let bytes = build_frame_bytes(&payload, "{}");
    let mut save = decode(&bytes);
    assert_eq!(save.heroes[0].gold(), 1_000);

    save.heroes[0].set_gold(99_999).unwrap();
    assert!(save.heroes[0].is_dirty());

    let re_payload = save.encode_payload();
    let re_compressed = deflate(&re_payload, CompressionLevel::Optimal).unwrap();
    let re_frame = Frame {
        version: save.header.version,
        game_version: save.header.game_version.clone(),
        modules: vec![],
        metadata_json: save.metadata.to_json().unwrap(),
        compressed_payload: re_compressed,
    };
    let re_bytes = write_frame(&re_frame);

    let reloaded = decode(&re_bytes);
    assert_eq!(reloaded.heroes[0].gold(), 99_999);
}

#[test]
fn s3_unknown_segment_preserved_through_a_full_save_and_reload() {
    let mut payload = Vec::new();
    write_segment(&mut payload, 0xABCD, &[0xDE, 0xAD, 0xBE, 0xEF]);
    let bytes = build_frame_bytes(&payload, "{}");

    let save = decode(&bytes);
    assert_eq!(save.unknown_segments.len(), 1);
    assert_eq!(save.unknown_segments[0].id, 0xABCD);

    let re_payload = save.encode_payload();
    let re_compressed = deflate(&re_payload, CompressionLevel::Optimal).unwrap();
    let re_frame = Frame {
        version: save.header.version,
        game_version: save.header.game_version.clone(),
        modules: vec![],
        metadata_json: save.metadata.to_json().unwrap(),
        compressed_payload: re_compressed,
    };
    let re_bytes = write_frame(&re_frame);

    let reloaded = decode(&re_bytes);
    assert_eq!(reloaded.unknown_segments, save.unknown_segments);
}

#[test]
fn s6_corrupted_magic_byte_yields_no_partial_save_file() {
    let mut bytes = build_frame_bytes(&[], "{}");
    bytes[0] = 0x00;
    let err = save_codec::read_frame(&bytes).unwrap_err();
    assert!(matches!(err, save_codec::Error::MalformedFrame(_)));
}
