//! Exercises `SaveEngine::load`'s validation pass against hand-assembled
//! frames, the same way `save-model`'s integration tests hand-assemble
//! segment bytes rather than relying only on the in-module empty-save
//! fixtures. Several of these checks only fire on decoded data (attribute
//! clamping, wounded-vs-count) that the edit API would otherwise reject or
//! clamp before it could ever reach the reporter, so the only way to
//! exercise them is through a real decode.

use save_codec::{deflate, write_frame, write_segment, CompressionLevel, EntityWriter, Frame};
use save_engine::{CancellationToken, SaveEngine, SaveEngineConfig, Severity};
use tempfile::tempdir;

struct HeroFields {
    id: u64,
    gold: i32,
    attribute: i32,
    skill: i32,
    clan_id: Option<u64>,
}

impl Default for HeroFields {
    fn default() -> Self {
        Self {
            id: 0x0000_0001_0000_0001,
            gold: 1_000,
            attribute: 5,
            skill: 50,
            clan_id: None,
        }
    }
}

fn write_hero(w: &mut EntityWriter, fields: &HeroFields) {
    w.write_entity_id(fields.id);
    w.write_string("hero_player");
    w.write_string("Player");
    w.write_nullable_string(None);
    w.write_u8(0); // Gender::Male
    w.write_i32(28);
    w.write_i32(15);
    w.write_i32(5_000);
    w.write_i32(0);
    w.write_i32(3);
    w.write_i32(fields.gold);
    w.write_f32(1.0); // health
    w.write_u8(0); // HeroState::Active
    for _ in 0..6 {
        w.write_i32(fields.attribute);
    }
    for _ in 0..18 {
        w.write_i32(fields.skill);
    }
    w.write_bool(false); // no naval block
    w.write_u32(0); // no perks
    w.write_nullable_entity_id(fields.clan_id);
    w.write_bool(false); // no party id
    w.write_bool(false); // no fleet id
}

fn build_heroes_frame(heroes: &[HeroFields]) -> Vec<u8> {
    let mut content = EntityWriter::new();
    content.write_u32(heroes.len() as u32);
    for fields in heroes {
        write_hero(&mut content, fields);
    }

    let mut payload = Vec::new();
    write_segment(&mut payload, 0x0010, &content.into_bytes());
    build_frame_bytes(&payload)
}

fn write_troop_stack(w: &mut EntityWriter, count: u32, wounded: u32) {
    w.write_string("imperial_recruit");
    w.write_string("Imperial Recruit");
    w.write_u32(count);
    w.write_u32(wounded);
    w.write_i32(1);
    w.write_bool(false);
    w.write_nullable_entity_id(None);
}

fn build_party_with_overwounded_troop_frame() -> Vec<u8> {
    let mut content = EntityWriter::new();
    content.write_u32(1); // one party
    content.write_entity_id(0x0000_0002_0000_0001);
    content.write_u8(0); // PartyType::Lord
    content.write_u8(0); // PartyState::Idle
    content.write_i32(500); // gold
    content.write_f32(100.0); // food
    content.write_f32(80.0); // morale
    content.write_i32(60); // size_limit
    content.write_i32(10); // prisoner_limit
    content.write_f32(0.0); // position.x
    content.write_f32(0.0); // position.y
    content.write_nullable_entity_id(None); // leader_id
    content.write_nullable_entity_id(None); // clan_id
    content.write_nullable_entity_id(None); // settlement_id
    content.write_u32(1); // one troop stack
    write_troop_stack(&mut content, 10, 999); // wounded far exceeds count
    content.write_u32(0); // no prisoners

    let mut payload = Vec::new();
    write_segment(&mut payload, 0x0020, &content.into_bytes());
    build_frame_bytes(&payload)
}

fn build_frame_bytes(payload: &[u8]) -> Vec<u8> {
    let compressed = deflate(payload, CompressionLevel::Optimal).unwrap();
    let frame = Frame {
        version: 7,
        game_version: "v1.3.10.12".to_string(),
        modules: vec![],
        metadata_json: "{}".to_string(),
        compressed_payload: compressed,
    };
    write_frame(&frame)
}

async fn load(bytes: Vec<u8>) -> (save_model::SaveFile, save_engine::ValidationReport) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("campaign.sav");
    tokio::fs::write(&path, bytes).await.unwrap();

    let engine = SaveEngine::new(SaveEngineConfig::default(), None);
    let token = CancellationToken::new();
    let (save, report) = engine.load(&path, &token).await.unwrap();
    (save, report.expect("validation runs by default"))
}

#[tokio::test]
async fn load_reports_a_dangling_clan_reference_as_a_warning() {
    let hero = HeroFields {
        clan_id: Some(0x0000_0004_dead_beef),
        ..HeroFields::default()
    };
    let (save, report) = load(build_heroes_frame(&[hero])).await;
    assert_eq!(save.heroes.len(), 1);
    assert!(report
        .warnings
        .iter()
        .any(|f| f.severity == Severity::Warning && f.description.contains("dangling reference")));
}

#[tokio::test]
async fn load_reports_an_out_of_range_attribute_and_skill() {
    let hero = HeroFields {
        attribute: 99,
        skill: 9_999,
        ..HeroFields::default()
    };
    let (_, report) = load(build_heroes_frame(&[hero])).await;
    assert!(report.errors.iter().any(|f| f.description.contains("attribute")));
    assert!(report.errors.iter().any(|f| f.description.contains("skill")));
}

#[tokio::test]
async fn load_reports_a_hero_with_the_empty_zero_entity_id() {
    let hero = HeroFields { id: 0, ..HeroFields::default() };
    let (_, report) = load(build_heroes_frame(&[hero])).await;
    assert!(report.errors.iter().any(|f| f.description.contains("empty (zero) entity id")));
}

#[tokio::test]
async fn load_reports_wounded_greater_than_count_for_a_decoded_party() {
    let (save, report) = load(build_party_with_overwounded_troop_frame()).await;
    assert_eq!(save.parties[0].troops[0].wounded(), 999);
    assert!(report.errors.iter().any(|f| f.description.contains("wounded") && f.description.contains("999")));
}
