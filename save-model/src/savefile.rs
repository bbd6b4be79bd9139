//! `SaveFile`, the root aggregate, and full-payload encode/decode dispatch
//! over the segment table.

use save_codec::{walk_segments, write_segment, EntityReader, EntityWriter};
use tracing::warn;

use crate::campaign_time::CampaignTime;
use crate::error::{Error, Result};
use crate::faction::{Faction, FactionKind, CLAN_SEGMENT_ID, FACTION_SEGMENT_ID, KINGDOM_SEGMENT_ID};
use crate::fleet::Fleet;
use crate::hero::Hero;
use crate::metadata::Metadata;
use crate::party::Party;
use crate::resolver::Resolver;
use crate::settlement::Settlement;
use crate::ship::Ship;
use crate::unknown_segment::UnknownSegment;

const CAMPAIGN_TIME_SEGMENT_ID: u16 = 0x0001;
const HEROES_SEGMENT_ID: u16 = 0x0010;
const PARTIES_SEGMENT_ID: u16 = 0x0020;
const SETTLEMENTS_SEGMENT_ID: u16 = 0x0030;
const FLEETS_SEGMENT_ID: u16 = 0x0100;
const SHIPS_SEGMENT_ID: u16 = 0x0101;

/// Segment ids recognized as present but structurally opaque: known to
/// exist, but stored verbatim rather than field-decoded.
const OPAQUE_SEGMENT_IDS: [u16; 3] = [0x0070, 0x0080, 0x0090];

/// Header fields that live outside the compressed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub version: i32,
    pub game_version: String,
    pub compressed_size: usize,
    pub uncompressed_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRecord {
    pub id: String,
    pub version: String,
    pub official: bool,
}

/// The fully decoded campaign object graph plus everything needed to
/// re-encode it byte-compatibly.
#[derive(Debug)]
pub struct SaveFile {
    pub header: Header,
    pub modules: Vec<ModuleRecord>,
    pub metadata: Metadata,
    pub campaign_time: CampaignTime,
    pub heroes: Vec<Hero>,
    pub parties: Vec<Party>,
    pub settlements: Vec<Settlement>,
    pub factions: Vec<Faction>,
    pub clans: Vec<Faction>,
    pub kingdoms: Vec<Faction>,
    pub fleets: Vec<Fleet>,
    pub ships: Vec<Ship>,
    pub unknown_segments: Vec<UnknownSegment>,
    /// Retained only when the engine's `keep_raw_data` option is set.
    pub raw_payload: Option<Vec<u8>>,
    header_dirty: bool,
    metadata_dirty: bool,
}

impl SaveFile {
    /// Decodes the decompressed payload into every known segment,
    /// dispatching by id. Unrecognized and deliberately-opaque ids are
    /// preserved as [`UnknownSegment`]s in original order.
    ///
    /// When `permissive` is set, a decode failure for a *known* segment id
    /// is logged and the segment is kept as an `UnknownSegment` instead of
    /// propagating; otherwise the first such failure is returned.
    pub fn decode_payload(
        header: Header,
        modules: Vec<ModuleRecord>,
        metadata: Metadata,
        payload: &[u8],
        permissive: bool,
    ) -> Result<Self> {
        let raw_segments = walk_segments(payload)?;

        let mut campaign_time = CampaignTime::default();
        let mut heroes = Vec::new();
        let mut parties = Vec::new();
        let mut settlements = Vec::new();
        let mut factions = Vec::new();
        let mut clans = Vec::new();
        let mut kingdoms = Vec::new();
        let mut fleets = Vec::new();
        let mut ships = Vec::new();
        let mut unknown_segments = Vec::new();

        for segment in raw_segments {
            let decoded = (|| -> Result<()> {
                match segment.id {
                    CAMPAIGN_TIME_SEGMENT_ID => {
                        let mut r = EntityReader::new(segment.id, &segment.content);
                        campaign_time = CampaignTime::from_ticks(r.read_i64()?);
                        Ok(())
                    }
                    HEROES_SEGMENT_ID => {
                        heroes = read_many(segment.id, &segment.content, Hero::read)?;
                        Ok(())
                    }
                    PARTIES_SEGMENT_ID => {
                        parties = read_many(segment.id, &segment.content, Party::read)?;
                        Ok(())
                    }
                    SETTLEMENTS_SEGMENT_ID => {
                        settlements = read_many(segment.id, &segment.content, Settlement::read)?;
                        Ok(())
                    }
                    FACTION_SEGMENT_ID => {
                        factions = read_many(segment.id, &segment.content, |r| {
                            Faction::read(FactionKind::Faction, FACTION_SEGMENT_ID, r)
                        })?;
                        Ok(())
                    }
                    CLAN_SEGMENT_ID => {
                        clans = read_many(segment.id, &segment.content, |r| {
                            Faction::read(FactionKind::Clan, CLAN_SEGMENT_ID, r)
                        })?;
                        Ok(())
                    }
                    KINGDOM_SEGMENT_ID => {
                        kingdoms = read_many(segment.id, &segment.content, |r| {
                            Faction::read(FactionKind::Kingdom, KINGDOM_SEGMENT_ID, r)
                        })?;
                        Ok(())
                    }
                    FLEETS_SEGMENT_ID => {
                        fleets = read_many(segment.id, &segment.content, Fleet::read)?;
                        Ok(())
                    }
                    SHIPS_SEGMENT_ID => {
                        ships = read_many(segment.id, &segment.content, Ship::read)?;
                        Ok(())
                    }
                    id if OPAQUE_SEGMENT_IDS.contains(&id) => {
                        unknown_segments.push(UnknownSegment {
                            id,
                            bytes: segment.content.clone(),
                            original_offset: segment.offset,
                        });
                        Ok(())
                    }
                    _ => {
                        unknown_segments.push(UnknownSegment {
                            id: segment.id,
                            bytes: segment.content.clone(),
                            original_offset: segment.offset,
                        });
                        Ok(())
                    }
                }
            })();

            if let Err(err) = decoded {
                if permissive {
                    warn!(segment_id = %format!("{:#06x}", segment.id), error = %err, "skipping segment under permissive mode");
                    unknown_segments.push(UnknownSegment {
                        id: segment.id,
                        bytes: segment.content,
                        original_offset: segment.offset,
                    });
                } else {
                    return Err(err);
                }
            }
        }

        Ok(Self {
            header,
            modules,
            metadata,
            campaign_time,
            heroes,
            parties,
            settlements,
            factions,
            clans,
            kingdoms,
            fleets,
            ships,
            unknown_segments,
            raw_payload: None,
            header_dirty: false,
            metadata_dirty: false,
        })
    }

    /// Re-serializes the whole object graph into a fresh payload buffer.
    /// Known segments come first in segment-table order; unknown
    /// segments are re-emitted afterward, unchanged and in original order.
    pub fn encode_payload(&self) -> Vec<u8> {
        let mut payload = Vec::new();

        let mut w = EntityWriter::new();
        w.write_i64(self.campaign_time.ticks);
        write_segment(&mut payload, CAMPAIGN_TIME_SEGMENT_ID, &w.into_bytes());

        write_many(&mut payload, HEROES_SEGMENT_ID, &self.heroes, Hero::write);
        write_many(&mut payload, PARTIES_SEGMENT_ID, &self.parties, Party::write);
        write_many(&mut payload, SETTLEMENTS_SEGMENT_ID, &self.settlements, Settlement::write);
        write_many(&mut payload, FACTION_SEGMENT_ID, &self.factions, Faction::write);
        write_many(&mut payload, CLAN_SEGMENT_ID, &self.clans, Faction::write);
        write_many(&mut payload, KINGDOM_SEGMENT_ID, &self.kingdoms, Faction::write);
        write_many(&mut payload, FLEETS_SEGMENT_ID, &self.fleets, Fleet::write);
        write_many(&mut payload, SHIPS_SEGMENT_ID, &self.ships, Ship::write);

        for unknown in &self.unknown_segments {
            write_segment(&mut payload, unknown.id, &unknown.bytes);
        }

        payload
    }

    pub fn resolver(&self) -> Resolver {
        Resolver::build(&self.heroes, &self.parties, &self.clans, &self.fleets, &self.ships)
    }

    /// Whether any owned entity, the header, or the metadata has unsaved
    /// changes.
    pub fn is_dirty(&self) -> bool {
        self.header_dirty
            || self.metadata_dirty
            || self.heroes.iter().any(Hero::is_dirty)
            || self.parties.iter().any(Party::is_dirty)
            || self.settlements.iter().any(Settlement::is_dirty)
            || self.factions.iter().any(Faction::is_dirty)
            || self.clans.iter().any(Faction::is_dirty)
            || self.kingdoms.iter().any(Faction::is_dirty)
            || self.fleets.iter().any(Fleet::is_dirty)
            || self.ships.iter().any(Ship::is_dirty)
    }

    /// Resets every dirty flag after a successful save.
    pub fn clear_dirty(&mut self) {
        self.header_dirty = false;
        self.metadata_dirty = false;
        self.heroes.iter_mut().for_each(Hero::clear_dirty);
        self.parties.iter_mut().for_each(Party::clear_dirty);
        self.settlements.iter_mut().for_each(Settlement::clear_dirty);
        self.factions.iter_mut().for_each(Faction::clear_dirty);
        self.clans.iter_mut().for_each(Faction::clear_dirty);
        self.kingdoms.iter_mut().for_each(Faction::clear_dirty);
        self.fleets.iter_mut().for_each(Fleet::clear_dirty);
        self.ships.iter_mut().for_each(Ship::clear_dirty);
    }

    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
        self.metadata_dirty = true;
    }

    pub fn set_game_version(&mut self, game_version: String) {
        self.header.game_version = game_version;
        self.header_dirty = true;
    }
}

fn read_many<T>(
    segment_id: u16,
    content: &[u8],
    read_one: impl Fn(&mut EntityReader) -> Result<T>,
) -> Result<Vec<T>> {
    let mut r = EntityReader::new(segment_id, content);
    let count = r.read_u32()?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        items.push(read_one(&mut r)?);
    }
    Ok(items)
}

fn write_many<T>(payload: &mut Vec<u8>, segment_id: u16, items: &[T], write_one: impl Fn(&T, &mut EntityWriter)) {
    let mut w = EntityWriter::new();
    w.write_u32(items.len() as u32);
    for item in items {
        write_one(item, &mut w);
    }
    write_segment(payload, segment_id, &w.into_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_header() -> Header {
        Header {
            version: 7,
            game_version: "v1.3.10.12".to_string(),
            compressed_size: 0,
            uncompressed_size: 0,
        }
    }

    #[test]
    fn empty_payload_decodes_to_empty_collections() {
        let save = SaveFile::decode_payload(empty_header(), vec![], Metadata::default(), &[], false).unwrap();
        assert!(save.heroes.is_empty());
        assert!(save.unknown_segments.is_empty());
        assert!(!save.is_dirty());
    }

    #[test]
    fn unknown_segment_survives_a_decode_encode_round_trip() {
        let mut payload = Vec::new();
        write_segment(&mut payload, 0xABCD, &[0xDE, 0xAD, 0xBE, 0xEF]);

        let save = SaveFile::decode_payload(empty_header(), vec![], Metadata::default(), &payload, false).unwrap();
        assert_eq!(save.unknown_segments.len(), 1);
        assert_eq!(save.unknown_segments[0].id, 0xABCD);

        let re_encoded = save.encode_payload();
        let save2 = SaveFile::decode_payload(empty_header(), vec![], Metadata::default(), &re_encoded, false).unwrap();
        assert_eq!(save2.unknown_segments, save.unknown_segments);
    }

    #[test]
    fn opaque_known_segments_are_kept_as_unknown() {
        let mut payload = Vec::new();
        write_segment(&mut payload, 0x0070, &[1, 2, 3]);
        let save = SaveFile::decode_payload(empty_header(), vec![], Metadata::default(), &payload, false).unwrap();
        assert_eq!(save.unknown_segments.len(), 1);
        assert_eq!(save.unknown_segments[0].id, 0x0070);
    }

    #[test]
    fn permissive_mode_downgrades_a_corrupt_known_segment_to_unknown() {
        // a truncated heroes segment (declares one hero but has no bytes for it)
        let mut w = EntityWriter::new();
        w.write_u32(1);
        let mut payload = Vec::new();
        write_segment(&mut payload, HEROES_SEGMENT_ID, &w.into_bytes());

        let strict = SaveFile::decode_payload(empty_header(), vec![], Metadata::default(), &payload, false);
        assert!(strict.is_err());

        let permissive =
            SaveFile::decode_payload(empty_header(), vec![], Metadata::default(), &payload, true).unwrap();
        assert!(permissive.heroes.is_empty());
        assert_eq!(permissive.unknown_segments.len(), 1);
        assert_eq!(permissive.unknown_segments[0].id, HEROES_SEGMENT_ID);
    }

    #[test]
    fn clear_dirty_resets_every_owned_entity() {
        let mut save = SaveFile::decode_payload(empty_header(), vec![], Metadata::default(), &[], false).unwrap();
        save.set_game_version("v1.3.10.13".to_string());
        assert!(save.is_dirty());
        save.clear_dirty();
        assert!(!save.is_dirty());
    }
}
