//! Faction/Clan/Kingdom entities, decoders/encoders for segments 0x0040,
//! 0x0050, and 0x0060.
//!
//! The three share an identical on-disk shape; only the segment id and
//! the `kind` tag distinguish which collection an instance belongs to.

use save_codec::{EntityReader, EntityWriter};

use crate::error::Result;

pub const FACTION_SEGMENT_ID: u16 = 0x0040;
pub const CLAN_SEGMENT_ID: u16 = 0x0050;
pub const KINGDOM_SEGMENT_ID: u16 = 0x0060;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactionKind {
    Faction,
    Clan,
    Kingdom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Faction {
    pub id: u64,
    pub kind: FactionKind,
    pub name: String,
    pub tier: i32,
    pub(crate) renown: f32,
    pub(crate) influence: f32,
    pub(crate) gold: i32,
    pub is_player_clan: bool,
    pub primary_color: u32,
    pub secondary_color: u32,
    pub(crate) dirty: bool,
}

impl Faction {
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn renown(&self) -> f32 {
        self.renown
    }

    pub fn set_renown(&mut self, value: f32) {
        self.renown = value.max(0.0);
        self.dirty = true;
    }

    pub fn influence(&self) -> f32 {
        self.influence
    }

    pub fn set_influence(&mut self, value: f32) {
        self.influence = value.max(0.0);
        self.dirty = true;
    }

    pub fn gold(&self) -> i32 {
        self.gold
    }

    pub fn set_gold(&mut self, value: i32) -> Result<()> {
        if value < 0 {
            return Err(crate::error::Error::FieldOutOfRange {
                field: "faction.gold",
                value: value as i64,
                min: 0,
                max: i32::MAX as i64,
            });
        }
        self.gold = value;
        self.dirty = true;
        Ok(())
    }

    pub(crate) fn read(kind: FactionKind, segment_id: u16, r: &mut EntityReader) -> Result<Self> {
        let id = r.read_entity_id()?;
        let name = r.read_string()?;
        let tier = r.read_i32()?;
        let renown = r.read_f32()?;
        let influence = r.read_f32()?;
        let gold = r.read_i32()?;
        let is_player_clan = r.read_bool()?;
        let primary_color = r.read_u32()?;
        let secondary_color = r.read_u32()?;
        let _ = segment_id;

        Ok(Self {
            id,
            kind,
            name,
            tier,
            renown,
            influence,
            gold,
            is_player_clan,
            primary_color,
            secondary_color,
            dirty: false,
        })
    }

    pub(crate) fn write(&self, w: &mut EntityWriter) {
        w.write_entity_id(self.id);
        w.write_string(&self.name);
        w.write_i32(self.tier);
        w.write_f32(self.renown);
        w.write_f32(self.influence);
        w.write_i32(self.gold);
        w.write_bool(self.is_player_clan);
        w.write_u32(self.primary_color);
        w.write_u32(self.secondary_color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: FactionKind) -> Faction {
        Faction {
            id: 0x0000_0004_0000_0001,
            kind,
            name: "House Derthert".to_string(),
            tier: 5,
            renown: 1200.0,
            influence: 300.0,
            gold: 20000,
            is_player_clan: true,
            primary_color: 0xFF22_3344,
            secondary_color: 0xFF55_6677,
            dirty: false,
        }
    }

    #[test]
    fn roundtrips_through_write_and_read() {
        let faction = sample(FactionKind::Clan);
        let mut w = EntityWriter::new();
        faction.write(&mut w);
        let bytes = w.into_bytes();
        let mut r = EntityReader::new(CLAN_SEGMENT_ID, &bytes);
        let decoded = Faction::read(FactionKind::Clan, CLAN_SEGMENT_ID, &mut r).unwrap();
        assert_eq!(decoded, faction);
        assert!(r.is_empty());
    }

    #[test]
    fn set_gold_rejects_negative() {
        let mut faction = sample(FactionKind::Kingdom);
        assert!(faction.set_gold(-1).is_err());
    }
}
