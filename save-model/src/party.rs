//! Party entity, decoder/encoder for segment 0x0020.

use save_codec::{EntityReader, EntityWriter};

use crate::error::{Error, Result};

pub const SEGMENT_ID: u16 = 0x0020;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyType {
    Lord,
    Caravan,
    Garrison,
    Militia,
    Bandit,
    Villager,
    Quest,
    Special,
}

impl PartyType {
    fn from_u8(v: u8) -> Result<Self> {
        use PartyType::*;
        Ok(match v {
            0 => Lord,
            1 => Caravan,
            2 => Garrison,
            3 => Militia,
            4 => Bandit,
            5 => Villager,
            6 => Quest,
            7 => Special,
            other => {
                return Err(Error::SegmentDecodeError(
                    SEGMENT_ID,
                    format!("unrecognized party type tag {other}"),
                ))
            }
        })
    }

    fn to_u8(self) -> u8 {
        use PartyType::*;
        match self {
            Lord => 0,
            Caravan => 1,
            Garrison => 2,
            Militia => 3,
            Bandit => 4,
            Villager => 5,
            Quest => 6,
            Special => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyState {
    Idle,
    Moving,
    Besieging,
    Raiding,
    Escaping,
    Disbanded,
}

impl PartyState {
    fn from_u8(v: u8) -> Result<Self> {
        use PartyState::*;
        Ok(match v {
            0 => Idle,
            1 => Moving,
            2 => Besieging,
            3 => Raiding,
            4 => Escaping,
            5 => Disbanded,
            other => {
                return Err(Error::SegmentDecodeError(
                    SEGMENT_ID,
                    format!("unrecognized party state tag {other}"),
                ))
            }
        })
    }

    fn to_u8(self) -> u8 {
        use PartyState::*;
        match self {
            Idle => 0,
            Moving => 1,
            Besieging => 2,
            Raiding => 3,
            Escaping => 4,
            Disbanded => 5,
        }
    }
}

/// A run of identical troops within a party's roster.
#[derive(Debug, Clone, PartialEq)]
pub struct TroopStack {
    pub troop_id: String,
    pub display_name: String,
    pub(crate) count: u32,
    pub(crate) wounded: u32,
    pub tier: i32,
    pub is_hero: bool,
    pub hero_id: Option<u64>,
}

impl TroopStack {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn wounded(&self) -> u32 {
        self.wounded
    }

    /// Sets `count`, clamping `wounded` down to match if it would otherwise
    /// exceed the new count.
    pub fn set_count(&mut self, count: u32) {
        self.count = count;
        if self.wounded > self.count {
            self.wounded = self.count;
        }
    }

    /// Rejects a wounded count greater than the current troop count.
    pub fn set_wounded(&mut self, wounded: u32) -> Result<()> {
        if wounded > self.count {
            return Err(Error::FieldOutOfRange {
                field: "troop_stack.wounded",
                value: wounded as i64,
                min: 0,
                max: self.count as i64,
            });
        }
        self.wounded = wounded;
        Ok(())
    }

    fn read(r: &mut EntityReader) -> Result<Self> {
        let troop_id = r.read_string()?;
        let display_name = r.read_string()?;
        let count = r.read_u32()?;
        let wounded = r.read_u32()?;
        let tier = r.read_i32()?;
        let is_hero = r.read_bool()?;
        let hero_id = r.read_nullable_entity_id()?;
        Ok(Self {
            troop_id,
            display_name,
            count,
            wounded,
            tier,
            is_hero,
            hero_id,
        })
    }

    fn write(&self, w: &mut EntityWriter) {
        w.write_string(&self.troop_id);
        w.write_string(&self.display_name);
        w.write_u32(self.count);
        w.write_u32(self.wounded);
        w.write_i32(self.tier);
        w.write_bool(self.is_hero);
        w.write_nullable_entity_id(self.hero_id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position2D {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Party {
    pub id: u64,
    pub party_type: PartyType,
    pub state: PartyState,
    pub(crate) gold: i32,
    pub food: f32,
    pub(crate) morale: f32,
    pub size_limit: i32,
    pub prisoner_limit: i32,
    pub position: Position2D,
    pub leader_id: Option<u64>,
    pub clan_id: Option<u64>,
    pub settlement_id: Option<u64>,
    pub troops: Vec<TroopStack>,
    pub prisoners: Vec<TroopStack>,
    pub(crate) dirty: bool,
}

impl Party {
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn gold(&self) -> i32 {
        self.gold
    }

    pub fn set_gold(&mut self, value: i32) -> Result<()> {
        if value < 0 {
            return Err(Error::FieldOutOfRange {
                field: "party.gold",
                value: value as i64,
                min: 0,
                max: i32::MAX as i64,
            });
        }
        self.gold = value;
        self.dirty = true;
        Ok(())
    }

    pub fn morale(&self) -> f32 {
        self.morale
    }

    /// Clamps morale to `[0, 100]`.
    pub fn set_morale(&mut self, value: f32) {
        self.morale = value.clamp(0.0, 100.0);
        self.dirty = true;
    }

    pub(crate) fn read(r: &mut EntityReader) -> Result<Self> {
        let id = r.read_entity_id()?;
        let party_type = PartyType::from_u8(r.read_u8()?)?;
        let state = PartyState::from_u8(r.read_u8()?)?;
        let gold = r.read_i32()?;
        let food = r.read_f32()?;
        let morale = r.read_f32()?;
        let size_limit = r.read_i32()?;
        let prisoner_limit = r.read_i32()?;
        let position = Position2D {
            x: r.read_f32()?,
            y: r.read_f32()?,
        };
        let leader_id = r.read_nullable_entity_id()?;
        let clan_id = r.read_nullable_entity_id()?;
        let settlement_id = r.read_nullable_entity_id()?;

        let troop_count = r.read_u32()?;
        let mut troops = Vec::with_capacity(troop_count as usize);
        for _ in 0..troop_count {
            troops.push(TroopStack::read(r)?);
        }

        let prisoner_count = r.read_u32()?;
        let mut prisoners = Vec::with_capacity(prisoner_count as usize);
        for _ in 0..prisoner_count {
            prisoners.push(TroopStack::read(r)?);
        }

        Ok(Self {
            id,
            party_type,
            state,
            gold,
            food,
            morale,
            size_limit,
            prisoner_limit,
            position,
            leader_id,
            clan_id,
            settlement_id,
            troops,
            prisoners,
            dirty: false,
        })
    }

    pub(crate) fn write(&self, w: &mut EntityWriter) {
        w.write_entity_id(self.id);
        w.write_u8(self.party_type.to_u8());
        w.write_u8(self.state.to_u8());
        w.write_i32(self.gold);
        w.write_f32(self.food);
        w.write_f32(self.morale);
        w.write_i32(self.size_limit);
        w.write_i32(self.prisoner_limit);
        w.write_f32(self.position.x);
        w.write_f32(self.position.y);
        w.write_nullable_entity_id(self.leader_id);
        w.write_nullable_entity_id(self.clan_id);
        w.write_nullable_entity_id(self.settlement_id);

        w.write_u32(self.troops.len() as u32);
        for troop in &self.troops {
            troop.write(w);
        }

        w.write_u32(self.prisoners.len() as u32);
        for prisoner in &self.prisoners {
            prisoner.write(w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Party {
        Party {
            id: 0x0000_0002_0000_0001,
            party_type: PartyType::Lord,
            state: PartyState::Moving,
            gold: 4000,
            food: 12.5,
            morale: 75.0,
            size_limit: 80,
            prisoner_limit: 20,
            position: Position2D { x: 120.0, y: 45.5 },
            leader_id: Some(0x0000_0001_0000_0001),
            clan_id: Some(0x0000_0004_0000_0001),
            settlement_id: None,
            troops: vec![TroopStack {
                troop_id: "imperial_recruit".to_string(),
                display_name: "Imperial Recruit".to_string(),
                count: 40,
                wounded: 5,
                tier: 1,
                is_hero: false,
                hero_id: None,
            }],
            prisoners: vec![],
            dirty: false,
        }
    }

    #[test]
    fn roundtrips_through_write_and_read() {
        let party = sample();
        let mut w = EntityWriter::new();
        party.write(&mut w);
        let bytes = w.into_bytes();
        let mut r = EntityReader::new(SEGMENT_ID, &bytes);
        let decoded = Party::read(&mut r).unwrap();
        assert_eq!(decoded, party);
        assert!(r.is_empty());
    }

    #[test]
    fn decode_tolerates_wounded_greater_than_count() {
        // `Party::read` accepts the value as-is; it is the validation
        // reporter's job to flag this, not the decoder's.
        let mut party = sample();
        party.troops[0].wounded = 999;
        let mut w = EntityWriter::new();
        party.write(&mut w);
        let bytes = w.into_bytes();
        let mut r = EntityReader::new(SEGMENT_ID, &bytes);
        let decoded = Party::read(&mut r).unwrap();
        assert_eq!(decoded.troops[0].wounded, 999);
    }

    #[test]
    fn set_count_clamps_wounded_down() {
        let mut stack = sample().troops.remove(0);
        stack.set_count(3);
        assert_eq!(stack.wounded(), 3);
    }

    #[test]
    fn set_morale_clamps_to_0_100() {
        let mut party = sample();
        party.set_morale(500.0);
        assert_eq!(party.morale(), 100.0);
        party.set_morale(-10.0);
        assert_eq!(party.morale(), 0.0);
    }
}
