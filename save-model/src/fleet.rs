//! Fleet entity, decoder/encoder for segment 0x0100.

use save_codec::{EntityReader, EntityWriter};

use crate::error::{Error, Result};

pub const SEGMENT_ID: u16 = 0x0100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleetState {
    Docked,
    Sailing,
    Anchored,
    InCombat,
    Blockading,
    Fleeing,
    Disabled,
}

impl FleetState {
    fn from_u8(v: u8) -> Result<Self> {
        use FleetState::*;
        Ok(match v {
            0 => Docked,
            1 => Sailing,
            2 => Anchored,
            3 => InCombat,
            4 => Blockading,
            5 => Fleeing,
            6 => Disabled,
            other => {
                return Err(Error::SegmentDecodeError(
                    SEGMENT_ID,
                    format!("unrecognized fleet state tag {other}"),
                ))
            }
        })
    }

    fn to_u8(self) -> u8 {
        use FleetState::*;
        match self {
            Docked => 0,
            Sailing => 1,
            Anchored => 2,
            InCombat => 3,
            Blockading => 4,
            Fleeing => 5,
            Disabled => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavalPosition {
    pub x: f32,
    pub y: f32,
    pub heading: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fleet {
    pub id: u64,
    pub admiral_id: Option<u64>,
    pub clan_id: Option<u64>,
    pub flagship_id: Option<u64>,
    /// Ids of the ships belonging to this fleet, in serialized order. The
    /// resolver turns this into non-owning `&Ship` links after decode.
    pub ship_ids: Vec<u64>,
    pub position: NavalPosition,
    pub state: FleetState,
    pub formation: i32,
    pub(crate) morale: f32,
    pub(crate) gold: i32,
    pub(crate) dirty: bool,
}

impl Fleet {
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn morale(&self) -> f32 {
        self.morale
    }

    /// Clamps morale to `[0, 100]`.
    pub fn set_morale(&mut self, value: f32) {
        self.morale = value.clamp(0.0, 100.0);
        self.dirty = true;
    }

    pub fn gold(&self) -> i32 {
        self.gold
    }

    pub fn set_gold(&mut self, value: i32) -> Result<()> {
        if value < 0 {
            return Err(Error::FieldOutOfRange {
                field: "fleet.gold",
                value: value as i64,
                min: 0,
                max: i32::MAX as i64,
            });
        }
        self.gold = value;
        self.dirty = true;
        Ok(())
    }

    pub(crate) fn read(r: &mut EntityReader) -> Result<Self> {
        let id = r.read_entity_id()?;
        let admiral_id = r.read_nullable_entity_id()?;
        let clan_id = r.read_nullable_entity_id()?;
        let flagship_id = r.read_nullable_entity_id()?;

        let ship_count = r.read_u32()?;
        let mut ship_ids = Vec::with_capacity(ship_count as usize);
        for _ in 0..ship_count {
            ship_ids.push(r.read_entity_id()?);
        }

        let position = NavalPosition {
            x: r.read_f32()?,
            y: r.read_f32()?,
            heading: r.read_f32()?,
        };
        let state = FleetState::from_u8(r.read_u8()?)?;
        let formation = r.read_i32()?;
        let morale = r.read_f32()?;
        let gold = r.read_i32()?;

        Ok(Self {
            id,
            admiral_id,
            clan_id,
            flagship_id,
            ship_ids,
            position,
            state,
            formation,
            morale,
            gold,
            dirty: false,
        })
    }

    pub(crate) fn write(&self, w: &mut EntityWriter) {
        w.write_entity_id(self.id);
        w.write_nullable_entity_id(self.admiral_id);
        w.write_nullable_entity_id(self.clan_id);
        w.write_nullable_entity_id(self.flagship_id);

        w.write_u32(self.ship_ids.len() as u32);
        for ship_id in &self.ship_ids {
            w.write_entity_id(*ship_id);
        }

        w.write_f32(self.position.x);
        w.write_f32(self.position.y);
        w.write_f32(self.position.heading);
        w.write_u8(self.state.to_u8());
        w.write_i32(self.formation);
        w.write_f32(self.morale);
        w.write_i32(self.gold);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Fleet {
        Fleet {
            id: 0x0000_0064_0000_0001,
            admiral_id: Some(0x0000_0001_0000_0001),
            clan_id: Some(0x0000_0004_0000_0001),
            flagship_id: Some(0x0000_0065_0000_0001),
            ship_ids: vec![0x0000_0065_0000_0001, 0x0000_0065_0000_0002],
            position: NavalPosition {
                x: 10.0,
                y: 20.0,
                heading: 90.0,
            },
            state: FleetState::Sailing,
            formation: 1,
            morale: 80.0,
            gold: 5000,
            dirty: false,
        }
    }

    #[test]
    fn roundtrips_through_write_and_read() {
        let fleet = sample();
        let mut w = EntityWriter::new();
        fleet.write(&mut w);
        let bytes = w.into_bytes();
        let mut r = EntityReader::new(SEGMENT_ID, &bytes);
        let decoded = Fleet::read(&mut r).unwrap();
        assert_eq!(decoded, fleet);
        assert!(r.is_empty());
    }

    #[test]
    fn set_morale_clamps_to_0_100() {
        let mut fleet = sample();
        fleet.set_morale(-1.0);
        assert_eq!(fleet.morale(), 0.0);
    }
}
