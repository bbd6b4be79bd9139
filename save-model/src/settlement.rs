//! Settlement entity, decoder/encoder for segment 0x0030.

use save_codec::{EntityReader, EntityWriter};

use crate::error::{Error, Result};
use crate::party::Position2D;

pub const SEGMENT_ID: u16 = 0x0030;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementType {
    Town,
    Castle,
    Village,
    Hideout,
}

impl SettlementType {
    fn from_u8(v: u8) -> Result<Self> {
        use SettlementType::*;
        Ok(match v {
            0 => Town,
            1 => Castle,
            2 => Village,
            3 => Hideout,
            other => {
                return Err(Error::SegmentDecodeError(
                    SEGMENT_ID,
                    format!("unrecognized settlement type tag {other}"),
                ))
            }
        })
    }

    fn to_u8(self) -> u8 {
        use SettlementType::*;
        match self {
            Town => 0,
            Castle => 1,
            Village => 2,
            Hideout => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub id: u64,
    pub settlement_type: SettlementType,
    pub position: Position2D,
    pub(crate) prosperity: f32,
    pub(crate) loyalty: f32,
    pub(crate) security: f32,
    pub food_stocks: f32,
    pub militia: f32,
    pub garrison: i32,
    pub wall_level: i32,
    pub(crate) dirty: bool,
}

impl Settlement {
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn prosperity(&self) -> f32 {
        self.prosperity
    }

    pub fn set_prosperity(&mut self, value: f32) {
        self.prosperity = value.max(0.0);
        self.dirty = true;
    }

    pub fn loyalty(&self) -> f32 {
        self.loyalty
    }

    /// Clamps loyalty to `[0, 100]`.
    pub fn set_loyalty(&mut self, value: f32) {
        self.loyalty = value.clamp(0.0, 100.0);
        self.dirty = true;
    }

    pub fn security(&self) -> f32 {
        self.security
    }

    /// Clamps security to `[0, 100]`.
    pub fn set_security(&mut self, value: f32) {
        self.security = value.clamp(0.0, 100.0);
        self.dirty = true;
    }

    pub(crate) fn read(r: &mut EntityReader) -> Result<Self> {
        let id = r.read_entity_id()?;
        let settlement_type = SettlementType::from_u8(r.read_u8()?)?;
        let position = Position2D {
            x: r.read_f32()?,
            y: r.read_f32()?,
        };
        let prosperity = r.read_f32()?;
        let loyalty = r.read_f32()?;
        let security = r.read_f32()?;
        let food_stocks = r.read_f32()?;
        let militia = r.read_f32()?;
        let garrison = r.read_i32()?;
        let wall_level = r.read_i32()?;

        Ok(Self {
            id,
            settlement_type,
            position,
            prosperity,
            loyalty,
            security,
            food_stocks,
            militia,
            garrison,
            wall_level,
            dirty: false,
        })
    }

    pub(crate) fn write(&self, w: &mut EntityWriter) {
        w.write_entity_id(self.id);
        w.write_u8(self.settlement_type.to_u8());
        w.write_f32(self.position.x);
        w.write_f32(self.position.y);
        w.write_f32(self.prosperity);
        w.write_f32(self.loyalty);
        w.write_f32(self.security);
        w.write_f32(self.food_stocks);
        w.write_f32(self.militia);
        w.write_i32(self.garrison);
        w.write_i32(self.wall_level);
    }
}
