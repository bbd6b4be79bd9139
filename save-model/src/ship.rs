//! Ship entity, decoder/encoder for segment 0x0101.

use std::collections::BTreeSet;

use save_codec::{EntityReader, EntityWriter};

use crate::error::{Error, Result};

pub const SEGMENT_ID: u16 = 0x0101;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipType {
    Snekkja,
    Cog,
    Knarr,
    Longship,
    Galley,
    Warship,
    Carrack,
    ManOfWar,
}

impl ShipType {
    fn from_u8(v: u8) -> Result<Self> {
        use ShipType::*;
        Ok(match v {
            0 => Snekkja,
            1 => Cog,
            2 => Knarr,
            3 => Longship,
            4 => Galley,
            5 => Warship,
            6 => Carrack,
            7 => ManOfWar,
            other => {
                return Err(Error::SegmentDecodeError(
                    SEGMENT_ID,
                    format!("unrecognized ship type tag {other}"),
                ))
            }
        })
    }

    fn to_u8(self) -> u8 {
        use ShipType::*;
        match self {
            Snekkja => 0,
            Cog => 1,
            Knarr => 2,
            Longship => 3,
            Galley => 4,
            Warship => 5,
            Carrack => 6,
            ManOfWar => 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CargoEntry {
    pub item_id: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub id: u64,
    pub ship_type: ShipType,
    pub(crate) hull_points: i32,
    pub crew_count: i32,
    pub crew_quality: i32,
    pub(crate) crew_morale: f32,
    pub(crate) upgrades: BTreeSet<u32>,
    pub cargo: Vec<CargoEntry>,
    pub fleet_id: Option<u64>,
    pub(crate) dirty: bool,
}

impl Ship {
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn hull_points(&self) -> i32 {
        self.hull_points
    }

    pub fn set_hull_points(&mut self, value: i32) {
        self.hull_points = value.max(0);
        self.dirty = true;
    }

    pub fn crew_morale(&self) -> f32 {
        self.crew_morale
    }

    /// Clamps crew morale to `[0, 100]`.
    pub fn set_crew_morale(&mut self, value: f32) {
        self.crew_morale = value.clamp(0.0, 100.0);
        self.dirty = true;
    }

    pub fn upgrades(&self) -> &BTreeSet<u32> {
        &self.upgrades
    }

    pub fn add_upgrade(&mut self, upgrade_id: u32) {
        if self.upgrades.insert(upgrade_id) {
            self.dirty = true;
        }
    }

    pub fn remove_upgrade(&mut self, upgrade_id: u32) {
        if self.upgrades.remove(&upgrade_id) {
            self.dirty = true;
        }
    }

    pub(crate) fn read(r: &mut EntityReader) -> Result<Self> {
        let id = r.read_entity_id()?;
        let ship_type = ShipType::from_u8(r.read_u8()?)?;
        let hull_points = r.read_i32()?;
        let crew_count = r.read_i32()?;
        let crew_quality = r.read_i32()?;
        let crew_morale = r.read_f32()?;

        let upgrade_count = r.read_u32()?;
        let mut upgrades = BTreeSet::new();
        for _ in 0..upgrade_count {
            upgrades.insert(r.read_u32()?);
        }

        let cargo_count = r.read_u32()?;
        let mut cargo = Vec::with_capacity(cargo_count as usize);
        for _ in 0..cargo_count {
            let item_id = r.read_string()?;
            let quantity = r.read_i32()?;
            cargo.push(CargoEntry { item_id, quantity });
        }

        let fleet_id = r.read_nullable_entity_id()?;

        Ok(Self {
            id,
            ship_type,
            hull_points,
            crew_count,
            crew_quality,
            crew_morale,
            upgrades,
            cargo,
            fleet_id,
            dirty: false,
        })
    }

    pub(crate) fn write(&self, w: &mut EntityWriter) {
        w.write_entity_id(self.id);
        w.write_u8(self.ship_type.to_u8());
        w.write_i32(self.hull_points);
        w.write_i32(self.crew_count);
        w.write_i32(self.crew_quality);
        w.write_f32(self.crew_morale);

        w.write_u32(self.upgrades.len() as u32);
        for upgrade_id in &self.upgrades {
            w.write_u32(*upgrade_id);
        }

        w.write_u32(self.cargo.len() as u32);
        for entry in &self.cargo {
            w.write_string(&entry.item_id);
            w.write_i32(entry.quantity);
        }

        w.write_nullable_entity_id(self.fleet_id);
    }
}
