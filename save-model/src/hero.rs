//! Hero entity, decoder/encoder for segment 0x0010.

use std::collections::BTreeSet;

use save_codec::{EntityReader, EntityWriter};

use crate::error::{Error, Result};

pub const SEGMENT_ID: u16 = 0x0010;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    fn from_u8(v: u8) -> Result<Self> {
        match v {
            0 => Ok(Gender::Male),
            1 => Ok(Gender::Female),
            other => Err(Error::SegmentDecodeError(
                SEGMENT_ID,
                format!("unrecognized gender tag {other}"),
            )),
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            Gender::Male => 0,
            Gender::Female => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroState {
    Active,
    Fugitive,
    Prisoner,
    Released,
    Dead,
    Disabled,
    NotSpawned,
    Traveling,
}

impl HeroState {
    fn from_u8(v: u8) -> Result<Self> {
        use HeroState::*;
        Ok(match v {
            0 => Active,
            1 => Fugitive,
            2 => Prisoner,
            3 => Released,
            4 => Dead,
            5 => Disabled,
            6 => NotSpawned,
            7 => Traveling,
            other => {
                return Err(Error::SegmentDecodeError(
                    SEGMENT_ID,
                    format!("unrecognized hero state tag {other}"),
                ))
            }
        })
    }

    fn to_u8(self) -> u8 {
        use HeroState::*;
        match self {
            Active => 0,
            Fugitive => 1,
            Prisoner => 2,
            Released => 3,
            Dead => 4,
            Disabled => 5,
            NotSpawned => 6,
            Traveling => 7,
        }
    }
}

/// The six core attributes, each clamped to `[0, 10]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attributes {
    pub vigor: i32,
    pub control: i32,
    pub endurance: i32,
    pub cunning: i32,
    pub social: i32,
    pub intelligence: i32,
}

impl Attributes {
    pub const MIN: i32 = 0;
    pub const MAX: i32 = 10;

    fn read(r: &mut EntityReader) -> Result<Self> {
        Ok(Self {
            vigor: r.read_i32()?,
            control: r.read_i32()?,
            endurance: r.read_i32()?,
            cunning: r.read_i32()?,
            social: r.read_i32()?,
            intelligence: r.read_i32()?,
        })
    }

    fn write(&self, w: &mut EntityWriter) {
        w.write_i32(self.vigor);
        w.write_i32(self.control);
        w.write_i32(self.endurance);
        w.write_i32(self.cunning);
        w.write_i32(self.social);
        w.write_i32(self.intelligence);
    }
}

/// The eighteen tracked skills, each in `[0, 300]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Skills {
    pub one_handed: i32,
    pub two_handed: i32,
    pub polearm: i32,
    pub bow: i32,
    pub crossbow: i32,
    pub throwing: i32,
    pub riding: i32,
    pub athletics: i32,
    pub smithing: i32,
    pub scouting: i32,
    pub tactics: i32,
    pub roguery: i32,
    pub charm: i32,
    pub leadership: i32,
    pub trade: i32,
    pub steward: i32,
    pub medicine: i32,
    pub engineering: i32,
}

impl Skills {
    pub const MIN: i32 = 0;
    pub const MAX: i32 = 300;

    fn read(r: &mut EntityReader) -> Result<Self> {
        Ok(Self {
            one_handed: r.read_i32()?,
            two_handed: r.read_i32()?,
            polearm: r.read_i32()?,
            bow: r.read_i32()?,
            crossbow: r.read_i32()?,
            throwing: r.read_i32()?,
            riding: r.read_i32()?,
            athletics: r.read_i32()?,
            smithing: r.read_i32()?,
            scouting: r.read_i32()?,
            tactics: r.read_i32()?,
            roguery: r.read_i32()?,
            charm: r.read_i32()?,
            leadership: r.read_i32()?,
            trade: r.read_i32()?,
            steward: r.read_i32()?,
            medicine: r.read_i32()?,
            engineering: r.read_i32()?,
        })
    }

    fn write(&self, w: &mut EntityWriter) {
        w.write_i32(self.one_handed);
        w.write_i32(self.two_handed);
        w.write_i32(self.polearm);
        w.write_i32(self.bow);
        w.write_i32(self.crossbow);
        w.write_i32(self.throwing);
        w.write_i32(self.riding);
        w.write_i32(self.athletics);
        w.write_i32(self.smithing);
        w.write_i32(self.scouting);
        w.write_i32(self.tactics);
        w.write_i32(self.roguery);
        w.write_i32(self.charm);
        w.write_i32(self.leadership);
        w.write_i32(self.trade);
        w.write_i32(self.steward);
        w.write_i32(self.medicine);
        w.write_i32(self.engineering);
    }
}

/// Optional per-hero naval proficiency, present only for heroes who have
/// ever crewed a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavalSkills {
    pub seamanship: i32,
    pub naval_tactics: i32,
    pub ship_engineering: i32,
}

impl NavalSkills {
    fn read(r: &mut EntityReader) -> Result<Self> {
        Ok(Self {
            seamanship: r.read_i32()?,
            naval_tactics: r.read_i32()?,
            ship_engineering: r.read_i32()?,
        })
    }

    fn write(&self, w: &mut EntityWriter) {
        w.write_i32(self.seamanship);
        w.write_i32(self.naval_tactics);
        w.write_i32(self.ship_engineering);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hero {
    pub id: u64,
    pub hero_id: String,
    pub display_name: String,
    pub first_name: Option<String>,
    pub gender: Gender,
    pub age: i32,
    pub level: i32,
    pub experience: i32,
    pub unspent_attribute_points: i32,
    pub unspent_focus_points: i32,
    pub(crate) gold: i32,
    pub(crate) health: f32,
    pub state: HeroState,
    pub(crate) attributes: Attributes,
    pub(crate) skills: Skills,
    pub naval: Option<NavalSkills>,
    pub(crate) perk_ids: BTreeSet<u32>,
    pub clan_id: Option<u64>,
    pub party_id: Option<u64>,
    pub fleet_id: Option<u64>,
    pub(crate) dirty: bool,
}

impl Hero {
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

    /// Rejects negative gold rather than clamping, since a negative
    /// balance is never meaningful for a hero.
    pub fn set_gold(&mut self, value: i32) -> Result<()> {
        if value < 0 {
            return Err(Error::FieldOutOfRange {
                field: "hero.gold",
                value: value as i64,
                min: 0,
                max: i32::MAX as i64,
            });
        }
        self.gold = value;
        self.dirty = true;
        Ok(())
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    /// Clamps health to `[0, 1]` rather than rejecting, matching how the
    /// game itself saturates health at the bounds.
    pub fn set_health(&mut self, value: f32) {
        self.health = value.clamp(0.0, 1.0);
        self.dirty = true;
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Clamps every field of `attributes` to `[0, 10]` before storing it.
    pub fn set_attributes(&mut self, attributes: Attributes) {
        self.attributes = Attributes {
            vigor: attributes.vigor.clamp(Attributes::MIN, Attributes::MAX),
            control: attributes.control.clamp(Attributes::MIN, Attributes::MAX),
            endurance: attributes.endurance.clamp(Attributes::MIN, Attributes::MAX),
            cunning: attributes.cunning.clamp(Attributes::MIN, Attributes::MAX),
            social: attributes.social.clamp(Attributes::MIN, Attributes::MAX),
            intelligence: attributes.intelligence.clamp(Attributes::MIN, Attributes::MAX),
        };
        self.dirty = true;
    }

    pub fn skills(&self) -> &Skills {
        &self.skills
    }

    /// Clamps every skill to `[0, 300]` before storing it.
    pub fn set_skills(&mut self, skills: Skills) {
        let clamp = |v: i32| v.clamp(Skills::MIN, Skills::MAX);
        self.skills = Skills {
            one_handed: clamp(skills.one_handed),
            two_handed: clamp(skills.two_handed),
            polearm: clamp(skills.polearm),
            bow: clamp(skills.bow),
            crossbow: clamp(skills.crossbow),
            throwing: clamp(skills.throwing),
            riding: clamp(skills.riding),
            athletics: clamp(skills.athletics),
            smithing: clamp(skills.smithing),
            scouting: clamp(skills.scouting),
            tactics: clamp(skills.tactics),
            roguery: clamp(skills.roguery),
            charm: clamp(skills.charm),
            leadership: clamp(skills.leadership),
            trade: clamp(skills.trade),
            steward: clamp(skills.steward),
            medicine: clamp(skills.medicine),
            engineering: clamp(skills.engineering),
        };
        self.dirty = true;
    }

    pub fn perk_ids(&self) -> &BTreeSet<u32> {
        &self.perk_ids
    }

    /// Inserts a perk id; no-op (and not marked dirty) if already held,
    /// since the set is already unique.
    pub fn add_perk(&mut self, perk_id: u32) {
        if self.perk_ids.insert(perk_id) {
            self.dirty = true;
        }
    }

    pub fn remove_perk(&mut self, perk_id: u32) {
        if self.perk_ids.remove(&perk_id) {
            self.dirty = true;
        }
    }

    pub(crate) fn read(r: &mut EntityReader) -> Result<Self> {
        let id = r.read_entity_id()?;
        let hero_id = r.read_string()?;
        let display_name = r.read_string()?;
        let first_name = r.read_nullable_string()?;
        let gender = Gender::from_u8(r.read_u8()?)?;
        let age = r.read_i32()?;
        let level = r.read_i32()?;
        let experience = r.read_i32()?;
        let unspent_attribute_points = r.read_i32()?;
        let unspent_focus_points = r.read_i32()?;
        let gold = r.read_i32()?;
        let health = r.read_f32()?;
        let state = HeroState::from_u8(r.read_u8()?)?;
        let attributes = Attributes::read(r)?;
        let skills = Skills::read(r)?;
        let naval = if r.read_bool()? {
            Some(NavalSkills::read(r)?)
        } else {
            None
        };
        let perk_count = r.read_u32()?;
        let mut perk_ids = BTreeSet::new();
        for _ in 0..perk_count {
            perk_ids.insert(r.read_u32()?);
        }
        let clan_id = r.read_nullable_entity_id()?;
        let party_id = r.read_nullable_entity_id()?;
        let fleet_id = r.read_nullable_entity_id()?;

        Ok(Self {
            id,
            hero_id,
            display_name,
            first_name,
            gender,
            age,
            level,
            experience,
            unspent_attribute_points,
            unspent_focus_points,
            gold,
            health,
            state,
            attributes,
            skills,
            naval,
            perk_ids,
            clan_id,
            party_id,
            fleet_id,
            dirty: false,
        })
    }

    pub(crate) fn write(&self, w: &mut EntityWriter) {
        w.write_entity_id(self.id);
        w.write_string(&self.hero_id);
        w.write_string(&self.display_name);
        w.write_nullable_string(self.first_name.as_deref());
        w.write_u8(self.gender.to_u8());
        w.write_i32(self.age);
        w.write_i32(self.level);
        w.write_i32(self.experience);
        w.write_i32(self.unspent_attribute_points);
        w.write_i32(self.unspent_focus_points);
        w.write_i32(self.gold);
        w.write_f32(self.health);
        w.write_u8(self.state.to_u8());
        self.attributes.write(w);
        self.skills.write(w);
        match &self.naval {
            Some(naval) => {
                w.write_bool(true);
                naval.write(w);
            }
            None => w.write_bool(false),
        }
        w.write_u32(self.perk_ids.len() as u32);
        for perk_id in &self.perk_ids {
            w.write_u32(*perk_id);
        }
        w.write_nullable_entity_id(self.clan_id);
        w.write_nullable_entity_id(self.party_id);
        w.write_nullable_entity_id(self.fleet_id);
    }
}
