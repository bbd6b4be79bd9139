//! Campaign object graph, entity decoders/encoders, and reference
//! resolver for Mount & Blade II: Bannerlord `.sav` files.
//!
//! This crate sits on top of `save-codec`'s wire-format primitives and
//! owns everything `save-codec` deliberately knows nothing about: what a
//! hero, a party, a fleet, or a clan look like on the wire, how to turn
//! opaque 64-bit ids into an in-memory object graph after decode, and the
//! range-checked edit API callers mutate that graph through.

mod campaign_time;
mod error;
mod faction;
mod fleet;
mod hero;
mod ids;
mod metadata;
mod party;
mod resolver;
mod savefile;
mod settlement;
mod ship;
mod unknown_segment;

pub use campaign_time::{CampaignTime, BASE_YEAR, DAYS_PER_SEASON, HOURS_PER_DAY, SEASONS_PER_YEAR, TICKS_PER_HOUR};
pub use error::{Error, Result};
pub use faction::{Faction, FactionKind, CLAN_SEGMENT_ID, FACTION_SEGMENT_ID, KINGDOM_SEGMENT_ID};
pub use fleet::{Fleet, FleetState, NavalPosition};
pub use hero::{Attributes, Gender, Hero, HeroState, NavalSkills, Skills};
pub use ids::{index_of, make_entity_id, type_tag, type_tag_of};
pub use metadata::Metadata;
pub use party::{Party, PartyState, PartyType, Position2D, TroopStack};
pub use resolver::{DanglingReference, Resolver};
pub use savefile::{Header, ModuleRecord, SaveFile};
pub use settlement::{Settlement, SettlementType};
pub use ship::{CargoEntry, Ship, ShipType};
pub use unknown_segment::UnknownSegment;
