//! Entity id type tags.
//!
//! An entity id is a plain `u64` as far as `save-codec` is concerned; this
//! module defines the high-32-bit type tags campaign code uses to tell
//! what kind of entity a given id refers to, and a small helper for
//! pulling that tag back out.

/// Type tag occupying the high 32 bits of an entity id. The low 32 bits
/// are a per-type sequential index assigned at creation time.
pub mod type_tag {
    pub const HERO: u32 = 1;
    pub const PARTY: u32 = 2;
    pub const SETTLEMENT: u32 = 3;
    pub const CLAN: u32 = 4;
    pub const KINGDOM: u32 = 5;
    pub const FACTION: u32 = 6;

    pub const ARMY: u32 = 10;
    pub const MAP_EVENT: u32 = 11;
    pub const SIEGE: u32 = 12;

    pub const WORKSHOP: u32 = 20;
    pub const CARAVAN: u32 = 21;
    pub const VILLAGE: u32 = 22;
    pub const TOWN: u32 = 23;
    pub const CASTLE: u32 = 24;

    pub const QUEST: u32 = 30;
    pub const ISSUE: u32 = 31;

    pub const ITEM_OBJECT: u32 = 50;
    pub const ITEM_ROSTER: u32 = 51;
    pub const EQUIPMENT: u32 = 52;

    pub const FLEET: u32 = 100;
    pub const SHIP: u32 = 101;
    pub const PORT: u32 = 102;
    pub const SEA_ROUTE: u32 = 103;
    pub const NAVAL_BATTLE: u32 = 104;

    pub const CHARACTER_OBJECT: u32 = 200;
    pub const CULTURE_OBJECT: u32 = 201;
    pub const POLICY_OBJECT: u32 = 202;
    pub const BUILDING_TYPE: u32 = 203;

    /// Reserved for modded content; the low 32 bits remain a free index
    /// within this tag rather than a sub-tag.
    pub const CUSTOM: u32 = 1000;
}

/// Builds an entity id from a type tag and a per-type index.
pub fn make_entity_id(tag: u32, index: u32) -> u64 {
    (u64::from(tag) << 32) | u64::from(index)
}

/// Extracts the type tag (high 32 bits) from an entity id.
pub fn type_tag_of(id: u64) -> u32 {
    (id >> 32) as u32
}

/// Extracts the per-type index (low 32 bits) from an entity id.
pub fn index_of(id: u64) -> u32 {
    id as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_tag_and_index() {
        let id = make_entity_id(type_tag::HERO, 42);
        assert_eq!(type_tag_of(id), type_tag::HERO);
        assert_eq!(index_of(id), 42);
    }

    #[test]
    fn distinct_tags_do_not_collide_on_same_index() {
        let hero = make_entity_id(type_tag::HERO, 1);
        let party = make_entity_id(type_tag::PARTY, 1);
        assert_ne!(hero, party);
    }

    #[test]
    fn custom_tag_is_reserved_above_known_tags() {
        assert!(type_tag::CUSTOM > type_tag::BUILDING_TYPE);
    }
}
