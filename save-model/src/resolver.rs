//! Post-decode reference resolution.
//!
//! The resolver never owns entities — `SaveFile` keeps the owning
//! collections. It only builds id → index maps and reports dangling
//! references; convenience lookups take the relevant slice as an
//! argument rather than the resolver holding borrowed pointers into it.

use std::collections::HashMap;

use crate::faction::Faction;
use crate::fleet::Fleet;
use crate::hero::Hero;
use crate::party::Party;
use crate::ship::Ship;

/// A non-null reference field that pointed at an id absent from the
/// corresponding collection once the whole save had decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub referrer_id: u64,
    pub field: &'static str,
    pub target_id: u64,
}

#[derive(Debug, Default)]
pub struct Resolver {
    heroes_by_id: HashMap<u64, usize>,
    parties_by_id: HashMap<u64, usize>,
    clans_by_id: HashMap<u64, usize>,
    fleets_by_id: HashMap<u64, usize>,
    ships_by_id: HashMap<u64, usize>,
    pub dangling: Vec<DanglingReference>,
}

fn check(
    dangling: &mut Vec<DanglingReference>,
    referrer_id: u64,
    field: &'static str,
    target: Option<u64>,
    map: &HashMap<u64, usize>,
) {
    if let Some(target_id) = target {
        if !map.contains_key(&target_id) {
            dangling.push(DanglingReference {
                referrer_id,
                field,
                target_id,
            });
        }
    }
}

impl Resolver {
    pub fn build(
        heroes: &[Hero],
        parties: &[Party],
        clans: &[Faction],
        fleets: &[Fleet],
        ships: &[Ship],
    ) -> Self {
        let heroes_by_id: HashMap<u64, usize> =
            heroes.iter().enumerate().map(|(i, h)| (h.id, i)).collect();
        let parties_by_id: HashMap<u64, usize> =
            parties.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
        let clans_by_id: HashMap<u64, usize> =
            clans.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
        let fleets_by_id: HashMap<u64, usize> =
            fleets.iter().enumerate().map(|(i, f)| (f.id, i)).collect();
        let ships_by_id: HashMap<u64, usize> =
            ships.iter().enumerate().map(|(i, s)| (s.id, i)).collect();

        let mut dangling = Vec::new();

        for hero in heroes {
            check(&mut dangling, hero.id, "hero.clan_id", hero.clan_id, &clans_by_id);
            check(&mut dangling, hero.id, "hero.party_id", hero.party_id, &parties_by_id);
            check(&mut dangling, hero.id, "hero.fleet_id", hero.fleet_id, &fleets_by_id);
        }
        for party in parties {
            check(&mut dangling, party.id, "party.leader_id", party.leader_id, &heroes_by_id);
            check(&mut dangling, party.id, "party.clan_id", party.clan_id, &clans_by_id);
        }
        for fleet in fleets {
            check(&mut dangling, fleet.id, "fleet.admiral_id", fleet.admiral_id, &heroes_by_id);
            check(&mut dangling, fleet.id, "fleet.clan_id", fleet.clan_id, &clans_by_id);
            check(&mut dangling, fleet.id, "fleet.flagship_id", fleet.flagship_id, &ships_by_id);
            for ship_id in &fleet.ship_ids {
                check(&mut dangling, fleet.id, "fleet.ship_ids", Some(*ship_id), &ships_by_id);
            }
        }
        for ship in ships {
            check(&mut dangling, ship.id, "ship.fleet_id", ship.fleet_id, &fleets_by_id);
        }

        Resolver {
            heroes_by_id,
            parties_by_id,
            clans_by_id,
            fleets_by_id,
            ships_by_id,
            dangling,
        }
    }

    pub fn hero<'a>(&self, id: u64, heroes: &'a [Hero]) -> Option<&'a Hero> {
        self.heroes_by_id.get(&id).map(|&i| &heroes[i])
    }

    pub fn party<'a>(&self, id: u64, parties: &'a [Party]) -> Option<&'a Party> {
        self.parties_by_id.get(&id).map(|&i| &parties[i])
    }

    pub fn clan<'a>(&self, id: u64, clans: &'a [Faction]) -> Option<&'a Faction> {
        self.clans_by_id.get(&id).map(|&i| &clans[i])
    }

    pub fn fleet<'a>(&self, id: u64, fleets: &'a [Fleet]) -> Option<&'a Fleet> {
        self.fleets_by_id.get(&id).map(|&i| &fleets[i])
    }

    pub fn ship<'a>(&self, id: u64, ships: &'a [Ship]) -> Option<&'a Ship> {
        self.ships_by_id.get(&id).map(|&i| &ships[i])
    }

    /// Resolves a fleet's `ship_ids` into the `Ship`s themselves, in order,
    /// skipping any that turned out dangling.
    pub fn ships_in_fleet<'a>(&self, fleet: &Fleet, ships: &'a [Ship]) -> Vec<&'a Ship> {
        fleet
            .ship_ids
            .iter()
            .filter_map(|id| self.ship(*id, ships))
            .collect()
    }
}
