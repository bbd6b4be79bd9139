//! Validation reporter: aggregates structural and cross-entity checks into
//! a report consumed by callers. Never mutates the save and never
//! propagates findings as errors.

use save_model::{Attributes, Skills, SaveFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub severity: Severity,
    pub description: String,
    /// Entity ids this finding is about, if any.
    pub entity_ids: Vec<u64>,
}

impl Finding {
    fn new(severity: Severity, description: impl Into<String>, entity_ids: Vec<u64>) -> Self {
        Self {
            severity,
            description: description.into(),
            entity_ids,
        }
    }
}

/// A validation pass's findings, already bucketed by severity for
/// convenient reporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub infos: Vec<Finding>,
}

impl ValidationReport {
    fn push(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Error => self.errors.push(finding),
            Severity::Warning => self.warnings.push(finding),
            Severity::Info => self.infos.push(finding),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.infos.is_empty()
    }
}

/// Runs every structural, cross-entity, and header/module check against
/// `save` and returns the aggregated report.
pub fn validate(save: &SaveFile) -> ValidationReport {
    let mut report = ValidationReport::default();
    let resolver = save.resolver();

    check_dangling_references(save, &resolver, &mut report);
    check_numeric_ranges(save, &mut report);
    check_wounded_vs_count(save, &mut report);
    check_cross_entity(save, &resolver, &mut report);
    check_header_and_modules(save, &mut report);
    check_empty_required_ids(save, &mut report);

    report
}

fn check_dangling_references(save: &SaveFile, resolver: &save_model::Resolver, report: &mut ValidationReport) {
    for dangling in &resolver.dangling {
        let _ = save;
        report.push(Finding::new(
            Severity::Warning,
            format!(
                "dangling reference: field `{}` on entity {:#018x} points to missing entity {:#018x}",
                dangling.field, dangling.referrer_id, dangling.target_id
            ),
            vec![dangling.referrer_id],
        ));
    }
}

fn check_numeric_ranges(save: &SaveFile, report: &mut ValidationReport) {
    for hero in &save.heroes {
        if !(0.0..=1.0).contains(&hero.health()) {
            report.push(Finding::new(
                Severity::Error,
                format!("hero health {} outside [0, 1]", hero.health()),
                vec![hero.id],
            ));
        }
        if hero.gold() < 0 {
            report.push(Finding::new(
                Severity::Error,
                format!("hero gold {} is negative", hero.gold()),
                vec![hero.id],
            ));
        }
        for (name, value) in attribute_fields(hero.attributes()) {
            if !(Attributes::MIN..=Attributes::MAX).contains(&value) {
                report.push(Finding::new(
                    Severity::Error,
                    format!("hero attribute `{name}` {value} outside [{}, {}]", Attributes::MIN, Attributes::MAX),
                    vec![hero.id],
                ));
            }
        }
        for (name, value) in skill_fields(hero.skills()) {
            if !(Skills::MIN..=Skills::MAX).contains(&value) {
                report.push(Finding::new(
                    Severity::Error,
                    format!("hero skill `{name}` {value} outside [{}, {}]", Skills::MIN, Skills::MAX),
                    vec![hero.id],
                ));
            }
        }
    }
    for party in &save.parties {
        if !(0.0..=100.0).contains(&party.morale()) {
            report.push(Finding::new(
                Severity::Error,
                format!("party morale {} outside [0, 100]", party.morale()),
                vec![party.id],
            ));
        }
    }
}

fn check_wounded_vs_count(save: &SaveFile, report: &mut ValidationReport) {
    for party in &save.parties {
        for stack in party.troops.iter().chain(party.prisoners.iter()) {
            if stack.wounded() > stack.count() {
                report.push(Finding::new(
                    Severity::Error,
                    format!(
                        "troop stack `{}` has wounded ({}) greater than count ({})",
                        stack.display_name,
                        stack.wounded(),
                        stack.count()
                    ),
                    vec![party.id],
                ));
            }
        }
    }
}

fn check_cross_entity(save: &SaveFile, resolver: &save_model::Resolver, report: &mut ValidationReport) {
    for fleet in &save.fleets {
        if let Some(flagship_id) = fleet.flagship_id {
            if !fleet.ship_ids.contains(&flagship_id) {
                report.push(Finding::new(
                    Severity::Warning,
                    format!(
                        "fleet {:#018x}'s flagship {:#018x} is not among its own ships",
                        fleet.id, flagship_id
                    ),
                    vec![fleet.id],
                ));
            }
        }
    }
    for ship in &save.ships {
        if let Some(fleet_id) = ship.fleet_id {
            match resolver.fleet(fleet_id, &save.fleets) {
                Some(fleet) if !fleet.ship_ids.contains(&ship.id) => {
                    report.push(Finding::new(
                        Severity::Warning,
                        format!(
                            "ship {:#018x} claims fleet {:#018x}, but that fleet does not list it",
                            ship.id, fleet_id
                        ),
                        vec![ship.id, fleet_id],
                    ));
                }
                _ => {}
            }
        }
    }
    for party in &save.parties {
        if let Some(leader_id) = party.leader_id {
            if let Some(leader) = resolver.hero(leader_id, &save.heroes) {
                if leader.state == save_model::HeroState::Dead {
                    report.push(Finding::new(
                        Severity::Warning,
                        format!("party {:#018x}'s leader {:#018x} is dead", party.id, leader_id),
                        vec![party.id, leader_id],
                    ));
                }
            }
        }
    }
}

fn attribute_fields(attributes: &Attributes) -> [(&'static str, i32); 6] {
    [
        ("vigor", attributes.vigor),
        ("control", attributes.control),
        ("endurance", attributes.endurance),
        ("cunning", attributes.cunning),
        ("social", attributes.social),
        ("intelligence", attributes.intelligence),
    ]
}

fn skill_fields(skills: &Skills) -> [(&'static str, i32); 18] {
    [
        ("one_handed", skills.one_handed),
        ("two_handed", skills.two_handed),
        ("polearm", skills.polearm),
        ("bow", skills.bow),
        ("crossbow", skills.crossbow),
        ("throwing", skills.throwing),
        ("riding", skills.riding),
        ("athletics", skills.athletics),
        ("smithing", skills.smithing),
        ("scouting", skills.scouting),
        ("tactics", skills.tactics),
        ("roguery", skills.roguery),
        ("charm", skills.charm),
        ("leadership", skills.leadership),
        ("trade", skills.trade),
        ("steward", skills.steward),
        ("medicine", skills.medicine),
        ("engineering", skills.engineering),
    ]
}

/// An entity id of `0` is the documented empty sentinel, never a valid
/// identity for an entity that exists in the graph.
fn check_empty_required_ids(save: &SaveFile, report: &mut ValidationReport) {
    let mut check = |id: u64, kind: &str| {
        if id == 0 {
            report.push(Finding::new(Severity::Error, format!("{kind} has the empty (zero) entity id"), vec![id]));
        }
    };
    for hero in &save.heroes {
        check(hero.id, "hero");
    }
    for party in &save.parties {
        check(party.id, "party");
    }
    for settlement in &save.settlements {
        check(settlement.id, "settlement");
    }
    for faction in save.factions.iter().chain(&save.clans).chain(&save.kingdoms) {
        check(faction.id, "faction");
    }
    for fleet in &save.fleets {
        check(fleet.id, "fleet");
    }
    for ship in &save.ships {
        check(ship.id, "ship");
    }
}

fn check_header_and_modules(save: &SaveFile, report: &mut ValidationReport) {
    if save.header.game_version.is_empty() {
        report.push(Finding::new(Severity::Warning, "game-version string is empty", vec![]));
    }
    if save.modules.is_empty() {
        report.push(Finding::new(Severity::Info, "module list is empty", vec![]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use save_model::{Header, Metadata};

    fn empty_header() -> Header {
        Header {
            version: 7,
            game_version: "v1.3.10.12".to_string(),
            compressed_size: 0,
            uncompressed_size: 0,
        }
    }

    #[test]
    fn clean_empty_save_produces_no_errors() {
        let save = SaveFile::decode_payload(empty_header(), vec![], Metadata::default(), &[], false).unwrap();
        let report = validate(&save);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn empty_game_version_is_a_warning() {
        let mut header = empty_header();
        header.game_version = String::new();
        let save = SaveFile::decode_payload(header, vec![], Metadata::default(), &[], false).unwrap();
        let report = validate(&save);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn empty_modules_is_an_info_finding() {
        let save = SaveFile::decode_payload(empty_header(), vec![], Metadata::default(), &[], false).unwrap();
        let report = validate(&save);
        assert_eq!(report.infos.len(), 1);
    }
}
