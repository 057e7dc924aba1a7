//! Shared helpers - Rank tables and spell lookups used by both classes

use sod_core::prelude::*;

/// A row of a spell's rank table
pub trait Ranked {
    fn required_level(&self) -> u32;
}

/// Highest rank a character of `level` knows
///
/// Rank tables are ordered from rank 1 upwards.
pub fn highest_rank<T: Ranked>(ranks: &[T], level: u32) -> Option<&T> {
    ranks.iter().rev().find(|rank| rank.required_level() <= level)
}

/// Spells of `unit` whose label is one of `labels`
pub fn spells_labeled(sim: &Simulation, unit: UnitId, labels: &[&str]) -> Vec<SpellId> {
    sim.unit(unit)
        .spells()
        .iter()
        .copied()
        .filter(|spell| labels.contains(&sim.spell(*spell).label()))
        .collect()
}

/// Run `f` on the config of every spell of `unit` labeled one of `labels`
pub fn modify_spells(
    sim: &mut Simulation,
    unit: UnitId,
    labels: &[&str],
    f: impl Fn(&mut SpellConfig),
) {
    for spell in spells_labeled(sim, unit, labels) {
        f(&mut sim.spell_mut(spell).config);
    }
}

/// True if `spell` is labeled one of `labels`
pub fn is_labeled(sim: &Simulation, spell: SpellId, labels: &[&str]) -> bool {
    labels.contains(&sim.spell(spell).label())
}

/// Whether the caster's target has any bleed running
pub fn target_has_bleed(sim: &Simulation, caster: UnitId, target: UnitId) -> bool {
    spells_labeled(sim, caster, &["Rake", "Rip"])
        .into_iter()
        .any(|spell| sim.is_dot_active(spell, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(u32);

    impl Ranked for Row {
        fn required_level(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn test_highest_rank() {
        let ranks = [Row(1), Row(20), Row(40), Row(60)];
        assert_eq!(highest_rank(&ranks, 60).map(|r| r.0), Some(60));
        assert_eq!(highest_rank(&ranks, 45).map(|r| r.0), Some(40));
        assert_eq!(highest_rank(&ranks, 19).map(|r| r.0), Some(1));
    }

    #[test]
    fn test_no_rank_below_first_level() {
        let ranks = [Row(10), Row(20)];
        assert!(highest_rank(&ranks, 5).is_none());
    }

    #[test]
    fn test_modify_spells_by_label() {
        let mut sim = Simulation::with_defaults(1);
        let unit = sim.add_unit(Unit::new("Caster", UnitKind::Player, 60));
        let wrath = sim.register_spell(unit, SpellConfig::new("Wrath", ActionId::spell(9912)));
        let other = sim.register_spell(unit, SpellConfig::new("Starfire", ActionId::spell(25298)));

        modify_spells(&mut sim, unit, &["Wrath"], |config| config.bonus_crit += 3.0);
        assert!((sim.spell(wrath).config.bonus_crit - 3.0).abs() < f64::EPSILON);
        assert!(sim.spell(other).config.bonus_crit.abs() < f64::EPSILON);
        assert!(is_labeled(&sim, other, &["Wrath", "Starfire"]));
    }
}
