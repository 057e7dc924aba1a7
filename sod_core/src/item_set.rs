//! Item sets - Bonuses unlocked by wearing several pieces of a set

use crate::error::{Result, SimError};
use crate::sim::Simulation;
use crate::types::UnitId;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Applies one set bonus to the wearer
pub type SetBonus = fn(&mut Simulation, UnitId);

#[derive(Debug, Clone)]
pub struct ItemSet {
    pub name: String,
    /// Pieces required → bonus
    pub bonuses: BTreeMap<u32, SetBonus>,
}

impl ItemSet {
    pub fn new(name: impl Into<String>) -> Self {
        ItemSet {
            name: name.into(),
            bonuses: BTreeMap::new(),
        }
    }

    pub fn with_bonus(mut self, pieces: u32, bonus: SetBonus) -> Self {
        self.bonuses.insert(pieces, bonus);
        self
    }

    /// Bonuses unlocked by wearing `pieces` items
    pub fn active_bonuses(&self, pieces: u32) -> impl Iterator<Item = (u32, SetBonus)> + '_ {
        self.bonuses
            .range(..=pieces)
            .map(|(count, bonus)| (*count, *bonus))
    }
}

/// Item sets known to a class, looked up by name
#[derive(Debug, Clone, Default)]
pub struct ItemSetRegistry {
    sets: HashMap<String, ItemSet>,
}

impl ItemSetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, set: ItemSet) {
        self.sets.insert(set.name.clone(), set);
    }

    pub fn get(&self, name: &str) -> Option<&ItemSet> {
        self.sets.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Apply every bonus the equipped piece counts unlock
    ///
    /// Returns the applied bonuses as `"<set> (<pieces>)"`.
    pub fn apply(
        &self,
        sim: &mut Simulation,
        unit: UnitId,
        equipped: &BTreeMap<String, u32>,
    ) -> Result<Vec<String>> {
        let mut applied = Vec::new();
        for (name, pieces) in equipped {
            let set = self
                .get(name)
                .ok_or_else(|| SimError::UnknownItemSet(name.clone()))?;
            for (count, bonus) in set.active_bonuses(*pieces) {
                bonus(sim, unit);
                debug!(set = %name, pieces = count, "applied set bonus");
                applied.push(format!("{} ({})", name, count));
            }
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    fn two_piece(sim: &mut Simulation, unit: UnitId) {
        sim.unit_mut(unit).add_stat(Stat::SpellPower, 12.0);
    }

    fn three_piece(sim: &mut Simulation, unit: UnitId) {
        sim.unit_mut(unit).add_stat(Stat::SpellCrit, 1.0);
    }

    fn registry() -> ItemSetRegistry {
        let mut registry = ItemSetRegistry::new();
        registry.register(
            ItemSet::new("Test Regalia")
                .with_bonus(2, two_piece)
                .with_bonus(3, three_piece),
        );
        registry
    }

    #[test]
    fn test_applies_bonuses_up_to_piece_count() {
        let mut sim = Simulation::with_defaults(1);
        let unit = sim.add_unit(Unit::new("Player", UnitKind::Player, 60));
        let equipped = BTreeMap::from([("Test Regalia".to_string(), 2)]);

        let applied = registry().apply(&mut sim, unit, &equipped).unwrap();
        assert_eq!(applied, vec!["Test Regalia (2)".to_string()]);
        assert!((sim.unit(unit).stat(Stat::SpellPower) - 12.0).abs() < 1e-9);
        assert!(sim.unit(unit).stat(Stat::SpellCrit).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_set_is_error() {
        let mut sim = Simulation::with_defaults(1);
        let unit = sim.add_unit(Unit::new("Player", UnitKind::Player, 60));
        let equipped = BTreeMap::from([("Missing".to_string(), 3)]);
        let err = registry().apply(&mut sim, unit, &equipped).unwrap_err();
        assert!(matches!(err, SimError::UnknownItemSet(name) if name == "Missing"));
    }
}
