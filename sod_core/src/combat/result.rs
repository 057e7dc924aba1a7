//! SpellResult - Outcome of one damage calculation

use crate::types::{HitOutcome, SpellId, UnitId};
use serde::{Deserialize, Serialize};

/// A resolved hit or tick, ready to be dealt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellResult {
    pub spell: SpellId,
    pub caster: UnitId,
    pub target: UnitId,
    pub outcome: HitOutcome,
    /// Final damage after every multiplier, mitigation and the outcome
    pub damage: f64,
    /// Damage before armor or partial resists
    pub pre_mitigation_damage: f64,
    pub periodic: bool,
}

impl SpellResult {
    pub fn new(spell: SpellId, caster: UnitId, target: UnitId, periodic: bool) -> Self {
        SpellResult {
            spell,
            caster,
            target,
            outcome: HitOutcome::empty(),
            damage: 0.0,
            pre_mitigation_damage: 0.0,
            periodic,
        }
    }

    pub fn landed(&self) -> bool {
        self.outcome.landed()
    }

    pub fn did_crit(&self) -> bool {
        self.outcome.did_crit()
    }

    /// Damage lost to armor or partial resists
    pub fn mitigated(&self) -> f64 {
        if !self.landed() {
            return 0.0;
        }
        (self.pre_mitigation_damage - self.damage).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_result_has_not_landed() {
        let result = SpellResult::new(SpellId(1), UnitId(1), UnitId(0), false);
        assert!(!result.landed());
        assert!(result.damage.abs() < f64::EPSILON);
    }

    #[test]
    fn test_mitigated() {
        let mut result = SpellResult::new(SpellId(1), UnitId(1), UnitId(0), false);
        result.outcome = HitOutcome::HIT | HitOutcome::PARTIAL_2_4;
        result.pre_mitigation_damage = 400.0;
        result.damage = 200.0;
        assert!((result.mitigated() - 200.0).abs() < 0.01);

        result.outcome = HitOutcome::MISS;
        assert!(result.mitigated().abs() < f64::EPSILON);
    }
}
