//! Outcome resolution - Hit, crit, dodge and glance rolls
//!
//! Every roll draws from the simulation's seeded rng, so a fixed seed
//! always reproduces the same sequence of outcomes.

use super::result::SpellResult;
use crate::defense::{binary_hit_chance, resist_coefficient, AttackTable, ResistInput};
use crate::sim::Simulation;
use crate::stats::Stat;
use crate::types::{HitOutcome, ProcMask, SpellFlags, SpellId, UnitId};

/// Which attack table a damage calculation rolls on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Spell hit roll, then a crit roll if it landed
    MagicHitAndCrit,
    MagicHit,
    /// Always lands, then rolls for crit
    MagicCrit,
    AlwaysHit,
    /// One roll over miss, dodge, crit, hit
    MeleeSpecialHitAndCrit,
    /// One roll over miss, dodge, glance, crit, hit
    MeleeWhite,
    /// Periodic tick that cannot crit
    Tick,
    /// Periodic tick rolling against the dot's snapshot crit chance
    SnapshotCrit,
}

/// Crit damage multiplier: `1 + (base - 1) * (1 + bonus)`
///
/// With a 1.5 spell base, a +100% bonus yields 2.0.
pub fn crit_multiplier(base: f64, bonus: f64) -> f64 {
    1.0 + (base - 1.0) * (1.0 + bonus)
}

impl Simulation {
    pub fn attack_table(&self, attacker: UnitId, target: UnitId) -> AttackTable {
        AttackTable::new(
            self.unit(attacker).level,
            self.unit(target).level,
            &self.constants.hit,
        )
    }

    /// Resistance coefficient of `target` against `spell`, in `[0, 1]`
    pub fn resist_coefficient(&self, spell: SpellId, target: UnitId) -> f64 {
        let spell_ref = self.spell(spell);
        let caster = self.unit(spell_ref.caster);
        let target_unit = self.unit(target);
        let input = ResistInput {
            resistance: target_unit.resistance(spell_ref.config.school),
            penetration: caster.stat(Stat::SpellPenetration),
            attacker_level: caster.level,
            target_level: target_unit.level,
            target_is_enemy: target_unit.is_enemy(),
            binary: spell_ref.config.flags.contains(SpellFlags::BINARY),
            pure_dot: spell_ref.config.flags.contains(SpellFlags::PURE_DOT),
        };
        resist_coefficient(&input, &self.constants.resist)
    }

    /// Chance for a spell to land, including the binary resist penalty
    pub fn spell_hit_chance(&self, spell: SpellId, target: UnitId) -> f64 {
        let spell_ref = self.spell(spell);
        let caster = self.unit(spell_ref.caster);
        let table = self.attack_table(spell_ref.caster, target);
        let hit = caster.spell_hit_percent() + spell_ref.config.bonus_hit;
        let mut chance = 1.0 - table.spell_miss_chance(hit);

        let flags = spell_ref.config.flags;
        if flags.contains(SpellFlags::BINARY)
            && !flags.contains(SpellFlags::IGNORE_RESISTS)
            && !spell_ref.config.school.is_physical()
        {
            chance *= binary_hit_chance(self.resist_coefficient(spell, target));
        }
        chance.clamp(0.0, 1.0)
    }

    /// Spell crit chance as a fraction
    pub fn spell_crit_chance(&self, spell: SpellId, _target: UnitId) -> f64 {
        let spell_ref = self.spell(spell);
        let caster = self.unit(spell_ref.caster);
        ((caster.spell_crit_percent() + spell_ref.config.bonus_crit) / 100.0).clamp(0.0, 1.0)
    }

    /// Melee crit chance as a fraction, after level-based suppression
    pub fn melee_crit_chance(&self, spell: SpellId, target: UnitId) -> f64 {
        let spell_ref = self.spell(spell);
        let caster = self.unit(spell_ref.caster);
        let table = self.attack_table(spell_ref.caster, target);
        let crit = (caster.melee_crit_percent() + spell_ref.config.bonus_crit) / 100.0;
        (crit - table.crit_suppression).clamp(0.0, 1.0)
    }

    /// Crit multiplier of a spell: melee base 2.0, spell base 1.5 by default
    pub fn spell_crit_multiplier(&self, spell: SpellId) -> f64 {
        let config = &self.spell(spell).config;
        let base = if config.proc_mask.intersects(ProcMask::MELEE) {
            self.constants.crit.melee_multiplier
        } else {
            self.constants.crit.spell_multiplier
        };
        crit_multiplier(base, config.crit_damage_bonus)
    }

    /// Roll `kind` and adjust `result.damage` accordingly
    pub(crate) fn apply_outcome(
        &mut self,
        result: &mut SpellResult,
        kind: OutcomeKind,
        snapshot_crit_chance: f64,
    ) {
        let partial = result.outcome.intersection(HitOutcome::PARTIAL);
        let spell = result.spell;
        let target = result.target;

        let outcome = match kind {
            OutcomeKind::MagicHitAndCrit => {
                if self.roll_spell_hit(spell, target) {
                    self.roll_spell_crit(spell, target)
                } else {
                    HitOutcome::MISS
                }
            }
            OutcomeKind::MagicHit => {
                if self.roll_spell_hit(spell, target) {
                    HitOutcome::HIT
                } else {
                    HitOutcome::MISS
                }
            }
            OutcomeKind::MagicCrit => self.roll_spell_crit(spell, target),
            OutcomeKind::AlwaysHit => HitOutcome::HIT,
            OutcomeKind::MeleeSpecialHitAndCrit => self.roll_melee(spell, target, false),
            OutcomeKind::MeleeWhite => self.roll_melee(spell, target, true),
            OutcomeKind::Tick => HitOutcome::TICK,
            OutcomeKind::SnapshotCrit => {
                if self.random_float("Snapshot Crit") < snapshot_crit_chance {
                    HitOutcome::TICK | HitOutcome::CRIT
                } else {
                    HitOutcome::TICK
                }
            }
        };

        if !outcome.landed() {
            result.outcome = outcome;
            result.damage = 0.0;
            return;
        }

        result.outcome = outcome | partial;
        if outcome.did_crit() {
            result.damage *= self.spell_crit_multiplier(spell);
        } else if outcome.did_glance() {
            result.damage *= self.constants.crit.glance_multiplier;
        }
    }

    fn roll_spell_hit(&mut self, spell: SpellId, target: UnitId) -> bool {
        let chance = self.spell_hit_chance(spell, target);
        self.random_float("Spell Hit") < chance
    }

    fn roll_spell_crit(&mut self, spell: SpellId, target: UnitId) -> HitOutcome {
        let chance = self.spell_crit_chance(spell, target);
        if self.random_float("Spell Crit") < chance {
            HitOutcome::CRIT
        } else {
            HitOutcome::HIT
        }
    }

    fn roll_melee(&mut self, spell: SpellId, target: UnitId, white: bool) -> HitOutcome {
        let caster = self.spell(spell).caster;
        let table = self.attack_table(caster, target);
        let hit = self.unit(caster).melee_hit_percent() + self.spell(spell).config.bonus_hit;

        let miss = table.melee_miss_chance(hit);
        let dodge = miss + table.dodge;
        let glance = if white { dodge + table.glance } else { dodge };
        let crit = glance + self.melee_crit_chance(spell, target);

        let roll = self.random_float("Melee Attack Table");
        if roll < miss {
            HitOutcome::MISS
        } else if roll < dodge {
            HitOutcome::DODGE
        } else if roll < glance {
            HitOutcome::GLANCE
        } else if roll < crit {
            HitOutcome::CRIT
        } else {
            HitOutcome::HIT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crit_multiplier() {
        assert!((crit_multiplier(1.5, 0.0) - 1.5).abs() < 1e-9);
        // Vengeance 5/5: +100% crit bonus
        assert!((crit_multiplier(1.5, 1.0) - 2.0).abs() < 1e-9);
        assert!((crit_multiplier(2.0, 0.0) - 2.0).abs() < 1e-9);
        assert!((crit_multiplier(2.0, 0.5) - 2.5).abs() < 1e-9);
    }
}
