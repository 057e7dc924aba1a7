//! Damage calculation - Multipliers, mitigation and dealing damage

use crate::combat::{OutcomeKind, SpellResult};
use crate::defense::{armor_damage_modifier, partial_resist_thresholds, roll_partial_resist};
use crate::sim::Simulation;
use crate::stats::Stat;
use crate::types::{SpellFlags, SpellId, UnitId};
use std::time::Duration;
use tracing::trace;

impl Simulation {
    /// Caster-side multiplier for a spell: spell, caster and school multipliers
    pub fn attacker_multiplier(&self, spell: SpellId, periodic: bool) -> f64 {
        let spell_ref = self.spell(spell);
        let caster = self.unit(spell_ref.caster);
        let config = &spell_ref.config;
        let mut multiplier = config.damage_multiplier
            * config.damage_multiplier_additive
            * caster.pseudo.damage_dealt_multiplier
            * caster.pseudo.school_dealt(config.school);
        if periodic {
            multiplier *= caster.pseudo.periodic_damage_dealt_multiplier;
        }
        multiplier
    }

    /// Target-side multiplier: damage taken, school taken and periodic taken
    pub fn target_multiplier(&self, spell: SpellId, target: UnitId, periodic: bool) -> f64 {
        let school = self.spell(spell).config.school;
        let pseudo = &self.unit(target).pseudo;
        let mut multiplier = pseudo.damage_taken_multiplier * pseudo.school_taken(school);
        if periodic {
            multiplier *= pseudo.periodic_school_taken(school);
        }
        multiplier
    }

    /// Spell power of the caster in the spell's school
    pub fn spell_power_for(&self, spell: SpellId) -> f64 {
        let spell_ref = self.spell(spell);
        self.unit(spell_ref.caster).spell_power(spell_ref.config.school)
    }

    /// Direct damage: `(base + coefficient * spell power) * multipliers`, mitigated, then rolled
    pub fn calc_damage(
        &mut self,
        spell: SpellId,
        target: UnitId,
        base_damage: f64,
        outcome: OutcomeKind,
    ) -> SpellResult {
        let coefficient = self.spell(spell).config.bonus_coefficient;
        let raw = base_damage + coefficient * self.spell_power_for(spell);
        let damage = raw * self.attacker_multiplier(spell, false);
        self.finish_calc(spell, target, damage, false, outcome, 0.0)
    }

    /// Periodic damage calculated fresh (not from a snapshot)
    pub fn calc_periodic_damage(
        &mut self,
        spell: SpellId,
        target: UnitId,
        base_damage: f64,
        outcome: OutcomeKind,
    ) -> SpellResult {
        let coefficient = self
            .spell(spell)
            .config
            .dot
            .as_ref()
            .map(|d| d.bonus_coefficient)
            .unwrap_or(self.spell(spell).config.bonus_coefficient);
        let raw = base_damage + coefficient * self.spell_power_for(spell);
        let damage = raw * self.attacker_multiplier(spell, true);
        let crit_chance = self.spell_crit_chance(spell, target);
        self.finish_calc(spell, target, damage, true, outcome, crit_chance)
    }

    /// Resolve a hit whose attacker side is already computed
    pub(crate) fn finish_calc(
        &mut self,
        spell: SpellId,
        target: UnitId,
        attacker_damage: f64,
        periodic: bool,
        outcome: OutcomeKind,
        snapshot_crit_chance: f64,
    ) -> SpellResult {
        let caster = self.spell(spell).caster;
        let mut result = SpellResult::new(spell, caster, target, periodic);
        result.damage = attacker_damage * self.target_multiplier(spell, target, periodic);
        result.pre_mitigation_damage = result.damage;

        self.apply_mitigation(&mut result);
        self.apply_outcome(&mut result, outcome, snapshot_crit_chance);
        result
    }

    /// Roll an outcome without any damage, e.g. for debuffs and curses
    pub fn calc_outcome(&mut self, spell: SpellId, target: UnitId, outcome: OutcomeKind) -> SpellResult {
        let caster = self.spell(spell).caster;
        let mut result = SpellResult::new(spell, caster, target, false);
        self.apply_outcome(&mut result, outcome, 0.0);
        result
    }

    fn apply_mitigation(&mut self, result: &mut SpellResult) {
        let config = &self.spell(result.spell).config;
        let school = config.school;
        let flags = config.flags;

        if school.is_physical() {
            if result.periodic || flags.contains(SpellFlags::IGNORE_ARMOR) {
                return;
            }
            let attacker = self.unit(result.caster);
            let armor =
                (self.unit(result.target).armor() - attacker.stat(Stat::ArmorPenetration)).max(0.0);
            result.damage *= armor_damage_modifier(armor, attacker.level, &self.constants.armor);
            return;
        }

        if flags.contains(SpellFlags::BINARY) || flags.contains(SpellFlags::IGNORE_RESISTS) {
            return;
        }
        let coeff = self.resist_coefficient(result.spell, result.target);
        if coeff <= 0.0 {
            return;
        }
        let thresholds = partial_resist_thresholds(coeff);
        let roll = self.random_float("Partial Resist");
        let (multiplier, outcome) = roll_partial_resist(roll, &thresholds);
        result.damage *= multiplier;
        result.outcome |= outcome;
    }

    /// Record a result and fire the damage hooks
    ///
    /// Hook order: the caster's `on_spell_hit_dealt` (or
    /// `on_periodic_damage_dealt` for ticks), then the target's
    /// `on_spell_hit_taken`.
    pub fn deal_damage(&mut self, result: &SpellResult) {
        let spell = result.spell;
        if !self.spell(spell).has_flag(SpellFlags::NO_METRICS) {
            self.spell_mut(spell).metrics.record(result);
        }
        self.unit_mut(result.target).damage_taken += result.damage;

        if !self.spell(spell).has_flag(SpellFlags::NO_LOGS) {
            let label = self.spell(spell).label().to_string();
            let outcome = result.outcome.label();
            let damage = result.damage;
            let kind = if result.periodic { "tick" } else { "hit" };
            trace!(
                time = self.now().as_secs_f64(),
                spell = %label,
                outcome,
                damage,
                "{}",
                kind
            );
            self.log(result.caster, || {
                format!("{} {} {} for {:.1}", label, kind, outcome, damage)
            });
        }

        self.fire_damage_dealt(result);
        self.fire_damage_taken(result);
    }

    /// Calculate and immediately deal direct damage
    pub fn calc_and_deal_damage(
        &mut self,
        spell: SpellId,
        target: UnitId,
        base_damage: f64,
        outcome: OutcomeKind,
    ) -> SpellResult {
        let result = self.calc_damage(spell, target, base_damage, outcome);
        self.deal_damage(&result);
        result
    }

    /// Travel time of a projectile spell to the encounter target
    pub fn travel_time(&self, spell: SpellId) -> Duration {
        let speed = self.spell(spell).config.missile_speed;
        if speed <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64((self.encounter.distance_yards / speed).max(0.0))
    }

    /// Run `f` once the spell's projectile arrives
    pub fn wait_travel_time(&mut self, spell: SpellId, f: impl FnOnce(&mut Simulation) + 'static) {
        let delay = self.travel_time(spell);
        if delay.is_zero() {
            f(self);
        } else {
            let at = self.now() + delay;
            self.schedule_action(at, f);
        }
    }
}
