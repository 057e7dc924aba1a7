//! Casting - Cast checks, GCD, cooldowns, hardcasts and resource costs

use super::config::{Cost, GCD_MIN};
use crate::error::{Result, SimError};
use crate::sim::{Event, Simulation};
use crate::types::{SpellFlags, SpellId, UnitId};
use crate::unit::Hardcast;
use std::time::Duration;
use tracing::trace;

impl Simulation {
    /// Cast time after flat reductions and haste
    pub fn cast_time(&self, spell: SpellId) -> Duration {
        let spell_ref = self.spell(spell);
        let cast = &spell_ref.config.cast;
        let base = cast.cast_time.saturating_sub(cast.cast_time_reduction);
        if cast.ignore_haste || base.is_zero() {
            base
        } else {
            base.div_f64(self.unit(spell_ref.caster).cast_speed())
        }
    }

    /// GCD triggered by a spell after haste, never below one second
    pub fn gcd(&self, spell: SpellId) -> Duration {
        let spell_ref = self.spell(spell);
        let cast = &spell_ref.config.cast;
        if cast.gcd.is_zero() || cast.ignore_haste {
            return cast.gcd;
        }
        cast.gcd
            .div_f64(self.unit(spell_ref.caster).cast_speed())
            .max(GCD_MIN)
    }

    /// Resource cost the spell would pay right now
    pub fn spell_cost(&self, spell: SpellId) -> f64 {
        let spell_ref = self.spell(spell);
        let caster = self.unit(spell_ref.caster);
        let amount = spell_ref.config.cost.base_amount()
            * spell_ref.config.cost_multiplier
            * caster.pseudo.cost_multiplier;
        amount.max(0.0)
    }

    /// Why `spell` cannot be cast on `target` right now, if anything
    pub fn cast_blocker(&self, spell: SpellId, target: UnitId) -> Option<&'static str> {
        let spell_ref = self.spell(spell);
        let caster = self.unit(spell_ref.caster);
        let now = self.now();

        if caster.hardcast.is_some() || caster.channeling.is_some() {
            return Some("already casting");
        }
        if !spell_ref.config.cast.gcd.is_zero() && caster.gcd_ready > now {
            return Some("global cooldown");
        }
        if !spell_ref.is_ready(now) {
            return Some("on cooldown");
        }
        let cost = self.spell_cost(spell);
        let affordable = match spell_ref.config.cost {
            Cost::None => true,
            Cost::Mana { .. } => caster.current_mana() >= cost,
            Cost::Energy { .. } => caster.current_energy() >= cost,
        };
        if !affordable {
            return Some("not enough resources");
        }
        if let Some(condition) = &spell_ref.config.extra_cast_condition {
            if !condition(self, spell, target) {
                return Some("cast condition not met");
            }
        }
        None
    }

    pub fn can_cast(&self, spell: SpellId, target: UnitId) -> bool {
        self.cast_blocker(spell, target).is_none()
    }

    /// Start casting `spell` on `target`
    ///
    /// Instants resolve immediately. Hardcasts lock the caster and resolve
    /// when the cast finishes. Channels pay up front and deal damage through
    /// their dot.
    pub fn cast(&mut self, spell: SpellId, target: UnitId) -> Result<()> {
        if let Some(reason) = self.cast_blocker(spell, target) {
            return Err(SimError::CannotCast {
                spell: self.spell(spell).label().to_string(),
                reason: reason.to_string(),
            });
        }

        let now = self.now();
        let caster = self.spell(spell).caster;
        let cast_time = self.cast_time(spell);
        let gcd = self.gcd(spell);
        let cooldown = self.spell(spell).config.cooldown;
        let flags = self.spell(spell).config.flags;

        if !gcd.is_zero() {
            self.unit_mut(caster).gcd_ready = now + gcd.max(cast_time);
        }
        {
            let spell_mut = self.spell_mut(spell);
            spell_mut.cooldown_ready = now + cast_time + cooldown;
            spell_mut.metrics.casts += 1;
        }

        let label = self.spell(spell).label().to_string();
        trace!(time = now.as_secs_f64(), spell = %label, "cast started");

        if flags.contains(SpellFlags::RESET_ATTACK_SWING) {
            self.delay_swing(caster, now + cast_time);
        }

        if flags.contains(SpellFlags::CHANNELED) || cast_time.is_zero() {
            self.log(caster, || format!("Casts {}", label));
            self.pay_cost(spell);
            self.finish_cast(spell, target);
        } else {
            self.log(caster, || {
                format!("Begins casting {} ({:.2}s)", label, cast_time.as_secs_f64())
            });
            self.unit_mut(caster).hardcast = Some(Hardcast {
                spell,
                target,
                ends_at: now + cast_time,
            });
            self.schedule(now + cast_time, Event::CastComplete { unit: caster });
        }

        self.schedule_unit_ready(caster);
        Ok(())
    }

    pub(crate) fn complete_hardcast(&mut self, unit: UnitId) {
        let Some(hardcast) = self.unit_mut(unit).hardcast.take() else {
            return;
        };
        let label = self.spell(hardcast.spell).label().to_string();
        self.log(unit, || format!("Completes casting {}", label));
        self.pay_cost(hardcast.spell);
        self.finish_cast(hardcast.spell, hardcast.target);
        self.schedule_unit_ready(unit);
    }

    fn finish_cast(&mut self, spell: SpellId, target: UnitId) {
        if let Some(apply) = self.spell(spell).config.apply_effects.clone() {
            apply(self, spell, target);
        }
        if !self.spell(spell).has_flag(SpellFlags::NO_ON_CAST_COMPLETE) {
            self.fire_on_cast_complete(spell);
        }
    }

    fn pay_cost(&mut self, spell: SpellId) {
        let amount = self.spell_cost(spell);
        if amount <= 0.0 {
            return;
        }
        let now = self.now();
        let caster = self.spell(spell).caster;
        match self.spell(spell).config.cost {
            Cost::None => {}
            Cost::Mana { .. } => self.unit_mut(caster).spend_mana(amount, now),
            Cost::Energy { .. } => self.unit_mut(caster).spend_energy(amount),
        }
    }

    /// Return the refundable share of an energy cost after a miss or dodge
    pub fn issue_refund(&mut self, spell: SpellId) {
        let Cost::Energy { refund, .. } = self.spell(spell).config.cost else {
            return;
        };
        let amount = self.spell_cost(spell) * refund;
        if amount <= 0.0 {
            return;
        }
        let caster = self.spell(spell).caster;
        let source = format!("{} Refund", self.spell(spell).label());
        self.unit_mut(caster).add_energy(amount, &source);
    }
}
