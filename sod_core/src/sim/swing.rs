//! Main-hand auto attacks

use super::{Event, Simulation};
use crate::combat::OutcomeKind;
use crate::spell::{CastConfig, SpellConfig};
use crate::types::{ActionId, ProcMask, SpellFlags, SpellId, UnitId};
use crate::unit::Weapon;
use std::time::Duration;

impl Simulation {
    /// Equip `weapon` and turn on white swings; returns the auto attack spell
    ///
    /// Swings start with the next [`Simulation::run`], or immediately through
    /// [`Simulation::start_auto_attacks`] mid-fight.
    pub fn enable_auto_attacks(&mut self, unit: UnitId, weapon: Weapon) -> SpellId {
        let spell = match self.unit(unit).auto_attack.spell {
            Some(spell) => spell,
            None => self.register_spell(
                unit,
                SpellConfig {
                    proc_mask: ProcMask::MELEE_MH_AUTO,
                    flags: SpellFlags::NO_ON_CAST_COMPLETE,
                    cast: CastConfig::off_gcd(),
                    ..SpellConfig::new("Auto Attack", ActionId::spell(6603))
                },
            ),
        };
        let state = &mut self.unit_mut(unit).auto_attack;
        state.weapon = Some(weapon);
        state.enabled = true;
        state.spell = Some(spell);
        spell
    }

    pub fn disable_auto_attacks(&mut self, unit: UnitId) {
        let state = &mut self.unit_mut(unit).auto_attack;
        state.enabled = false;
        state.generation += 1;
    }

    /// Time between swings after melee haste
    pub fn swing_interval(&self, unit: UnitId) -> Duration {
        let u = self.unit(unit);
        let speed = u.auto_attack.weapon_speed() / u.melee_speed().max(f64::EPSILON);
        Duration::from_secs_f64(speed.max(0.1))
    }

    /// Rolled weapon damage plus the attack power bonus
    pub fn weapon_damage(&mut self, unit: UnitId) -> f64 {
        let Some(weapon) = self.unit(unit).auto_attack.weapon else {
            return 0.0;
        };
        let ap = self.unit(unit).attack_power();
        weapon.roll(&mut self.rng) + weapon.attack_power_bonus(ap)
    }

    /// Swing now and keep swinging
    pub fn start_auto_attacks(&mut self, unit: UnitId) {
        let now = self.now();
        self.reschedule_swing(unit, now);
    }

    /// Push the next swing back to `at` if it would land earlier
    pub fn delay_swing(&mut self, unit: UnitId, at: Duration) {
        let state = &self.unit(unit).auto_attack;
        if !state.enabled || state.next_swing >= at {
            return;
        }
        self.reschedule_swing(unit, at);
    }

    /// Restart the swing timer from now
    pub fn reset_swing(&mut self, unit: UnitId) {
        if !self.unit(unit).auto_attack.enabled {
            return;
        }
        let at = self.now() + self.swing_interval(unit);
        self.reschedule_swing(unit, at);
    }

    fn reschedule_swing(&mut self, unit: UnitId, at: Duration) {
        let generation = {
            let state = &mut self.unit_mut(unit).auto_attack;
            state.next_swing = at;
            state.generation += 1;
            state.generation
        };
        self.schedule(at, Event::AutoAttack { unit, generation });
    }

    pub(crate) fn handle_swing(&mut self, unit: UnitId, generation: u64) {
        let spell = {
            let state = &self.unit(unit).auto_attack;
            if !state.enabled || state.generation != generation {
                return;
            }
            match state.spell {
                Some(spell) => spell,
                None => return,
            }
        };

        let target = self.primary_target();
        let damage = self.weapon_damage(unit);
        self.spell_mut(spell).metrics.casts += 1;
        self.calc_and_deal_damage(spell, target, damage, OutcomeKind::MeleeWhite);

        let at = self.now() + self.swing_interval(unit);
        self.reschedule_swing(unit, at);
    }
}
