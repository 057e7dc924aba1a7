//! DoT application, snapshots and tick processing

use crate::combat::{OutcomeKind, SpellResult};
use crate::sim::{Event, Simulation};
use crate::types::{DotId, SpellFlags, SpellId, UnitId};
use std::time::Duration;
use tracing::trace;

impl Simulation {
    /// Dot of `spell` on `target`, if the spell has one
    pub fn dot_of(&self, spell: SpellId, target: UnitId) -> Option<DotId> {
        self.spell(spell).dot_for(target)
    }

    pub fn is_dot_active(&self, spell: SpellId, target: UnitId) -> bool {
        self.dot_of(spell, target)
            .is_some_and(|dot| self.dot(dot).is_active())
    }

    /// Remaining duration of a dot, zero when inactive
    pub fn dot_remaining(&self, dot: DotId) -> Duration {
        self.dot(dot).remaining_duration(self.now())
    }

    /// Apply (or reapply) a dot: take a fresh snapshot and restart its ticks
    pub fn apply_dot(&mut self, dot: DotId) {
        let now = self.now();
        let (spell, caster) = {
            let d = self.dot(dot);
            (d.spell, d.caster)
        };
        let period = {
            let config = &self.dot(dot).config;
            if config.affected_by_haste {
                config.tick_length.div_f64(self.unit(caster).cast_speed())
            } else {
                config.tick_length
            }
        };

        let was_active = self.dot(dot).is_active();
        {
            let d = self.dot_mut(dot);
            d.generation += 1;
            d.active = true;
            d.tick_count = 0;
            d.tick_period = period;
            d.next_tick_at = now + period;
            d.expires_at = now + period * d.config.num_ticks;
            d.applications += 1;
            if !was_active {
                d.active_since = now;
            }
        }
        self.take_dot_snapshot(dot, false);

        if self.spell(spell).has_flag(SpellFlags::CHANNELED) {
            self.unit_mut(caster).channeling = Some(dot);
        }

        let d = self.dot(dot);
        let label = d.config.label.clone();
        let event = Event::DotTick {
            dot,
            generation: d.generation,
        };
        let at = d.next_tick_at;
        trace!(time = now.as_secs_f64(), dot = %label, refreshed = was_active, "dot applied");
        self.schedule(at, event);
    }

    /// Re-snapshot an active dot and restart its tick count without
    /// disturbing the current tick timer
    pub fn rollover_dot(&mut self, dot: DotId) {
        if !self.dot(dot).is_active() {
            self.apply_dot(dot);
            return;
        }
        {
            let d = self.dot_mut(dot);
            d.tick_count = 0;
            d.expires_at = d.next_tick_at + d.tick_period * d.config.num_ticks.saturating_sub(1);
        }
        self.take_dot_snapshot(dot, true);
    }

    pub fn deactivate_dot(&mut self, dot: DotId) {
        let now = self.now();
        let caster = {
            let d = self.dot_mut(dot);
            if !d.active {
                return;
            }
            d.active = false;
            d.generation += 1;
            d.uptime += now.saturating_sub(d.active_since);
            d.caster
        };
        if self.unit(caster).channeling == Some(dot) {
            self.unit_mut(caster).channeling = None;
            self.schedule_unit_ready(caster);
        }
    }

    /// Standard snapshot: `base + coefficient * spell power`, the current
    /// crit chance and the caster's periodic multiplier
    pub fn snapshot_dot(&mut self, dot: DotId, base_damage: f64) {
        let (spell, target, coefficient) = {
            let d = self.dot(dot);
            (d.spell, d.target, d.config.bonus_coefficient)
        };
        let base = base_damage + coefficient * self.spell_power_for(spell);
        let crit = self.spell_crit_chance(spell, target);
        let multiplier = self.attacker_multiplier(spell, true);

        let d = self.dot_mut(dot);
        d.snapshot_base_damage = base;
        d.snapshot_crit_chance = crit;
        d.snapshot_attacker_multiplier = multiplier;
    }

    /// Resolve one tick from the stored snapshot and deal it
    pub fn calc_and_deal_periodic_snapshot_damage(
        &mut self,
        dot: DotId,
        outcome: OutcomeKind,
    ) -> SpellResult {
        let (spell, target, damage, crit) = {
            let d = self.dot(dot);
            (
                d.spell,
                d.target,
                d.snapshot_base_damage * d.snapshot_attacker_multiplier,
                d.snapshot_crit_chance,
            )
        };
        let result = self.finish_calc(spell, target, damage, true, outcome, crit);
        self.deal_damage(&result);
        result
    }

    pub(crate) fn handle_dot_tick(&mut self, dot: DotId, generation: u64) {
        {
            let d = self.dot_mut(dot);
            if !d.active || d.generation != generation {
                return;
            }
            d.tick_count += 1;
        }

        match self.dot(dot).config.on_tick.clone() {
            Some(on_tick) => on_tick(self, dot),
            None => {
                self.calc_and_deal_periodic_snapshot_damage(dot, OutcomeKind::Tick);
            }
        }

        // The tick hook may have reapplied or cancelled the dot
        let (finished, at) = {
            let d = self.dot(dot);
            if !d.active || d.generation != generation {
                return;
            }
            (d.tick_count >= d.config.num_ticks, d.next_tick_at + d.tick_period)
        };
        if finished {
            self.deactivate_dot(dot);
            return;
        }
        self.dot_mut(dot).next_tick_at = at;
        self.schedule(at, Event::DotTick { dot, generation });
    }

    /// Close out uptime of dots still running when the fight ends
    pub(crate) fn finalize_dot_uptime(&mut self) {
        let now = self.now();
        for d in self.dots.iter_mut().filter(|d| d.active) {
            d.uptime += now.saturating_sub(d.active_since);
            d.active_since = now;
        }
    }

    fn take_dot_snapshot(&mut self, dot: DotId, rollover: bool) {
        match self.dot(dot).config.on_snapshot.clone() {
            Some(on_snapshot) => on_snapshot(self, dot, rollover),
            None => self.snapshot_dot(dot, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use std::time::Duration;

    fn dot_sim(flags: SpellFlags) -> (Simulation, UnitId, SpellId) {
        let mut encounter = EncounterConfig::default();
        encounter.target.level = 60;
        let mut sim = Simulation::new(3, &encounter, CombatConstants::default());
        let caster = sim.add_unit(
            Unit::new("Caster", UnitKind::Player, 60)
                .with_stats(Stats::from_pairs(&[(Stat::SpellPower, 100.0)])),
        );
        let spell = sim.register_spell(
            caster,
            SpellConfig {
                school: SpellSchool::SHADOW,
                flags: flags | SpellFlags::PURE_DOT | SpellFlags::IGNORE_RESISTS,
                dot: Some(
                    DotConfig::new("Corruption", 6, Duration::from_secs(3))
                        .with_coefficient(0.1)
                        .on_snapshot(|sim, dot, _| sim.snapshot_dot(dot, 50.0)),
                ),
                ..SpellConfig::new("Corruption", ActionId::spell(25311))
            }
            .with_apply_effects(|sim, spell, target| {
                if let Some(dot) = sim.dot_of(spell, target) {
                    sim.apply_dot(dot);
                }
            }),
        );
        (sim, caster, spell)
    }

    #[test]
    fn test_dot_ticks_to_completion() {
        let (mut sim, _, spell) = dot_sim(SpellFlags::empty());
        let target = sim.primary_target();
        sim.cast(spell, target).unwrap();
        let dot = sim.dot_of(spell, target).unwrap();
        assert!(sim.dot(dot).is_active());
        assert_eq!(sim.dot_remaining(dot), Duration::from_secs(18));

        sim.advance(Duration::from_secs(30));
        assert!(!sim.dot(dot).is_active());
        assert_eq!(sim.dot(dot).tick_count(), 6);
        assert_eq!(sim.spell(spell).metrics.ticks, 6);
        // 6 ticks of 50 + 0.1 * 100
        assert!((sim.spell(spell).metrics.damage - 360.0).abs() < 0.01);
        assert_eq!(sim.dot(dot).uptime, Duration::from_secs(18));
    }

    #[test]
    fn test_reapply_restarts_ticks() {
        let (mut sim, _, spell) = dot_sim(SpellFlags::empty());
        let target = sim.primary_target();
        let dot = sim.dot_of(spell, target).unwrap();
        sim.apply_dot(dot);
        sim.advance(Duration::from_secs(7));
        assert_eq!(sim.dot(dot).tick_count(), 2);

        sim.apply_dot(dot);
        assert_eq!(sim.dot(dot).tick_count(), 0);
        assert_eq!(sim.dot_remaining(dot), Duration::from_secs(18));
        sim.advance(Duration::from_secs(40));
        // Two before the refresh, six after it
        assert_eq!(sim.spell(spell).metrics.ticks, 8);
    }

    #[test]
    fn test_rollover_keeps_tick_timer() {
        let (mut sim, _, spell) = dot_sim(SpellFlags::empty());
        let target = sim.primary_target();
        let dot = sim.dot_of(spell, target).unwrap();
        sim.apply_dot(dot);
        sim.advance(Duration::from_secs(4));
        sim.rollover_dot(dot);
        // Next tick at 6s, then five more
        assert_eq!(sim.dot(dot).expires_at(), Duration::from_secs(21));
    }

    #[test]
    fn test_channel_locks_caster_until_done() {
        let (mut sim, caster, spell) = dot_sim(SpellFlags::CHANNELED);
        let target = sim.primary_target();
        sim.cast(spell, target).unwrap();
        let dot = sim.dot_of(spell, target).unwrap();
        assert_eq!(sim.unit(caster).channeling, Some(dot));
        assert_eq!(sim.cast_blocker(spell, target), Some("already casting"));

        sim.advance(Duration::from_secs(20));
        assert_eq!(sim.unit(caster).channeling, None);
    }
}
