//! Simulation - Units, spells, auras and dots driven by a time-ordered event queue
//!
//! One `Simulation` is one iteration of a fight. All randomness comes from a
//! seeded ChaCha8 stream, so the same seed reproduces the same fight.

mod event;
mod regen;
mod swing;

pub(crate) use event::Event;
use event::Scheduled;

use crate::aura::Aura;
use crate::config::{CombatConstants, EncounterConfig};
use crate::dot::Dot;
use crate::log::CombatLog;
use crate::metrics::{AuraSummary, IterationResult, ResourceSummary, SpellSummary};
use crate::rotation::{Decision, Rotation};
use crate::spell::{Spell, SpellConfig};
use crate::stats::Stat;
use crate::types::{AuraId, DotId, SpellId, UnitId};
use crate::unit::{Unit, UnitKind};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::time::Duration;
use tracing::{trace, Level};

/// Delay before a unit retries after its rotation failed to cast
const RETRY_DELAY: Duration = Duration::from_millis(100);
/// Rotation wakeups allowed at a single timestamp before forcing a delay
const MAX_ACTIONS_PER_INSTANT: u32 = 32;

pub struct Simulation {
    pub(crate) units: Vec<Unit>,
    pub(crate) spells: Vec<Spell>,
    pub(crate) auras: Vec<Aura>,
    pub(crate) dots: Vec<Dot>,
    queue: BinaryHeap<Scheduled>,
    seq: u64,
    now: Duration,
    end_time: Duration,
    rng: ChaCha8Rng,
    pub constants: CombatConstants,
    pub encounter: EncounterConfig,
    rotations: Vec<Option<Rc<dyn Rotation>>>,
    log: Option<CombatLog>,
    primary_target: UnitId,
    instant_actions: (Duration, u32),
}

impl Simulation {
    /// Create a simulation containing only the encounter's target
    pub fn new(seed: u64, encounter: &EncounterConfig, constants: CombatConstants) -> Self {
        let mut sim = Simulation {
            units: Vec::new(),
            spells: Vec::new(),
            auras: Vec::new(),
            dots: Vec::new(),
            queue: BinaryHeap::new(),
            seq: 0,
            now: Duration::ZERO,
            end_time: Duration::from_secs_f64(encounter.duration_seconds.max(0.0)),
            rng: ChaCha8Rng::seed_from_u64(seed),
            constants,
            encounter: encounter.clone(),
            rotations: Vec::new(),
            log: None,
            primary_target: UnitId(0),
            instant_actions: (Duration::ZERO, 0),
        };

        let config = &encounter.target;
        let mut target = Unit::new(config.name.clone(), UnitKind::Target, config.level);
        target.add_stat(Stat::Armor, config.armor);
        target.add_stat(Stat::ArcaneResistance, config.arcane_resistance);
        target.add_stat(Stat::FireResistance, config.fire_resistance);
        target.add_stat(Stat::FrostResistance, config.frost_resistance);
        target.add_stat(Stat::NatureResistance, config.nature_resistance);
        target.add_stat(Stat::ShadowResistance, config.shadow_resistance);
        sim.primary_target = sim.add_unit(target);
        sim
    }

    /// Default encounter and constants
    pub fn with_defaults(seed: u64) -> Self {
        Self::new(seed, &EncounterConfig::default(), CombatConstants::default())
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Planned end of the fight
    pub fn end_time(&self) -> Duration {
        self.end_time
    }

    pub fn remaining_fight(&self) -> Duration {
        self.end_time.saturating_sub(self.now)
    }

    // === Units ===

    pub fn add_unit(&mut self, mut unit: Unit) -> UnitId {
        let id = UnitId(self.units.len());
        unit.id = id;
        unit.max_combo_points = self.constants.regen.max_combo_points;
        self.units.push(unit);
        self.rotations.push(None);
        id
    }

    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.0]
    }

    pub fn unit_mut(&mut self, id: UnitId) -> &mut Unit {
        &mut self.units[id.0]
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn primary_target(&self) -> UnitId {
        self.primary_target
    }

    /// Pets owned by `owner`
    pub fn pets_of(&self, owner: UnitId) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|u| u.owner() == Some(owner))
            .map(|u| u.id)
            .collect()
    }

    // === Spells, auras, dots ===

    /// Register a spell on `caster`; spells with a dot get one dot per enemy
    pub fn register_spell(&mut self, caster: UnitId, config: SpellConfig) -> SpellId {
        let id = SpellId(self.spells.len());
        let mut spell = Spell::new(id, caster, config);

        if let Some(dot_config) = spell.config.dot.clone() {
            let enemies: Vec<UnitId> = self
                .units
                .iter()
                .filter(|u| u.is_enemy())
                .map(|u| u.id)
                .collect();
            for target in enemies {
                let dot_id = DotId(self.dots.len());
                self.dots
                    .push(Dot::new(dot_id, id, caster, target, dot_config.clone()));
                spell.dots.push((target, dot_id));
            }
        }

        self.spells.push(spell);
        self.unit_mut(caster).spells.push(id);
        id
    }

    pub fn spell(&self, id: SpellId) -> &Spell {
        &self.spells[id.0]
    }

    pub fn spell_mut(&mut self, id: SpellId) -> &mut Spell {
        &mut self.spells[id.0]
    }

    pub fn spell_by_label(&self, unit: UnitId, label: &str) -> Option<SpellId> {
        self.unit(unit)
            .spells
            .iter()
            .copied()
            .find(|id| self.spell(*id).label() == label)
    }

    pub fn aura(&self, id: AuraId) -> &Aura {
        &self.auras[id.0]
    }

    pub fn aura_mut(&mut self, id: AuraId) -> &mut Aura {
        &mut self.auras[id.0]
    }

    pub fn dot(&self, id: DotId) -> &Dot {
        &self.dots[id.0]
    }

    pub fn dot_mut(&mut self, id: DotId) -> &mut Dot {
        &mut self.dots[id.0]
    }

    pub fn set_rotation(&mut self, unit: UnitId, rotation: Rc<dyn Rotation>) {
        self.rotations[unit.0] = Some(rotation);
    }

    // === Randomness ===

    /// Uniform draw in `[0, 1)`; `label` names the roll in trace output
    pub fn random_float(&mut self, label: &str) -> f64 {
        let value: f64 = self.rng.gen();
        trace!(label, value, "roll");
        value
    }

    /// Uniform draw in `[min, max)`
    pub fn roll(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// True with probability `chance`
    pub fn proc(&mut self, chance: f64, label: &str) -> bool {
        if chance >= 1.0 {
            true
        } else if chance <= 0.0 {
            false
        } else {
            self.random_float(label) < chance
        }
    }

    // === Logging ===

    /// Keep a combat log for this iteration
    pub fn enable_log(&mut self) {
        self.log = Some(CombatLog::new());
    }

    pub fn combat_log(&self) -> Option<&CombatLog> {
        self.log.as_ref()
    }

    pub fn take_log(&mut self) -> Option<CombatLog> {
        self.log.take()
    }

    /// Record a combat event; the message is only built when someone reads it
    pub fn log(&mut self, unit: UnitId, message: impl FnOnce() -> String) {
        let tracing_on = tracing::enabled!(Level::TRACE);
        if self.log.is_none() && !tracing_on {
            return;
        }
        let message = message();
        let name = &self.units[unit.0].name;
        if tracing_on {
            trace!(time = self.now.as_secs_f64(), unit = %name, "{}", message);
        }
        if let Some(log) = self.log.as_mut() {
            log.push(self.now, name, message);
        }
    }

    // === Scheduling ===

    pub(crate) fn schedule(&mut self, at: Duration, event: Event) {
        let at = at.max(self.now);
        self.seq += 1;
        self.queue.push(Scheduled {
            at,
            seq: self.seq,
            event,
        });
    }

    /// Run `f` at time `at`
    pub fn schedule_action(&mut self, at: Duration, f: impl FnOnce(&mut Simulation) + 'static) {
        self.schedule(at, Event::Delayed(Box::new(f)));
    }

    /// Wake the unit's rotation once it can act again
    ///
    /// Hardcasts and channels wake the unit themselves when they finish.
    pub fn schedule_unit_ready(&mut self, unit: UnitId) {
        let now = self.now;
        let (generation, at, busy) = {
            let u = self.unit_mut(unit);
            u.ready_generation += 1;
            let busy = u.hardcast.is_some() || u.channeling.is_some();
            (u.ready_generation, u.gcd_ready.max(now), busy)
        };
        if busy || self.rotations[unit.0].is_none() {
            return;
        }
        self.schedule(at, Event::UnitReady { unit, generation });
    }

    fn schedule_unit_wakeup(&mut self, unit: UnitId, at: Duration) {
        let generation = {
            let u = self.unit_mut(unit);
            u.ready_generation += 1;
            u.ready_generation
        };
        self.schedule(at, Event::UnitReady { unit, generation });
    }

    // === Event loop ===

    /// Run one full iteration: reset, schedule the opening events and
    /// process the queue until the rolled fight length
    pub fn run(&mut self) {
        let base = self.encounter.duration_seconds;
        let variation = self.encounter.duration_variation_seconds;
        let seconds = self.roll(base - variation, base + variation).max(1.0);
        self.end_time = Duration::from_secs_f64(seconds);

        for unit in &mut self.units {
            unit.reset_resources();
        }
        self.reset_auras();

        for index in 0..self.units.len() {
            let unit = UnitId(index);
            self.schedule_unit_ready(unit);
            if self.unit(unit).auto_attack.enabled {
                self.start_auto_attacks(unit);
            }
        }
        self.schedule_resource_tick();

        self.advance(self.end_time);
        self.finalize_aura_uptime();
        self.finalize_dot_uptime();
    }

    /// Process every event scheduled before `until`, then move the clock there
    pub fn advance(&mut self, until: Duration) {
        while let Some(next) = self.queue.peek() {
            if next.at >= until {
                break;
            }
            let Some(scheduled) = self.queue.pop() else {
                break;
            };
            self.now = scheduled.at;
            trace!(
                time = scheduled.at.as_secs_f64(),
                event = scheduled.event.name(),
                "dispatch"
            );
            self.dispatch(scheduled.event);
        }
        self.now = until.max(self.now);
    }

    fn dispatch(&mut self, event: Event) {
        match event {
            Event::AuraExpire { aura, generation } => self.handle_aura_expire(aura, generation),
            Event::DotTick { dot, generation } => self.handle_dot_tick(dot, generation),
            Event::CastComplete { unit } => self.complete_hardcast(unit),
            Event::Delayed(f) => f(self),
            Event::UnitReady { unit, generation } => {
                if self.unit(unit).ready_generation == generation {
                    self.run_rotation(unit);
                }
            }
            Event::ResourceTick => self.handle_resource_tick(),
            Event::AutoAttack { unit, generation } => self.handle_swing(unit, generation),
        }
    }

    fn run_rotation(&mut self, unit: UnitId) {
        let Some(rotation) = self.rotations[unit.0].clone() else {
            return;
        };
        {
            let u = self.unit(unit);
            if u.hardcast.is_some() || u.channeling.is_some() {
                return;
            }
        }

        if self.instant_actions.0 == self.now {
            self.instant_actions.1 += 1;
        } else {
            self.instant_actions = (self.now, 1);
        }
        if self.instant_actions.1 > MAX_ACTIONS_PER_INSTANT {
            let at = self.now + RETRY_DELAY;
            self.schedule_unit_wakeup(unit, at);
            return;
        }

        match rotation.next_action(self, unit) {
            Decision::Cast { spell, target } => {
                if let Err(err) = self.cast(spell, target) {
                    trace!(time = self.now.as_secs_f64(), error = %err, "rotation cast failed");
                    let at = self.now + RETRY_DELAY;
                    self.schedule_unit_wakeup(unit, at);
                }
            }
            Decision::Wait(until) => {
                let at = until.max(self.now + Duration::from_millis(1));
                self.schedule_unit_wakeup(unit, at);
            }
        }
    }

    // === Results ===

    /// Damage and breakdowns for `player` and its pets
    pub fn iteration_result(&self, player: UnitId) -> IterationResult {
        let seconds = self.now.as_secs_f64().max(f64::EPSILON);
        let mut owners = vec![player];
        owners.extend(self.pets_of(player));

        let mut spells = Vec::new();
        let mut damage = 0.0;
        for spell in self.spells.iter().filter(|s| owners.contains(&s.caster)) {
            let m = &spell.metrics;
            damage += m.damage;
            if m.casts == 0 && m.damage <= 0.0 {
                continue;
            }
            spells.push(SpellSummary {
                unit: self.unit(spell.caster).name.clone(),
                label: spell.label().to_string(),
                action_id: spell.config.action_id,
                casts: m.casts as f64,
                hits: m.hits as f64,
                crits: (m.crits + m.crit_ticks) as f64,
                misses: m.misses as f64,
                ticks: m.ticks as f64,
                damage: m.damage,
                dps: m.damage / seconds,
            });
        }

        let auras = self
            .auras
            .iter()
            .filter(|a| owners.contains(&a.unit) || self.unit(a.unit).is_enemy())
            .filter(|a| a.metrics.activations > 0)
            .map(|a| AuraSummary {
                unit: self.unit(a.unit).name.clone(),
                label: a.label().to_string(),
                action_id: a.config.action_id,
                activations: a.metrics.activations as f64,
                uptime_percent: a.metrics.uptime.as_secs_f64() / seconds * 100.0,
            })
            .collect();

        let resources = owners
            .iter()
            .flat_map(|id| {
                let unit = self.unit(*id);
                unit.resource_metrics
                    .gains
                    .iter()
                    .filter_map(move |(source, gain)| {
                        gain.kind.map(|kind| ResourceSummary {
                            unit: unit.name.clone(),
                            source: source.clone(),
                            kind,
                            gained: gain.gained,
                        })
                    })
            })
            .collect();

        IterationResult {
            duration_seconds: seconds,
            damage,
            dps: damage / seconds,
            spells,
            auras,
            resources,
        }
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("now", &self.now)
            .field("end_time", &self.end_time)
            .field("units", &self.units.len())
            .field("spells", &self.spells.len())
            .field("auras", &self.auras.len())
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}
