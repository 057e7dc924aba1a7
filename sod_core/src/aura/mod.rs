//! Auras - Buffs, debuffs and hidden trackers attached to a unit
//!
//! An aura is registered once per iteration and toggled on and off as the
//! fight progresses. Expiration is scheduled through the event queue and
//! carries the aura's generation, so refreshing an aura silently cancels
//! the earlier expiration.

mod config;
mod proc;

pub use config::{permanent_aura, AuraConfig, AuraHook, CastHook, ResultHook, StacksHook};
pub use proc::{ProcCallback, ProcHandler, ProcTrigger, SpellFilter};

use crate::combat::SpellResult;
use crate::metrics::AuraMetrics;
use crate::sim::{Event, Simulation};
use crate::stats::Stats;
use crate::types::{ActionId, AuraId, SpellId, UnitId};
use std::time::Duration;
use tracing::trace;

#[derive(Debug)]
pub struct Aura {
    pub id: AuraId,
    pub unit: UnitId,
    pub config: AuraConfig,
    pub(crate) active: bool,
    pub(crate) stacks: u32,
    pub(crate) applied_at: Duration,
    pub(crate) expires_at: Option<Duration>,
    pub(crate) generation: u64,
    active_since: Duration,
    pub metrics: AuraMetrics,
}

impl Aura {
    pub(crate) fn new(id: AuraId, unit: UnitId, config: AuraConfig) -> Self {
        Aura {
            id,
            unit,
            config,
            active: false,
            stacks: 0,
            applied_at: Duration::ZERO,
            expires_at: None,
            generation: 0,
            active_since: Duration::ZERO,
            metrics: AuraMetrics::default(),
        }
    }

    pub fn label(&self) -> &str {
        &self.config.label
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    /// Time of the last gain or refresh
    pub fn applied_at(&self) -> Duration {
        self.applied_at
    }

    pub fn expires_at(&self) -> Option<Duration> {
        self.expires_at
    }
}

impl Simulation {
    pub fn register_aura(&mut self, unit: UnitId, config: AuraConfig) -> AuraId {
        let id = AuraId(self.auras.len());
        self.auras.push(Aura::new(id, unit, config));
        self.unit_mut(unit).auras.push(id);
        id
    }

    /// Aura with the same label on `unit`, registering `config` if absent
    ///
    /// Used for shared debuffs that several spells apply.
    pub fn get_or_register_aura(&mut self, unit: UnitId, config: AuraConfig) -> AuraId {
        match self.aura_by_label(unit, &config.label) {
            Some(id) => id,
            None => self.register_aura(unit, config),
        }
    }

    pub fn aura_by_label(&self, unit: UnitId, label: &str) -> Option<AuraId> {
        self.unit(unit)
            .auras
            .iter()
            .copied()
            .find(|id| self.aura(*id).label() == label)
    }

    pub fn is_aura_active(&self, aura: AuraId) -> bool {
        self.aura(aura).active
    }

    pub fn aura_stacks(&self, aura: AuraId) -> u32 {
        self.aura(aura).stacks
    }

    /// Remaining duration; `Duration::MAX` for an active aura that never expires
    pub fn aura_remaining(&self, aura: AuraId) -> Duration {
        let a = self.aura(aura);
        if !a.active {
            return Duration::ZERO;
        }
        match a.expires_at {
            Some(at) => at.saturating_sub(self.now()),
            None => Duration::MAX,
        }
    }

    /// Gain the aura, or refresh its duration if it is already active
    pub fn activate_aura(&mut self, aura: AuraId) {
        if self.aura(aura).active {
            self.refresh_aura(aura);
            return;
        }
        let now = self.now();
        {
            let a = self.aura_mut(aura);
            a.active = true;
            a.applied_at = now;
            a.active_since = now;
            a.metrics.activations += 1;
        }
        self.schedule_aura_expiry(aura);

        let a = self.aura(aura);
        let (unit, label) = (a.unit, a.config.label.clone());
        trace!(time = now.as_secs_f64(), aura = %label, "aura gained");
        self.log(unit, || format!("Aura gained: {}", label));

        if let Some(on_gain) = self.aura(aura).config.on_gain.clone() {
            on_gain(self, aura);
        }
    }

    /// Restart the duration of an active aura
    pub fn refresh_aura(&mut self, aura: AuraId) {
        if !self.aura(aura).active {
            return;
        }
        let now = self.now();
        self.aura_mut(aura).applied_at = now;
        self.schedule_aura_expiry(aura);
    }

    pub fn deactivate_aura(&mut self, aura: AuraId) {
        let now = self.now();
        {
            let a = self.aura_mut(aura);
            if !a.active {
                return;
            }
            a.active = false;
            a.generation += 1;
            a.expires_at = None;
            a.metrics.uptime += now.saturating_sub(a.active_since);
        }

        let old = self.aura(aura).stacks;
        if old > 0 {
            self.aura_mut(aura).stacks = 0;
            if let Some(hook) = self.aura(aura).config.on_stacks_change.clone() {
                hook(self, aura, old, 0);
            }
        }

        let a = self.aura(aura);
        let (unit, label) = (a.unit, a.config.label.clone());
        trace!(time = now.as_secs_f64(), aura = %label, "aura faded");
        self.log(unit, || format!("Aura faded: {}", label));

        if let Some(on_expire) = self.aura(aura).config.on_expire.clone() {
            on_expire(self, aura);
        }
    }

    /// Set the stack count, clamped to `max_stacks`
    ///
    /// Gains the aura for a non-zero count; zero stacks expires it.
    pub fn set_stacks(&mut self, aura: AuraId, stacks: u32) {
        let max = self.aura(aura).config.max_stacks.max(1);
        let stacks = stacks.min(max);
        if stacks == 0 {
            self.deactivate_aura(aura);
            return;
        }
        if !self.aura(aura).active {
            self.activate_aura(aura);
        }
        let old = self.aura(aura).stacks;
        if old == stacks {
            return;
        }
        self.aura_mut(aura).stacks = stacks;
        if let Some(hook) = self.aura(aura).config.on_stacks_change.clone() {
            hook(self, aura, old, stacks);
        }
    }

    pub fn add_stack(&mut self, aura: AuraId) {
        self.add_stacks(aura, 1);
    }

    pub fn add_stacks(&mut self, aura: AuraId, count: u32) {
        let current = self.aura_stacks(aura);
        self.set_stacks(aura, current.saturating_add(count));
    }

    pub fn remove_stack(&mut self, aura: AuraId) {
        let current = self.aura_stacks(aura);
        self.set_stacks(aura, current.saturating_sub(1));
    }

    pub(crate) fn handle_aura_expire(&mut self, aura: AuraId, generation: u64) {
        let a = self.aura(aura);
        if a.active && a.generation == generation {
            self.deactivate_aura(aura);
        }
    }

    fn schedule_aura_expiry(&mut self, aura: AuraId) {
        let now = self.now();
        let a = self.aura_mut(aura);
        a.generation += 1;
        a.expires_at = a.config.duration.map(|d| now + d);
        if let Some(at) = a.expires_at {
            let event = Event::AuraExpire {
                aura,
                generation: a.generation,
            };
            self.schedule(at, event);
        }
    }

    /// Run every aura's reset hook, which brings permanent auras up
    pub fn reset_auras(&mut self) {
        for index in 0..self.auras.len() {
            let aura = AuraId(index);
            if let Some(on_reset) = self.aura(aura).config.on_reset.clone() {
                on_reset(self, aura);
            }
        }
    }

    pub(crate) fn finalize_aura_uptime(&mut self) {
        let now = self.now();
        for a in self.auras.iter_mut().filter(|a| a.active) {
            a.metrics.uptime += now.saturating_sub(a.active_since);
            a.active_since = now;
        }
    }

    fn active_auras_of(&self, unit: UnitId) -> Vec<AuraId> {
        self.unit(unit)
            .auras
            .iter()
            .copied()
            .filter(|id| self.aura(*id).active)
            .collect()
    }

    pub(crate) fn fire_on_cast_complete(&mut self, spell: SpellId) {
        let caster = self.spell(spell).caster;
        for aura in self.active_auras_of(caster) {
            // An earlier hook may have consumed this aura
            if !self.aura(aura).active {
                continue;
            }
            if let Some(hook) = self.aura(aura).config.on_cast_complete.clone() {
                hook(self, aura, spell);
            }
        }
    }

    pub(crate) fn fire_damage_dealt(&mut self, result: &SpellResult) {
        for aura in self.active_auras_of(result.caster) {
            if !self.aura(aura).active {
                continue;
            }
            let config = &self.aura(aura).config;
            let hook = if result.periodic {
                config.on_periodic_damage_dealt.clone()
            } else {
                config.on_spell_hit_dealt.clone()
            };
            if let Some(hook) = hook {
                hook(self, aura, result);
            }
        }
    }

    pub(crate) fn fire_damage_taken(&mut self, result: &SpellResult) {
        for aura in self.active_auras_of(result.target) {
            if !self.aura(aura).active {
                continue;
            }
            if let Some(hook) = self.aura(aura).config.on_spell_hit_taken.clone() {
                hook(self, aura, result);
            }
        }
    }

    /// Register an aura that adds `stats` on gain and removes them on expire
    pub fn stat_buff_aura(
        &mut self,
        unit: UnitId,
        label: impl Into<String>,
        action_id: ActionId,
        stats: Stats,
        duration: Duration,
    ) -> AuraId {
        let removed = stats.invert();
        let config = AuraConfig::new(label, action_id)
            .with_duration(duration)
            .on_gain(move |sim, aura| {
                let unit = sim.aura(aura).unit;
                sim.unit_mut(unit).add_stats(&stats);
            })
            .on_expire(move |sim, aura| {
                let unit = sim.aura(aura).unit;
                sim.unit_mut(unit).add_stats(&removed);
            });
        self.register_aura(unit, config)
    }
}
