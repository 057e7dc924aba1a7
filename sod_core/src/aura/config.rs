//! AuraConfig - Label, duration, stacking and callbacks of an aura

use crate::combat::SpellResult;
use crate::sim::Simulation;
use crate::types::{ActionId, AuraId, SpellId};
use std::rc::Rc;
use std::time::Duration;

pub type AuraHook = Rc<dyn Fn(&mut Simulation, AuraId)>;
/// `(sim, aura, old_stacks, new_stacks)`
pub type StacksHook = Rc<dyn Fn(&mut Simulation, AuraId, u32, u32)>;
pub type CastHook = Rc<dyn Fn(&mut Simulation, AuraId, SpellId)>;
pub type ResultHook = Rc<dyn Fn(&mut Simulation, AuraId, &SpellResult)>;

#[derive(Clone, Default)]
pub struct AuraConfig {
    pub label: String,
    pub action_id: ActionId,
    /// `None` never expires
    pub duration: Option<Duration>,
    pub max_stacks: u32,
    pub on_reset: Option<AuraHook>,
    pub on_gain: Option<AuraHook>,
    pub on_expire: Option<AuraHook>,
    pub on_stacks_change: Option<StacksHook>,
    pub on_cast_complete: Option<CastHook>,
    pub on_spell_hit_dealt: Option<ResultHook>,
    pub on_periodic_damage_dealt: Option<ResultHook>,
    pub on_spell_hit_taken: Option<ResultHook>,
}

impl AuraConfig {
    pub fn new(label: impl Into<String>, action_id: ActionId) -> Self {
        AuraConfig {
            label: label.into(),
            action_id,
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_max_stacks(mut self, max_stacks: u32) -> Self {
        self.max_stacks = max_stacks;
        self
    }

    pub fn on_reset(mut self, f: impl Fn(&mut Simulation, AuraId) + 'static) -> Self {
        self.on_reset = Some(Rc::new(f));
        self
    }

    pub fn on_gain(mut self, f: impl Fn(&mut Simulation, AuraId) + 'static) -> Self {
        self.on_gain = Some(Rc::new(f));
        self
    }

    pub fn on_expire(mut self, f: impl Fn(&mut Simulation, AuraId) + 'static) -> Self {
        self.on_expire = Some(Rc::new(f));
        self
    }

    pub fn on_stacks_change(mut self, f: impl Fn(&mut Simulation, AuraId, u32, u32) + 'static) -> Self {
        self.on_stacks_change = Some(Rc::new(f));
        self
    }

    pub fn on_cast_complete(mut self, f: impl Fn(&mut Simulation, AuraId, SpellId) + 'static) -> Self {
        self.on_cast_complete = Some(Rc::new(f));
        self
    }

    pub fn on_spell_hit_dealt(mut self, f: impl Fn(&mut Simulation, AuraId, &SpellResult) + 'static) -> Self {
        self.on_spell_hit_dealt = Some(Rc::new(f));
        self
    }

    pub fn on_periodic_damage_dealt(
        mut self,
        f: impl Fn(&mut Simulation, AuraId, &SpellResult) + 'static,
    ) -> Self {
        self.on_periodic_damage_dealt = Some(Rc::new(f));
        self
    }

    pub fn on_spell_hit_taken(mut self, f: impl Fn(&mut Simulation, AuraId, &SpellResult) + 'static) -> Self {
        self.on_spell_hit_taken = Some(Rc::new(f));
        self
    }
}

impl std::fmt::Debug for AuraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuraConfig")
            .field("label", &self.label)
            .field("action_id", &self.action_id)
            .field("duration", &self.duration)
            .field("max_stacks", &self.max_stacks)
            .finish_non_exhaustive()
    }
}

/// Make an aura that is active for the whole fight
///
/// Activation happens in `on_reset`, after any `on_reset` already set.
pub fn permanent_aura(mut config: AuraConfig) -> AuraConfig {
    config.duration = None;
    let previous = config.on_reset.take();
    config.on_reset = Some(Rc::new(move |sim: &mut Simulation, aura: AuraId| {
        if let Some(previous) = &previous {
            previous(sim, aura);
        }
        sim.activate_aura(aura);
    }));
    config
}
