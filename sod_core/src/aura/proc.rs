//! Proc triggers - Permanent auras that react to casts and hits

use super::config::{permanent_aura, AuraConfig};
use crate::combat::SpellResult;
use crate::sim::Simulation;
use crate::types::{ActionId, AuraId, HitOutcome, ProcMask, SpellId, UnitId};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Which aura callback drives the trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcCallback {
    SpellHitDealt,
    PeriodicDamageDealt,
    CastComplete,
}

pub type SpellFilter = Rc<dyn Fn(&Simulation, SpellId) -> bool>;
/// Runs when the trigger fires; the result is `None` for cast-complete triggers
pub type ProcHandler = Rc<dyn Fn(&mut Simulation, SpellId, Option<&SpellResult>)>;

#[derive(Clone)]
pub struct ProcTrigger {
    pub name: String,
    pub action_id: ActionId,
    pub callback: ProcCallback,
    /// Empty matches any spell
    pub proc_mask: ProcMask,
    pub spell_filter: Option<SpellFilter>,
    /// Empty matches any outcome
    pub outcome: HitOutcome,
    pub proc_chance: f64,
    /// Procs per minute, scaled by the caster's weapon speed; overrides `proc_chance`
    pub ppm: Option<f64>,
    pub icd: Option<Duration>,
    pub handler: ProcHandler,
}

impl ProcTrigger {
    pub fn new(
        name: impl Into<String>,
        callback: ProcCallback,
        handler: impl Fn(&mut Simulation, SpellId, Option<&SpellResult>) + 'static,
    ) -> Self {
        ProcTrigger {
            name: name.into(),
            action_id: ActionId::default(),
            callback,
            proc_mask: ProcMask::empty(),
            spell_filter: None,
            outcome: HitOutcome::empty(),
            proc_chance: 1.0,
            ppm: None,
            icd: None,
            handler: Rc::new(handler),
        }
    }

    pub fn with_action_id(mut self, action_id: ActionId) -> Self {
        self.action_id = action_id;
        self
    }

    pub fn with_proc_mask(mut self, mask: ProcMask) -> Self {
        self.proc_mask = mask;
        self
    }

    pub fn with_outcome(mut self, outcome: HitOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn with_chance(mut self, chance: f64) -> Self {
        self.proc_chance = chance;
        self
    }

    pub fn with_ppm(mut self, ppm: f64) -> Self {
        self.ppm = Some(ppm);
        self
    }

    pub fn with_icd(mut self, icd: Duration) -> Self {
        self.icd = Some(icd);
        self
    }

    pub fn with_spell_filter(mut self, f: impl Fn(&Simulation, SpellId) -> bool + 'static) -> Self {
        self.spell_filter = Some(Rc::new(f));
        self
    }

    fn matches(&self, sim: &Simulation, spell: SpellId, result: Option<&SpellResult>) -> bool {
        let config = &sim.spell(spell).config;
        if !self.proc_mask.is_empty() && !self.proc_mask.intersects(config.proc_mask) {
            return false;
        }
        if let (false, Some(result)) = (self.outcome.is_empty(), result) {
            if !self.outcome.intersects(result.outcome) {
                return false;
            }
        }
        self.spell_filter
            .as_ref()
            .map_or(true, |filter| filter(sim, spell))
    }

    fn chance(&self, sim: &Simulation, unit: UnitId) -> f64 {
        match self.ppm {
            Some(ppm) => ppm * sim.unit(unit).auto_attack.weapon_speed() / 60.0,
            None => self.proc_chance,
        }
    }
}

impl std::fmt::Debug for ProcTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcTrigger")
            .field("name", &self.name)
            .field("callback", &self.callback)
            .field("proc_mask", &self.proc_mask)
            .field("outcome", &self.outcome)
            .field("proc_chance", &self.proc_chance)
            .field("ppm", &self.ppm)
            .field("icd", &self.icd)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Register a permanent aura on `unit` that runs the trigger's handler
    /// whenever its callback matches and the proc roll succeeds
    pub fn make_proc_trigger_aura(&mut self, unit: UnitId, trigger: ProcTrigger) -> AuraId {
        let trigger = Rc::new(trigger);
        let icd_ready = Rc::new(Cell::new(Duration::ZERO));

        let try_proc = {
            let trigger = trigger.clone();
            let icd_ready = icd_ready.clone();
            move |sim: &mut Simulation, aura: AuraId, spell: SpellId, result: Option<&SpellResult>| {
                if !trigger.matches(sim, spell, result) {
                    return;
                }
                if trigger.icd.is_some() && sim.now() < icd_ready.get() {
                    return;
                }
                let owner = sim.aura(aura).unit;
                let chance = trigger.chance(sim, owner);
                if chance < 1.0 && !sim.proc(chance, &trigger.name) {
                    return;
                }
                if let Some(icd) = trigger.icd {
                    icd_ready.set(sim.now() + icd);
                }
                (trigger.handler)(sim, spell, result);
            }
        };

        let mut config = AuraConfig::new(trigger.name.clone(), trigger.action_id);
        match trigger.callback {
            ProcCallback::SpellHitDealt => {
                config = config.on_spell_hit_dealt(move |sim, aura, result| {
                    try_proc(sim, aura, result.spell, Some(result))
                });
            }
            ProcCallback::PeriodicDamageDealt => {
                config = config.on_periodic_damage_dealt(move |sim, aura, result| {
                    try_proc(sim, aura, result.spell, Some(result))
                });
            }
            ProcCallback::CastComplete => {
                config = config.on_cast_complete(move |sim, aura, spell| try_proc(sim, aura, spell, None));
            }
        }
        let config = config.on_reset(move |_, _| icd_ready.set(Duration::ZERO));
        self.register_aura(unit, permanent_aura(config))
    }
}
