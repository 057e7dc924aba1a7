//! Spells - Registration data, casting and damage calculation

mod cast;
mod config;
mod damage;

pub use config::{ApplyEffects, CastCondition, CastConfig, Cost, SpellConfig, GCD_DEFAULT, GCD_MIN};

use crate::metrics::SpellMetrics;
use crate::types::{DotId, SpellFlags, SpellId, UnitId};
use std::time::Duration;

/// A spell registered on a unit
///
/// `config` stays mutable after registration: talents, auras and set
/// bonuses adjust multipliers, crit and cast times in place.
#[derive(Debug)]
pub struct Spell {
    pub id: SpellId,
    pub caster: UnitId,
    pub config: SpellConfig,
    pub(crate) cooldown_ready: Duration,
    /// One dot per enemy target, for spells with a dot
    pub(crate) dots: Vec<(UnitId, DotId)>,
    pub metrics: SpellMetrics,
}

impl Spell {
    pub(crate) fn new(id: SpellId, caster: UnitId, config: SpellConfig) -> Self {
        Spell {
            id,
            caster,
            config,
            cooldown_ready: Duration::ZERO,
            dots: Vec::new(),
            metrics: SpellMetrics::default(),
        }
    }

    pub fn label(&self) -> &str {
        &self.config.label
    }

    pub fn has_flag(&self, flag: SpellFlags) -> bool {
        self.config.flags.contains(flag)
    }

    pub fn cooldown_ready(&self) -> Duration {
        self.cooldown_ready
    }

    pub fn is_ready(&self, now: Duration) -> bool {
        self.cooldown_ready <= now
    }

    pub fn dot_for(&self, target: UnitId) -> Option<DotId> {
        self.dots
            .iter()
            .find(|(unit, _)| *unit == target)
            .map(|(_, dot)| *dot)
    }
}
