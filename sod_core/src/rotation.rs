//! Rotations - Deciding what a unit casts next
//!
//! [`PriorityRotation`] walks an ordered list of spells and casts the first
//! one whose conditions hold. It is built from a [`RotationConfig`], usually
//! loaded from TOML:
//!
//! ```toml
//! [[actions]]
//! spell = "Moonfire"
//! conditions = [{ type = "dot_inactive" }]
//!
//! [[actions]]
//! spell = "Wrath"
//! ```

use crate::config::ConfigError;
use crate::error::{Result, SimError};
use crate::sim::Simulation;
use crate::types::{AuraId, DotId, SpellId, UnitId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest a unit sleeps before re-evaluating its rotation
const MAX_WAIT: Duration = Duration::from_millis(500);

/// What a unit does when it wakes up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Cast { spell: SpellId, target: UnitId },
    /// Sleep until this absolute time
    Wait(Duration),
}

pub trait Rotation {
    fn next_action(&self, sim: &Simulation, unit: UnitId) -> Decision;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

impl RotationConfig {
    pub fn parse(content: &str) -> std::result::Result<Self, ConfigError> {
        crate::config::parse_toml(content)
    }

    /// Shorthand for a rotation without conditions
    pub fn from_labels(labels: &[&str]) -> Self {
        RotationConfig {
            actions: labels
                .iter()
                .map(|label| ActionConfig {
                    spell: label.to_string(),
                    conditions: Vec::new(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    pub spell: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Condition on an action; dot conditions default to the action's own spell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    DotInactive {
        #[serde(default)]
        spell: Option<String>,
    },
    DotRemainingBelow {
        #[serde(default)]
        spell: Option<String>,
        seconds: f64,
    },
    AuraActive { aura: String },
    AuraInactive { aura: String },
    TargetAuraActive { aura: String },
    TargetAuraInactive { aura: String },
    ComboPointsAtLeast { points: u32 },
    EnergyAtLeast { energy: f64 },
    EnergyBelow { energy: f64 },
    ManaPercentBelow { percent: f64 },
    ManaPercentAtLeast { percent: f64 },
    RemainingFightBelow { seconds: f64 },
}

#[derive(Debug, Clone, Copy)]
enum Check {
    DotInactive(DotId),
    DotRemainingBelow(DotId, Duration),
    AuraActive(AuraId),
    AuraInactive(AuraId),
    ComboPointsAtLeast(u32),
    EnergyAtLeast(f64),
    EnergyBelow(f64),
    ManaPercentBelow(f64),
    ManaPercentAtLeast(f64),
    RemainingFightBelow(Duration),
}

impl Check {
    fn holds(&self, sim: &Simulation, unit: UnitId) -> bool {
        let u = sim.unit(unit);
        match *self {
            Check::DotInactive(dot) => !sim.dot(dot).is_active(),
            Check::DotRemainingBelow(dot, limit) => sim.dot_remaining(dot) < limit,
            Check::AuraActive(aura) => sim.is_aura_active(aura),
            Check::AuraInactive(aura) => !sim.is_aura_active(aura),
            Check::ComboPointsAtLeast(points) => u.combo_points() >= points,
            Check::EnergyAtLeast(energy) => u.current_energy() >= energy,
            Check::EnergyBelow(energy) => u.current_energy() < energy,
            Check::ManaPercentBelow(percent) => u.mana_percent() < percent,
            Check::ManaPercentAtLeast(percent) => u.mana_percent() >= percent,
            Check::RemainingFightBelow(limit) => sim.remaining_fight() < limit,
        }
    }
}

#[derive(Debug, Clone)]
struct Action {
    spell: SpellId,
    checks: Vec<Check>,
}

/// Ordered spell priority list
#[derive(Debug, Clone)]
pub struct PriorityRotation {
    actions: Vec<Action>,
}

impl PriorityRotation {
    /// Resolve spell and aura labels against the units in `sim`
    pub fn build(sim: &Simulation, unit: UnitId, config: &RotationConfig) -> Result<Self> {
        let target = sim.primary_target();
        let spell_id = |label: &str| {
            sim.spell_by_label(unit, label)
                .ok_or_else(|| SimError::UnknownSpell(label.to_string()))
        };
        let aura_id = |owner: UnitId, label: &str| {
            sim.aura_by_label(owner, label)
                .ok_or_else(|| SimError::UnknownAura(label.to_string()))
        };
        let dot_id = |spell: SpellId| {
            sim.dot_of(spell, target).ok_or_else(|| {
                SimError::InvalidConfig(format!("{} has no dot", sim.spell(spell).label()))
            })
        };

        let mut actions = Vec::with_capacity(config.actions.len());
        for action in &config.actions {
            let spell = spell_id(&action.spell)?;
            let mut checks = Vec::with_capacity(action.conditions.len());
            for condition in &action.conditions {
                let dot_spell = |label: &Option<String>| match label {
                    Some(label) => spell_id(label),
                    None => Ok(spell),
                };
                let check = match condition {
                    Condition::DotInactive { spell: label } => {
                        Check::DotInactive(dot_id(dot_spell(label)?)?)
                    }
                    Condition::DotRemainingBelow { spell: label, seconds } => Check::DotRemainingBelow(
                        dot_id(dot_spell(label)?)?,
                        condition_seconds(*seconds)?,
                    ),
                    Condition::AuraActive { aura } => Check::AuraActive(aura_id(unit, aura)?),
                    Condition::AuraInactive { aura } => Check::AuraInactive(aura_id(unit, aura)?),
                    Condition::TargetAuraActive { aura } => Check::AuraActive(aura_id(target, aura)?),
                    Condition::TargetAuraInactive { aura } => {
                        Check::AuraInactive(aura_id(target, aura)?)
                    }
                    Condition::ComboPointsAtLeast { points } => Check::ComboPointsAtLeast(*points),
                    Condition::EnergyAtLeast { energy } => Check::EnergyAtLeast(*energy),
                    Condition::EnergyBelow { energy } => Check::EnergyBelow(*energy),
                    Condition::ManaPercentBelow { percent } => Check::ManaPercentBelow(*percent),
                    Condition::ManaPercentAtLeast { percent } => Check::ManaPercentAtLeast(*percent),
                    Condition::RemainingFightBelow { seconds } => {
                        Check::RemainingFightBelow(condition_seconds(*seconds)?)
                    }
                };
                checks.push(check);
            }
            actions.push(Action { spell, checks });
        }

        Ok(PriorityRotation { actions })
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Next moment anything relevant to this unit can change
    fn next_wakeup(&self, sim: &Simulation, unit: UnitId) -> Duration {
        let now = sim.now();
        let u = sim.unit(unit);
        let mut candidates = vec![sim.next_resource_tick(), u.gcd_ready];
        candidates.extend(self.actions.iter().map(|a| sim.spell(a.spell).cooldown_ready()));
        if u.auto_attack.enabled {
            candidates.push(u.auto_attack.next_swing);
        }
        candidates
            .into_iter()
            .filter(|t| *t > now)
            .min()
            .unwrap_or(now + MAX_WAIT)
            .min(now + MAX_WAIT)
    }
}

impl Rotation for PriorityRotation {
    fn next_action(&self, sim: &Simulation, unit: UnitId) -> Decision {
        let target = sim.primary_target();
        for action in &self.actions {
            if action.checks.iter().all(|c| c.holds(sim, unit)) && sim.can_cast(action.spell, target) {
                return Decision::Cast {
                    spell: action.spell,
                    target,
                };
            }
        }
        Decision::Wait(self.next_wakeup(sim, unit))
    }
}

/// Negative thresholds clamp to zero; infinite or oversized ones are rejected
fn condition_seconds(seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds.max(0.0)).map_err(|_| {
        SimError::InvalidConfig(format!(
            "condition threshold of {} seconds is out of range",
            seconds
        ))
    })
}
