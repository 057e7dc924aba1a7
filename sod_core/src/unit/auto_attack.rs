//! Auto attacks - Main-hand weapon and swing timer state

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::SpellId;

/// A melee weapon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub min_damage: f64,
    pub max_damage: f64,
    /// Swing time in seconds
    pub speed: f64,
}

impl Weapon {
    pub fn new(min_damage: f64, max_damage: f64, speed: f64) -> Self {
        Weapon {
            min_damage,
            max_damage,
            speed,
        }
    }

    pub fn average_damage(&self) -> f64 {
        (self.min_damage + self.max_damage) / 2.0
    }

    /// Roll base weapon damage, without attack power
    pub fn roll(&self, rng: &mut impl Rng) -> f64 {
        if self.max_damage <= self.min_damage {
            return self.min_damage;
        }
        rng.gen_range(self.min_damage..self.max_damage)
    }

    /// Attack power bonus to one swing: `AP / 14` per second of swing time
    pub fn attack_power_bonus(&self, attack_power: f64) -> f64 {
        self.speed * attack_power / 14.0
    }
}

/// Swing timer of a unit
#[derive(Debug, Clone, Default)]
pub struct AutoAttackState {
    pub weapon: Option<Weapon>,
    pub enabled: bool,
    pub next_swing: Duration,
    /// Bumped on every reschedule so older swing events are dropped
    pub(crate) generation: u64,
    /// Spell used to resolve white hits, registered on first enable
    pub(crate) spell: Option<SpellId>,
}

impl AutoAttackState {
    pub fn weapon_speed(&self) -> f64 {
        self.weapon.map(|w| w.speed).unwrap_or(0.0)
    }
}
