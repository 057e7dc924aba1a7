//! Dot - Runtime state of one spell's dot on one target

use super::types::DotConfig;
use crate::types::{DotId, SpellId, UnitId};
use std::time::Duration;

#[derive(Debug)]
pub struct Dot {
    pub id: DotId,
    pub spell: SpellId,
    pub caster: UnitId,
    pub target: UnitId,
    pub config: DotConfig,
    pub(crate) active: bool,
    pub(crate) tick_count: u32,
    pub(crate) tick_period: Duration,
    pub(crate) next_tick_at: Duration,
    pub(crate) expires_at: Duration,
    pub(crate) generation: u64,
    pub(crate) active_since: Duration,
    /// Damage per tick before multipliers, taken at application
    pub snapshot_base_damage: f64,
    /// Crit chance (fraction) taken at application
    pub snapshot_crit_chance: f64,
    pub snapshot_attacker_multiplier: f64,
    pub applications: u32,
    pub uptime: Duration,
}

impl Dot {
    pub(crate) fn new(id: DotId, spell: SpellId, caster: UnitId, target: UnitId, config: DotConfig) -> Self {
        Dot {
            id,
            spell,
            caster,
            target,
            tick_period: config.tick_length,
            config,
            active: false,
            tick_count: 0,
            next_tick_at: Duration::ZERO,
            expires_at: Duration::ZERO,
            generation: 0,
            active_since: Duration::ZERO,
            snapshot_base_damage: 0.0,
            snapshot_crit_chance: 0.0,
            snapshot_attacker_multiplier: 1.0,
            applications: 0,
            uptime: Duration::ZERO,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Ticks dealt since the last apply or rollover
    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    pub fn remaining_ticks(&self) -> u32 {
        self.config.num_ticks.saturating_sub(self.tick_count)
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    pub fn remaining_duration(&self, now: Duration) -> Duration {
        if !self.active {
            return Duration::ZERO;
        }
        self.expires_at.saturating_sub(now)
    }

    pub fn expires_at(&self) -> Duration {
        self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_dot_has_no_remaining_duration() {
        let config = DotConfig::new("Rip", 6, Duration::from_secs(2));
        let dot = Dot::new(DotId(0), SpellId(0), UnitId(1), UnitId(0), config);
        assert!(!dot.is_active());
        assert_eq!(dot.remaining_duration(Duration::ZERO), Duration::ZERO);
        assert_eq!(dot.remaining_ticks(), 6);
        assert_eq!(dot.tick_period(), Duration::from_secs(2));
    }
}
