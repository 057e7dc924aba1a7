//! DoT configuration

use crate::sim::Simulation;
use crate::types::DotId;
use std::rc::Rc;
use std::time::Duration;

/// Takes the snapshot when a dot is applied: `(sim, dot, is_rollover)`
pub type DotSnapshotHook = Rc<dyn Fn(&mut Simulation, DotId, bool)>;
/// Runs on every tick: `(sim, dot)`
pub type DotTickHook = Rc<dyn Fn(&mut Simulation, DotId)>;

/// Configuration for a spell's periodic component
#[derive(Clone)]
pub struct DotConfig {
    /// Display name, usually the spell label
    pub label: String,
    pub num_ticks: u32,
    pub tick_length: Duration,
    /// Spell power coefficient per tick
    pub bonus_coefficient: f64,
    /// Tick length is divided by cast speed at application
    pub affected_by_haste: bool,
    pub on_snapshot: Option<DotSnapshotHook>,
    pub on_tick: Option<DotTickHook>,
}

impl DotConfig {
    pub fn new(label: impl Into<String>, num_ticks: u32, tick_length: Duration) -> Self {
        DotConfig {
            label: label.into(),
            num_ticks,
            tick_length,
            bonus_coefficient: 0.0,
            affected_by_haste: false,
            on_snapshot: None,
            on_tick: None,
        }
    }

    pub fn with_coefficient(mut self, coefficient: f64) -> Self {
        self.bonus_coefficient = coefficient;
        self
    }

    pub fn on_snapshot(mut self, f: impl Fn(&mut Simulation, DotId, bool) + 'static) -> Self {
        self.on_snapshot = Some(Rc::new(f));
        self
    }

    pub fn on_tick(mut self, f: impl Fn(&mut Simulation, DotId) + 'static) -> Self {
        self.on_tick = Some(Rc::new(f));
        self
    }

    /// Unhasted total duration
    pub fn duration(&self) -> Duration {
        self.tick_length * self.num_ticks
    }
}

impl std::fmt::Debug for DotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DotConfig")
            .field("label", &self.label)
            .field("num_ticks", &self.num_ticks)
            .field("tick_length", &self.tick_length)
            .field("bonus_coefficient", &self.bonus_coefficient)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_duration() {
        let config = DotConfig::new("Corruption", 6, Duration::from_secs(3));
        assert_eq!(config.duration(), Duration::from_secs(18));
    }

    #[test]
    fn test_builder() {
        let config = DotConfig::new("Moonfire", 4, Duration::from_secs(3))
            .with_coefficient(0.13)
            .on_tick(|_, _| {});
        assert!((config.bonus_coefficient - 0.13).abs() < f64::EPSILON);
        assert!(config.on_tick.is_some());
        assert!(config.on_snapshot.is_none());
    }
}
