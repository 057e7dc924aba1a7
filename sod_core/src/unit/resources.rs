//! Resources - Mana, energy, combo points and where they came from

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Which bar a resource change applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Mana,
    Energy,
    ComboPoints,
}

impl ResourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Mana => "Mana",
            ResourceKind::Energy => "Energy",
            ResourceKind::ComboPoints => "Combo Points",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ManaBar {
    pub current: f64,
    /// Last time mana was spent, for the five-second rule
    pub last_spend: Option<Duration>,
}

impl ManaBar {
    /// True if no mana was spent during the last `window`
    pub fn outside_five_second_rule(&self, now: Duration, window: Duration) -> bool {
        match self.last_spend {
            Some(at) => now.saturating_sub(at) >= window,
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnergyBar {
    pub current: f64,
    pub max: f64,
}

impl EnergyBar {
    pub fn new(max: f64) -> Self {
        EnergyBar { current: max, max }
    }
}

/// Running totals of one resource source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceGain {
    pub kind: Option<ResourceKind>,
    /// Amount actually gained after capping
    pub gained: f64,
    /// Amount lost to the resource cap
    pub wasted: f64,
    pub events: u32,
}

/// Resource gains of a unit, keyed by source label
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceMetrics {
    pub gains: BTreeMap<String, ResourceGain>,
    pub mana_spent: f64,
    pub energy_spent: f64,
}

impl ResourceMetrics {
    pub fn record_gain(&mut self, kind: ResourceKind, source: &str, gained: f64, wasted: f64) {
        let entry = self.gains.entry(source.to_string()).or_default();
        entry.kind = Some(kind);
        entry.gained += gained;
        entry.wasted += wasted;
        entry.events += 1;
    }

    pub fn total_gained(&self, kind: ResourceKind) -> f64 {
        self.gains
            .values()
            .filter(|g| g.kind == Some(kind))
            .map(|g| g.gained)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_second_rule() {
        let mut bar = ManaBar::default();
        let window = Duration::from_secs(5);
        assert!(bar.outside_five_second_rule(Duration::ZERO, window));

        bar.last_spend = Some(Duration::from_secs(10));
        assert!(!bar.outside_five_second_rule(Duration::from_secs(12), window));
        assert!(bar.outside_five_second_rule(Duration::from_secs(15), window));
    }

    #[test]
    fn test_resource_metrics_totals() {
        let mut metrics = ResourceMetrics::default();
        metrics.record_gain(ResourceKind::Mana, "Life Tap", 424.0, 0.0);
        metrics.record_gain(ResourceKind::Mana, "Life Tap", 400.0, 24.0);
        metrics.record_gain(ResourceKind::Energy, "Energy Regen", 20.0, 0.0);

        assert!((metrics.total_gained(ResourceKind::Mana) - 824.0).abs() < 0.01);
        assert_eq!(metrics.gains["Life Tap"].events, 2);
        assert!((metrics.gains["Life Tap"].wasted - 24.0).abs() < 0.01);
    }
}
