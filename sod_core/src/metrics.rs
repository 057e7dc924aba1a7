//! Metrics - Per-spell and per-aura counters, iteration results and aggregation

use crate::combat::SpellResult;
use crate::log::LogEntry;
use crate::types::{ActionId, HitOutcome};
use crate::unit::ResourceKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Counters collected on a spell during one iteration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpellMetrics {
    pub casts: u32,
    pub hits: u32,
    pub crits: u32,
    pub misses: u32,
    pub dodges: u32,
    pub glances: u32,
    pub partial_resists: u32,
    pub ticks: u32,
    pub crit_ticks: u32,
    pub damage: f64,
}

impl SpellMetrics {
    pub fn record(&mut self, result: &SpellResult) {
        let outcome = result.outcome;
        if result.periodic {
            self.ticks += 1;
            if outcome.did_crit() {
                self.crit_ticks += 1;
            }
        } else if outcome.contains(HitOutcome::MISS) {
            self.misses += 1;
        } else if outcome.contains(HitOutcome::DODGE) {
            self.dodges += 1;
        } else {
            self.hits += 1;
            if outcome.did_crit() {
                self.crits += 1;
            }
            if outcome.did_glance() {
                self.glances += 1;
            }
        }
        if outcome.intersects(HitOutcome::PARTIAL) {
            self.partial_resists += 1;
        }
        self.damage += result.damage;
    }
}

/// Counters collected on an aura during one iteration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuraMetrics {
    pub activations: u32,
    pub uptime: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellSummary {
    pub unit: String,
    pub label: String,
    pub action_id: ActionId,
    pub casts: f64,
    pub hits: f64,
    pub crits: f64,
    pub misses: f64,
    pub ticks: f64,
    pub damage: f64,
    pub dps: f64,
}

impl SpellSummary {
    pub fn crit_percent(&self) -> f64 {
        let landed = self.hits + self.ticks;
        if landed <= 0.0 {
            0.0
        } else {
            self.crits / landed * 100.0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuraSummary {
    pub unit: String,
    pub label: String,
    pub action_id: ActionId,
    pub activations: f64,
    pub uptime_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub unit: String,
    pub source: String,
    pub kind: ResourceKind,
    pub gained: f64,
}

/// Outcome of one simulated fight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationResult {
    pub duration_seconds: f64,
    /// Damage dealt by the player and its pets
    pub damage: f64,
    pub dps: f64,
    pub spells: Vec<SpellSummary>,
    pub auras: Vec<AuraSummary>,
    pub resources: Vec<ResourceSummary>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionMetrics {
    pub mean: f64,
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
}

impl DistributionMetrics {
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        DistributionMetrics {
            mean,
            stdev: variance.sqrt(),
            min: samples.iter().copied().fold(f64::INFINITY, f64::min),
            max: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Aggregate over all iterations; per-spell values are per-iteration averages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimResult {
    pub iterations: u32,
    pub dps: DistributionMetrics,
    pub average_duration_seconds: f64,
    pub spells: Vec<SpellSummary>,
    pub auras: Vec<AuraSummary>,
    pub resources: Vec<ResourceSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<Vec<LogEntry>>,
}

impl SimResult {
    pub fn aggregate(results: &[IterationResult], log: Option<Vec<LogEntry>>) -> Self {
        let n = results.len().max(1) as f64;
        let dps: Vec<f64> = results.iter().map(|r| r.dps).collect();

        let mut spells: BTreeMap<(String, String), SpellSummary> = BTreeMap::new();
        let mut auras: BTreeMap<(String, String), AuraSummary> = BTreeMap::new();
        let mut resources: BTreeMap<(String, String), ResourceSummary> = BTreeMap::new();

        for result in results {
            for s in &result.spells {
                let entry = spells
                    .entry((s.unit.clone(), s.label.clone()))
                    .or_insert_with(|| SpellSummary {
                        casts: 0.0,
                        hits: 0.0,
                        crits: 0.0,
                        misses: 0.0,
                        ticks: 0.0,
                        damage: 0.0,
                        dps: 0.0,
                        ..s.clone()
                    });
                entry.casts += s.casts / n;
                entry.hits += s.hits / n;
                entry.crits += s.crits / n;
                entry.misses += s.misses / n;
                entry.ticks += s.ticks / n;
                entry.damage += s.damage / n;
                entry.dps += s.dps / n;
            }
            for a in &result.auras {
                let entry = auras
                    .entry((a.unit.clone(), a.label.clone()))
                    .or_insert_with(|| AuraSummary {
                        activations: 0.0,
                        uptime_percent: 0.0,
                        ..a.clone()
                    });
                entry.activations += a.activations / n;
                entry.uptime_percent += a.uptime_percent / n;
            }
            for r in &result.resources {
                let entry = resources
                    .entry((r.unit.clone(), r.source.clone()))
                    .or_insert_with(|| ResourceSummary {
                        gained: 0.0,
                        ..r.clone()
                    });
                entry.gained += r.gained / n;
            }
        }

        let mut spells: Vec<SpellSummary> = spells.into_values().collect();
        spells.sort_by(|a, b| b.damage.total_cmp(&a.damage));

        SimResult {
            iterations: results.len() as u32,
            dps: DistributionMetrics::from_samples(&dps),
            average_duration_seconds: results.iter().map(|r| r.duration_seconds).sum::<f64>() / n,
            spells,
            auras: auras.into_values().collect(),
            resources: resources.into_values().collect(),
            log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SpellId, UnitId};

    fn result(outcome: HitOutcome, damage: f64, periodic: bool) -> SpellResult {
        SpellResult {
            spell: SpellId(0),
            caster: UnitId(1),
            target: UnitId(0),
            outcome,
            damage,
            pre_mitigation_damage: damage,
            periodic,
        }
    }

    #[test]
    fn test_spell_metrics_record() {
        let mut metrics = SpellMetrics::default();
        metrics.record(&result(HitOutcome::HIT, 100.0, false));
        metrics.record(&result(HitOutcome::CRIT, 150.0, false));
        metrics.record(&result(HitOutcome::MISS, 0.0, false));
        metrics.record(&result(HitOutcome::TICK, 20.0, true));
        metrics.record(&result(HitOutcome::TICK | HitOutcome::CRIT, 30.0, true));
        metrics.record(&result(HitOutcome::HIT | HitOutcome::PARTIAL_1_4, 75.0, false));

        assert_eq!(metrics.hits, 3);
        assert_eq!(metrics.crits, 1);
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.ticks, 2);
        assert_eq!(metrics.crit_ticks, 1);
        assert_eq!(metrics.partial_resists, 1);
        assert!((metrics.damage - 375.0).abs() < 0.01);
    }

    #[test]
    fn test_distribution() {
        let dist = DistributionMetrics::from_samples(&[100.0, 200.0, 300.0]);
        assert!((dist.mean - 200.0).abs() < 0.01);
        assert!((dist.min - 100.0).abs() < 0.01);
        assert!((dist.max - 300.0).abs() < 0.01);
        // population stdev of 100/200/300
        assert!((dist.stdev - 81.65).abs() < 0.01);
    }

    #[test]
    fn test_aggregate_averages_spells() {
        let spell = |damage: f64| SpellSummary {
            unit: "Player".to_string(),
            label: "Wrath".to_string(),
            action_id: ActionId::spell(9912),
            casts: 10.0,
            hits: 9.0,
            crits: 2.0,
            misses: 1.0,
            ticks: 0.0,
            damage,
            dps: damage / 100.0,
        };
        let iteration = |damage: f64| IterationResult {
            duration_seconds: 100.0,
            damage,
            dps: damage / 100.0,
            spells: vec![spell(damage)],
            auras: vec![],
            resources: vec![],
        };

        let result = SimResult::aggregate(&[iteration(10000.0), iteration(20000.0)], None);
        assert_eq!(result.iterations, 2);
        assert!((result.dps.mean - 150.0).abs() < 0.01);
        assert_eq!(result.spells.len(), 1);
        assert!((result.spells[0].damage - 15000.0).abs() < 0.01);
        assert!((result.spells[0].casts - 10.0).abs() < 0.01);
    }
}
