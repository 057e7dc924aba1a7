//! StatSource - Trait and implementations for stat providers
//!
//! A unit's starting stats are assembled from sources (class base stats,
//! gear, flat bonuses) before the simulation starts. Anything that changes
//! mid-fight goes through auras instead.

mod base_stats;
mod buff;
mod gear;

pub use base_stats::BaseStatsSource;
pub use buff::BuffSource;
pub use gear::GearSource;

use crate::stats::Stats;

/// Trait for anything that contributes stats to a unit
pub trait StatSource: Send + Sync {
    /// Unique identifier for this source
    fn id(&self) -> &str;

    /// Priority for application order (higher = applied later)
    /// Suggested priorities:
    /// - Base stats: -100
    /// - Gear: 0
    /// - Bonuses: 200
    fn priority(&self) -> i32 {
        0
    }

    /// Apply this source's stats
    fn apply(&self, stats: &mut Stats);
}

/// Sum all sources in priority order
pub fn build_stats(sources: &[&dyn StatSource]) -> Stats {
    let mut ordered: Vec<&dyn StatSource> = sources.to_vec();
    ordered.sort_by_key(|s| s.priority());

    let mut stats = Stats::new();
    for source in ordered {
        source.apply(&mut stats);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Stat;

    #[test]
    fn test_build_stats_sums_sources() {
        let base = BaseStatsSource::new(
            "druid",
            60,
            Stats::from_pairs(&[(Stat::Intellect, 95.0), (Stat::Spirit, 102.0)]),
        );
        let gear = GearSource::new("head", Stats::from_pairs(&[(Stat::Intellect, 20.0)]));
        let bonus = BuffSource::new("wisdom", "Wisdom", Stats::from_pairs(&[(Stat::Spirit, 3.0)]))
            .with_stacks(2);

        let stats = build_stats(&[&bonus, &gear, &base]);
        assert!((stats[Stat::Intellect] - 115.0).abs() < 0.01);
        assert!((stats[Stat::Spirit] - 108.0).abs() < 0.01);
    }
}
