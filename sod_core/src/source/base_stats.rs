//! BaseStatsSource - Class base stats at a character level

use crate::source::StatSource;
use crate::stats::Stats;

/// Naked stats of a class at a level
pub struct BaseStatsSource {
    id: String,
    pub level: u32,
    pub stats: Stats,
}

impl BaseStatsSource {
    pub fn new(class_name: &str, level: u32, stats: Stats) -> Self {
        BaseStatsSource {
            id: format!("base_{}_{}", class_name.to_lowercase(), level),
            level,
            stats,
        }
    }
}

impl StatSource for BaseStatsSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        -100 // Base stats apply first
    }

    fn apply(&self, stats: &mut Stats) {
        stats.add_assign(&self.stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Stat;

    #[test]
    fn test_base_stats_id() {
        let source = BaseStatsSource::new("Warlock", 40, Stats::new());
        assert_eq!(source.id(), "base_warlock_40");
    }

    #[test]
    fn test_base_stats_apply() {
        let source = BaseStatsSource::new("warlock", 60, Stats::from_pairs(&[(Stat::Stamina, 66.0)]));
        let mut stats = Stats::from_pairs(&[(Stat::Stamina, 10.0)]);
        source.apply(&mut stats);
        assert!((stats[Stat::Stamina] - 76.0).abs() < 0.01);
    }

    #[test]
    fn test_base_stats_priority() {
        let source = BaseStatsSource::new("druid", 1, Stats::new());
        assert_eq!(source.priority(), -100);
    }
}
