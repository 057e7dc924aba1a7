//! BuffSource - Flat stat bonuses that last the whole fight

use crate::source::StatSource;
use crate::stats::Stats;

/// Named stat bonus, optionally stacked
///
/// Used for permanent bonuses known before the fight starts, such as the
/// share of an owner's stats a pet inherits.
#[derive(Debug, Clone)]
pub struct BuffSource {
    pub buff_id: String,
    pub name: String,
    /// Stats granted per stack
    pub stats_per_stack: Stats,
    pub stacks: u32,
}

impl BuffSource {
    pub fn new(buff_id: &str, name: &str, stats_per_stack: Stats) -> Self {
        BuffSource {
            buff_id: buff_id.to_string(),
            name: name.to_string(),
            stats_per_stack,
            stacks: 1,
        }
    }

    /// Set the number of stacks
    pub fn with_stacks(mut self, stacks: u32) -> Self {
        self.stacks = stacks;
        self
    }

    pub fn total(&self) -> Stats {
        self.stats_per_stack.scale(self.stacks as f64)
    }
}

impl StatSource for BuffSource {
    fn id(&self) -> &str {
        &self.buff_id
    }

    fn priority(&self) -> i32 {
        200 // Bonuses apply after gear
    }

    fn apply(&self, stats: &mut Stats) {
        stats.add_assign(&self.total());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Stat;

    #[test]
    fn test_buff_stacks() {
        let buff = BuffSource::new("test", "Test", Stats::from_pairs(&[(Stat::SpellPower, 10.0)]))
            .with_stacks(3);

        let mut stats = Stats::new();
        buff.apply(&mut stats);

        // 10 per stack * 3 stacks = 30
        assert!((stats[Stat::SpellPower] - 30.0).abs() < 0.01);
    }

    #[test]
    fn test_zero_stacks_adds_nothing() {
        let buff = BuffSource::new("test", "Test", Stats::from_pairs(&[(Stat::Stamina, 5.0)]))
            .with_stacks(0);
        assert!(buff.total().is_zero());
    }

    #[test]
    fn test_buff_priority() {
        let buff = BuffSource::new("test", "Test", Stats::new());
        assert_eq!(buff.priority(), 200);
    }
}
