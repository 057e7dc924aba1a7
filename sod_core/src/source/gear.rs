//! GearSource - Stats from equipped items

use crate::source::StatSource;
use crate::stats::Stats;

/// Stats from the item(s) in one equipment slot
pub struct GearSource {
    /// Slot name, e.g. `head` or `all` for a pre-summed gear set
    pub slot: String,
    pub stats: Stats,
}

impl GearSource {
    pub fn new(slot: impl Into<String>, stats: Stats) -> Self {
        GearSource {
            slot: slot.into(),
            stats,
        }
    }
}

impl StatSource for GearSource {
    fn id(&self) -> &str {
        &self.slot
    }

    fn priority(&self) -> i32 {
        0 // Gear applies at default priority
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
    fn test_gear_source_id() {
        let source = GearSource::new("main_hand", Stats::new());
        assert_eq!(source.id(), "main_hand");
    }

    #[test]
    fn test_gear_adds_stats() {
        let source = GearSource::new(
            "chest",
            Stats::from_pairs(&[(Stat::SpellPower, 22.0), (Stat::SpellCrit, 1.0)]),
        );
        let mut stats = Stats::new();
        source.apply(&mut stats);
        source.apply(&mut stats);
        assert!((stats[Stat::SpellPower] - 44.0).abs() < 0.01);
        assert!((stats[Stat::SpellCrit] - 2.0).abs() < 0.01);
    }
}
