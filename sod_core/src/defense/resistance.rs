//! Resistance - Magic partial resists and binary spell hit chance
//!
//! Resistance is turned into a coefficient in `[0, 1]`:
//! `coeff = max(0, resistance - penetration) / (attacker_level * cap_per_level)`.
//!
//! - Pure DoTs count only a tenth of the resistance.
//! - Non-binary spells against a higher-level enemy gain extra average mitigation.
//! - Non-binary spells roll a 0/25/50/75% partial resist from piecewise-linear tables.
//! - Binary spells never partially resist; their hit chance drops to `1 - 0.75 * coeff`.

use crate::config::ResistConstants;
use crate::types::HitOutcome;

/// Everything needed to compute a resistance coefficient
#[derive(Debug, Clone, Copy)]
pub struct ResistInput {
    pub resistance: f64,
    pub penetration: f64,
    pub attacker_level: u32,
    pub target_level: u32,
    /// Level-based mitigation only applies to enemy targets
    pub target_is_enemy: bool,
    pub binary: bool,
    pub pure_dot: bool,
}

/// Roll thresholds: a roll at or below `any` is resisted at least 25%, etc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialResistThresholds {
    pub any: f64,
    pub half_or_more: f64,
    pub three_quarters: f64,
}

/// Resistance coefficient, scaled so 1.0 means the average resist hits its cap
pub fn resist_coefficient(input: &ResistInput, constants: &ResistConstants) -> f64 {
    let resistance = (input.resistance - input.penetration).max(0.0);
    let cap = input.attacker_level.max(1) as f64 * constants.cap_per_level;
    let mut coeff = resistance / cap;

    if input.pure_dot {
        coeff /= constants.pure_dot_divisor;
    }

    if !input.binary && input.target_is_enemy && input.target_level > input.attacker_level {
        let levels = (input.target_level - input.attacker_level) as f64;
        // coefficient runs 0..1 while average mitigation runs 0..0.75
        coeff += constants.mitigation_per_level * levels / 0.75;
    }

    coeff.min(1.0)
}

pub fn partial_resist_thresholds(coeff: f64) -> PartialResistThresholds {
    let chance_25 = piecewise_linear3(coeff, 0.0, 0.55, 0.22, 0.04);
    let chance_50 = piecewise_linear3(coeff, 0.0, 0.18, 0.56, 0.16);
    let chance_75 = piecewise_linear3(coeff, 0.0, 0.03, 0.22, 0.80);
    PartialResistThresholds {
        any: chance_25 + chance_50 + chance_75,
        half_or_more: chance_50 + chance_75,
        three_quarters: chance_75,
    }
}

/// Map a uniform roll in `[0, 1)` to a damage multiplier and outcome flag
pub fn roll_partial_resist(roll: f64, thresholds: &PartialResistThresholds) -> (f64, HitOutcome) {
    if roll > thresholds.any {
        (1.0, HitOutcome::empty())
    } else if roll > thresholds.half_or_more {
        (0.75, HitOutcome::PARTIAL_1_4)
    } else if roll > thresholds.three_quarters {
        (0.5, HitOutcome::PARTIAL_2_4)
    } else {
        (0.25, HitOutcome::PARTIAL_3_4)
    }
}

/// Hit chance multiplier for binary spells
pub fn binary_hit_chance(coeff: f64) -> f64 {
    1.0 - 0.75 * coeff
}

/// Expected damage multiplier after partial resists
pub fn average_resist_multiplier(coeff: f64) -> f64 {
    let t = partial_resist_thresholds(coeff);
    let p75 = t.three_quarters;
    let p50 = t.half_or_more - t.three_quarters;
    let p25 = t.any - t.half_or_more;
    let p0 = 1.0 - t.any;
    p0 + 0.75 * p25 + 0.5 * p50 + 0.25 * p75
}

fn piecewise_linear3(val: f64, p0: f64, p1: f64, p2: f64, p3: f64) -> f64 {
    if val < 1.0 / 3.0 {
        interpolate(val * 3.0, p0, p1)
    } else if val < 2.0 / 3.0 {
        interpolate((val - 1.0 / 3.0) * 3.0, p1, p2)
    } else {
        interpolate((val - 2.0 / 3.0) * 3.0, p2, p3)
    }
}

fn interpolate(val: f64, p0: f64, p1: f64) -> f64 {
    p0 * (1.0 - val) + p1 * val
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn input(resistance: f64) -> ResistInput {
        ResistInput {
            resistance,
            penetration: 0.0,
            attacker_level: 60,
            target_level: 60,
            target_is_enemy: true,
            binary: false,
            pure_dot: false,
        }
    }

    #[test]
    fn test_zero_resistance_never_resists() {
        let coeff = resist_coefficient(&input(0.0), &ResistConstants::default());
        assert!(coeff.abs() < f64::EPSILON);
        let t = partial_resist_thresholds(coeff);
        assert!(t.any.abs() < f64::EPSILON);
        assert!((average_resist_multiplier(coeff) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_boss_level_mitigation() {
        // +3 level boss: 0.02 * 3 / 0.75 = 0.08
        let mut i = input(0.0);
        i.target_level = 63;
        let coeff = resist_coefficient(&i, &ResistConstants::default());
        assert!((coeff - 0.08).abs() < 1e-9);

        // Binary spells ignore level mitigation
        i.binary = true;
        let coeff = resist_coefficient(&i, &ResistConstants::default());
        assert!(coeff.abs() < f64::EPSILON);
    }

    #[test]
    fn test_pure_dot_uses_tenth() {
        let constants = ResistConstants::default();
        let direct = resist_coefficient(&input(150.0), &constants);
        let mut dot = input(150.0);
        dot.pure_dot = true;
        let pure = resist_coefficient(&dot, &constants);
        // 150 / 300 = 0.5, pure dot = 0.05
        assert!((direct - 0.5).abs() < 1e-9);
        assert!((pure - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_penetration_offsets_resistance() {
        let mut i = input(100.0);
        i.penetration = 150.0;
        let coeff = resist_coefficient(&i, &ResistConstants::default());
        assert!(coeff.abs() < f64::EPSILON);
    }

    #[test]
    fn test_full_coefficient_thresholds() {
        // At coeff 1.0 the table reaches its last breakpoint
        let t = partial_resist_thresholds(1.0 - 1e-12);
        assert!((t.three_quarters - 0.80).abs() < 1e-6);
        assert!((t.half_or_more - 0.96).abs() < 1e-6);
        assert!((t.any - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_roll_buckets() {
        let t = PartialResistThresholds {
            any: 0.5,
            half_or_more: 0.2,
            three_quarters: 0.05,
        };
        assert_eq!(roll_partial_resist(0.9, &t), (1.0, HitOutcome::empty()));
        assert_eq!(roll_partial_resist(0.3, &t), (0.75, HitOutcome::PARTIAL_1_4));
        assert_eq!(roll_partial_resist(0.1, &t), (0.5, HitOutcome::PARTIAL_2_4));
        assert_eq!(roll_partial_resist(0.01, &t), (0.25, HitOutcome::PARTIAL_3_4));
    }

    #[test]
    fn test_binary_hit_chance() {
        assert!((binary_hit_chance(0.0) - 1.0).abs() < f64::EPSILON);
        assert!((binary_hit_chance(1.0) - 0.25).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn prop_thresholds_are_ordered(coeff in 0.0f64..1.0) {
            let t = partial_resist_thresholds(coeff);
            prop_assert!(t.three_quarters <= t.half_or_more + 1e-12);
            prop_assert!(t.half_or_more <= t.any + 1e-12);
            prop_assert!(t.any <= 1.0 + 1e-9);
            prop_assert!(t.three_quarters >= 0.0);
        }

        #[test]
        fn prop_average_multiplier_decreases(a in 0.0f64..0.99, delta in 0.001f64..0.01) {
            let b = (a + delta).min(0.999);
            prop_assert!(average_resist_multiplier(b) <= average_resist_multiplier(a) + 1e-9);
        }

        #[test]
        fn prop_coefficient_capped(resistance in 0.0f64..2000.0, level in 1u32..=60) {
            let mut i = input(resistance);
            i.attacker_level = level;
            let coeff = resist_coefficient(&i, &ResistConstants::default());
            prop_assert!((0.0..=1.0).contains(&coeff));
        }
    }
}
