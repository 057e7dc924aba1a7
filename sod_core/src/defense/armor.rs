//! Armor - Physical damage reduction scaled by attacker level

use crate::config::ArmorConstants;

/// Damage multiplier applied to physical hits against `armor`
///
/// `1 - armor / (armor + base + per_level * attacker_level)`. Armor at or
/// below zero leaves damage untouched.
pub fn armor_damage_modifier(armor: f64, attacker_level: u32, constants: &ArmorConstants) -> f64 {
    if armor <= 0.0 {
        return 1.0;
    }
    let divisor = armor + constants.base + constants.per_attacker_level * attacker_level as f64;
    1.0 - armor / divisor
}

/// Damage reduction from armor as a percentage (0-100)
pub fn armor_reduction_percent(armor: f64, attacker_level: u32, constants: &ArmorConstants) -> f64 {
    ((1.0 - armor_damage_modifier(armor, attacker_level, constants)) * 100.0).clamp(0.0, 100.0)
}
