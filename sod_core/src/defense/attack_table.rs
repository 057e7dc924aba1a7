//! AttackTable - Level-difference driven miss, dodge, glance and crit suppression

use crate::config::HitConstants;

/// Attack table chances between one attacker and one target, as fractions in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackTable {
    /// Spell miss chance before the attacker's spell hit
    pub base_spell_miss: f64,
    /// Spell hit can never reduce the miss chance below this
    pub min_spell_miss: f64,
    /// Special-attack and white-hit miss chance before melee hit
    pub base_melee_miss: f64,
    pub dodge: f64,
    /// Glancing blow chance for white hits
    pub glance: f64,
    /// Melee crit chance removed against higher-level targets
    pub crit_suppression: f64,
}

impl AttackTable {
    pub fn new(attacker_level: u32, target_level: u32, constants: &HitConstants) -> Self {
        let diff = target_level as i64 - attacker_level as i64;
        let level_index = diff.clamp(0, 3) as usize;

        let spell_miss = if diff <= 2 {
            constants.spell_base_miss + constants.spell_miss_per_level * diff as f64
        } else {
            constants.spell_miss_plus_three + constants.spell_miss_high_level_step * (diff - 3) as f64
        };

        let positive_diff = diff.max(0) as f64;

        AttackTable {
            base_spell_miss: (spell_miss / 100.0).max(constants.spell_min_miss / 100.0),
            min_spell_miss: constants.spell_min_miss / 100.0,
            base_melee_miss: constants.melee_miss[level_index] / 100.0,
            dodge: ((constants.dodge_base + constants.dodge_per_level * diff as f64) / 100.0).max(0.0),
            glance: ((constants.glance_base + constants.glance_per_level * positive_diff) / 100.0)
                .max(0.0),
            crit_suppression: constants.melee_crit_suppression[level_index] / 100.0,
        }
    }

    /// Spell miss chance after `hit_percent` points of spell hit
    pub fn spell_miss_chance(&self, hit_percent: f64) -> f64 {
        (self.base_spell_miss - hit_percent / 100.0).max(self.min_spell_miss)
    }

    /// Melee miss chance after `hit_percent` points of melee hit
    pub fn melee_miss_chance(&self, hit_percent: f64) -> f64 {
        (self.base_melee_miss - hit_percent / 100.0).max(0.0)
    }
}
