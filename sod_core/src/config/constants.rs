//! Combat constants configuration
//!
//! Attack table, armor, resistance and regeneration numbers. Every section
//! has serde defaults so a constants file only needs the values it changes.

use serde::{Deserialize, Serialize};

/// Tunable combat constants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatConstants {
    #[serde(default)]
    pub hit: HitConstants,
    #[serde(default)]
    pub armor: ArmorConstants,
    #[serde(default)]
    pub resist: ResistConstants,
    #[serde(default)]
    pub crit: CritConstants,
    #[serde(default)]
    pub regen: RegenConstants,
}

impl CombatConstants {
    /// Parse constants from a TOML string, falling back to defaults for missing sections
    pub fn from_toml(content: &str) -> Result<Self, super::ConfigError> {
        super::parse_toml(content)
    }
}

/// Built-in constants shipped with the crate
pub fn default_constants() -> CombatConstants {
    let toml = include_str!("../../config/constants.toml");
    CombatConstants::from_toml(toml).unwrap_or_default()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitConstants {
    /// Spell miss percent against a target of equal level
    #[serde(default = "default_spell_base_miss")]
    pub spell_base_miss: f64,
    /// Extra spell miss percent per level the target is above the caster (up to +2)
    #[serde(default = "default_spell_miss_per_level")]
    pub spell_miss_per_level: f64,
    /// Spell miss percent against a target three levels higher
    #[serde(default = "default_spell_miss_plus_three")]
    pub spell_miss_plus_three: f64,
    /// Extra spell miss percent per level beyond +3
    #[serde(default = "default_spell_miss_high_level_step")]
    pub spell_miss_high_level_step: f64,
    /// Spell hit can never push miss below this percent
    #[serde(default = "default_spell_min_miss")]
    pub spell_min_miss: f64,
    /// Special-attack miss percent indexed by level difference 0..=3
    #[serde(default = "default_melee_miss")]
    pub melee_miss: [f64; 4],
    #[serde(default = "default_dodge_base")]
    pub dodge_base: f64,
    #[serde(default = "default_dodge_per_level")]
    pub dodge_per_level: f64,
    /// Glancing blow percent for white hits against an equal-level target
    #[serde(default = "default_glance_base")]
    pub glance_base: f64,
    #[serde(default = "default_glance_per_level")]
    pub glance_per_level: f64,
    /// Melee crit percent suppressed against higher-level targets, indexed by level difference
    #[serde(default = "default_crit_suppression")]
    pub melee_crit_suppression: [f64; 4],
}

impl Default for HitConstants {
    fn default() -> Self {
        HitConstants {
            spell_base_miss: default_spell_base_miss(),
            spell_miss_per_level: default_spell_miss_per_level(),
            spell_miss_plus_three: default_spell_miss_plus_three(),
            spell_miss_high_level_step: default_spell_miss_high_level_step(),
            spell_min_miss: default_spell_min_miss(),
            melee_miss: default_melee_miss(),
            dodge_base: default_dodge_base(),
            dodge_per_level: default_dodge_per_level(),
            glance_base: default_glance_base(),
            glance_per_level: default_glance_per_level(),
            melee_crit_suppression: default_crit_suppression(),
        }
    }
}

fn default_spell_base_miss() -> f64 {
    4.0
}
fn default_spell_miss_per_level() -> f64 {
    1.0
}
fn default_spell_miss_plus_three() -> f64 {
    17.0
}
fn default_spell_miss_high_level_step() -> f64 {
    11.0
}
fn default_spell_min_miss() -> f64 {
    1.0
}
fn default_melee_miss() -> [f64; 4] {
    [5.0, 5.5, 6.0, 8.0]
}
fn default_dodge_base() -> f64 {
    5.0
}
fn default_dodge_per_level() -> f64 {
    0.5
}
fn default_glance_base() -> f64 {
    10.0
}
fn default_glance_per_level() -> f64 {
    10.0
}
fn default_crit_suppression() -> [f64; 4] {
    [0.0, 0.2, 0.4, 1.8]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmorConstants {
    /// Formula: modifier = 1 - armor / (armor + base + per_level * attacker_level)
    #[serde(default = "default_armor_base")]
    pub base: f64,
    #[serde(default = "default_armor_per_level")]
    pub per_attacker_level: f64,
}

impl Default for ArmorConstants {
    fn default() -> Self {
        ArmorConstants {
            base: default_armor_base(),
            per_attacker_level: default_armor_per_level(),
        }
    }
}

fn default_armor_base() -> f64 {
    400.0
}
fn default_armor_per_level() -> f64 {
    85.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResistConstants {
    /// Resistance that counts as fully resisted is `attacker_level * cap_per_level`
    #[serde(default = "default_cap_per_level")]
    pub cap_per_level: f64,
    /// Pure DoTs divide the resistance coefficient by this
    #[serde(default = "default_pure_dot_divisor")]
    pub pure_dot_divisor: f64,
    /// Average mitigation added per level an enemy is above the attacker
    #[serde(default = "default_mitigation_per_level")]
    pub mitigation_per_level: f64,
}

impl Default for ResistConstants {
    fn default() -> Self {
        ResistConstants {
            cap_per_level: default_cap_per_level(),
            pure_dot_divisor: default_pure_dot_divisor(),
            mitigation_per_level: default_mitigation_per_level(),
        }
    }
}

fn default_cap_per_level() -> f64 {
    5.0
}
fn default_pure_dot_divisor() -> f64 {
    10.0
}
fn default_mitigation_per_level() -> f64 {
    0.02
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CritConstants {
    /// Base spell critical strike multiplier (1.5 = 150%)
    #[serde(default = "default_spell_crit")]
    pub spell_multiplier: f64,
    #[serde(default = "default_melee_crit")]
    pub melee_multiplier: f64,
    /// Damage dealt by a glancing blow
    #[serde(default = "default_glance_multiplier")]
    pub glance_multiplier: f64,
}

impl Default for CritConstants {
    fn default() -> Self {
        CritConstants {
            spell_multiplier: default_spell_crit(),
            melee_multiplier: default_melee_crit(),
            glance_multiplier: default_glance_multiplier(),
        }
    }
}

fn default_spell_crit() -> f64 {
    1.5
}
fn default_melee_crit() -> f64 {
    2.0
}
fn default_glance_multiplier() -> f64 {
    0.65
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenConstants {
    /// Seconds between mana and energy ticks
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f64,
    #[serde(default = "default_energy_per_tick")]
    pub energy_per_tick: f64,
    #[serde(default = "default_max_energy")]
    pub max_energy: f64,
    /// Spirit regen pauses for this long after spending mana
    #[serde(default = "default_five_second_rule")]
    pub five_second_rule: f64,
    #[serde(default = "default_max_combo_points")]
    pub max_combo_points: u32,
}

impl Default for RegenConstants {
    fn default() -> Self {
        RegenConstants {
            tick_seconds: default_tick_seconds(),
            energy_per_tick: default_energy_per_tick(),
            max_energy: default_max_energy(),
            five_second_rule: default_five_second_rule(),
            max_combo_points: default_max_combo_points(),
        }
    }
}

fn default_tick_seconds() -> f64 {
    2.0
}
fn default_energy_per_tick() -> f64 {
    20.0
}
fn default_max_energy() -> f64 {
    100.0
}
fn default_five_second_rule() -> f64 {
    5.0
}
fn default_max_combo_points() -> u32 {
    5
}
