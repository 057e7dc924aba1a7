//! Encounter and run settings

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level simulation settings file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Keep a combat log for the first iteration
    #[serde(default)]
    pub capture_log: bool,
    #[serde(default)]
    pub encounter: EncounterConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            iterations: default_iterations(),
            seed: default_seed(),
            capture_log: false,
            encounter: EncounterConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: SimConfig = super::load_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = super::parse_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::ValidationError(
                "iterations must be at least 1".to_string(),
            ));
        }
        self.encounter.validate()
    }
}

fn default_iterations() -> u32 {
    1000
}

fn default_seed() -> u64 {
    42
}

/// The fight: how long it lasts and what is being hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterConfig {
    #[serde(default = "default_duration")]
    pub duration_seconds: f64,
    /// Each iteration's duration is rolled within `duration ± variation`
    #[serde(default = "default_variation")]
    pub duration_variation_seconds: f64,
    /// Distance to the target, used for spell travel time
    #[serde(default = "default_distance")]
    pub distance_yards: f64,
    #[serde(default)]
    pub target: TargetConfig,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        EncounterConfig {
            duration_seconds: default_duration(),
            duration_variation_seconds: default_variation(),
            distance_yards: default_distance(),
            target: TargetConfig::default(),
        }
    }
}

impl EncounterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.duration_seconds > 0.0 && self.duration_seconds.is_finite()) {
            return Err(ConfigError::ValidationError(
                "duration_seconds must be positive and finite".to_string(),
            ));
        }
        if self.duration_variation_seconds < 0.0
            || self.duration_variation_seconds >= self.duration_seconds
        {
            return Err(ConfigError::ValidationError(
                "duration_variation_seconds must be in [0, duration_seconds)".to_string(),
            ));
        }
        if !(self.distance_yards >= 0.0 && self.distance_yards.is_finite()) {
            return Err(ConfigError::ValidationError(
                "distance_yards must be finite and not negative".to_string(),
            ));
        }
        Ok(())
    }

    /// A default boss fight scaled to a player level bracket
    pub fn for_player_level(level: u32) -> Self {
        EncounterConfig {
            target: TargetConfig::boss_for_level(level),
            ..Default::default()
        }
    }
}

fn default_duration() -> f64 {
    180.0
}

fn default_variation() -> f64 {
    5.0
}

fn default_distance() -> f64 {
    25.0
}

/// The enemy being attacked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_target_name")]
    pub name: String,
    #[serde(default = "default_target_level")]
    pub level: u32,
    #[serde(default = "default_target_armor")]
    pub armor: f64,
    #[serde(default)]
    pub arcane_resistance: f64,
    #[serde(default)]
    pub fire_resistance: f64,
    #[serde(default)]
    pub frost_resistance: f64,
    #[serde(default)]
    pub nature_resistance: f64,
    #[serde(default)]
    pub shadow_resistance: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        TargetConfig {
            name: default_target_name(),
            level: default_target_level(),
            armor: default_target_armor(),
            arcane_resistance: 0.0,
            fire_resistance: 0.0,
            frost_resistance: 0.0,
            nature_resistance: 0.0,
            shadow_resistance: 0.0,
        }
    }
}

impl TargetConfig {
    /// Raid boss for a level bracket: three levels above the player at 60, two below that
    pub fn boss_for_level(level: u32) -> Self {
        let (target_level, armor) = match level {
            0..=25 => (27, 1104.0),
            26..=40 => (42, 1995.0),
            41..=50 => (52, 2850.0),
            _ => (63, 3731.0),
        };
        TargetConfig {
            level: target_level,
            armor,
            ..Default::default()
        }
    }
}

fn default_target_name() -> String {
    "Target Dummy".to_string()
}

fn default_target_level() -> u32 {
    63
}

fn default_target_armor() -> f64 {
    3731.0
}

/// Built-in default settings
pub fn default_sim_config() -> SimConfig {
    let toml = include_str!("../../config/encounter.toml");
    SimConfig::parse(toml).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encounter() {
        let toml = r#"
iterations = 50
seed = 7

[encounter]
duration_seconds = 120.0

[encounter.target]
level = 52
armor = 2850.0
shadow_resistance = 30.0
"#;
        let config = SimConfig::parse(toml).unwrap();
        assert_eq!(config.iterations, 50);
        assert_eq!(config.seed, 7);
        assert!((config.encounter.duration_seconds - 120.0).abs() < 0.01);
        assert!((config.encounter.duration_variation_seconds - 5.0).abs() < 0.01);
        assert_eq!(config.encounter.target.level, 52);
        assert!((config.encounter.target.shadow_resistance - 30.0).abs() < 0.01);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let result = SimConfig::parse("iterations = 0");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_variation_must_be_below_duration() {
        let toml = r#"
[encounter]
duration_seconds = 10.0
duration_variation_seconds = 10.0
"#;
        assert!(SimConfig::parse(toml).is_err());
    }

    #[test]
    fn test_infinite_encounter_values_rejected() {
        let toml = r#"
[encounter]
duration_seconds = inf
"#;
        assert!(SimConfig::parse(toml).is_err());

        let toml = r#"
[encounter]
distance_yards = inf
"#;
        assert!(SimConfig::parse(toml).is_err());
    }

    #[test]
    fn test_boss_for_level() {
        assert_eq!(TargetConfig::boss_for_level(60).level, 63);
        assert_eq!(TargetConfig::boss_for_level(25).level, 27);
        assert_eq!(TargetConfig::boss_for_level(50).level, 52);
    }

    #[test]
    fn test_default_config_parses() {
        let config = default_sim_config();
        assert!(config.iterations > 0);
        assert!(config.encounter.validate().is_ok());
    }
}
