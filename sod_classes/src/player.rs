//! PlayerConfig - TOML-described characters and how they become units
//!
//! A player is assembled from class base stats and gear, registered with
//! its class content, then given its item set bonuses and a rotation:
//!
//! ```toml
//! name = "Boomkin"
//! class = "druid"
//! level = 60
//!
//! [gear]
//! intellect = 180.0
//! spell_power = 420.0
//!
//! [druid]
//! form = "moonkin"
//! runes = ["eclipse", "starsurge", "sunfire"]
//! ```

use crate::{druid, warlock};
use serde::{Deserialize, Serialize};
use sod_core::config::{load_toml, parse_toml, ConfigError};
use sod_core::prelude::*;
use sod_core::source::{build_stats, BaseStatsSource, GearSource};
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

/// Highest character level in the season
pub const MAX_LEVEL: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Class {
    Druid,
    Warlock,
}

impl Class {
    pub fn name(&self) -> &'static str {
        match self {
            Class::Druid => "Druid",
            Class::Warlock => "Warlock",
        }
    }

    /// Stat conversions and spirit regen of the class
    pub fn profile(&self) -> ClassProfile {
        match self {
            Class::Druid => ClassProfile {
                name: "Druid".to_string(),
                base_spell_crit: 1.8,
                base_melee_crit: 0.9,
                intellect_per_spell_crit: 60.0,
                agility_per_melee_crit: 20.0,
                attack_power_per_strength: 2.0,
                attack_power_per_agility: 0.0,
                spirit_regen_base: 15.0,
                spirit_regen_divisor: 5.0,
            },
            Class::Warlock => ClassProfile {
                name: "Warlock".to_string(),
                base_spell_crit: 1.7,
                base_melee_crit: 2.0,
                intellect_per_spell_crit: 60.6,
                agility_per_melee_crit: 20.0,
                attack_power_per_strength: 1.0,
                attack_power_per_agility: 0.0,
                spirit_regen_base: 8.0,
                spirit_regen_divisor: 4.0,
            },
        }
    }

    /// Rotation used when a config does not name one
    pub fn default_rotation(&self) -> RotationConfig {
        match self {
            Class::Druid => RotationConfig::from_labels(&["Wrath"]),
            Class::Warlock => RotationConfig::from_labels(&["Shadow Bolt"]),
        }
    }
}

/// A character: class, level, gear, class options and rotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    pub class: Class,
    pub level: u32,
    /// Summed stats of all equipped items
    #[serde(default)]
    pub gear: Stats,
    /// Set name to number of equipped pieces
    #[serde(default)]
    pub item_sets: BTreeMap<String, u32>,
    #[serde(default)]
    pub druid: Option<druid::DruidConfig>,
    #[serde(default)]
    pub warlock: Option<warlock::WarlockConfig>,
    #[serde(default)]
    pub rotation: Option<RotationConfig>,
}

impl PlayerConfig {
    pub fn load(path: &Path) -> std::result::Result<Self, ConfigError> {
        let config: PlayerConfig = load_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, ConfigError> {
        let config: PlayerConfig = parse_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.level == 0 || self.level > MAX_LEVEL {
            return Err(ConfigError::ValidationError(format!(
                "level must be between 1 and {}, got {}",
                MAX_LEVEL, self.level
            )));
        }
        match self.class {
            Class::Druid if self.warlock.is_some() => Err(ConfigError::ValidationError(
                "warlock options given for a druid".to_string(),
            )),
            Class::Warlock if self.druid.is_some() => Err(ConfigError::ValidationError(
                "druid options given for a warlock".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

// === Base stats ===

/// Naked stats and base mana of a class at a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseStatsEntry {
    pub class: Class,
    pub level: u32,
    pub base_mana: f64,
    pub stats: Stats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BaseStatsFile {
    base_stats: Vec<BaseStatsEntry>,
}

/// Parse a base stats table from TOML
pub fn parse_base_stats(content: &str) -> std::result::Result<Vec<BaseStatsEntry>, ConfigError> {
    let file: BaseStatsFile = parse_toml(content)?;
    Ok(file.base_stats)
}

/// Get the bundled base stats table
pub fn default_base_stats() -> Vec<BaseStatsEntry> {
    let toml = include_str!("../config/base_stats.toml");
    parse_base_stats(toml).unwrap_or_else(|_| {
        vec![
            BaseStatsEntry {
                class: Class::Druid,
                level: 60,
                base_mana: 1244.0,
                stats: Stats::from_pairs(&[
                    (Stat::Strength, 62.0),
                    (Stat::Agility, 65.0),
                    (Stat::Stamina, 69.0),
                    (Stat::Intellect, 100.0),
                    (Stat::Spirit, 110.0),
                    (Stat::Health, 1483.0),
                ]),
            },
            BaseStatsEntry {
                class: Class::Warlock,
                level: 60,
                base_mana: 1093.0,
                stats: Stats::from_pairs(&[
                    (Stat::Strength, 48.0),
                    (Stat::Agility, 50.0),
                    (Stat::Stamina, 66.0),
                    (Stat::Intellect, 125.0),
                    (Stat::Spirit, 130.0),
                    (Stat::Health, 1414.0),
                ]),
            },
        ]
    })
}

/// Closest table entry at or below `level`, or the lowest one above it
pub fn base_stats_for(class: Class, level: u32) -> Option<BaseStatsEntry> {
    let mut entries: Vec<BaseStatsEntry> = default_base_stats()
        .into_iter()
        .filter(|e| e.class == class)
        .collect();
    entries.sort_by_key(|e| e.level);
    let below = entries.iter().rev().find(|e| e.level <= level).cloned();
    below.or_else(|| entries.first().cloned())
}

// === Building ===

/// Add a player described by `config` to `sim` and return its id
///
/// Registration order matters: class content first, then item set bonuses
/// (which look spells up by label), then pets, then the rotation.
pub fn build_player(sim: &mut Simulation, config: &PlayerConfig) -> Result<UnitId> {
    config.validate()?;
    let base = base_stats_for(config.class, config.level).ok_or_else(|| {
        SimError::InvalidConfig(format!("no base stats for {}", config.class.name()))
    })?;

    let mut naked = base.stats;
    naked[Stat::Mana] += base.base_mana;
    let base_source = BaseStatsSource::new(config.class.name(), config.level, naked);
    let gear_source = GearSource::new("all", config.gear);
    let stats = build_stats(&[&base_source, &gear_source]);

    let unit = sim.add_unit(
        Unit::new(config.name.clone(), UnitKind::Player, config.level)
            .with_profile(config.class.profile())
            .with_stats(stats)
            .with_base_mana(base.base_mana),
    );

    let registry = crate::item_sets();
    match config.class {
        Class::Druid => {
            let options = config.druid.clone().unwrap_or_default();
            druid::register(sim, unit, &options)?;
            registry.apply(sim, unit, &config.item_sets)?;
        }
        Class::Warlock => {
            let options = config.warlock.clone().unwrap_or_default();
            let warlock = warlock::register(sim, unit, &options)?;
            registry.apply(sim, unit, &config.item_sets)?;
            if options.summon_imp {
                warlock.summon_imp(sim)?;
            }
        }
    }

    let rotation = config
        .rotation
        .clone()
        .unwrap_or_else(|| config.class.default_rotation());
    let rotation = PriorityRotation::build(sim, unit, &rotation)?;
    sim.set_rotation(unit, Rc::new(rotation));

    debug!(
        player = %config.name,
        class = config.class.name(),
        level = config.level,
        spells = sim.unit(unit).spells().len(),
        "player built"
    );
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_stats_cover_both_classes() {
        let entries = default_base_stats();
        assert!(entries.iter().any(|e| e.class == Class::Druid && e.level == 60));
        assert!(entries.iter().any(|e| e.class == Class::Warlock && e.level == 25));
    }

    #[test]
    fn test_base_stats_bracket() {
        let entry = base_stats_for(Class::Warlock, 45).unwrap();
        assert_eq!(entry.level, 40);
        let entry = base_stats_for(Class::Druid, 10).unwrap();
        assert_eq!(entry.level, 25);
    }

    #[test]
    fn test_parse_player_config() {
        let toml = r#"
name = "Boomkin"
class = "druid"
level = 60

[gear]
intellect = 150.0
spell_power = 300.0

[item_sets]
"Cenarion Eclipse" = 4

[druid]
form = "moonkin"
runes = ["eclipse", "starsurge"]

[druid.talents]
moonfury = 5
moonkin_form = true
"#;
        let config = PlayerConfig::parse(toml).unwrap();
        assert_eq!(config.class, Class::Druid);
        assert!((config.gear[Stat::SpellPower] - 300.0).abs() < f64::EPSILON);
        assert_eq!(config.item_sets["Cenarion Eclipse"], 4);
        let druid = config.druid.unwrap();
        assert_eq!(druid.talents.moonfury, 5);
        assert!(druid.talents.moonkin_form);
        assert_eq!(druid.form, druid::StartingForm::Moonkin);
    }

    #[test]
    fn test_validate_rejects_mismatched_section() {
        let toml = r#"
name = "Confused"
class = "warlock"
level = 60

[druid]
form = "cat"
"#;
        assert!(matches!(
            PlayerConfig::parse(toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_level() {
        let toml = r#"
name = "Too High"
class = "druid"
level = 70
"#;
        assert!(PlayerConfig::parse(toml).is_err());
    }

    #[test]
    fn test_build_player_applies_gear_and_rotation() {
        let config = PlayerConfig {
            name: "Caster".to_string(),
            class: Class::Warlock,
            level: 60,
            gear: Stats::from_pairs(&[(Stat::Intellect, 50.0)]),
            item_sets: BTreeMap::new(),
            druid: None,
            warlock: None,
            rotation: None,
        };
        let mut sim = Simulation::with_defaults(42);
        let unit = build_player(&mut sim, &config).unwrap();
        let base = base_stats_for(Class::Warlock, 60).unwrap();
        let expected = base.stats[Stat::Intellect] + 50.0;
        assert!((sim.unit(unit).stat(Stat::Intellect) - expected).abs() < 0.01);
        assert!(sim.spell_by_label(unit, "Shadow Bolt").is_some());
    }

    #[test]
    fn test_unknown_item_set_is_an_error() {
        let mut item_sets = BTreeMap::new();
        item_sets.insert("Imaginary Regalia".to_string(), 2);
        let config = PlayerConfig {
            name: "Caster".to_string(),
            class: Class::Druid,
            level: 60,
            gear: Stats::new(),
            item_sets,
            druid: None,
            warlock: None,
            rotation: None,
        };
        let mut sim = Simulation::with_defaults(42);
        assert!(matches!(
            build_player(&mut sim, &config),
            Err(SimError::UnknownItemSet(_))
        ));
    }
}
