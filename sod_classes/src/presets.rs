//! Presets - Ready-made level 60 characters
//!
//! Each preset is a bundled player TOML. They double as worked examples of
//! the config format and as the default inputs of the CLI and viewer.

use crate::player::{Class, PlayerConfig, MAX_LEVEL};
use tracing::warn;

const BALANCE_DRUID: &str = include_str!("../config/presets/balance_druid_60.toml");
const FERAL_DRUID: &str = include_str!("../config/presets/feral_druid_60.toml");
const AFFLICTION_WARLOCK: &str = include_str!("../config/presets/affliction_warlock_60.toml");
const DESTRUCTION_WARLOCK: &str = include_str!("../config/presets/destruction_warlock_60.toml");

/// Bundled characters
pub struct PlayerPresets;

impl PlayerPresets {
    /// Preset keys, in display order
    pub fn names() -> &'static [&'static str] {
        &[
            "balance_druid_60",
            "feral_druid_60",
            "affliction_warlock_60",
            "destruction_warlock_60",
        ]
    }

    pub fn get(name: &str) -> Option<PlayerConfig> {
        match name {
            "balance_druid_60" => Some(Self::balance_druid_60()),
            "feral_druid_60" => Some(Self::feral_druid_60()),
            "affliction_warlock_60" => Some(Self::affliction_warlock_60()),
            "destruction_warlock_60" => Some(Self::destruction_warlock_60()),
            _ => None,
        }
    }

    /// Every preset with its key
    pub fn all() -> Vec<(&'static str, PlayerConfig)> {
        Self::names()
            .iter()
            .filter_map(|name| Self::get(name).map(|config| (*name, config)))
            .collect()
    }

    /// Moonkin weaving Wrath and Starfire around Eclipse
    pub fn balance_druid_60() -> PlayerConfig {
        preset(BALANCE_DRUID, "Balance Druid", Class::Druid)
    }

    /// Cat keeping Savage Roar, Rip and Mangle up between Shreds
    pub fn feral_druid_60() -> PlayerConfig {
        preset(FERAL_DRUID, "Feral Druid", Class::Druid)
    }

    /// Dots, Haunt and Shadow Bolt filler with the Imp out
    pub fn affliction_warlock_60() -> PlayerConfig {
        preset(AFFLICTION_WARLOCK, "Affliction Warlock", Class::Warlock)
    }

    /// Immolate, Conflagrate and Incinerate with the Imp out
    pub fn destruction_warlock_60() -> PlayerConfig {
        preset(DESTRUCTION_WARLOCK, "Destruction Warlock", Class::Warlock)
    }
}

/// Parse a bundled preset, falling back to a naked character of the class
fn preset(toml: &str, name: &str, class: Class) -> PlayerConfig {
    PlayerConfig::parse(toml).unwrap_or_else(|e| {
        warn!(preset = name, error = %e, "bundled preset is invalid, using a naked character");
        PlayerConfig {
            name: name.to_string(),
            class,
            level: MAX_LEVEL,
            gear: Default::default(),
            item_sets: Default::default(),
            druid: None,
            warlock: None,
            rotation: None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::druid::{DruidRune, StartingForm};
    use crate::player::build_player;
    use crate::warlock::WarlockRune;
    use sod_core::prelude::*;

    /// Parse without the fallback so a broken file fails loudly
    fn parse_bundled(toml: &str) -> PlayerConfig {
        PlayerConfig::parse(toml).unwrap()
    }

    #[test]
    fn test_bundled_presets_parse() {
        for toml in [BALANCE_DRUID, FERAL_DRUID, AFFLICTION_WARLOCK, DESTRUCTION_WARLOCK] {
            let config = parse_bundled(toml);
            assert_eq!(config.level, 60);
            assert!(config.rotation.is_some());
        }
    }

    #[test]
    fn test_get_and_names_agree() {
        assert_eq!(PlayerPresets::all().len(), PlayerPresets::names().len());
        assert!(PlayerPresets::get("retribution_paladin_60").is_none());
    }

    #[test]
    fn test_balance_preset_contents() {
        let config = PlayerPresets::balance_druid_60();
        assert_eq!(config.class, Class::Druid);
        let druid = config.druid.unwrap();
        assert_eq!(druid.form, StartingForm::Moonkin);
        assert!(druid.runes.contains(&DruidRune::Eclipse));
        assert!(druid.talents.moonkin_form);
        assert_eq!(config.item_sets.get("Cenarion Eclipse"), Some(&4));
    }

    #[test]
    fn test_warlock_presets_bring_the_imp() {
        let affliction = PlayerPresets::affliction_warlock_60().warlock.unwrap();
        assert!(affliction.summon_imp);
        assert!(affliction.runes.contains(&WarlockRune::Haunt));
        let destruction = PlayerPresets::destruction_warlock_60().warlock.unwrap();
        assert!(destruction.summon_imp);
        assert!(destruction.talents.conflagrate);
    }

    #[test]
    fn test_every_preset_builds() {
        for (name, config) in PlayerPresets::all() {
            let mut sim = Simulation::with_defaults(3);
            let unit = build_player(&mut sim, &config)
                .unwrap_or_else(|e| panic!("{} failed to build: {}", name, e));
            assert!(!sim.unit(unit).spells().is_empty());
            if config.class == Class::Warlock {
                assert_eq!(sim.pets_of(unit).len(), 1);
            }
        }
    }
}
