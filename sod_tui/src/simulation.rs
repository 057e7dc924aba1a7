//! Simulation bridge - Runs presets and reads a character sheet

use sod_classes::{build_player, PlayerConfig};
use sod_core::config::default_constants;
use sod_core::prelude::*;
use tracing::debug;

/// A character's numbers as they enter combat
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterSheet {
    pub stats: Vec<(Stat, f64)>,
    pub max_mana: f64,
    pub spell_crit: f64,
    pub spell_hit: f64,
    pub melee_crit: f64,
    pub melee_hit: f64,
    pub attack_power: f64,
    pub spells: Vec<String>,
    pub pets: Vec<String>,
}

/// Run `config.iterations` fights of `player`
pub fn run_player(player: &PlayerConfig, config: &SimConfig) -> Result<SimResult> {
    debug!(player = %player.name, iterations = config.iterations, "running from viewer");
    SimRunner::new(config.clone()).run(|sim| build_player(sim, player))
}

/// Build `player` into a throwaway fight and read its stats after pre-combat setup
pub fn character_sheet(player: &PlayerConfig, config: &SimConfig) -> Result<CharacterSheet> {
    let mut sim = Simulation::new(config.seed, &config.encounter, default_constants());
    let unit = build_player(&mut sim, player)?;
    sim.unit_mut(unit).reset_resources();
    sim.reset_auras();

    let u = sim.unit(unit);
    let stats = Stat::all()
        .iter()
        .map(|stat| (*stat, u.stat(*stat)))
        .filter(|(_, value)| value.abs() > f64::EPSILON)
        .collect();
    let spells = u
        .spells()
        .iter()
        .map(|spell| sim.spell(*spell).label().to_string())
        .collect();
    let pets = sim
        .pets_of(unit)
        .into_iter()
        .map(|pet| sim.unit(pet).name.clone())
        .collect();

    Ok(CharacterSheet {
        stats,
        max_mana: u.max_mana(),
        spell_crit: u.spell_crit_percent(),
        spell_hit: u.spell_hit_percent(),
        melee_crit: u.melee_crit_percent(),
        melee_hit: u.melee_hit_percent(),
        attack_power: u.attack_power(),
        spells,
        pets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sod_classes::PlayerPresets;

    fn quick() -> SimConfig {
        SimConfig {
            iterations: 2,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_sheet_lists_spells_and_pets() {
        let sheet = character_sheet(&PlayerPresets::affliction_warlock_60(), &quick()).unwrap();
        assert!(sheet.spells.iter().any(|s| s == "Corruption"));
        assert_eq!(sheet.pets, vec!["Imp".to_string()]);
        assert!(sheet.max_mana > 0.0);
    }

    #[test]
    fn test_run_player() {
        let result = run_player(&PlayerPresets::balance_druid_60(), &quick()).unwrap();
        assert_eq!(result.iterations, 2);
        assert!(result.dps.mean > 0.0);
    }
}
