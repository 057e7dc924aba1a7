//! Druid - Forms, balance and feral spells, talents, runes and item sets
//!
//! Registration runs in dependency order so closures can capture the ids
//! they need: form auras, then auras that spells turn on, then the spells,
//! then the triggers that watch those spells.

pub mod balance;
pub mod feral;
pub mod forms;
pub mod item_sets;
pub mod runes;
pub mod talents;

pub use forms::{Form, FormAuras, StartingForm};
pub use runes::DruidRune;
pub use talents::DruidTalents;

use serde::{Deserialize, Serialize};
use sod_core::prelude::*;
use tracing::debug;

/// Energy cap of the cat form power bar
pub const MAX_ENERGY: f64 = 100.0;

/// Druid options of a player config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DruidConfig {
    #[serde(default)]
    pub talents: DruidTalents,
    #[serde(default)]
    pub runes: Vec<DruidRune>,
    #[serde(default)]
    pub form: StartingForm,
}

/// Auras that spells and triggers toggle, when the character has them
#[derive(Debug, Clone, Copy, Default)]
pub struct DruidAuras {
    pub natures_grace: Option<AuraId>,
    pub clearcasting: Option<AuraId>,
    pub solar_eclipse: Option<AuraId>,
    pub lunar_eclipse: Option<AuraId>,
    pub starsurge: Option<AuraId>,
    pub savage_roar: Option<AuraId>,
    /// Mangle debuff on the primary target
    pub mangle: Option<AuraId>,
}

/// A registered druid: the ids and talent values its content closes over
#[derive(Debug, Clone)]
pub struct Druid {
    pub unit: UnitId,
    pub level: u32,
    pub base_mana: f64,
    pub talents: DruidTalents,
    pub runes: Vec<DruidRune>,
    pub forms: FormAuras,
    pub auras: DruidAuras,
}

impl Druid {
    pub fn has_rune(&self, rune: DruidRune) -> bool {
        self.runes.contains(&rune)
    }

    /// Register a spell castable only in one of `forms`
    pub fn register_spell(&self, sim: &mut Simulation, forms: Form, config: SpellConfig) -> SpellId {
        let auras = self.forms;
        let config = config.and_cast_condition(move |sim, _, _| auras.in_form(sim, forms));
        sim.register_spell(self.unit, config)
    }

    /// Moonfury: multiplier on the base damage of balance spells
    pub fn moonfury_multiplier(&self) -> f64 {
        1.0 + 0.02 * f64::from(self.talents.moonfury)
    }

    /// Vengeance: bonus to the crit damage of balance spells
    pub fn vengeance_crit_bonus(&self) -> f64 {
        0.2 * f64::from(self.talents.vengeance)
    }

    /// Moonglow: multiplier on balance spell mana costs
    pub fn moonglow_cost(&self, base: f64) -> Cost {
        Cost::Mana {
            base,
            multiplier: 1.0 - 0.03 * f64::from(self.talents.moonglow),
        }
    }

    /// Base damage of the level-scaled rune abilities (Starsurge, Sunfire)
    pub fn base_rune_damage(&self) -> f64 {
        let level = f64::from(self.level);
        9.183105 + 0.616405 * level + 0.028608 * level * level
    }
}

/// Register every druid feature for `unit` according to `config`
pub fn register(sim: &mut Simulation, unit: UnitId, config: &DruidConfig) -> Result<Druid> {
    if config.form == StartingForm::Moonkin && !config.talents.moonkin_form {
        return Err(SimError::InvalidConfig(
            "starting in Moonkin Form requires the Moonkin Form talent".to_string(),
        ));
    }

    let (level, base_mana) = {
        let u = sim.unit_mut(unit);
        u.energy = Some(EnergyBar::new(MAX_ENERGY));
        (u.level, u.base_mana)
    };

    talents::apply_passive_talents(sim, unit, &config.talents);
    let forms = forms::register_form_auras(sim, unit, level, &config.talents, config.form);

    let mut druid = Druid {
        unit,
        level,
        base_mana,
        talents: config.talents.clone(),
        runes: config.runes.clone(),
        forms,
        auras: DruidAuras::default(),
    };

    // Auras that spells activate
    talents::register_talent_auras(sim, &mut druid);
    runes::register_rune_auras(sim, &mut druid);
    feral::register_feral_auras(sim, &mut druid);

    // Spells
    forms::register_form_spells(sim, &druid);
    balance::register_balance_spells(sim, &druid);
    feral::register_feral_spells(sim, &druid);

    // Triggers watching the spells above
    talents::register_talent_triggers(sim, &druid);
    runes::register_rune_triggers(sim, &druid);

    debug!(
        unit = unit.0,
        level,
        runes = druid.runes.len(),
        "druid registered"
    );
    Ok(druid)
}


#[cfg(test)]
mod tests {
    use super::test_support::druid_sim;
    use super::*;

    #[test]
    fn test_register_balance_kit() {
        let (sim, druid) = druid_sim(DruidConfig::default(), &[]);
        for label in ["Wrath", "Starfire", "Moonfire", "Cat Form", "Shred", "Rip"] {
            assert!(
                sim.spell_by_label(druid.unit, label).is_some(),
                "missing {}",
                label
            );
        }
        // Rune spells need their rune
        assert!(sim.spell_by_label(druid.unit, "Starsurge").is_none());
        assert!(sim.spell_by_label(druid.unit, "Mangle (Cat)").is_none());
    }

    #[test]
    fn test_moonkin_start_requires_talent() {
        let mut sim = Simulation::with_defaults(1);
        let unit = sim.add_unit(Unit::new("Druid", UnitKind::Player, 60));
        let config = DruidConfig {
            form: StartingForm::Moonkin,
            ..Default::default()
        };
        assert!(matches!(
            register(&mut sim, unit, &config),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_talent_helpers() {
        let config = DruidConfig {
            talents: DruidTalents {
                moonfury: 5,
                vengeance: 5,
                moonglow: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        let (_, druid) = druid_sim(config, &[]);
        assert!((druid.moonfury_multiplier() - 1.1).abs() < 1e-9);
        assert!((druid.vengeance_crit_bonus() - 1.0).abs() < 1e-9);
        assert!((druid.moonglow_cost(100.0).base_amount() - 91.0).abs() < 1e-9);
        // 9.183105 + 0.616405 * 60 + 0.028608 * 3600
        assert!((druid.base_rune_damage() - 149.156205).abs() < 1e-6);
    }
}
