//! Druid runes - Eclipse, Starsurge, Fury of Stormrage and the rune toggles
//!
//! Rune spells (Starsurge, Sunfire, Mangle, Savage Roar) live with the other
//! balance and feral spells; this module owns the rune list and the auras
//! and triggers the runes add.

use super::Druid;
use crate::common::{is_labeled, modify_spells};
use serde::{Deserialize, Serialize};
use sod_core::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DruidRune {
    Eclipse,
    FuryOfStormrage,
    Starsurge,
    Sunfire,
    Mangle,
    SavageRoar,
}

impl DruidRune {
    pub fn name(&self) -> &'static str {
        match self {
            DruidRune::Eclipse => "Eclipse",
            DruidRune::FuryOfStormrage => "Fury of Stormrage",
            DruidRune::Starsurge => "Starsurge",
            DruidRune::Sunfire => "Sunfire",
            DruidRune::Mangle => "Mangle",
            DruidRune::SavageRoar => "Savage Roar",
        }
    }
}

const ECLIPSE_DURATION: Duration = Duration::from_secs(15);
const ECLIPSE_MAX_STACKS: u32 = 4;
/// Crit chance in percent granted by either Eclipse
const ECLIPSE_CRIT_BONUS: f64 = 30.0;
const LUNAR_CAST_TIME_REDUCTION: Duration = Duration::from_secs(1);

const SOLAR_SPELLS: [&str; 2] = ["Wrath", "Starsurge"];
const LUNAR_SPELLS: [&str; 2] = ["Starfire", "Starsurge"];

/// Additive damage bonus Starfire gains from the Starsurge buff
pub const STARSURGE_STARFIRE_BONUS: f64 = 0.8;

pub(crate) fn register_rune_auras(sim: &mut Simulation, druid: &mut Druid) {
    let unit = druid.unit;
    if druid.has_rune(DruidRune::Eclipse) {
        druid.auras.solar_eclipse = Some(register_solar_eclipse(sim, unit));
        druid.auras.lunar_eclipse = Some(register_lunar_eclipse(sim, unit));
    }
    if druid.has_rune(DruidRune::Starsurge) {
        druid.auras.starsurge = Some(register_starsurge_buff(sim, unit));
    }
}

fn register_solar_eclipse(sim: &mut Simulation, unit: UnitId) -> AuraId {
    let config = AuraConfig::new("Solar Eclipse", ActionId::spell(408250))
        .with_duration(ECLIPSE_DURATION)
        .with_max_stacks(ECLIPSE_MAX_STACKS)
        .on_gain(|sim, aura| {
            let unit = sim.aura(aura).unit;
            modify_spells(sim, unit, &SOLAR_SPELLS, |config| {
                config.bonus_crit += ECLIPSE_CRIT_BONUS
            });
        })
        .on_expire(|sim, aura| {
            let unit = sim.aura(aura).unit;
            modify_spells(sim, unit, &SOLAR_SPELLS, |config| {
                config.bonus_crit -= ECLIPSE_CRIT_BONUS
            });
        })
        .on_cast_complete(|sim, aura, spell| {
            if is_labeled(sim, spell, &SOLAR_SPELLS) {
                sim.remove_stack(aura);
            }
        });
    sim.register_aura(unit, config)
}

fn register_lunar_eclipse(sim: &mut Simulation, unit: UnitId) -> AuraId {
    let config = AuraConfig::new("Lunar Eclipse", ActionId::spell(408255))
        .with_duration(ECLIPSE_DURATION)
        .with_max_stacks(ECLIPSE_MAX_STACKS)
        .on_gain(|sim, aura| {
            let unit = sim.aura(aura).unit;
            modify_spells(sim, unit, &LUNAR_SPELLS, |config| {
                if config.label == "Starfire" {
                    config.cast.cast_time_reduction += LUNAR_CAST_TIME_REDUCTION;
                } else {
                    config.bonus_crit += ECLIPSE_CRIT_BONUS;
                }
            });
        })
        .on_expire(|sim, aura| {
            let unit = sim.aura(aura).unit;
            modify_spells(sim, unit, &LUNAR_SPELLS, |config| {
                if config.label == "Starfire" {
                    config.cast.cast_time_reduction = config
                        .cast
                        .cast_time_reduction
                        .saturating_sub(LUNAR_CAST_TIME_REDUCTION);
                } else {
                    config.bonus_crit -= ECLIPSE_CRIT_BONUS;
                }
            });
        })
        .on_cast_complete(|sim, aura, spell| {
            if is_labeled(sim, spell, &["Starfire"]) {
                sim.remove_stack(aura);
            }
        });
    sim.register_aura(unit, config)
}

/// Buff left by Starsurge; the next Starfire deals extra damage and eats it
fn register_starsurge_buff(sim: &mut Simulation, unit: UnitId) -> AuraId {
    let config = AuraConfig::new("Starsurge", ActionId::spell(417157).with_tag(1))
        .with_duration(Duration::from_secs(15))
        .with_max_stacks(1)
        .on_gain(|sim, aura| {
            let unit = sim.aura(aura).unit;
            modify_spells(sim, unit, &["Starfire"], |c| {
                c.damage_multiplier_additive += STARSURGE_STARFIRE_BONUS
            });
        })
        .on_expire(|sim, aura| {
            let unit = sim.aura(aura).unit;
            modify_spells(sim, unit, &["Starfire"], |c| {
                c.damage_multiplier_additive -= STARSURGE_STARFIRE_BONUS
            });
        })
        .on_cast_complete(|sim, aura, spell| {
            if is_labeled(sim, spell, &["Starfire"]) {
                sim.deactivate_aura(aura);
            }
        });
    sim.register_aura(unit, config)
}

pub(crate) fn register_rune_triggers(sim: &mut Simulation, druid: &Druid) {
    let unit = druid.unit;

    if let (Some(solar), Some(lunar)) = (druid.auras.solar_eclipse, druid.auras.lunar_eclipse) {
        sim.make_proc_trigger_aura(
            unit,
            ProcTrigger::new("Eclipse", ProcCallback::SpellHitDealt, move |sim, spell, _| {
                // Wrath builds toward Lunar, Starfire toward Solar, Starsurge both
                if is_labeled(sim, spell, &["Wrath", "Starsurge"]) {
                    sim.activate_aura(lunar);
                    sim.add_stack(lunar);
                }
                if is_labeled(sim, spell, &["Starfire", "Starsurge"]) {
                    sim.activate_aura(solar);
                    sim.add_stacks(solar, 2);
                }
            })
            .with_action_id(ActionId::spell(408248))
            .with_outcome(HitOutcome::LANDED)
            .with_spell_filter(|sim, spell| is_labeled(sim, spell, &["Wrath", "Starfire", "Starsurge"])),
        );
    }

    if druid.has_rune(DruidRune::FuryOfStormrage) {
        let config = AuraConfig::new("Fury of Stormrage", ActionId::spell(414799))
            .on_gain(|sim, aura| {
                let unit = sim.aura(aura).unit;
                modify_spells(sim, unit, &["Wrath"], |config| config.cost_multiplier -= 1.0);
            })
            .on_expire(|sim, aura| {
                let unit = sim.aura(aura).unit;
                modify_spells(sim, unit, &["Wrath"], |config| config.cost_multiplier += 1.0);
            });
        sim.register_aura(unit, permanent_aura(config));
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::druid_sim;
    use super::super::DruidConfig;
    use super::*;

    fn with_runes(runes: &[DruidRune]) -> DruidConfig {
        DruidConfig {
            runes: runes.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_rune_names() {
        let runes: Vec<DruidRune> =
            serde_json::from_str(r#"["eclipse", "fury_of_stormrage", "savage_roar"]"#).unwrap();
        assert_eq!(
            runes,
            vec![DruidRune::Eclipse, DruidRune::FuryOfStormrage, DruidRune::SavageRoar]
        );
        assert_eq!(DruidRune::FuryOfStormrage.name(), "Fury of Stormrage");
    }

    #[test]
    fn test_solar_eclipse_boosts_wrath_crit() {
        let (mut sim, druid) = druid_sim(with_runes(&[DruidRune::Eclipse]), &[]);
        let solar = druid.auras.solar_eclipse.unwrap();
        let wrath = sim.spell_by_label(druid.unit, "Wrath").unwrap();

        sim.add_stacks(solar, 2);
        assert_eq!(sim.aura_stacks(solar), 2);
        assert!((sim.spell(wrath).config.bonus_crit - ECLIPSE_CRIT_BONUS).abs() < 1e-9);

        sim.deactivate_aura(solar);
        assert!(sim.spell(wrath).config.bonus_crit.abs() < 1e-9);
    }

    #[test]
    fn test_lunar_eclipse_shortens_starfire() {
        let (mut sim, druid) = druid_sim(with_runes(&[DruidRune::Eclipse]), &[]);
        let lunar = druid.auras.lunar_eclipse.unwrap();
        let starfire = sim.spell_by_label(druid.unit, "Starfire").unwrap();
        let target = sim.primary_target();
        assert_eq!(sim.cast_time(starfire), Duration::from_millis(3500));

        sim.add_stack(lunar);
        assert_eq!(sim.cast_time(starfire), Duration::from_millis(2500));

        // The single stack is spent by the next Starfire
        sim.cast(starfire, target).unwrap();
        sim.advance(Duration::from_millis(2600));
        assert!(!sim.is_aura_active(lunar));
        assert_eq!(sim.cast_time(starfire), Duration::from_millis(3500));
    }

    #[test]
    fn test_wrath_landing_builds_lunar_eclipse() {
        let (mut sim, druid) = druid_sim(with_runes(&[DruidRune::Eclipse]), &[(Stat::SpellHit, 20.0)]);
        let lunar = druid.auras.lunar_eclipse.unwrap();
        let wrath = sim.spell_by_label(druid.unit, "Wrath").unwrap();
        let target = sim.primary_target();
        sim.reset_auras();

        sim.cast(wrath, target).unwrap();
        // 2s cast plus 1.25s of travel
        sim.advance(Duration::from_secs(4));
        assert!(sim.spell(wrath).metrics.hits > 0);
        assert_eq!(sim.aura_stacks(lunar), 1);
    }

    #[test]
    fn test_fury_of_stormrage_makes_wrath_free() {
        let (mut sim, druid) = druid_sim(with_runes(&[DruidRune::FuryOfStormrage]), &[]);
        let wrath = sim.spell_by_label(druid.unit, "Wrath").unwrap();
        assert!(sim.spell_cost(wrath) > 0.0);

        let fury = sim.aura_by_label(druid.unit, "Fury of Stormrage").unwrap();
        sim.activate_aura(fury);
        assert!(sim.spell_cost(wrath).abs() < 1e-9);
    }

    #[test]
    fn test_no_rune_auras_without_runes() {
        let (sim, druid) = druid_sim(DruidConfig::default(), &[]);
        assert!(druid.auras.solar_eclipse.is_none());
        assert!(druid.auras.starsurge.is_none());
        assert!(sim.aura_by_label(druid.unit, "Eclipse").is_none());
    }
}
