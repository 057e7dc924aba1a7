//! Warlock talents - Spell modifiers, Amplify Curse, Nightfall and Improved Shadow Bolt

use super::runes::WarlockRune;
use super::Warlock;
use crate::common::{is_labeled, modify_spells};
use serde::{Deserialize, Serialize};
use sod_core::prelude::*;
use std::time::Duration;

/// Talent points by talent; ranks are counts, single-point talents are flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarlockTalents {
    // Affliction
    pub improved_corruption: u32,
    pub improved_curse_of_agony: u32,
    pub improved_drain_life: u32,
    pub improved_life_tap: u32,
    pub amplify_curse: bool,
    pub siphon_life: bool,
    pub nightfall: u32,
    pub shadow_mastery: u32,

    // Demonology
    pub improved_imp: u32,

    // Destruction
    pub improved_shadow_bolt: u32,
    pub bane: u32,
    pub improved_firebolt: u32,
    pub devastation: u32,
    pub improved_immolate: u32,
    pub ruin: bool,
    pub emberstorm: u32,
    pub conflagrate: bool,
}

/// Spells the destruction talents apply to
pub const DESTRUCTION_SPELLS: [&str; 5] =
    ["Shadow Bolt", "Immolate", "Conflagrate", "Incinerate", "Shadowflame"];
const FIRE_SPELLS: [&str; 3] = ["Immolate", "Conflagrate", "Incinerate"];
const BANE_SPELLS: [&str; 2] = ["Shadow Bolt", "Immolate"];
/// Spells whose landed crit applies Improved Shadow Bolt
const IMPROVED_SHADOW_BOLT_SPELLS: [&str; 2] = ["Shadow Bolt", "Shadowflame"];
const NIGHTFALL_SPELLS: [&str; 2] = ["Corruption", "Drain Life"];

/// Charges of the Improved Shadow Bolt debuff; the Shadowflame rune raises it
const IMPROVED_SHADOW_BOLT_CHARGES: u32 = 4;
const IMPROVED_SHADOW_BOLT_SHADOWFLAME_CHARGES: u32 = 10;

/// Talent adjustments to spells that are already registered
pub(crate) fn apply_spell_talents(sim: &mut Simulation, warlock: &Warlock) {
    let unit = warlock.unit;
    let talents = &warlock.talents;

    let devastation = f64::from(talents.devastation);
    if devastation > 0.0 {
        modify_spells(sim, unit, &DESTRUCTION_SPELLS, |config| config.bonus_crit += devastation);
    }
    if talents.ruin {
        modify_spells(sim, unit, &DESTRUCTION_SPELLS, |config| config.crit_damage_bonus += 1.0);
    }

    let emberstorm = 0.02 * f64::from(talents.emberstorm);
    if emberstorm > 0.0 {
        modify_spells(sim, unit, &FIRE_SPELLS, |config| {
            config.damage_multiplier_additive += emberstorm
        });
    }

    // Dots and Drain Life take Shadow Mastery on their base damage instead
    let shadow_mastery = warlock.shadow_mastery_bonus();
    if shadow_mastery > 0.0 {
        modify_spells(sim, unit, &["Shadow Bolt"], |config| {
            config.damage_multiplier_additive += shadow_mastery
        });
    }

    let bane = Duration::from_millis(100 * u64::from(talents.bane));
    if !bane.is_zero() {
        modify_spells(sim, unit, &BANE_SPELLS, |config| {
            config.cast.cast_time = config.cast.cast_time.saturating_sub(bane)
        });
    }
}

pub(crate) fn register_talent_auras(sim: &mut Simulation, warlock: &mut Warlock) {
    let unit = warlock.unit;

    if warlock.talents.amplify_curse {
        let config = AuraConfig::new("Amplify Curse", ActionId::spell(18288))
            .with_duration(Duration::from_secs(30));
        warlock.auras.amplify_curse = Some(sim.register_aura(unit, config));
    }

    if warlock.talents.nightfall > 0 {
        warlock.auras.shadow_trance = Some(register_shadow_trance(sim, unit));
    }

    if warlock.talents.improved_shadow_bolt > 0 {
        let target = sim.primary_target();
        let bonus = 1.0 + 0.04 * f64::from(warlock.talents.improved_shadow_bolt);
        let charges = improved_shadow_bolt_charges(warlock);
        warlock.auras.improved_shadow_bolt =
            Some(register_improved_shadow_bolt_debuff(sim, target, bonus, charges));
    }
}

/// Shadow Trance: the next Shadow Bolt is instant
fn register_shadow_trance(sim: &mut Simulation, unit: UnitId) -> AuraId {
    let config = AuraConfig::new("Shadow Trance", ActionId::spell(17941))
        .with_duration(Duration::from_secs(10))
        .on_gain(|sim, aura| {
            let unit = sim.aura(aura).unit;
            modify_spells(sim, unit, &["Shadow Bolt"], |config| {
                config.cast.cast_time_reduction += config.cast.cast_time
            });
        })
        .on_expire(|sim, aura| {
            let unit = sim.aura(aura).unit;
            modify_spells(sim, unit, &["Shadow Bolt"], |config| {
                config.cast.cast_time_reduction =
                    config.cast.cast_time_reduction.saturating_sub(config.cast.cast_time)
            });
        })
        .on_cast_complete(|sim, aura, spell| {
            if is_labeled(sim, spell, &["Shadow Bolt"]) && sim.cast_time(spell).is_zero() {
                sim.deactivate_aura(aura);
            }
        });
    sim.register_aura(unit, config)
}

/// Debuff raising shadow damage taken; direct shadow hits spend a charge
fn improved_shadow_bolt_charges(warlock: &Warlock) -> u32 {
    if warlock.has_rune(WarlockRune::Shadowflame) {
        IMPROVED_SHADOW_BOLT_SHADOWFLAME_CHARGES
    } else {
        IMPROVED_SHADOW_BOLT_CHARGES
    }
}

fn register_improved_shadow_bolt_debuff(
    sim: &mut Simulation,
    target: UnitId,
    bonus: f64,
    charges: u32,
) -> AuraId {
    let config = AuraConfig::new("Improved Shadow Bolt", ActionId::spell(17800))
        .with_duration(Duration::from_secs(12))
        .with_max_stacks(charges)
        .on_gain(move |sim, aura| {
            let unit = sim.aura(aura).unit;
            sim.unit_mut(unit).pseudo.school_damage_taken_multiplier[SpellSchool::SHADOW.index()] *=
                bonus;
        })
        .on_expire(move |sim, aura| {
            let unit = sim.aura(aura).unit;
            sim.unit_mut(unit).pseudo.school_damage_taken_multiplier[SpellSchool::SHADOW.index()] /=
                bonus;
        })
        .on_spell_hit_taken(|sim, aura, result| {
            if result.periodic || !result.landed() {
                return;
            }
            if sim.spell(result.spell).config.school != SpellSchool::SHADOW {
                return;
            }
            // The crit that applied the debuff does not spend a charge
            if sim.aura(aura).applied_at() < sim.now() {
                sim.remove_stack(aura);
            }
        });
    sim.get_or_register_aura(target, config)
}

pub(crate) fn register_talent_triggers(sim: &mut Simulation, warlock: &Warlock) {
    let unit = warlock.unit;

    if let Some(debuff) = warlock.auras.improved_shadow_bolt {
        let charges = improved_shadow_bolt_charges(warlock);
        sim.make_proc_trigger_aura(
            unit,
            ProcTrigger::new("Improved Shadow Bolt Trigger", ProcCallback::SpellHitDealt, move |sim, _, result| {
                let Some(result) = result else {
                    return;
                };
                if sim.aura(debuff).unit != result.target {
                    return;
                }
                sim.activate_aura(debuff);
                sim.set_stacks(debuff, charges);
            })
            .with_outcome(HitOutcome::CRIT)
            .with_spell_filter(|sim, spell| is_labeled(sim, spell, &IMPROVED_SHADOW_BOLT_SPELLS)),
        );
    }

    if let Some(shadow_trance) = warlock.auras.shadow_trance {
        sim.make_proc_trigger_aura(
            unit,
            ProcTrigger::new("Nightfall", ProcCallback::PeriodicDamageDealt, move |sim, _, _| {
                sim.activate_aura(shadow_trance);
            })
            .with_action_id(ActionId::spell(18094))
            .with_chance(0.02 * f64::from(warlock.talents.nightfall))
            .with_spell_filter(|sim, spell| is_labeled(sim, spell, &NIGHTFALL_SPELLS)),
        );
    }
}

/// Extra Nightfall roll from gear; does nothing without the talent
pub(crate) fn add_nightfall_chance(sim: &mut Simulation, unit: UnitId, chance: f64) {
    let Some(shadow_trance) = sim.aura_by_label(unit, "Shadow Trance") else {
        return;
    };
    sim.make_proc_trigger_aura(
        unit,
        ProcTrigger::new("Nightfall (Gear)", ProcCallback::PeriodicDamageDealt, move |sim, _, _| {
            sim.activate_aura(shadow_trance);
        })
        .with_chance(chance)
        .with_spell_filter(|sim, spell| is_labeled(sim, spell, &NIGHTFALL_SPELLS)),
    );
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{warlock_sim, with_talents};
    use super::*;

    #[test]
    fn test_parse_talents_with_defaults() {
        let talents: WarlockTalents = toml::from_str("bane = 5\nconflagrate = true").unwrap();
        assert_eq!(talents.bane, 5);
        assert!(talents.conflagrate);
        assert_eq!(talents.emberstorm, 0);
    }

    #[test]
    fn test_bane_shortens_shadow_bolt() {
        let (sim, warlock) = warlock_sim(
            with_talents(WarlockTalents {
                bane: 5,
                ..Default::default()
            }),
            &[],
        );
        let shadow_bolt = sim.spell_by_label(warlock.unit, "Shadow Bolt").unwrap();
        let immolate = sim.spell_by_label(warlock.unit, "Immolate").unwrap();
        assert_eq!(sim.cast_time(shadow_bolt), Duration::from_millis(2500));
        assert_eq!(sim.cast_time(immolate), Duration::from_millis(1500));
    }

    #[test]
    fn test_destruction_talents_modify_spells() {
        let (sim, warlock) = warlock_sim(
            with_talents(WarlockTalents {
                devastation: 5,
                ruin: true,
                emberstorm: 5,
                shadow_mastery: 5,
                ..Default::default()
            }),
            &[],
        );
        let shadow_bolt = sim.spell(sim.spell_by_label(warlock.unit, "Shadow Bolt").unwrap());
        assert!((shadow_bolt.config.bonus_crit - 5.0).abs() < 1e-9);
        assert!((shadow_bolt.config.crit_damage_bonus - 1.0).abs() < 1e-9);
        assert!((shadow_bolt.config.damage_multiplier_additive - 1.1).abs() < 1e-9);

        let immolate = sim.spell(sim.spell_by_label(warlock.unit, "Immolate").unwrap());
        assert!((immolate.config.damage_multiplier_additive - 1.1).abs() < 1e-9);

        // Corruption is neither destruction nor fire
        let corruption = sim.spell(sim.spell_by_label(warlock.unit, "Corruption").unwrap());
        assert!(corruption.config.bonus_crit.abs() < 1e-9);
        assert!((corruption.config.damage_multiplier_additive - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_shadowflame_rune_with_destruction_talents() {
        let config = super::super::WarlockConfig {
            talents: WarlockTalents {
                improved_shadow_bolt: 5,
                devastation: 5,
                ruin: true,
                ..Default::default()
            },
            runes: vec![WarlockRune::Shadowflame],
            ..Default::default()
        };
        let (sim, warlock) = warlock_sim(config, &[]);
        let debuff = warlock.auras.improved_shadow_bolt.unwrap();
        assert_eq!(sim.aura(debuff).config.max_stacks, IMPROVED_SHADOW_BOLT_SHADOWFLAME_CHARGES);

        let shadowflame = sim.spell(sim.spell_by_label(warlock.unit, "Shadowflame").unwrap());
        assert!((shadowflame.config.bonus_crit - 5.0).abs() < 1e-9);
        assert!((shadowflame.config.crit_damage_bonus - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_shadow_trance_makes_shadow_bolt_instant() {
        let (mut sim, warlock) = warlock_sim(
            with_talents(WarlockTalents {
                nightfall: 2,
                ..Default::default()
            }),
            &[],
        );
        let shadow_trance = warlock.auras.shadow_trance.unwrap();
        let shadow_bolt = sim.spell_by_label(warlock.unit, "Shadow Bolt").unwrap();
        let target = sim.primary_target();

        sim.activate_aura(shadow_trance);
        assert!(sim.cast_time(shadow_bolt).is_zero());

        sim.cast(shadow_bolt, target).unwrap();
        assert!(!sim.is_aura_active(shadow_trance));
        assert_eq!(sim.cast_time(shadow_bolt), Duration::from_secs(3));
    }

    #[test]
    fn test_improved_shadow_bolt_debuff_charges() {
        let (mut sim, warlock) = warlock_sim(
            with_talents(WarlockTalents {
                improved_shadow_bolt: 5,
                ..Default::default()
            }),
            &[(Stat::SpellHit, 20.0)],
        );
        let debuff = warlock.auras.improved_shadow_bolt.unwrap();
        let target = sim.primary_target();
        assert_eq!(sim.aura(debuff).unit, target);

        sim.activate_aura(debuff);
        sim.set_stacks(debuff, 4);
        let taken = sim.unit(target).pseudo.school_taken(SpellSchool::SHADOW);
        assert!((taken - 1.2).abs() < 1e-9);

        // A later direct shadow hit spends a charge
        sim.advance(Duration::from_secs(1));
        let shadow_bolt = sim.spell_by_label(warlock.unit, "Shadow Bolt").unwrap();
        sim.cast(shadow_bolt, target).unwrap();
        sim.advance(Duration::from_secs(6));
        let spell = sim.spell(shadow_bolt);
        assert!(spell.metrics.hits > spell.metrics.crits);
        assert_eq!(sim.aura_stacks(debuff), 3);

        sim.deactivate_aura(debuff);
        let taken = sim.unit(target).pseudo.school_taken(SpellSchool::SHADOW);
        assert!((taken - 1.0).abs() < 1e-9);
    }
}
