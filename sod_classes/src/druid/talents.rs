//! Druid talents - Passive modifiers and talent procs

use super::Druid;
use crate::common::{is_labeled, modify_spells};
use serde::{Deserialize, Serialize};
use sod_core::prelude::*;
use sod_core::spell::GCD_DEFAULT;
use std::time::Duration;

/// Talent points by talent; ranks are counts, single-point talents are flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DruidTalents {
    // Balance
    pub improved_wrath: u32,
    pub natures_grace: bool,
    pub improved_moonfire: u32,
    pub vengeance: u32,
    pub improved_starfire: u32,
    pub moonglow: u32,
    pub moonfury: u32,
    pub insect_swarm: bool,
    pub moonkin_form: bool,

    // Feral
    pub ferocity: u32,
    pub feral_aggression: u32,
    pub sharpened_claws: u32,
    pub improved_shred: u32,
    pub predatory_strikes: u32,
    pub blood_frenzy: u32,
    pub savage_fury: u32,
    pub heart_of_the_wild: u32,

    // Restoration
    pub natural_weapons: u32,
    pub omen_of_clarity: bool,
    pub furor: u32,
}

/// Cast time taken off the next Wrath or Starfire by Nature's Grace
const NATURES_GRACE_REDUCTION: Duration = Duration::from_millis(500);
/// Wrath's GCD while Nature's Grace is up
const NATURES_GRACE_WRATH_GCD: Duration = Duration::from_secs(1);
const NATURES_GRACE_SPELLS: [&str; 2] = ["Wrath", "Starfire"];

/// Stat and multiplier talents, applied once at registration
pub(crate) fn apply_passive_talents(sim: &mut Simulation, unit: UnitId, talents: &DruidTalents) {
    let u = sim.unit_mut(unit);
    u.pseudo.damage_dealt_multiplier *= 1.0 + 0.02 * f64::from(talents.natural_weapons);
    if talents.heart_of_the_wild > 0 {
        u.multiply_stat(Stat::Intellect, 1.0 + 0.04 * f64::from(talents.heart_of_the_wild));
    }
}

pub(crate) fn register_talent_auras(sim: &mut Simulation, druid: &mut Druid) {
    if druid.talents.natures_grace {
        druid.auras.natures_grace = Some(register_natures_grace_aura(sim, druid.unit));
    }
    if druid.talents.omen_of_clarity {
        druid.auras.clearcasting = Some(register_clearcasting_aura(sim, druid.unit));
    }
}

fn register_natures_grace_aura(sim: &mut Simulation, unit: UnitId) -> AuraId {
    let config = AuraConfig::new("Nature's Grace", ActionId::spell(16886))
        .with_duration(Duration::from_secs(15))
        .on_gain(|sim, aura| {
            let unit = sim.aura(aura).unit;
            modify_spells(sim, unit, &NATURES_GRACE_SPELLS, |config| {
                config.cast.cast_time_reduction += NATURES_GRACE_REDUCTION;
                if config.label == "Wrath" {
                    config.cast.gcd = NATURES_GRACE_WRATH_GCD;
                }
            });
        })
        .on_expire(|sim, aura| {
            let unit = sim.aura(aura).unit;
            modify_spells(sim, unit, &NATURES_GRACE_SPELLS, |config| {
                config.cast.cast_time_reduction =
                    config.cast.cast_time_reduction.saturating_sub(NATURES_GRACE_REDUCTION);
                if config.label == "Wrath" {
                    config.cast.gcd = GCD_DEFAULT;
                }
            });
        })
        .on_cast_complete(|sim, aura, spell| {
            // Only a cast that started after the proc consumes it
            let base_cast = sim.spell(spell).config.cast.cast_time;
            if base_cast.is_zero() {
                return;
            }
            let active_for = sim.now().saturating_sub(sim.aura(aura).applied_at());
            if active_for >= sim.cast_time(spell) {
                sim.deactivate_aura(aura);
            }
        });
    sim.register_aura(unit, config)
}

/// Spells of `unit` flagged as Omen of Clarity consumers
fn omen_spells(sim: &Simulation, unit: UnitId) -> Vec<SpellId> {
    sim.unit(unit)
        .spells()
        .iter()
        .copied()
        .filter(|spell| sim.spell(*spell).has_flag(SpellFlags::OMEN))
        .collect()
}

fn register_clearcasting_aura(sim: &mut Simulation, unit: UnitId) -> AuraId {
    let config = AuraConfig::new("Clearcasting", ActionId::spell(16870))
        .with_duration(Duration::from_secs(15))
        .on_gain(|sim, aura| {
            let unit = sim.aura(aura).unit;
            for spell in omen_spells(sim, unit) {
                sim.spell_mut(spell).config.cost_multiplier -= 1.0;
            }
        })
        .on_expire(|sim, aura| {
            let unit = sim.aura(aura).unit;
            for spell in omen_spells(sim, unit) {
                sim.spell_mut(spell).config.cost_multiplier += 1.0;
            }
        })
        .on_cast_complete(|sim, aura, spell| {
            if !sim.spell(spell).has_flag(SpellFlags::OMEN) || is_labeled(sim, spell, &["Starsurge"]) {
                return;
            }
            // Not consumed by the cast that procced it
            if sim.aura(aura).applied_at() < sim.now() {
                sim.deactivate_aura(aura);
            }
        });
    sim.register_aura(unit, config)
}

pub(crate) fn register_talent_triggers(sim: &mut Simulation, druid: &Druid) {
    let unit = druid.unit;

    if let Some(natures_grace) = druid.auras.natures_grace {
        // Spells with a travel time proc Nature's Grace when cast instead
        sim.make_proc_trigger_aura(
            unit,
            ProcTrigger::new("Nature's Grace Trigger", ProcCallback::SpellHitDealt, move |sim, _, _| {
                sim.activate_aura(natures_grace);
            })
            .with_proc_mask(ProcMask::SPELL_DAMAGE)
            .with_outcome(HitOutcome::CRIT)
            .with_spell_filter(|sim, spell| sim.spell(spell).config.missile_speed <= 0.0),
        );
    }

    if let Some(clearcasting) = druid.auras.clearcasting {
        sim.make_proc_trigger_aura(
            unit,
            ProcTrigger::new("Omen of Clarity", ProcCallback::SpellHitDealt, move |sim, _, _| {
                sim.activate_aura(clearcasting);
            })
            .with_action_id(ActionId::spell(16864))
            .with_proc_mask(ProcMask::MELEE)
            .with_outcome(HitOutcome::LANDED)
            .with_ppm(2.0)
            .with_icd(Duration::from_secs(10)),
        );
    }

    if druid.talents.blood_frenzy > 0 {
        let chance = [0.0, 0.5, 1.0][druid.talents.blood_frenzy.min(2) as usize];
        let forms = druid.forms;
        sim.make_proc_trigger_aura(
            unit,
            ProcTrigger::new("Blood Frenzy", ProcCallback::SpellHitDealt, |sim, spell, _| {
                let caster = sim.spell(spell).caster;
                sim.unit_mut(caster).add_combo_points(1, "Blood Frenzy");
            })
            .with_action_id(ActionId::spell(16953))
            .with_outcome(HitOutcome::CRIT)
            .with_chance(chance)
            .with_spell_filter(move |sim, spell| {
                forms.in_form(sim, super::Form::CAT)
                    && is_labeled(sim, spell, &["Shred", "Rake", "Mangle (Cat)"])
            }),
        );
    }
}
