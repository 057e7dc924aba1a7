//! Warlock runes - Backdraft, Incinerate, Haunt and Everlasting Affliction
//!
//! Rune spells (Incinerate, Shadowflame, Haunt, Unstable Affliction) are
//! registered with the destruction and affliction spells; this module owns
//! the rune list and the buffs they leave behind.

use super::Warlock;
use crate::common::{is_labeled, spells_labeled};
use serde::{Deserialize, Serialize};
use sod_core::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarlockRune {
    Pandemic,
    Backdraft,
    EverlastingAffliction,
    MasterChanneler,
    Incinerate,
    Haunt,
    UnstableAffliction,
    Shadowflame,
}

impl WarlockRune {
    pub fn name(&self) -> &'static str {
        match self {
            WarlockRune::Pandemic => "Pandemic",
            WarlockRune::Backdraft => "Backdraft",
            WarlockRune::EverlastingAffliction => "Everlasting Affliction",
            WarlockRune::MasterChanneler => "Master Channeler",
            WarlockRune::Incinerate => "Incinerate",
            WarlockRune::Haunt => "Haunt",
            WarlockRune::UnstableAffliction => "Unstable Affliction",
            WarlockRune::Shadowflame => "Shadowflame",
        }
    }
}

const BACKDRAFT_HASTE: f64 = 1.3;
/// Fire damage bonus after Incinerate
pub const INCINERATE_FIRE_BONUS: f64 = 1.25;
/// Periodic shadow damage bonus on a Haunted target
pub const HAUNT_PERIODIC_BONUS: f64 = 1.2;

/// Hits that refresh Corruption with Everlasting Affliction
const EVERLASTING_AFFLICTION_SPELLS: [&str; 5] =
    ["Shadow Bolt", "Drain Life", "Drain Soul", "Incinerate", "Haunt"];

pub(crate) fn register_rune_auras(sim: &mut Simulation, warlock: &mut Warlock) {
    let unit = warlock.unit;
    if warlock.has_rune(WarlockRune::Backdraft) {
        warlock.auras.backdraft = Some(register_backdraft(sim, unit));
    }
    if warlock.has_rune(WarlockRune::Incinerate) {
        warlock.auras.incinerate = Some(register_incinerate_buff(sim, unit));
    }
    if warlock.has_rune(WarlockRune::Haunt) {
        let target = sim.primary_target();
        warlock.auras.haunt = Some(register_haunt_debuff(sim, target));
    }
}

/// Backdraft: 30% cast speed after Conflagrate lands
fn register_backdraft(sim: &mut Simulation, unit: UnitId) -> AuraId {
    let config = AuraConfig::new("Backdraft", ActionId::spell(427714))
        .with_duration(Duration::from_secs(15))
        .on_gain(|sim, aura| {
            let unit = sim.aura(aura).unit;
            sim.unit_mut(unit).multiply_cast_speed(BACKDRAFT_HASTE);
        })
        .on_expire(|sim, aura| {
            let unit = sim.aura(aura).unit;
            sim.unit_mut(unit).multiply_cast_speed(1.0 / BACKDRAFT_HASTE);
        });
    sim.register_aura(unit, config)
}

fn register_incinerate_buff(sim: &mut Simulation, unit: UnitId) -> AuraId {
    let fire = SpellSchool::FIRE.index();
    let config = AuraConfig::new("Incinerate", ActionId::spell(412758))
        .with_duration(Duration::from_secs(15))
        .on_gain(move |sim, aura| {
            let unit = sim.aura(aura).unit;
            sim.unit_mut(unit).pseudo.school_damage_dealt_multiplier[fire] *= INCINERATE_FIRE_BONUS;
        })
        .on_expire(move |sim, aura| {
            let unit = sim.aura(aura).unit;
            sim.unit_mut(unit).pseudo.school_damage_dealt_multiplier[fire] /= INCINERATE_FIRE_BONUS;
        });
    sim.register_aura(unit, config)
}

fn register_haunt_debuff(sim: &mut Simulation, target: UnitId) -> AuraId {
    let shadow = SpellSchool::SHADOW.index();
    let config = AuraConfig::new("Haunt", ActionId::spell(403501))
        .with_duration(Duration::from_secs(12))
        .on_gain(move |sim, aura| {
            let unit = sim.aura(aura).unit;
            sim.unit_mut(unit).pseudo.periodic_school_damage_taken_multiplier[shadow] *=
                HAUNT_PERIODIC_BONUS;
        })
        .on_expire(move |sim, aura| {
            let unit = sim.aura(aura).unit;
            sim.unit_mut(unit).pseudo.periodic_school_damage_taken_multiplier[shadow] /=
                HAUNT_PERIODIC_BONUS;
        });
    sim.get_or_register_aura(target, config)
}

pub(crate) fn register_rune_triggers(sim: &mut Simulation, warlock: &Warlock) {
    let unit = warlock.unit;
    if warlock.has_rune(WarlockRune::EverlastingAffliction) {
        sim.make_proc_trigger_aura(
            unit,
            ProcTrigger::new(
                "Everlasting Affliction",
                ProcCallback::SpellHitDealt,
                move |sim, spell, result| {
                    let Some(result) = result else {
                        return;
                    };
                    let caster = sim.spell(spell).caster;
                    for corruption in spells_labeled(sim, caster, &["Corruption"]) {
                        if let Some(dot) = sim.dot_of(corruption, result.target) {
                            if sim.dot(dot).is_active() {
                                sim.rollover_dot(dot);
                            }
                        }
                    }
                },
            )
            .with_action_id(ActionId::spell(412689))
            .with_outcome(HitOutcome::LANDED)
            .with_spell_filter(|sim, spell| is_labeled(sim, spell, &EVERLASTING_AFFLICTION_SPELLS)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{warlock_sim, with_runes};
    use super::*;

    #[test]
    fn test_rune_names() {
        assert_eq!(WarlockRune::EverlastingAffliction.name(), "Everlasting Affliction");
        assert_eq!(WarlockRune::MasterChanneler.name(), "Master Channeler");
        assert_eq!(WarlockRune::UnstableAffliction.name(), "Unstable Affliction");
        let rune: WarlockRune = serde_json::from_str("\"unstable_affliction\"").unwrap();
        assert_eq!(rune, WarlockRune::UnstableAffliction);
    }

    #[test]
    fn test_backdraft_hastes_casts() {
        let (mut sim, warlock) = warlock_sim(with_runes(&[WarlockRune::Backdraft]), &[]);
        let backdraft = warlock.auras.backdraft.unwrap();
        let shadow_bolt = sim.spell_by_label(warlock.unit, "Shadow Bolt").unwrap();

        sim.activate_aura(backdraft);
        let hasted = sim.cast_time(shadow_bolt).as_secs_f64();
        assert!((hasted - 3.0 / 1.3).abs() < 1e-6);

        sim.deactivate_aura(backdraft);
        assert!((sim.unit(warlock.unit).cast_speed() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_incinerate_buff_raises_fire_damage() {
        let (mut sim, warlock) = warlock_sim(with_runes(&[WarlockRune::Incinerate]), &[]);
        let buff = warlock.auras.incinerate.unwrap();
        sim.activate_aura(buff);
        let fire = sim.unit(warlock.unit).pseudo.school_dealt(SpellSchool::FIRE);
        assert!((fire - INCINERATE_FIRE_BONUS).abs() < 1e-9);
        let shadow = sim.unit(warlock.unit).pseudo.school_dealt(SpellSchool::SHADOW);
        assert!((shadow - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_haunt_debuff_on_target() {
        let (mut sim, warlock) = warlock_sim(with_runes(&[WarlockRune::Haunt]), &[]);
        let haunt = warlock.auras.haunt.unwrap();
        let target = sim.primary_target();
        assert_eq!(sim.aura(haunt).unit, target);

        sim.activate_aura(haunt);
        let taken = sim.unit(target).pseudo.periodic_school_taken(SpellSchool::SHADOW);
        assert!((taken - HAUNT_PERIODIC_BONUS).abs() < 1e-9);
    }

    #[test]
    fn test_everlasting_affliction_refreshes_corruption() {
        let (mut sim, warlock) = warlock_sim(
            with_runes(&[WarlockRune::EverlastingAffliction]),
            &[(Stat::SpellHit, 20.0)],
        );
        let target = sim.primary_target();
        let corruption = sim.spell_by_label(warlock.unit, "Corruption").unwrap();
        let dot = sim.dot_of(corruption, target).unwrap();
        sim.reset_auras();
        sim.apply_dot(dot);

        // Part way into Corruption, a landed Shadow Bolt resets its duration
        sim.advance(Duration::from_secs(7));
        let shadow_bolt = sim.spell_by_label(warlock.unit, "Shadow Bolt").unwrap();
        sim.cast(shadow_bolt, target).unwrap();
        sim.advance(Duration::from_secs(12));

        assert!(sim.spell(shadow_bolt).metrics.hits > 0);
        assert!(sim.dot(dot).is_active());
        assert!(sim.dot_remaining(dot) > Duration::from_secs(10));
    }
}
