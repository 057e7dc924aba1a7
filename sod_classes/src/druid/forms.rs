//! Druid forms - Cat and Moonkin shapeshifts
//!
//! The current form is whichever form aura is active; none means Humanoid.
//! Spells registered through [`super::Druid::register_spell`] carry the set
//! of forms they may be cast in.

use super::talents::DruidTalents;
use super::Druid;
use crate::common::modify_spells;
use serde::{Deserialize, Serialize};
use sod_core::prelude::*;
use std::ops::BitOr;

/// Energy granted by a successful Furor roll on entering Cat Form
const FUROR_ENERGY: f64 = 40.0;

/// A set of druid forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Form(u8);

impl Form {
    pub const HUMANOID: Form = Form(1 << 0);
    pub const CAT: Form = Form(1 << 1);
    pub const MOONKIN: Form = Form(1 << 2);
    pub const ANY: Form = Form(0b111);

    /// True if the two sets share a form
    pub const fn matches(self, other: Form) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Form {
    type Output = Form;

    fn bitor(self, rhs: Form) -> Form {
        Form(self.0 | rhs.0)
    }
}

/// Form the druid is in when the fight starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartingForm {
    #[default]
    Humanoid,
    Cat,
    Moonkin,
}

/// The druid's form auras
#[derive(Debug, Clone, Copy)]
pub struct FormAuras {
    pub cat: AuraId,
    /// Only with the Moonkin Form talent
    pub moonkin: Option<AuraId>,
}

impl FormAuras {
    pub fn current(&self, sim: &Simulation) -> Form {
        if sim.is_aura_active(self.cat) {
            Form::CAT
        } else if self.moonkin.is_some_and(|aura| sim.is_aura_active(aura)) {
            Form::MOONKIN
        } else {
            Form::HUMANOID
        }
    }

    pub fn in_form(&self, sim: &Simulation, forms: Form) -> bool {
        forms.matches(self.current(sim))
    }
}

/// Cat Form claws by level bracket
pub fn claw_weapon(level: u32) -> Weapon {
    match level {
        60.. => Weapon::new(43.84, 65.76, 1.0),
        50..=59 => Weapon::new(37.28, 55.92, 1.0),
        40..=49 => Weapon::new(27.80306, 41.7046, 1.0),
        _ => Weapon::new(16.3866, 24.5799, 1.0),
    }
}

pub(crate) fn register_form_auras(
    sim: &mut Simulation,
    unit: UnitId,
    level: u32,
    talents: &DruidTalents,
    start: StartingForm,
) -> FormAuras {
    let cat = register_cat_form_aura(sim, unit, level, talents, start);
    let moonkin = talents
        .moonkin_form
        .then(|| register_moonkin_form_aura(sim, unit, start));
    FormAuras { cat, moonkin }
}

fn register_cat_form_aura(
    sim: &mut Simulation,
    unit: UnitId,
    level: u32,
    talents: &DruidTalents,
    start: StartingForm,
) -> AuraId {
    let weapon = claw_weapon(level);
    let level = f64::from(level);
    let attack_power = 2.0 * level + f64::from(talents.predatory_strikes) * 0.5 * level;
    let melee_crit = 2.0 * f64::from(talents.sharpened_claws);
    let strength = 1.0 + 0.04 * f64::from(talents.heart_of_the_wild);
    let furor_chance = 0.2 * f64::from(talents.furor);

    let config = AuraConfig::new("Cat Form", ActionId::spell(768))
        .on_reset(move |sim, aura| {
            if start == StartingForm::Cat {
                sim.activate_aura(aura);
            }
        })
        .on_gain(move |sim, aura| {
            let unit = sim.aura(aura).unit;
            {
                let u = sim.unit_mut(unit);
                u.add_stat(Stat::AttackPower, attack_power);
                u.add_stat(Stat::MeleeCrit, melee_crit);
                u.multiply_stat(Stat::Strength, strength);
                u.pseudo.agility_to_attack_power += 1.0;
                u.pseudo.feral_attack_power_active = true;
            }
            sim.enable_auto_attacks(unit, weapon);

            // Shifting mid-fight starts from an empty bar
            if !sim.now().is_zero() {
                if let Some(bar) = sim.unit_mut(unit).energy.as_mut() {
                    bar.current = 0.0;
                }
                if furor_chance > 0.0 && sim.proc(furor_chance, "Furor") {
                    sim.unit_mut(unit).add_energy(FUROR_ENERGY, "Furor");
                }
                sim.start_auto_attacks(unit);
            }
        })
        .on_expire(move |sim, aura| {
            let unit = sim.aura(aura).unit;
            {
                let u = sim.unit_mut(unit);
                u.add_stat(Stat::AttackPower, -attack_power);
                u.add_stat(Stat::MeleeCrit, -melee_crit);
                u.multiply_stat(Stat::Strength, 1.0 / strength);
                u.pseudo.agility_to_attack_power -= 1.0;
                u.pseudo.feral_attack_power_active = false;
            }
            sim.disable_auto_attacks(unit);
        });
    sim.register_aura(unit, config)
}

fn register_moonkin_form_aura(sim: &mut Simulation, unit: UnitId, start: StartingForm) -> AuraId {
    let discounted = ["Moonfire", "Sunfire"];
    let config = AuraConfig::new("Moonkin Form", ActionId::spell(24858))
        .on_reset(move |sim, aura| {
            if start == StartingForm::Moonkin {
                sim.activate_aura(aura);
            }
        })
        .on_gain(move |sim, aura| {
            let unit = sim.aura(aura).unit;
            sim.unit_mut(unit).add_stat(Stat::SpellCrit, 3.0);
            modify_spells(sim, unit, &discounted, |config| config.cost_multiplier -= 0.5);
        })
        .on_expire(move |sim, aura| {
            let unit = sim.aura(aura).unit;
            sim.unit_mut(unit).add_stat(Stat::SpellCrit, -3.0);
            modify_spells(sim, unit, &discounted, |config| config.cost_multiplier += 0.5);
        });
    sim.register_aura(unit, config)
}

/// Shapeshift spells; each one leaves the other form
pub(crate) fn register_form_spells(sim: &mut Simulation, druid: &Druid) {
    let forms = druid.forms;

    druid.register_spell(
        sim,
        Form::HUMANOID | Form::MOONKIN,
        SpellConfig {
            cost: Cost::mana(0.55 * druid.base_mana),
            ..SpellConfig::new("Cat Form", ActionId::spell(768))
        }
        .with_apply_effects(move |sim, _, _| {
            if let Some(moonkin) = forms.moonkin {
                sim.deactivate_aura(moonkin);
            }
            sim.activate_aura(forms.cat);
        }),
    );

    if let Some(moonkin) = forms.moonkin {
        druid.register_spell(
            sim,
            Form::HUMANOID | Form::CAT,
            SpellConfig {
                cost: Cost::mana(0.35 * druid.base_mana),
                ..SpellConfig::new("Moonkin Form", ActionId::spell(24858))
            }
            .with_apply_effects(move |sim, _, _| {
                sim.deactivate_aura(forms.cat);
                sim.activate_aura(moonkin);
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::druid_sim;
    use super::super::{DruidConfig, DruidTalents};
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_form_matching() {
        assert!(Form::ANY.matches(Form::CAT));
        assert!((Form::HUMANOID | Form::MOONKIN).matches(Form::MOONKIN));
        assert!(!(Form::HUMANOID | Form::MOONKIN).matches(Form::CAT));
    }

    #[test]
    fn test_claw_weapon_brackets() {
        assert!((claw_weapon(60).min_damage - 43.84).abs() < 1e-9);
        assert!((claw_weapon(55).max_damage - 55.92).abs() < 1e-9);
        assert!((claw_weapon(25).speed - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cat_form_gates_spells() {
        let (mut sim, druid) = druid_sim(DruidConfig::default(), &[]);
        let target = sim.primary_target();
        let shred = sim.spell_by_label(druid.unit, "Shred").unwrap();
        let wrath = sim.spell_by_label(druid.unit, "Wrath").unwrap();
        assert_eq!(sim.cast_blocker(shred, target), Some("cast condition not met"));
        assert_eq!(sim.cast_blocker(wrath, target), None);

        let cat = sim.spell_by_label(druid.unit, "Cat Form").unwrap();
        sim.cast(cat, target).unwrap();
        assert_eq!(druid.forms.current(&sim), Form::CAT);

        sim.advance(Duration::from_secs(2));
        assert_eq!(sim.cast_blocker(wrath, target), Some("cast condition not met"));
        assert_eq!(sim.cast_blocker(cat, target), Some("cast condition not met"));
    }

    #[test]
    fn test_cat_form_stats() {
        let config = DruidConfig {
            talents: DruidTalents {
                sharpened_claws: 3,
                predatory_strikes: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        let (mut sim, druid) = druid_sim(config, &[(Stat::Agility, 100.0)]);
        let before_ap = sim.unit(druid.unit).attack_power();
        let before_crit = sim.unit(druid.unit).melee_crit_percent();

        sim.activate_aura(druid.forms.cat);
        let u = sim.unit(druid.unit);
        // 2 * 60 + 3 * 0.5 * 60 + 100 agility
        assert!((u.attack_power() - before_ap - 310.0).abs() < 1e-6);
        assert!((u.melee_crit_percent() - before_crit - 6.0).abs() < 1e-6);
        assert!(u.auto_attack.enabled);

        sim.deactivate_aura(druid.forms.cat);
        let u = sim.unit(druid.unit);
        assert!((u.attack_power() - before_ap).abs() < 1e-6);
        assert!(!u.auto_attack.enabled);
    }

    #[test]
    fn test_shifting_mid_fight_empties_energy() {
        let (mut sim, druid) = druid_sim(DruidConfig::default(), &[]);
        sim.advance(Duration::from_secs(5));
        sim.activate_aura(druid.forms.cat);
        assert!(sim.unit(druid.unit).current_energy().abs() < 1e-9);
    }

    #[test]
    fn test_moonkin_form_crit_and_discount() {
        let config = DruidConfig {
            talents: DruidTalents {
                moonkin_form: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let (mut sim, druid) = druid_sim(config, &[]);
        let moonkin = druid.forms.moonkin.unwrap();
        let moonfire = sim.spell_by_label(druid.unit, "Moonfire").unwrap();
        let cost = sim.spell_cost(moonfire);
        let crit = sim.unit(druid.unit).spell_crit_percent();

        sim.activate_aura(moonkin);
        assert_eq!(druid.forms.current(&sim), Form::MOONKIN);
        assert!((sim.unit(druid.unit).spell_crit_percent() - crit - 3.0).abs() < 1e-9);
        assert!((sim.spell_cost(moonfire) - cost * 0.5).abs() < 1e-6);

        sim.deactivate_aura(moonkin);
        assert!((sim.spell_cost(moonfire) - cost).abs() < 1e-6);
    }
}
