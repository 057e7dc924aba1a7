//! Warlock item sets - Tier and PvP bonuses

use super::talents::add_nightfall_chance;
use crate::common::modify_spells;
use sod_core::prelude::*;

pub fn register_all(registry: &mut ItemSetRegistry) {
    registry.register(ItemSet::new("Nightmare Prophet's Garb").with_bonus(2, nightmare_prophet_2p));
    registry.register(
        ItemSet::new("Deathmist Raiment")
            .with_bonus(2, deathmist_2p)
            .with_bonus(4, deathmist_4p)
            .with_bonus(6, deathmist_6p)
            .with_bonus(8, deathmist_8p),
    );
    registry.register(
        ItemSet::new("Corrupted Felheart")
            .with_bonus(2, felheart_2p)
            .with_bonus(4, felheart_4p)
            .with_bonus(6, felheart_6p),
    );
}

// === Nightmare Prophet's Garb ===

fn nightmare_prophet_2p(sim: &mut Simulation, unit: UnitId) {
    let u = sim.unit_mut(unit);
    u.add_stat(Stat::MeleeHit, 1.0);
    u.add_stat(Stat::SpellHit, 1.0);
}

// === Deathmist Raiment ===

fn deathmist_2p(sim: &mut Simulation, unit: UnitId) {
    sim.unit_mut(unit).add_stat(Stat::SpellPower, 23.0);
}

/// Landed white hits and spell casts may restore 270 to 300 mana
fn deathmist_4p(sim: &mut Simulation, unit: UnitId) {
    fn restore_mana(sim: &mut Simulation, spell: SpellId) {
        let caster = sim.spell(spell).caster;
        let amount = sim.roll(270.0, 300.0);
        sim.unit_mut(caster).add_mana(amount, "Deathmist Raiment");
    }

    sim.make_proc_trigger_aura(
        unit,
        ProcTrigger::new("Deathmist Mana (Melee)", ProcCallback::SpellHitDealt, |sim, spell, _| {
            restore_mana(sim, spell)
        })
        .with_action_id(ActionId::spell(450583))
        .with_proc_mask(ProcMask::MELEE_WHITE_HIT)
        .with_outcome(HitOutcome::LANDED)
        .with_chance(0.06),
    );
    sim.make_proc_trigger_aura(
        unit,
        ProcTrigger::new("Deathmist Mana (Spell)", ProcCallback::CastComplete, |sim, spell, _| {
            restore_mana(sim, spell)
        })
        .with_action_id(ActionId::spell(450583))
        .with_proc_mask(ProcMask::SPELL_DAMAGE)
        .with_chance(0.06),
    );
}

fn deathmist_6p(sim: &mut Simulation, unit: UnitId) {
    let u = sim.unit_mut(unit);
    for stat in [
        Stat::ArcaneResistance,
        Stat::FireResistance,
        Stat::FrostResistance,
        Stat::NatureResistance,
        Stat::ShadowResistance,
    ] {
        u.add_stat(stat, 8.0);
    }
}

fn deathmist_8p(sim: &mut Simulation, unit: UnitId) {
    sim.unit_mut(unit).add_stat(Stat::BonusArmor, 200.0);
}

// === Corrupted Felheart ===

/// Life Tap restores 50% more mana
fn felheart_2p(sim: &mut Simulation, unit: UnitId) {
    modify_spells(sim, unit, &["Life Tap"], |config| config.damage_multiplier *= 1.5);
}

fn felheart_4p(sim: &mut Simulation, unit: UnitId) {
    let u = sim.unit_mut(unit);
    u.add_stat(Stat::MeleeCrit, 2.0);
    u.add_stat(Stat::SpellCrit, 2.0);
}

/// A second Nightfall chance; needs the Nightfall talent
fn felheart_6p(sim: &mut Simulation, unit: UnitId) {
    add_nightfall_chance(sim, unit, 0.04);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{warlock_sim, with_talents};
    use super::super::{WarlockConfig, WarlockTalents};
    use super::*;
    use std::collections::BTreeMap;

    fn registry() -> ItemSetRegistry {
        let mut registry = ItemSetRegistry::new();
        register_all(&mut registry);
        registry
    }

    #[test]
    fn test_registers_warlock_sets() {
        assert_eq!(
            registry().names(),
            vec!["Corrupted Felheart", "Deathmist Raiment", "Nightmare Prophet's Garb"]
        );
    }

    #[test]
    fn test_felheart_boosts_life_tap() {
        let (mut sim, warlock) = warlock_sim(WarlockConfig::default(), &[]);
        let equipped = BTreeMap::from([("Corrupted Felheart".to_string(), 4)]);
        let crit = sim.unit(warlock.unit).spell_crit_percent();

        let applied = registry().apply(&mut sim, warlock.unit, &equipped).unwrap();
        assert_eq!(applied.len(), 2);
        let life_tap = sim.spell_by_label(warlock.unit, "Life Tap").unwrap();
        assert!((sim.spell(life_tap).config.damage_multiplier - 1.5).abs() < 1e-9);
        assert!((sim.unit(warlock.unit).spell_crit_percent() - crit - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_felheart_six_piece_needs_nightfall() {
        let equipped = BTreeMap::from([("Corrupted Felheart".to_string(), 6)]);

        let (mut sim, warlock) = warlock_sim(WarlockConfig::default(), &[]);
        let auras = sim.unit(warlock.unit).auras().len();
        registry().apply(&mut sim, warlock.unit, &equipped).unwrap();
        assert_eq!(sim.unit(warlock.unit).auras().len(), auras);

        let (mut sim, warlock) = warlock_sim(
            with_talents(WarlockTalents {
                nightfall: 2,
                ..Default::default()
            }),
            &[],
        );
        let auras = sim.unit(warlock.unit).auras().len();
        registry().apply(&mut sim, warlock.unit, &equipped).unwrap();
        assert_eq!(sim.unit(warlock.unit).auras().len(), auras + 1);
    }

    #[test]
    fn test_deathmist_two_piece() {
        let (mut sim, warlock) = warlock_sim(WarlockConfig::default(), &[]);
        let equipped = BTreeMap::from([("Deathmist Raiment".to_string(), 2)]);
        registry().apply(&mut sim, warlock.unit, &equipped).unwrap();
        assert!((sim.unit(warlock.unit).spell_power(SpellSchool::SHADOW) - 23.0).abs() < 1e-9);
    }
}
