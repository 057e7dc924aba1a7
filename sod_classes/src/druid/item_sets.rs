//! Druid item sets - Phase 1 through 4 tier and PvP bonuses
//!
//! Bonuses run after the druid's spells are registered, so spell-modifying
//! bonuses can look spells up by label.

use crate::common::{is_labeled, modify_spells};
use sod_core::prelude::*;
use std::time::Duration;

pub fn register_all(registry: &mut ItemSetRegistry) {
    registry.register(
        ItemSet::new("Lost Worshipper's Armor")
            .with_bonus(2, lost_worshipper_2p)
            .with_bonus(3, lost_worshipper_3p),
    );
    registry.register(ItemSet::new("Exiled Prophet's Raiment").with_bonus(2, exiled_prophet_2p));
    registry.register(
        ItemSet::new("Emerald Watcher Vestments")
            .with_bonus(2, emerald_watcher_2p)
            .with_bonus(3, emerald_watcher_3p),
    );
    registry.register(
        ItemSet::new("Feralheart Raiment")
            .with_bonus(2, feralheart_2p)
            .with_bonus(4, feralheart_4p)
            .with_bonus(6, feralheart_6p)
            .with_bonus(8, feralheart_8p),
    );
    registry.register(
        ItemSet::new("Coagulate Bloodguard's Leathers")
            .with_bonus(2, bloodguard_2p)
            .with_bonus(3, bloodguard_3p),
    );
    registry.register(ItemSet::new("Cenarion Eclipse").with_bonus(4, cenarion_eclipse_4p));
}

// === Lost Worshipper's Armor ===

fn lost_worshipper_2p(sim: &mut Simulation, unit: UnitId) {
    let u = sim.unit_mut(unit);
    u.add_stat(Stat::MeleeCrit, 1.0);
    u.add_stat(Stat::SpellCrit, 1.0);
}

/// +3% crit on Wrath and Starfire
fn lost_worshipper_3p(sim: &mut Simulation, unit: UnitId) {
    modify_spells(sim, unit, &["Wrath", "Starfire"], |config| config.bonus_crit += 3.0);
}

// === Exiled Prophet's Raiment ===

fn exiled_prophet_2p(sim: &mut Simulation, unit: UnitId) {
    sim.unit_mut(unit).add_stat(Stat::Mp5, 4.0);
}

// === Emerald Watcher Vestments ===

fn emerald_watcher_2p(sim: &mut Simulation, unit: UnitId) {
    sim.unit_mut(unit).add_stat(Stat::Stamina, 10.0);
}

fn emerald_watcher_3p(sim: &mut Simulation, unit: UnitId) {
    sim.unit_mut(unit).add_stat(Stat::SpellPower, 12.0);
}

// === Feralheart Raiment ===

fn feralheart_2p(sim: &mut Simulation, unit: UnitId) {
    let u = sim.unit_mut(unit);
    u.add_stat(Stat::AttackPower, 40.0);
    u.add_stat(Stat::SpellDamage, 23.0);
}

/// Spell casts may restore mana; landed white hits may restore energy
fn feralheart_4p(sim: &mut Simulation, unit: UnitId) {
    sim.make_proc_trigger_aura(
        unit,
        ProcTrigger::new("Feralheart Mana", ProcCallback::CastComplete, |sim, spell, _| {
            let caster = sim.spell(spell).caster;
            sim.unit_mut(caster).add_mana(300.0, "Feralheart Raiment");
        })
        .with_action_id(ActionId::spell(450608))
        .with_proc_mask(ProcMask::SPELL_DAMAGE)
        .with_chance(0.02),
    );
    sim.make_proc_trigger_aura(
        unit,
        ProcTrigger::new("Feralheart Energy", ProcCallback::SpellHitDealt, |sim, spell, _| {
            let caster = sim.spell(spell).caster;
            sim.unit_mut(caster).add_energy(40.0, "Feralheart Raiment");
        })
        .with_action_id(ActionId::spell(450609))
        .with_proc_mask(ProcMask::MELEE_WHITE_HIT)
        .with_outcome(HitOutcome::LANDED)
        .with_chance(0.06),
    );
}

fn feralheart_6p(sim: &mut Simulation, unit: UnitId) {
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

fn feralheart_8p(sim: &mut Simulation, unit: UnitId) {
    sim.unit_mut(unit).add_stat(Stat::BonusArmor, 200.0);
}

// === Coagulate Bloodguard's Leathers ===

/// Cat Form mana cost reduction while Power Shredder is up
const POWER_SHREDDER_DISCOUNT: f64 = 0.3;

fn bloodguard_2p(sim: &mut Simulation, unit: UnitId) {
    sim.unit_mut(unit).add_stat(Stat::Strength, 10.0);
}

/// Shred casts make the next Cat Form cheaper
fn bloodguard_3p(sim: &mut Simulation, unit: UnitId) {
    let config = AuraConfig::new("Power Shredder", ActionId::spell(449925))
        .with_duration(Duration::from_secs(10))
        .on_gain(|sim, aura| {
            let unit = sim.aura(aura).unit;
            modify_spells(sim, unit, &["Cat Form"], |config| {
                config.cost_multiplier -= POWER_SHREDDER_DISCOUNT
            });
        })
        .on_expire(|sim, aura| {
            let unit = sim.aura(aura).unit;
            modify_spells(sim, unit, &["Cat Form"], |config| {
                config.cost_multiplier += POWER_SHREDDER_DISCOUNT
            });
        })
        .on_cast_complete(|sim, aura, spell| {
            if is_labeled(sim, spell, &["Cat Form"]) {
                sim.deactivate_aura(aura);
            }
        });
    let power_shredder = sim.register_aura(unit, config);

    sim.make_proc_trigger_aura(
        unit,
        ProcTrigger::new("Power Shredder Trigger", ProcCallback::CastComplete, move |sim, _, _| {
            sim.activate_aura(power_shredder);
        })
        .with_spell_filter(|sim, spell| is_labeled(sim, spell, &["Shred"])),
    );
}

// === Cenarion Eclipse ===

fn cenarion_eclipse_4p(sim: &mut Simulation, unit: UnitId) {
    let u = sim.unit_mut(unit);
    u.add_stat(Stat::MeleeHit, 3.0);
    u.add_stat(Stat::SpellHit, 3.0);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::druid_sim;
    use super::super::DruidConfig;
    use super::*;
    use std::collections::BTreeMap;

    fn registry() -> ItemSetRegistry {
        let mut registry = ItemSetRegistry::new();
        register_all(&mut registry);
        registry
    }

    #[test]
    fn test_registers_druid_sets() {
        assert_eq!(registry().names().len(), 6);
    }

    #[test]
    fn test_lost_worshipper_adds_wrath_crit() {
        let (mut sim, druid) = druid_sim(DruidConfig::default(), &[]);
        let equipped = BTreeMap::from([("Lost Worshipper's Armor".to_string(), 3)]);
        let crit = sim.unit(druid.unit).spell_crit_percent();

        let applied = registry().apply(&mut sim, druid.unit, &equipped).unwrap();
        assert_eq!(applied.len(), 2);
        let wrath = sim.spell_by_label(druid.unit, "Wrath").unwrap();
        assert!((sim.spell(wrath).config.bonus_crit - 3.0).abs() < 1e-9);
        assert!((sim.unit(druid.unit).spell_crit_percent() - crit - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_feralheart_two_piece_stats() {
        let (mut sim, druid) = druid_sim(DruidConfig::default(), &[]);
        let equipped = BTreeMap::from([("Feralheart Raiment".to_string(), 3)]);
        registry().apply(&mut sim, druid.unit, &equipped).unwrap();
        let u = sim.unit(druid.unit);
        assert!((u.stat(Stat::AttackPower) - 40.0).abs() < 1e-9);
        assert!((u.stat(Stat::SpellDamage) - 23.0).abs() < 1e-9);
    }

    #[test]
    fn test_power_shredder_discounts_cat_form() {
        let (mut sim, druid) = druid_sim(DruidConfig::default(), &[]);
        let equipped = BTreeMap::from([("Coagulate Bloodguard's Leathers".to_string(), 3)]);
        registry().apply(&mut sim, druid.unit, &equipped).unwrap();

        let cat_form = sim.spell_by_label(druid.unit, "Cat Form").unwrap();
        let power_shredder = sim.aura_by_label(druid.unit, "Power Shredder").unwrap();
        let full = sim.spell_cost(cat_form);

        sim.activate_aura(power_shredder);
        assert!((sim.spell_cost(cat_form) - full * 0.7).abs() < 1e-6);

        let target = sim.primary_target();
        sim.cast(cat_form, target).unwrap();
        assert!(!sim.is_aura_active(power_shredder));
        assert!((sim.spell_cost(cat_form) - full).abs() < 1e-6);
    }
}
