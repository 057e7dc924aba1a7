//! Feral spells - Cat Form builders, bleeds and finishers

use super::forms::Form;
use super::runes::DruidRune;
use super::Druid;
use crate::common::{highest_rank, target_has_bleed, Ranked};
use sod_core::prelude::*;
use std::time::Duration;

/// Damage bonus of Shred and Rake against a bleeding target
const BLEEDING_TARGET_BONUS: f64 = 1.3;
/// Physical damage bonus while Savage Roar is up
const SAVAGE_ROAR_MULTIPLIER: f64 = 1.3;
/// Bleed damage taken bonus of the Mangle debuff
const MANGLE_BLEED_MULTIPLIER: f64 = 1.3;
/// Share of energy returned when a builder misses or is dodged
const BUILDER_REFUND: f64 = 0.8;

struct RakeRank {
    spell_id: u32,
    level: u32,
    initial: f64,
    dot_total: f64,
}

const RAKE_RANKS: [RakeRank; 4] = [
    RakeRank { spell_id: 1822, level: 24, initial: 19.0, dot_total: 39.0 },
    RakeRank { spell_id: 1823, level: 34, initial: 29.0, dot_total: 57.0 },
    RakeRank { spell_id: 1824, level: 44, initial: 43.0, dot_total: 75.0 },
    RakeRank { spell_id: 9904, level: 54, initial: 58.0, dot_total: 96.0 },
];

struct RipRank {
    spell_id: u32,
    level: u32,
    tick_base: f64,
    tick_per_combo: f64,
}

const RIP_RANKS: [RipRank; 6] = [
    RipRank { spell_id: 1079, level: 20, tick_base: 3.0, tick_per_combo: 4.0 },
    RipRank { spell_id: 9492, level: 28, tick_base: 4.0, tick_per_combo: 7.0 },
    RipRank { spell_id: 9493, level: 36, tick_base: 6.0, tick_per_combo: 9.0 },
    RipRank { spell_id: 9752, level: 44, tick_base: 9.0, tick_per_combo: 14.0 },
    RipRank { spell_id: 9894, level: 52, tick_base: 12.0, tick_per_combo: 20.0 },
    RipRank { spell_id: 9896, level: 60, tick_base: 17.0, tick_per_combo: 28.0 },
];

struct BiteRank {
    spell_id: u32,
    level: u32,
    base: f64,
    range: f64,
    per_combo: f64,
    per_energy: f64,
}

const BITE_RANKS: [BiteRank; 4] = [
    BiteRank { spell_id: 22568, level: 32, base: 14.0, range: 16.0, per_combo: 36.0, per_energy: 1.0 },
    BiteRank { spell_id: 22827, level: 40, base: 20.0, range: 24.0, per_combo: 59.0, per_energy: 1.5 },
    BiteRank { spell_id: 22828, level: 48, base: 30.0, range: 40.0, per_combo: 92.0, per_energy: 2.0 },
    BiteRank { spell_id: 22829, level: 56, base: 45.0, range: 50.0, per_combo: 128.0, per_energy: 2.5 },
];

impl Ranked for RakeRank {
    fn required_level(&self) -> u32 {
        self.level
    }
}

impl Ranked for RipRank {
    fn required_level(&self) -> u32 {
        self.level
    }
}

impl Ranked for BiteRank {
    fn required_level(&self) -> u32 {
        self.level
    }
}

/// Shred spell id and flat bonus by level bracket
fn shred_rank(level: u32) -> (u32, f64) {
    let (spell_id, flat) = match level {
        60.. => (9830, 80.0),
        50..=59 => (9829, 64.0),
        40..=49 => (8992, 44.0),
        _ => (5221, 24.0),
    };
    (spell_id, flat * 0.075)
}

/// Rip duration scaling: five points count as four
fn rip_combo_scaling(combo_points: u32) -> f64 {
    if combo_points == 5 {
        4.0
    } else {
        f64::from(combo_points)
    }
}

/// Savage Roar duration for a finisher spending `combo_points`
pub fn savage_roar_duration(combo_points: u32) -> Duration {
    Duration::from_secs(9 + 5 * u64::from(combo_points))
}

fn has_combo_points(sim: &Simulation, spell: SpellId, _target: UnitId) -> bool {
    let caster = sim.spell(spell).caster;
    sim.unit(caster).combo_points() > 0
}

pub(crate) fn register_feral_auras(sim: &mut Simulation, druid: &mut Druid) {
    if druid.has_rune(DruidRune::SavageRoar) {
        let config = AuraConfig::new("Savage Roar", ActionId::spell(407988))
            .with_duration(savage_roar_duration(1))
            .on_gain(|sim, aura| {
                let unit = sim.aura(aura).unit;
                sim.unit_mut(unit).pseudo.school_damage_dealt_multiplier[SpellSchool::PHYSICAL.index()] *=
                    SAVAGE_ROAR_MULTIPLIER;
            })
            .on_expire(|sim, aura| {
                let unit = sim.aura(aura).unit;
                sim.unit_mut(unit).pseudo.school_damage_dealt_multiplier[SpellSchool::PHYSICAL.index()] /=
                    SAVAGE_ROAR_MULTIPLIER;
            });
        druid.auras.savage_roar = Some(sim.register_aura(druid.unit, config));
    }

    if druid.has_rune(DruidRune::Mangle) {
        // One debuff per target, shared by every druid applying it
        let target = sim.primary_target();
        let config = AuraConfig::new("Mangle", ActionId::spell(409828).with_tag(1))
            .with_duration(Duration::from_secs(60))
            .on_gain(|sim, aura| {
                let unit = sim.aura(aura).unit;
                sim.unit_mut(unit).pseudo.periodic_school_damage_taken_multiplier
                    [SpellSchool::PHYSICAL.index()] *= MANGLE_BLEED_MULTIPLIER;
            })
            .on_expire(|sim, aura| {
                let unit = sim.aura(aura).unit;
                sim.unit_mut(unit).pseudo.periodic_school_damage_taken_multiplier
                    [SpellSchool::PHYSICAL.index()] /= MANGLE_BLEED_MULTIPLIER;
            });
        druid.auras.mangle = Some(sim.get_or_register_aura(target, config));
    }
}

pub(crate) fn register_feral_spells(sim: &mut Simulation, druid: &Druid) {
    register_shred(sim, druid);
    register_rake(sim, druid);
    register_rip(sim, druid);
    register_ferocious_bite(sim, druid);
    if druid.has_rune(DruidRune::Mangle) {
        register_mangle(sim, druid);
    }
    if let Some(aura) = druid.auras.savage_roar {
        register_savage_roar(sim, druid, aura);
    }
}

fn register_shred(sim: &mut Simulation, druid: &Druid) {
    let (spell_id, flat) = shred_rank(druid.level);
    let cost = 60.0 - 6.0 * f64::from(druid.talents.improved_shred);

    druid.register_spell(
        sim,
        Form::CAT,
        SpellConfig {
            proc_mask: ProcMask::MELEE_MH_SPECIAL,
            flags: SpellFlags::OMEN | SpellFlags::BUILDER,
            cost: Cost::energy(cost, BUILDER_REFUND),
            cast: CastConfig::energy_gcd(),
            damage_multiplier: 4.0,
            ..SpellConfig::new("Shred", ActionId::spell(spell_id))
        }
        .with_apply_effects(move |sim, spell, target| {
            let caster = sim.spell(spell).caster;
            let mut base = flat + sim.weapon_damage(caster);
            if target_has_bleed(sim, caster, target) {
                base *= BLEEDING_TARGET_BONUS;
            }
            let result =
                sim.calc_and_deal_damage(spell, target, base, OutcomeKind::MeleeSpecialHitAndCrit);
            if result.landed() {
                sim.unit_mut(caster).add_combo_points(1, "Shred");
            } else {
                sim.issue_refund(spell);
            }
        }),
    );
}

fn register_rake(sim: &mut Simulation, druid: &Druid) {
    let Some(rank) = highest_rank(&RAKE_RANKS, druid.level) else {
        return;
    };
    let initial = rank.initial * 1.5;
    let per_tick = rank.dot_total / 3.0 * 1.5;
    let unit = druid.unit;

    let dot = DotConfig::new("Rake", 3, Duration::from_secs(3))
        .on_snapshot(move |sim, dot, _| {
            let ap = sim.unit(unit).attack_power();
            sim.snapshot_dot(dot, per_tick + 0.04 * ap);
            sim.dot_mut(dot).snapshot_crit_chance = 0.0;
        })
        .on_tick(|sim, dot| {
            sim.calc_and_deal_periodic_snapshot_damage(dot, OutcomeKind::Tick);
        });

    druid.register_spell(
        sim,
        Form::CAT,
        SpellConfig {
            proc_mask: ProcMask::MELEE_MH_SPECIAL,
            flags: SpellFlags::IGNORE_RESISTS | SpellFlags::BUILDER,
            cost: Cost::energy(40.0 - f64::from(druid.talents.ferocity), BUILDER_REFUND),
            cast: CastConfig::energy_gcd(),
            damage_multiplier: 1.0 + 0.1 * f64::from(druid.talents.savage_fury),
            dot: Some(dot),
            ..SpellConfig::new("Rake", ActionId::spell(rank.spell_id))
        }
        .with_apply_effects(move |sim, spell, target| {
            let caster = sim.spell(spell).caster;
            let mut base = initial + 0.04 * sim.unit(caster).attack_power();
            if target_has_bleed(sim, caster, target) {
                base *= BLEEDING_TARGET_BONUS;
            }
            let result =
                sim.calc_and_deal_damage(spell, target, base, OutcomeKind::MeleeSpecialHitAndCrit);
            if result.landed() {
                sim.unit_mut(caster).add_combo_points(1, "Rake");
                if let Some(dot) = sim.dot_of(spell, target) {
                    sim.apply_dot(dot);
                }
            } else {
                sim.issue_refund(spell);
            }
        }),
    );
}

fn register_rip(sim: &mut Simulation, druid: &Druid) {
    let Some(rank) = highest_rank(&RIP_RANKS, druid.level) else {
        return;
    };
    let (tick_base, tick_per_combo) = (rank.tick_base, rank.tick_per_combo);
    let unit = druid.unit;

    // Snapshot happens before the finisher spends its points
    let dot = DotConfig::new("Rip", 8, Duration::from_secs(2))
        .on_snapshot(move |sim, dot, _| {
            let u = sim.unit(unit);
            let combo_points = u.combo_points();
            let ap = u.attack_power();
            let base = tick_base
                + tick_per_combo * f64::from(combo_points)
                + 0.01 * ap * rip_combo_scaling(combo_points);
            sim.snapshot_dot(dot, base);
        })
        .on_tick(|sim, dot| {
            sim.calc_and_deal_periodic_snapshot_damage(dot, OutcomeKind::Tick);
        });

    druid.register_spell(
        sim,
        Form::CAT,
        SpellConfig {
            proc_mask: ProcMask::MELEE_MH_SPECIAL,
            flags: SpellFlags::OMEN | SpellFlags::PURE_DOT | SpellFlags::FINISHER,
            cost: Cost::energy(30.0, 0.0),
            cast: CastConfig::energy_gcd(),
            damage_multiplier_additive: 1.5,
            dot: Some(dot),
            ..SpellConfig::new("Rip", ActionId::spell(rank.spell_id))
        }
        .with_cast_condition(has_combo_points)
        .with_apply_effects(|sim, spell, target| {
            let result = sim.calc_outcome(spell, target, OutcomeKind::MeleeSpecialHitAndCrit);
            if result.landed() {
                if let Some(dot) = sim.dot_of(spell, target) {
                    sim.apply_dot(dot);
                }
                let caster = sim.spell(spell).caster;
                sim.unit_mut(caster).spend_combo_points();
            }
            sim.deal_damage(&result);
        }),
    );
}

fn register_ferocious_bite(sim: &mut Simulation, druid: &Druid) {
    let Some(rank) = highest_rank(&BITE_RANKS, druid.level) else {
        return;
    };
    let (base, range, per_combo, per_energy) =
        (rank.base, rank.range, rank.per_combo, rank.per_energy);

    druid.register_spell(
        sim,
        Form::CAT,
        SpellConfig {
            proc_mask: ProcMask::MELEE_MH_SPECIAL,
            flags: SpellFlags::FINISHER,
            cost: Cost::energy(35.0, 0.0),
            cast: CastConfig::energy_gcd(),
            damage_multiplier: 1.0 + 0.03 * f64::from(druid.talents.feral_aggression),
            ..SpellConfig::new("Ferocious Bite", ActionId::spell(rank.spell_id))
        }
        .with_cast_condition(has_combo_points)
        .with_apply_effects(move |sim, spell, target| {
            let caster = sim.spell(spell).caster;
            let (combo_points, excess_energy, ap) = {
                let u = sim.unit(caster);
                (f64::from(u.combo_points()), u.current_energy(), u.attack_power())
            };
            let damage = base
                + range * sim.random_float("Ferocious Bite")
                + per_combo * combo_points
                + per_energy * excess_energy
                + 0.03 * ap * combo_points;
            let result =
                sim.calc_and_deal_damage(spell, target, damage, OutcomeKind::MeleeSpecialHitAndCrit);
            if result.landed() {
                let u = sim.unit_mut(caster);
                u.spend_energy(excess_energy);
                u.spend_combo_points();
            }
        }),
    );
}

fn register_mangle(sim: &mut Simulation, druid: &Druid) {
    let debuff = druid.auras.mangle;

    druid.register_spell(
        sim,
        Form::CAT,
        SpellConfig {
            proc_mask: ProcMask::MELEE_MH_SPECIAL,
            flags: SpellFlags::OMEN | SpellFlags::BUILDER,
            cost: Cost::energy(40.0 - f64::from(druid.talents.ferocity), BUILDER_REFUND),
            cast: CastConfig::energy_gcd(),
            damage_multiplier_additive: (1.0 + 0.1 * f64::from(druid.talents.savage_fury)) * 2.7,
            ..SpellConfig::new("Mangle (Cat)", ActionId::spell(409828))
        }
        .with_apply_effects(move |sim, spell, target| {
            let caster = sim.spell(spell).caster;
            let base = sim.weapon_damage(caster);
            let result =
                sim.calc_and_deal_damage(spell, target, base, OutcomeKind::MeleeSpecialHitAndCrit);
            if result.landed() {
                sim.unit_mut(caster).add_combo_points(1, "Mangle (Cat)");
                if let Some(debuff) = debuff.filter(|aura| sim.aura(*aura).unit == target) {
                    sim.activate_aura(debuff);
                }
            } else {
                sim.issue_refund(spell);
            }
        }),
    );
}

fn register_savage_roar(sim: &mut Simulation, druid: &Druid, aura: AuraId) {
    druid.register_spell(
        sim,
        Form::CAT,
        SpellConfig {
            flags: SpellFlags::FINISHER,
            cost: Cost::energy(25.0, 0.0),
            cast: CastConfig::energy_gcd(),
            ..SpellConfig::new("Savage Roar", ActionId::spell(407988))
        }
        .with_cast_condition(has_combo_points)
        .with_apply_effects(move |sim, spell, _| {
            let caster = sim.spell(spell).caster;
            let combo_points = sim.unit_mut(caster).spend_combo_points();
            sim.aura_mut(aura).config.duration = Some(savage_roar_duration(combo_points));
            sim.activate_aura(aura);
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::super::test_support::druid_sim;
    use super::super::{DruidConfig, DruidTalents};
    use super::*;

    fn cat_sim(config: DruidConfig) -> (Simulation, Druid, UnitId) {
        let (mut sim, druid) = druid_sim(config, &[(Stat::MeleeHit, 20.0), (Stat::Agility, 100.0)]);
        sim.activate_aura(druid.forms.cat);
        let target = sim.primary_target();
        (sim, druid, target)
    }

    #[test]
    fn test_shred_rank_brackets() {
        assert_eq!(shred_rank(60).0, 9830);
        assert_eq!(shred_rank(52).0, 9829);
        assert!((shred_rank(60).1 - 6.0).abs() < 1e-9);
        assert_eq!(shred_rank(25).0, 5221);
    }

    #[test]
    fn test_savage_roar_duration() {
        assert_eq!(savage_roar_duration(1), Duration::from_secs(14));
        assert_eq!(savage_roar_duration(5), Duration::from_secs(34));
    }

    #[test]
    fn test_rip_scaling_caps_at_four() {
        assert!((rip_combo_scaling(3) - 3.0).abs() < 1e-9);
        assert!((rip_combo_scaling(5) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_improved_shred_lowers_cost() {
        let config = DruidConfig {
            talents: DruidTalents {
                improved_shred: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let (sim, druid, _) = cat_sim(config);
        let shred = sim.spell_by_label(druid.unit, "Shred").unwrap();
        assert!((sim.spell_cost(shred) - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_shred_builds_combo_point() {
        let (mut sim, druid, target) = cat_sim(DruidConfig::default());
        let shred = sim.spell_by_label(druid.unit, "Shred").unwrap();
        sim.cast(shred, target).unwrap();

        let u = sim.unit(druid.unit);
        assert!(sim.spell(shred).metrics.hits > 0);
        assert_eq!(u.combo_points(), 1);
        assert!((u.current_energy() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_finishers_need_combo_points() {
        let (mut sim, druid, target) = cat_sim(DruidConfig::default());
        let rip = sim.spell_by_label(druid.unit, "Rip").unwrap();
        let bite = sim.spell_by_label(druid.unit, "Ferocious Bite").unwrap();
        assert_eq!(sim.cast_blocker(rip, target), Some("cast condition not met"));
        assert_eq!(sim.cast_blocker(bite, target), Some("cast condition not met"));

        sim.unit_mut(druid.unit).add_combo_points(5, "test");
        assert_eq!(sim.cast_blocker(rip, target), None);
    }

    #[test]
    fn test_rip_snapshots_combo_points() {
        let (mut sim, druid, target) = cat_sim(DruidConfig::default());
        let rip = sim.spell_by_label(druid.unit, "Rip").unwrap();
        sim.unit_mut(druid.unit).add_combo_points(5, "test");
        let ap = sim.unit(druid.unit).attack_power();

        sim.cast(rip, target).unwrap();
        assert!(sim.is_dot_active(rip, target));
        let dot = sim.dot_of(rip, target).unwrap();
        // 17 + 28 * 5 + 0.01 * ap * 4
        let expected = 157.0 + 0.04 * ap;
        assert!((sim.dot(dot).snapshot_base_damage - expected).abs() < 1e-6);
        assert_eq!(sim.unit(druid.unit).combo_points(), 0);
        assert!(target_has_bleed(&sim, druid.unit, target));
    }

    #[test]
    fn test_ferocious_bite_spends_extra_energy() {
        let (mut sim, druid, target) = cat_sim(DruidConfig::default());
        let bite = sim.spell_by_label(druid.unit, "Ferocious Bite").unwrap();
        sim.unit_mut(druid.unit).add_combo_points(3, "test");

        sim.cast(bite, target).unwrap();
        let u = sim.unit(druid.unit);
        assert!(sim.spell(bite).metrics.hits > 0);
        assert!(u.current_energy().abs() < 1e-9);
        assert_eq!(u.combo_points(), 0);
    }

    #[test]
    fn test_savage_roar_buffs_physical_damage() {
        let config = DruidConfig {
            runes: vec![DruidRune::SavageRoar],
            ..Default::default()
        };
        let (mut sim, druid, target) = cat_sim(config);
        let roar = sim.spell_by_label(druid.unit, "Savage Roar").unwrap();
        let aura = druid.auras.savage_roar.unwrap();
        sim.unit_mut(druid.unit).add_combo_points(2, "test");

        sim.cast(roar, target).unwrap();
        assert!(sim.is_aura_active(aura));
        assert_eq!(sim.aura_remaining(aura), Duration::from_secs(19));
        let physical = sim.unit(druid.unit).pseudo.school_dealt(SpellSchool::PHYSICAL);
        assert!((physical - SAVAGE_ROAR_MULTIPLIER).abs() < 1e-9);

        sim.advance(Duration::from_secs(20));
        assert!(!sim.is_aura_active(aura));
        let physical = sim.unit(druid.unit).pseudo.school_dealt(SpellSchool::PHYSICAL);
        assert!((physical - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_mangle_applies_bleed_debuff() {
        let config = DruidConfig {
            runes: vec![DruidRune::Mangle],
            ..Default::default()
        };
        let (mut sim, druid, target) = cat_sim(config);
        let mangle = sim.spell_by_label(druid.unit, "Mangle (Cat)").unwrap();
        let debuff = druid.auras.mangle.unwrap();
        assert_eq!(sim.aura(debuff).unit, target);

        sim.cast(mangle, target).unwrap();
        assert!(sim.spell(mangle).metrics.hits > 0);
        assert!(sim.is_aura_active(debuff));
        let taken = sim.unit(target).pseudo.periodic_school_taken(SpellSchool::PHYSICAL);
        assert!((taken - MANGLE_BLEED_MULTIPLIER).abs() < 1e-9);
    }
}
