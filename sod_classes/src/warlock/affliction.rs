//! Affliction spells - Corruption, curses, drains, Siphon Life, Life Tap and the affliction runes

use super::destruction::{self, PANDEMIC_CRIT_BONUS};
use super::runes::WarlockRune;
use super::Warlock;
use crate::common::{highest_rank, spells_labeled, Ranked};
use sod_core::prelude::*;
use std::time::Duration;

struct CorruptionRank {
    spell_id: u32,
    total: f64,
    ticks: u32,
    coefficient: f64,
    mana: f64,
    level: u32,
}

impl Ranked for CorruptionRank {
    fn required_level(&self) -> u32 {
        self.level
    }
}

const CORRUPTION_RANKS: [CorruptionRank; 7] = [
    CorruptionRank { spell_id: 172, total: 40.0, ticks: 4, coefficient: 0.08, mana: 35.0, level: 4 },
    CorruptionRank { spell_id: 6222, total: 90.0, ticks: 5, coefficient: 0.155, mana: 55.0, level: 14 },
    CorruptionRank { spell_id: 6223, total: 222.0, ticks: 6, coefficient: 0.167, mana: 100.0, level: 24 },
    CorruptionRank { spell_id: 7648, total: 324.0, ticks: 6, coefficient: 0.167, mana: 160.0, level: 34 },
    CorruptionRank { spell_id: 11671, total: 486.0, ticks: 6, coefficient: 0.167, mana: 225.0, level: 44 },
    CorruptionRank { spell_id: 11672, total: 666.0, ticks: 6, coefficient: 0.167, mana: 290.0, level: 54 },
    CorruptionRank { spell_id: 25311, total: 822.0, ticks: 6, coefficient: 0.167, mana: 340.0, level: 60 },
];

/// Curses, drains and Siphon Life share this shape: a flat per-tick base
struct PeriodicRank {
    spell_id: u32,
    base: f64,
    coefficient: f64,
    mana: f64,
    level: u32,
}

impl Ranked for PeriodicRank {
    fn required_level(&self) -> u32 {
        self.level
    }
}

const fn periodic(spell_id: u32, base: f64, coefficient: f64, mana: f64, level: u32) -> PeriodicRank {
    PeriodicRank {
        spell_id,
        base,
        coefficient,
        mana,
        level,
    }
}

const CURSE_OF_AGONY_RANKS: [PeriodicRank; 6] = [
    periodic(980, 7.0, 0.046, 25.0, 8),
    periodic(1014, 15.0, 0.077, 50.0, 18),
    periodic(6217, 27.0, 0.083, 90.0, 28),
    periodic(11711, 42.0, 0.083, 130.0, 38),
    periodic(11712, 65.0, 0.083, 170.0, 48),
    periodic(11713, 87.0, 0.083, 215.0, 58),
];

const DRAIN_LIFE_RANKS: [PeriodicRank; 6] = [
    periodic(689, 10.0, 0.078, 55.0, 14),
    periodic(699, 17.0, 0.1, 85.0, 22),
    periodic(709, 29.0, 0.1, 135.0, 30),
    periodic(7651, 41.0, 0.1, 185.0, 38),
    periodic(11699, 55.0, 0.1, 240.0, 46),
    periodic(11700, 71.0, 0.1, 300.0, 54),
];

const SIPHON_LIFE_RANKS: [PeriodicRank; 4] = [
    periodic(18265, 15.0, 0.05, 150.0, 30),
    periodic(18879, 22.0, 0.05, 205.0, 38),
    periodic(18880, 33.0, 0.05, 285.0, 48),
    periodic(18881, 45.0, 0.05, 365.0, 58),
];

const SIPHON_LIFE_TICKS: u32 = 10;

// Per-tick base of the 5-tick channel
const DRAIN_SOUL_RANKS: [PeriodicRank; 4] = [
    periodic(1120, 11.0, 0.063, 55.0, 10),
    periodic(8288, 31.0, 0.1, 125.0, 24),
    periodic(8289, 59.0, 0.1, 210.0, 38),
    periodic(11675, 91.0, 0.1, 290.0, 52),
];

struct LifeTapRank {
    spell_id: u32,
    mana: f64,
    level: u32,
}

impl Ranked for LifeTapRank {
    fn required_level(&self) -> u32 {
        self.level
    }
}

const LIFE_TAP_RANKS: [LifeTapRank; 6] = [
    LifeTapRank { spell_id: 1454, mana: 30.0, level: 6 },
    LifeTapRank { spell_id: 1455, mana: 75.0, level: 16 },
    LifeTapRank { spell_id: 1456, mana: 140.0, level: 26 },
    LifeTapRank { spell_id: 11687, mana: 220.0, level: 36 },
    LifeTapRank { spell_id: 11688, mana: 310.0, level: 46 },
    LifeTapRank { spell_id: 11689, mana: 424.0, level: 56 },
];

const LIFE_TAP_COEFFICIENT: f64 = 0.68;

/// Only one of these can be on a target at a time, per warlock
pub const CURSES: [&str; 2] = ["Curse of Agony", "Curse of Doom"];

const CURSE_OF_AGONY_TICKS: u32 = 12;
/// Curse of Agony steps up every this many ticks
const CURSE_OF_AGONY_RAMP_TICKS: u32 = 4;
const AMPLIFY_CURSE_MULTIPLIER: f64 = 1.5;

const CURSE_OF_DOOM_DAMAGE: f64 = 3200.0;

/// Unstable Affliction's per-tick base as a share of the rune base damage
const UNSTABLE_AFFLICTION_SCALE: f64 = 0.6;
const UNSTABLE_AFFLICTION_COEFFICIENT: f64 = 0.2;

pub(crate) fn register_affliction_spells(sim: &mut Simulation, warlock: &Warlock) {
    register_corruption(sim, warlock);
    register_curse_of_agony(sim, warlock);
    if warlock.level >= 60 {
        register_curse_of_doom(sim, warlock);
    }
    if let Some(aura) = warlock.auras.amplify_curse {
        register_amplify_curse(sim, warlock, aura);
    }
    register_drain_life(sim, warlock);
    register_drain_soul(sim, warlock);
    if warlock.talents.siphon_life {
        register_siphon_life(sim, warlock);
    }
    register_life_tap(sim, warlock);
    if warlock.has_rune(WarlockRune::Haunt) {
        register_haunt(sim, warlock);
    }
    if warlock.has_rune(WarlockRune::UnstableAffliction) {
        register_unstable_affliction(sim, warlock);
    }
}

fn pandemic_crit_bonus(warlock: &Warlock) -> f64 {
    if warlock.has_rune(WarlockRune::Pandemic) {
        PANDEMIC_CRIT_BONUS
    } else {
        0.0
    }
}

/// Cast a dot spell: roll a magic hit and apply the dot when it lands
fn land_dot(sim: &mut Simulation, spell: SpellId, target: UnitId) -> bool {
    let result = sim.calc_outcome(spell, target, OutcomeKind::MagicHit);
    let landed = result.landed();
    if landed {
        if let Some(dot) = sim.dot_of(spell, target) {
            sim.apply_dot(dot);
        }
    }
    sim.deal_damage(&result);
    landed
}

/// Remove the caster's other curses from `target`
fn clear_other_curses(sim: &mut Simulation, curse: SpellId, target: UnitId) {
    let caster = sim.spell(curse).caster;
    for other in spells_labeled(sim, caster, &CURSES) {
        if other == curse {
            continue;
        }
        if let Some(dot) = sim.dot_of(other, target) {
            sim.deactivate_dot(dot);
        }
    }
}

fn register_corruption(sim: &mut Simulation, warlock: &Warlock) {
    let Some(rank) = highest_rank(&CORRUPTION_RANKS, warlock.level) else {
        return;
    };
    let per_tick = rank.total / f64::from(rank.ticks) * (1.0 + warlock.shadow_mastery_bonus());
    let tick_outcome = warlock.pandemic_tick_outcome();
    let cast_time = Duration::from_millis(2000)
        .saturating_sub(Duration::from_millis(400 * u64::from(warlock.talents.improved_corruption)));
    let crit_damage_bonus = pandemic_crit_bonus(warlock);

    let dot = DotConfig::new("Corruption", rank.ticks, Duration::from_secs(3))
        .with_coefficient(rank.coefficient)
        .on_snapshot(move |sim, dot, _| sim.snapshot_dot(dot, per_tick))
        .on_tick(move |sim, dot| {
            sim.calc_and_deal_periodic_snapshot_damage(dot, tick_outcome);
        });

    sim.register_spell(
        warlock.unit,
        SpellConfig {
            school: SpellSchool::SHADOW,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::PURE_DOT | SpellFlags::RESET_ATTACK_SWING,
            cost: Cost::mana(rank.mana),
            cast: CastConfig::with_cast_time(cast_time),
            crit_damage_bonus,
            dot: Some(dot),
            ..SpellConfig::new("Corruption", ActionId::spell(rank.spell_id))
        }
        .with_apply_effects(|sim, spell, target| {
            land_dot(sim, spell, target);
        }),
    );
}

fn register_curse_of_agony(sim: &mut Simulation, warlock: &Warlock) {
    let Some(rank) = highest_rank(&CURSE_OF_AGONY_RANKS, warlock.level) else {
        return;
    };
    let base = rank.base
        * (1.0 + 0.03 * f64::from(warlock.talents.improved_curse_of_agony))
        * (1.0 + warlock.shadow_mastery_bonus());
    let tick_outcome = warlock.pandemic_tick_outcome();
    let amplify_curse = warlock.auras.amplify_curse;
    let crit_damage_bonus = pandemic_crit_bonus(warlock);

    // Ticks 1-4 deal half, 5-8 the full amount, 9-12 one and a half
    let dot = DotConfig::new("Curse of Agony", CURSE_OF_AGONY_TICKS, Duration::from_secs(2))
        .with_coefficient(rank.coefficient)
        .on_snapshot(move |sim, dot, _| {
            sim.snapshot_dot(dot, base);
            let mut amplified = 1.0;
            if let Some(aura) = amplify_curse.filter(|aura| sim.is_aura_active(*aura)) {
                amplified = AMPLIFY_CURSE_MULTIPLIER;
                sim.deactivate_aura(aura);
            }
            sim.dot_mut(dot).snapshot_base_damage *= 0.5 * amplified;
        })
        .on_tick(move |sim, dot| {
            sim.calc_and_deal_periodic_snapshot_damage(dot, tick_outcome);
            let ticks = sim.dot(dot).tick_count();
            if ticks % CURSE_OF_AGONY_RAMP_TICKS == 0 {
                let steps = f64::from(ticks / CURSE_OF_AGONY_RAMP_TICKS);
                let d = sim.dot_mut(dot);
                d.snapshot_base_damage += d.snapshot_base_damage / steps;
            }
        });

    sim.register_spell(
        warlock.unit,
        SpellConfig {
            school: SpellSchool::SHADOW,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::PURE_DOT,
            cost: Cost::mana(rank.mana),
            cast: CastConfig::instant(),
            crit_damage_bonus,
            dot: Some(dot),
            ..SpellConfig::new("Curse of Agony", ActionId::spell(rank.spell_id))
        }
        .with_apply_effects(|sim, spell, target| {
            if land_dot(sim, spell, target) {
                clear_other_curses(sim, spell, target);
            }
        }),
    );
}

fn register_curse_of_doom(sim: &mut Simulation, warlock: &Warlock) {
    let tick_outcome = warlock.pandemic_tick_outcome();
    let crit_damage_bonus = pandemic_crit_bonus(warlock);

    // A single tick a minute after landing
    let dot = DotConfig::new("Curse of Doom", 1, Duration::from_secs(60))
        .on_snapshot(|sim, dot, _| sim.snapshot_dot(dot, CURSE_OF_DOOM_DAMAGE))
        .on_tick(move |sim, dot| {
            sim.calc_and_deal_periodic_snapshot_damage(dot, tick_outcome);
        });

    sim.register_spell(
        warlock.unit,
        SpellConfig {
            school: SpellSchool::SHADOW,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::PURE_DOT,
            cost: Cost::mana(300.0),
            cast: CastConfig::instant(),
            cooldown: Duration::from_secs(60),
            crit_damage_bonus,
            dot: Some(dot),
            ..SpellConfig::new("Curse of Doom", ActionId::spell(449432))
        }
        .with_apply_effects(|sim, spell, target| {
            if land_dot(sim, spell, target) {
                clear_other_curses(sim, spell, target);
            }
        }),
    );
}

/// Amplify Curse: the next Curse of Agony is 50% stronger
fn register_amplify_curse(sim: &mut Simulation, warlock: &Warlock, aura: AuraId) {
    sim.register_spell(
        warlock.unit,
        SpellConfig {
            school: SpellSchool::SHADOW,
            flags: SpellFlags::NO_METRICS,
            cast: CastConfig::off_gcd(),
            cooldown: Duration::from_secs(180),
            ..SpellConfig::new("Amplify Curse", ActionId::spell(18288))
        }
        .with_apply_effects(move |sim, _, _| sim.activate_aura(aura)),
    );
}

fn register_drain_life(sim: &mut Simulation, warlock: &Warlock) {
    let Some(rank) = highest_rank(&DRAIN_LIFE_RANKS, warlock.level) else {
        return;
    };
    let per_tick = rank.base
        * (1.0 + warlock.shadow_mastery_bonus() + 0.02 * f64::from(warlock.talents.improved_drain_life));
    let master_channeler = warlock.has_rune(WarlockRune::MasterChanneler);

    // Master Channeler turns the channel into a long dot on a cooldown
    let (ticks, flags, cooldown, cost_multiplier) = if master_channeler {
        (15, SpellFlags::empty(), Duration::from_secs(15), 2.0)
    } else {
        (5, SpellFlags::CHANNELED, Duration::ZERO, 1.0)
    };

    let dot = DotConfig::new("Drain Life", ticks, Duration::from_secs(1))
        .with_coefficient(rank.coefficient)
        .on_snapshot(move |sim, dot, _| sim.snapshot_dot(dot, per_tick));

    sim.register_spell(
        warlock.unit,
        SpellConfig {
            school: SpellSchool::SHADOW,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: flags | SpellFlags::BINARY,
            cost: Cost::mana(rank.mana),
            cost_multiplier,
            cast: CastConfig::instant(),
            cooldown,
            dot: Some(dot),
            ..SpellConfig::new("Drain Life", ActionId::spell(rank.spell_id))
        }
        .with_apply_effects(|sim, spell, target| {
            land_dot(sim, spell, target);
        }),
    );
}

fn register_drain_soul(sim: &mut Simulation, warlock: &Warlock) {
    let Some(rank) = highest_rank(&DRAIN_SOUL_RANKS, warlock.level) else {
        return;
    };
    let per_tick = rank.base;

    let dot = DotConfig::new("Drain Soul", 5, Duration::from_secs(3))
        .with_coefficient(rank.coefficient)
        .on_snapshot(move |sim, dot, _| sim.snapshot_dot(dot, per_tick));

    sim.register_spell(
        warlock.unit,
        SpellConfig {
            school: SpellSchool::SHADOW,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::CHANNELED | SpellFlags::RESET_ATTACK_SWING,
            cost: Cost::mana(rank.mana),
            cast: CastConfig::instant(),
            dot: Some(dot),
            ..SpellConfig::new("Drain Soul", ActionId::spell(rank.spell_id))
        }
        .with_apply_effects(|sim, spell, target| {
            land_dot(sim, spell, target);
        }),
    );
}

/// Siphon Life locks in the target's damage taken modifiers when applied.
/// The heal half is not modeled; units carry no health pool.
fn register_siphon_life(sim: &mut Simulation, warlock: &Warlock) {
    let Some(rank) = highest_rank(&SIPHON_LIFE_RANKS, warlock.level) else {
        return;
    };
    let per_tick = rank.base * (1.0 + warlock.shadow_mastery_bonus());
    let tick_outcome = warlock.pandemic_tick_outcome();

    let dot = DotConfig::new("Siphon Life", SIPHON_LIFE_TICKS, Duration::from_secs(3))
        .with_coefficient(rank.coefficient)
        .on_snapshot(move |sim, dot, _| {
            sim.snapshot_dot(dot, per_tick);
            let (spell, target) = (sim.dot(dot).spell, sim.dot(dot).target);
            let taken = sim.target_multiplier(spell, target, true);
            sim.dot_mut(dot).snapshot_attacker_multiplier *= taken;
        })
        .on_tick(move |sim, dot| {
            // Cancel out the live target modifiers for this tick
            let (spell, target) = (sim.dot(dot).spell, sim.dot(dot).target);
            let taken = sim.target_multiplier(spell, target, true);
            if taken <= 0.0 {
                return;
            }
            sim.dot_mut(dot).snapshot_attacker_multiplier /= taken;
            sim.calc_and_deal_periodic_snapshot_damage(dot, tick_outcome);
            sim.dot_mut(dot).snapshot_attacker_multiplier *= taken;
        });

    sim.register_spell(
        warlock.unit,
        SpellConfig {
            school: SpellSchool::SHADOW,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::BINARY | SpellFlags::RESET_ATTACK_SWING,
            cost: Cost::mana(rank.mana),
            cast: CastConfig::instant(),
            crit_damage_bonus: pandemic_crit_bonus(warlock),
            dot: Some(dot),
            ..SpellConfig::new("Siphon Life", ActionId::spell(rank.spell_id))
        }
        .with_apply_effects(|sim, spell, target| {
            land_dot(sim, spell, target);
        }),
    );
}

fn register_unstable_affliction(sim: &mut Simulation, warlock: &Warlock) {
    let per_tick = warlock.base_rune_damage() * UNSTABLE_AFFLICTION_SCALE;
    let tick_outcome = warlock.pandemic_tick_outcome();

    let dot = DotConfig::new("Unstable Affliction", 5, Duration::from_secs(3))
        .with_coefficient(UNSTABLE_AFFLICTION_COEFFICIENT)
        .on_snapshot(move |sim, dot, _| sim.snapshot_dot(dot, per_tick))
        .on_tick(move |sim, dot| {
            sim.calc_and_deal_periodic_snapshot_damage(dot, tick_outcome);
        });

    sim.register_spell(
        warlock.unit,
        SpellConfig {
            school: SpellSchool::SHADOW,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::PURE_DOT | SpellFlags::RESET_ATTACK_SWING,
            cost: Cost::mana(0.15 * warlock.base_mana),
            cast: CastConfig::instant(),
            crit_damage_bonus: pandemic_crit_bonus(warlock),
            damage_multiplier_additive: 1.0 + warlock.shadow_mastery_bonus(),
            dot: Some(dot),
            ..SpellConfig::new("Unstable Affliction", ActionId::spell(427717))
        }
        .with_apply_effects(|sim, spell, target| {
            // Unstable Affliction and Immolate do not share a target
            if land_dot(sim, spell, target) {
                let caster = sim.spell(spell).caster;
                if let Some(dot) = destruction::active_immolate(sim, caster, target) {
                    sim.deactivate_dot(dot);
                }
            }
        }),
    );
}

fn register_life_tap(sim: &mut Simulation, warlock: &Warlock) {
    let Some(rank) = highest_rank(&LIFE_TAP_RANKS, warlock.level) else {
        return;
    };
    let base = rank.mana;
    let improved = 1.0 + 0.1 * f64::from(warlock.talents.improved_life_tap);

    sim.register_spell(
        warlock.unit,
        SpellConfig {
            school: SpellSchool::SHADOW,
            cast: CastConfig::instant(),
            ..SpellConfig::new("Life Tap", ActionId::spell(rank.spell_id))
        }
        .with_apply_effects(move |sim, spell, _| {
            let caster = sim.spell(spell).caster;
            let spell_power = sim.spell_power_for(spell);
            let multiplier = sim.spell(spell).config.damage_multiplier;
            let gain = (base + LIFE_TAP_COEFFICIENT * spell_power) * improved * multiplier;
            sim.unit_mut(caster).add_mana(gain, "Life Tap");
        }),
    );
}

fn register_haunt(sim: &mut Simulation, warlock: &Warlock) {
    let base = warlock.base_rune_damage();
    let (min, max) = (base * 2.51, base * 2.94);
    let debuff = warlock.auras.haunt;

    sim.register_spell(
        warlock.unit,
        SpellConfig {
            school: SpellSchool::SHADOW,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::RESET_ATTACK_SWING,
            cost: Cost::mana(0.12 * warlock.base_mana),
            cast: CastConfig::instant(),
            cooldown: Duration::from_secs(12),
            bonus_coefficient: 0.714,
            missile_speed: 20.0,
            ..SpellConfig::new("Haunt", ActionId::spell(403501))
        }
        .with_apply_effects(move |sim, spell, target| {
            let damage = sim.roll(min, max);
            let result = sim.calc_damage(spell, target, damage, OutcomeKind::MagicHitAndCrit);
            sim.wait_travel_time(spell, move |sim| {
                sim.deal_damage(&result);
                if !result.landed() {
                    return;
                }
                if let Some(debuff) = debuff.filter(|aura| sim.aura(*aura).unit == result.target) {
                    sim.activate_aura(debuff);
                }
            });
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{warlock_sim, with_runes, with_talents};
    use super::super::runes::HAUNT_PERIODIC_BONUS;
    use super::super::{WarlockConfig, WarlockTalents};
    use super::*;

    #[test]
    fn test_corruption_rank_and_cast_time() {
        let (sim, warlock) = warlock_sim(
            with_talents(WarlockTalents {
                improved_corruption: 5,
                ..Default::default()
            }),
            &[],
        );
        let corruption = sim.spell_by_label(warlock.unit, "Corruption").unwrap();
        assert_eq!(sim.spell(corruption).config.action_id, ActionId::spell(25311));
        assert!(sim.cast_time(corruption).is_zero());
    }

    #[test]
    fn test_corruption_tick_damage() {
        let (mut sim, warlock) = warlock_sim(WarlockConfig::default(), &[]);
        let target = sim.primary_target();
        let corruption = sim.spell_by_label(warlock.unit, "Corruption").unwrap();
        let dot = sim.dot_of(corruption, target).unwrap();
        sim.apply_dot(dot);
        assert!((sim.dot(dot).snapshot_base_damage - 137.0).abs() < 1e-9);

        sim.advance(Duration::from_millis(18_100));
        assert_eq!(sim.spell(corruption).metrics.ticks, 6);
        assert!(!sim.dot(dot).is_active());
    }

    #[test]
    fn test_curse_of_agony_ramps() {
        let (mut sim, warlock) = warlock_sim(WarlockConfig::default(), &[]);
        let target = sim.primary_target();
        let agony = sim.spell_by_label(warlock.unit, "Curse of Agony").unwrap();
        let dot = sim.dot_of(agony, target).unwrap();
        sim.apply_dot(dot);
        assert!((sim.dot(dot).snapshot_base_damage - 43.5).abs() < 1e-9);

        // After the fourth tick
        sim.advance(Duration::from_millis(8100));
        assert!((sim.dot(dot).snapshot_base_damage - 87.0).abs() < 1e-9);

        // After the eighth tick
        sim.advance(Duration::from_millis(16_100));
        assert!((sim.dot(dot).snapshot_base_damage - 130.5).abs() < 1e-9);
    }

    #[test]
    fn test_amplify_curse_is_consumed() {
        let (mut sim, warlock) = warlock_sim(
            with_talents(WarlockTalents {
                amplify_curse: true,
                ..Default::default()
            }),
            &[],
        );
        let target = sim.primary_target();
        let amplify = sim.spell_by_label(warlock.unit, "Amplify Curse").unwrap();
        sim.cast(amplify, target).unwrap();
        let aura = warlock.auras.amplify_curse.unwrap();
        assert!(sim.is_aura_active(aura));

        let agony = sim.spell_by_label(warlock.unit, "Curse of Agony").unwrap();
        let dot = sim.dot_of(agony, target).unwrap();
        sim.apply_dot(dot);
        assert!((sim.dot(dot).snapshot_base_damage - 87.0 * 0.5 * 1.5).abs() < 1e-9);
        assert!(!sim.is_aura_active(aura));
    }

    #[test]
    fn test_one_curse_per_target() {
        let (mut sim, warlock) = warlock_sim(WarlockConfig::default(), &[(Stat::SpellHit, 20.0)]);
        let target = sim.primary_target();
        let agony = sim.spell_by_label(warlock.unit, "Curse of Agony").unwrap();
        let doom = sim.spell_by_label(warlock.unit, "Curse of Doom").unwrap();
        let agony_dot = sim.dot_of(agony, target).unwrap();
        sim.apply_dot(agony_dot);

        sim.cast(doom, target).unwrap();
        assert!(sim.is_dot_active(doom, target));
        assert!(!sim.dot(agony_dot).is_active());
    }

    /// One Curse of Doom tick: (damage, crit ticks)
    fn doom_tick(config: WarlockConfig, crit: f64) -> (f64, u32) {
        let (mut sim, warlock) =
            warlock_sim(config, &[(Stat::SpellCrit, crit), (Stat::SpellPower, 500.0)]);
        let target = sim.primary_target();
        let doom = sim.spell_by_label(warlock.unit, "Curse of Doom").unwrap();
        let dot = sim.dot_of(doom, target).unwrap();
        sim.apply_dot(dot);
        assert!((sim.dot(dot).snapshot_base_damage - 3200.0).abs() < 1e-9);

        sim.advance(Duration::from_millis(60_100));
        let metrics = &sim.spell(doom).metrics;
        assert_eq!(metrics.ticks, 1);
        (metrics.damage, metrics.crit_ticks)
    }

    #[test]
    fn test_curse_of_doom_ignores_spell_power() {
        let (sim, warlock) = warlock_sim(WarlockConfig::default(), &[]);
        let doom = sim.spell_by_label(warlock.unit, "Curse of Doom").unwrap();
        let dot = sim.spell(doom).config.dot.as_ref().unwrap();
        assert_eq!(dot.bonus_coefficient, 0.0);
        assert_eq!((dot.num_ticks, dot.tick_length), (1, Duration::from_secs(60)));
    }

    #[test]
    fn test_curse_of_doom_crits_with_pandemic() {
        let pandemic = || with_runes(&[WarlockRune::Pandemic]);
        let (plain, plain_crits) = doom_tick(pandemic(), -100.0);
        let (crit, crit_ticks) = doom_tick(pandemic(), 200.0);
        assert_eq!((plain_crits, crit_ticks), (0, 1));
        assert!(plain > 0.0);
        assert!((crit / plain - 2.0).abs() < 1e-9, "ratio {}", crit / plain);
    }

    #[test]
    fn test_curse_of_doom_never_crits_without_pandemic() {
        let (damage, crit_ticks) = doom_tick(WarlockConfig::default(), 200.0);
        assert_eq!(crit_ticks, 0);
        assert!(damage > 0.0);
    }

    #[test]
    fn test_master_channeler_drain_life() {
        let (sim, warlock) = warlock_sim(with_runes(&[WarlockRune::MasterChanneler]), &[]);
        let drain = sim.spell(sim.spell_by_label(warlock.unit, "Drain Life").unwrap());
        assert!(!drain.has_flag(SpellFlags::CHANNELED));
        assert_eq!(drain.config.cooldown, Duration::from_secs(15));
        assert!((sim.spell_cost(drain.id) - 600.0).abs() < 1e-9);
        assert_eq!(drain.config.dot.as_ref().unwrap().num_ticks, 15);
    }

    #[test]
    fn test_drain_life_channels() {
        let (mut sim, warlock) = warlock_sim(WarlockConfig::default(), &[]);
        let target = sim.primary_target();
        let drain = sim.spell_by_label(warlock.unit, "Drain Life").unwrap();
        let dot = sim.dot_of(drain, target).unwrap();
        sim.apply_dot(dot);
        assert_eq!(sim.unit(warlock.unit).channeling, Some(dot));

        sim.advance(Duration::from_millis(5100));
        assert_eq!(sim.unit(warlock.unit).channeling, None);
    }

    #[test]
    fn test_life_tap_restores_mana() {
        let (mut sim, warlock) = warlock_sim(
            with_talents(WarlockTalents {
                improved_life_tap: 2,
                ..Default::default()
            }),
            &[(Stat::SpellPower, 100.0)],
        );
        let target = sim.primary_target();
        sim.unit_mut(warlock.unit).spend_mana(1000.0, Duration::ZERO);
        let before = sim.unit(warlock.unit).current_mana();

        let life_tap = sim.spell_by_label(warlock.unit, "Life Tap").unwrap();
        sim.cast(life_tap, target).unwrap();
        let gained = sim.unit(warlock.unit).current_mana() - before;
        assert!((gained - (424.0 + 68.0) * 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_drain_soul_channels() {
        let (mut sim, warlock) = warlock_sim(WarlockConfig::default(), &[]);
        let target = sim.primary_target();
        let drain = sim.spell_by_label(warlock.unit, "Drain Soul").unwrap();
        assert_eq!(sim.spell(drain).config.action_id, ActionId::spell(11675));
        assert!(sim.spell(drain).has_flag(SpellFlags::CHANNELED));

        let dot = sim.dot_of(drain, target).unwrap();
        sim.apply_dot(dot);
        assert!((sim.dot(dot).snapshot_base_damage - 91.0).abs() < 1e-9);
        assert_eq!(sim.unit(warlock.unit).channeling, Some(dot));

        sim.advance(Duration::from_millis(15_100));
        assert_eq!(sim.spell(drain).metrics.ticks, 5);
        assert_eq!(sim.unit(warlock.unit).channeling, None);
    }

    #[test]
    fn test_siphon_life_needs_talent() {
        let (sim, warlock) = warlock_sim(WarlockConfig::default(), &[]);
        assert!(sim.spell_by_label(warlock.unit, "Siphon Life").is_none());

        let (sim, warlock) = warlock_sim(
            with_talents(WarlockTalents {
                siphon_life: true,
                shadow_mastery: 5,
                ..Default::default()
            }),
            &[],
        );
        let siphon = sim.spell(sim.spell_by_label(warlock.unit, "Siphon Life").unwrap());
        assert_eq!(siphon.config.action_id, ActionId::spell(18881));
        assert!(siphon.has_flag(SpellFlags::BINARY));
        assert!((sim.spell_cost(siphon.id) - 365.0).abs() < 1e-9);
        assert_eq!(siphon.config.dot.as_ref().unwrap().num_ticks, 10);
    }

    /// First Siphon Life tick, with Haunt going up before or after it lands
    fn siphon_life_tick(haunt_first: bool, haunt_after: bool) -> f64 {
        let config = WarlockConfig {
            talents: WarlockTalents {
                siphon_life: true,
                ..Default::default()
            },
            runes: vec![WarlockRune::Haunt],
            ..Default::default()
        };
        let (mut sim, warlock) = warlock_sim(config, &[]);
        let target = sim.primary_target();
        let haunt = warlock.auras.haunt.unwrap();
        let siphon = sim.spell_by_label(warlock.unit, "Siphon Life").unwrap();
        let dot = sim.dot_of(siphon, target).unwrap();

        if haunt_first {
            sim.activate_aura(haunt);
        }
        sim.apply_dot(dot);
        if haunt_after {
            sim.activate_aura(haunt);
        }
        sim.advance(Duration::from_millis(3100));
        assert_eq!(sim.spell(siphon).metrics.ticks, 1);
        sim.spell(siphon).metrics.damage
    }

    #[test]
    fn test_siphon_life_locks_target_modifiers() {
        let plain = siphon_life_tick(false, false);
        assert!(plain > 0.0);
        assert!((siphon_life_tick(false, true) - plain).abs() < 1e-9);
        let haunted = siphon_life_tick(true, false);
        assert!((haunted / plain - HAUNT_PERIODIC_BONUS).abs() < 1e-9);
    }

    #[test]
    fn test_unstable_affliction_rune() {
        let (sim, warlock) = warlock_sim(WarlockConfig::default(), &[]);
        assert!(sim.spell_by_label(warlock.unit, "Unstable Affliction").is_none());

        let (mut sim, warlock) =
            warlock_sim(with_runes(&[WarlockRune::UnstableAffliction]), &[]);
        let target = sim.primary_target();
        let ua = sim.spell_by_label(warlock.unit, "Unstable Affliction").unwrap();
        assert!((sim.spell_cost(ua) - 0.15 * 1093.0).abs() < 1e-6);

        let dot = sim.dot_of(ua, target).unwrap();
        sim.apply_dot(dot);
        // 0.6 of the level 60 rune base
        let expected = 0.6 * warlock.base_rune_damage();
        assert!((sim.dot(dot).snapshot_base_damage - expected).abs() < 1e-9);

        sim.advance(Duration::from_millis(15_100));
        assert_eq!(sim.spell(ua).metrics.ticks, 5);
    }

    #[test]
    fn test_unstable_affliction_removes_immolate() {
        let (mut sim, warlock) = warlock_sim(
            with_runes(&[WarlockRune::UnstableAffliction]),
            &[(Stat::SpellHit, 20.0)],
        );
        let target = sim.primary_target();
        let immolate = sim.spell_by_label(warlock.unit, "Immolate").unwrap();
        let immolate_dot = sim.dot_of(immolate, target).unwrap();
        sim.apply_dot(immolate_dot);

        let ua = sim.spell_by_label(warlock.unit, "Unstable Affliction").unwrap();
        sim.cast(ua, target).unwrap();
        assert!(sim.is_dot_active(ua, target));
        assert!(!sim.dot(immolate_dot).is_active());
    }

    #[test]
    fn test_unstable_affliction_crits_with_pandemic() {
        let (mut sim, warlock) = warlock_sim(
            with_runes(&[WarlockRune::UnstableAffliction, WarlockRune::Pandemic]),
            &[(Stat::SpellCrit, 200.0)],
        );
        let target = sim.primary_target();
        let ua = sim.spell_by_label(warlock.unit, "Unstable Affliction").unwrap();
        assert!((sim.spell_crit_multiplier(ua) - 2.0).abs() < 1e-9);

        let dot = sim.dot_of(ua, target).unwrap();
        sim.apply_dot(dot);
        sim.advance(Duration::from_millis(15_100));
        assert_eq!(sim.spell(ua).metrics.crit_ticks, 5);
    }

    #[test]
    fn test_haunt_cost_and_cooldown() {
        let (sim, warlock) = warlock_sim(with_runes(&[WarlockRune::Haunt]), &[]);
        let haunt = sim.spell(sim.spell_by_label(warlock.unit, "Haunt").unwrap());
        assert_eq!(haunt.config.cooldown, Duration::from_secs(12));
        assert!((sim.spell_cost(haunt.id) - 0.12 * 1093.0).abs() < 1e-6);
    }
}
