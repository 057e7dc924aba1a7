//! Balance spells - Wrath, Starfire, Moonfire, Insect Swarm, Starsurge, Sunfire
//!
//! Each ranked spell is registered once, at the highest rank the druid
//! knows, under its plain name so rotations can refer to it by label.

use super::forms::Form;
use super::runes::DruidRune;
use super::Druid;
use crate::common::{highest_rank, Ranked};
use sod_core::prelude::*;
use std::time::Duration;

struct DirectRank {
    spell_id: u32,
    min: f64,
    max: f64,
    coefficient: f64,
    mana: f64,
    cast_ms: u64,
    level: u32,
}

impl Ranked for DirectRank {
    fn required_level(&self) -> u32 {
        self.level
    }
}

const fn direct(
    spell_id: u32,
    min: f64,
    max: f64,
    coefficient: f64,
    mana: f64,
    cast_ms: u64,
    level: u32,
) -> DirectRank {
    DirectRank {
        spell_id,
        min,
        max,
        coefficient,
        mana,
        cast_ms,
        level,
    }
}

const WRATH_RANKS: [DirectRank; 8] = [
    direct(5176, 13.0, 16.0, 0.123, 20.0, 1500, 1),
    direct(5177, 28.0, 33.0, 0.231, 35.0, 1700, 6),
    direct(5178, 48.0, 57.0, 0.443, 55.0, 2000, 14),
    direct(5179, 69.0, 79.0, 0.571, 70.0, 2000, 22),
    direct(5180, 108.0, 123.0, 0.571, 100.0, 2000, 30),
    direct(6780, 148.0, 167.0, 0.571, 125.0, 2000, 38),
    direct(8905, 198.0, 221.0, 0.571, 155.0, 2000, 46),
    direct(9912, 248.0, 277.0, 0.571, 180.0, 2000, 54),
];

const STARFIRE_RANKS: [DirectRank; 7] = [
    direct(2912, 95.0, 115.0, 1.0, 95.0, 3500, 20),
    direct(8949, 146.0, 177.0, 1.0, 135.0, 3500, 26),
    direct(8950, 212.0, 253.0, 1.0, 180.0, 3500, 34),
    direct(8951, 293.0, 348.0, 1.0, 230.0, 3500, 42),
    direct(9875, 378.0, 445.0, 1.0, 275.0, 3500, 50),
    direct(9876, 451.0, 531.0, 1.0, 315.0, 3500, 58),
    direct(25298, 496.0, 584.0, 1.0, 340.0, 3500, 60),
];

struct MoonfireRank {
    spell_id: u32,
    min: f64,
    max: f64,
    coefficient: f64,
    dot_total: f64,
    dot_coefficient: f64,
    mana: f64,
    level: u32,
}

impl Ranked for MoonfireRank {
    fn required_level(&self) -> u32 {
        self.level
    }
}

const fn moonfire(
    spell_id: u32,
    min: f64,
    max: f64,
    coefficient: f64,
    dot_total: f64,
    dot_coefficient: f64,
    mana: f64,
    level: u32,
) -> MoonfireRank {
    MoonfireRank {
        spell_id,
        min,
        max,
        coefficient,
        dot_total,
        dot_coefficient,
        mana,
        level,
    }
}

const MOONFIRE_RANKS: [MoonfireRank; 10] = [
    moonfire(8921, 9.0, 12.0, 0.06, 12.0, 0.052, 25.0, 4),
    moonfire(8924, 17.0, 21.0, 0.094, 32.0, 0.081, 50.0, 10),
    moonfire(8925, 30.0, 37.0, 0.128, 52.0, 0.111, 75.0, 16),
    moonfire(8926, 44.0, 53.0, 0.15, 80.0, 0.13, 105.0, 22),
    moonfire(8927, 70.0, 82.0, 0.15, 124.0, 0.13, 150.0, 28),
    moonfire(8928, 91.0, 108.0, 0.15, 164.0, 0.13, 190.0, 34),
    moonfire(8929, 117.0, 137.0, 0.15, 212.0, 0.13, 235.0, 40),
    moonfire(9833, 143.0, 168.0, 0.15, 264.0, 0.13, 280.0, 46),
    moonfire(9834, 172.0, 200.0, 0.15, 320.0, 0.13, 325.0, 52),
    moonfire(9835, 195.0, 228.0, 0.15, 384.0, 0.13, 375.0, 58),
];

struct InsectSwarmRank {
    spell_id: u32,
    total: f64,
    mana: f64,
    level: u32,
}

impl Ranked for InsectSwarmRank {
    fn required_level(&self) -> u32 {
        self.level
    }
}

const INSECT_SWARM_RANKS: [InsectSwarmRank; 5] = [
    InsectSwarmRank { spell_id: 5570, total: 66.0, mana: 45.0, level: 20 },
    InsectSwarmRank { spell_id: 24974, total: 138.0, mana: 85.0, level: 30 },
    InsectSwarmRank { spell_id: 24975, total: 174.0, mana: 100.0, level: 40 },
    InsectSwarmRank { spell_id: 24976, total: 264.0, mana: 140.0, level: 50 },
    InsectSwarmRank { spell_id: 24977, total: 324.0, mana: 160.0, level: 60 },
];

const INSECT_SWARM_TICKS: u32 = 6;
const INSECT_SWARM_COEFFICIENT: f64 = 0.158;

const MOONFIRE_TICK_LENGTH: Duration = Duration::from_secs(3);

/// Outcome for balance dot ticks: only Moonkin Form lets them crit
fn balance_tick_outcome(sim: &Simulation, forms: super::FormAuras) -> OutcomeKind {
    if forms.in_form(sim, Form::MOONKIN) {
        OutcomeKind::SnapshotCrit
    } else {
        OutcomeKind::Tick
    }
}

impl Druid {
    /// Improved Moonfire: multiplier on Moonfire and Sunfire direct damage
    pub fn improved_moonfire_multiplier(&self) -> f64 {
        1.0 + 0.02 * f64::from(self.talents.improved_moonfire)
    }

    /// Improved Moonfire: crit chance in percent for Moonfire and Sunfire
    pub fn improved_moonfire_crit_bonus(&self) -> f64 {
        2.0 * f64::from(self.talents.improved_moonfire)
    }
}

pub(crate) fn register_balance_spells(sim: &mut Simulation, druid: &Druid) {
    let forms = Form::HUMANOID | Form::MOONKIN;

    register_wrath(sim, druid, forms);
    register_starfire(sim, druid, forms);
    register_moonfire(sim, druid, forms);
    if druid.talents.insect_swarm {
        register_insect_swarm(sim, druid, forms);
    }
    if druid.has_rune(DruidRune::Starsurge) {
        register_starsurge(sim, druid, forms);
    }
    if druid.has_rune(DruidRune::Sunfire) {
        register_sunfire(sim, druid, forms);
    }
}

fn register_wrath(sim: &mut Simulation, druid: &Druid, forms: Form) {
    let Some(rank) = highest_rank(&WRATH_RANKS, druid.level) else {
        return;
    };
    let (min, max) = (rank.min, rank.max);
    let moonfury = druid.moonfury_multiplier();
    let natures_grace = druid.auras.natures_grace;
    let cast_time = Duration::from_millis(rank.cast_ms)
        .saturating_sub(Duration::from_millis(100 * u64::from(druid.talents.improved_wrath)));

    druid.register_spell(
        sim,
        forms,
        SpellConfig {
            school: SpellSchool::NATURE,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::RESET_ATTACK_SWING,
            cost: Cost::mana(rank.mana),
            cast: CastConfig::with_cast_time(cast_time),
            crit_damage_bonus: druid.vengeance_crit_bonus(),
            bonus_coefficient: rank.coefficient,
            missile_speed: 20.0,
            ..SpellConfig::new("Wrath", ActionId::spell(rank.spell_id))
        }
        .with_apply_effects(move |sim, spell, target| {
            let base = sim.roll(min, max) * moonfury;
            let result = sim.calc_damage(spell, target, base, OutcomeKind::MagicHitAndCrit);
            // Nature's Grace procs as the bolt leaves, not when it lands
            if result.did_crit() {
                if let Some(aura) = natures_grace {
                    sim.activate_aura(aura);
                }
            }
            sim.wait_travel_time(spell, move |sim| sim.deal_damage(&result));
        }),
    );
}

fn register_starfire(sim: &mut Simulation, druid: &Druid, forms: Form) {
    let Some(rank) = highest_rank(&STARFIRE_RANKS, druid.level) else {
        return;
    };
    let (min, max) = (rank.min, rank.max);
    let moonfury = druid.moonfury_multiplier();
    let cast_time = Duration::from_millis(rank.cast_ms)
        .saturating_sub(Duration::from_millis(100 * u64::from(druid.talents.improved_starfire)));

    druid.register_spell(
        sim,
        forms,
        SpellConfig {
            school: SpellSchool::ARCANE,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::RESET_ATTACK_SWING,
            cost: druid.moonglow_cost(rank.mana),
            cast: CastConfig::with_cast_time(cast_time),
            crit_damage_bonus: druid.vengeance_crit_bonus(),
            bonus_coefficient: rank.coefficient,
            ..SpellConfig::new("Starfire", ActionId::spell(rank.spell_id))
        }
        .with_apply_effects(move |sim, spell, target| {
            let base = sim.roll(min, max) * moonfury;
            sim.calc_and_deal_damage(spell, target, base, OutcomeKind::MagicHitAndCrit);
        }),
    );
}

fn register_moonfire(sim: &mut Simulation, druid: &Druid, forms: Form) {
    let Some(rank) = highest_rank(&MOONFIRE_RANKS, druid.level) else {
        return;
    };
    let (min, max) = (rank.min, rank.max);
    let moonfury = druid.moonfury_multiplier();
    let direct_multiplier = moonfury * druid.improved_moonfire_multiplier();
    let ticks = if rank.spell_id == MOONFIRE_RANKS[0].spell_id { 3 } else { 4 };
    let per_tick = rank.dot_total / f64::from(ticks) * moonfury;
    let auras = druid.forms;

    let dot = DotConfig::new("Moonfire", ticks, MOONFIRE_TICK_LENGTH)
        .with_coefficient(rank.dot_coefficient)
        .on_snapshot(move |sim, dot, _| sim.snapshot_dot(dot, per_tick))
        .on_tick(move |sim, dot| {
            let outcome = balance_tick_outcome(sim, auras);
            sim.calc_and_deal_periodic_snapshot_damage(dot, outcome);
        });

    druid.register_spell(
        sim,
        forms,
        SpellConfig {
            school: SpellSchool::ARCANE,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::RESET_ATTACK_SWING,
            cost: druid.moonglow_cost(rank.mana),
            cast: CastConfig::instant(),
            bonus_crit: druid.improved_moonfire_crit_bonus(),
            crit_damage_bonus: druid.vengeance_crit_bonus(),
            bonus_coefficient: rank.coefficient,
            dot: Some(dot),
            ..SpellConfig::new("Moonfire", ActionId::spell(rank.spell_id))
        }
        .with_apply_effects(move |sim, spell, target| {
            let base = sim.roll(min, max) * direct_multiplier;
            let result = sim.calc_and_deal_damage(spell, target, base, OutcomeKind::MagicHitAndCrit);
            if result.landed() {
                if let Some(dot) = sim.dot_of(spell, target) {
                    sim.apply_dot(dot);
                }
            }
        }),
    );
}

fn register_insect_swarm(sim: &mut Simulation, druid: &Druid, forms: Form) {
    let Some(rank) = highest_rank(&INSECT_SWARM_RANKS, druid.level) else {
        return;
    };
    let per_tick = rank.total / f64::from(INSECT_SWARM_TICKS);
    let auras = druid.forms;

    let dot = DotConfig::new("Insect Swarm", INSECT_SWARM_TICKS, Duration::from_secs(2))
        .with_coefficient(INSECT_SWARM_COEFFICIENT)
        .on_snapshot(move |sim, dot, _| sim.snapshot_dot(dot, per_tick))
        .on_tick(move |sim, dot| {
            let outcome = balance_tick_outcome(sim, auras);
            sim.calc_and_deal_periodic_snapshot_damage(dot, outcome);
        });

    druid.register_spell(
        sim,
        forms,
        SpellConfig {
            school: SpellSchool::NATURE,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::OMEN,
            cost: Cost::mana(rank.mana),
            cast: CastConfig::instant(),
            dot: Some(dot),
            ..SpellConfig::new("Insect Swarm", ActionId::spell(rank.spell_id))
        }
        .with_apply_effects(|sim, spell, target| {
            let result = sim.calc_outcome(spell, target, OutcomeKind::MagicHit);
            if result.landed() {
                if let Some(dot) = sim.dot_of(spell, target) {
                    sim.apply_dot(dot);
                }
            }
            sim.deal_damage(&result);
        }),
    );
}

fn register_starsurge(sim: &mut Simulation, druid: &Druid, forms: Form) {
    let base = druid.base_rune_damage();
    let (min, max) = (base * 2.48, base * 3.04);
    let natures_grace = druid.auras.natures_grace;
    let buff = druid.auras.starsurge;

    druid.register_spell(
        sim,
        forms,
        SpellConfig {
            school: SpellSchool::ARCANE,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::BINARY | SpellFlags::OMEN | SpellFlags::RESET_ATTACK_SWING,
            cost: druid.moonglow_cost(0.01 * druid.base_mana),
            cast: CastConfig::instant(),
            cooldown: Duration::from_secs(6),
            bonus_coefficient: 0.429,
            missile_speed: 24.0,
            ..SpellConfig::new("Starsurge", ActionId::spell(417157))
        }
        .with_apply_effects(move |sim, spell, target| {
            let damage = sim.roll(min, max);
            let result = sim.calc_damage(spell, target, damage, OutcomeKind::MagicHitAndCrit);
            if result.did_crit() {
                if let Some(aura) = natures_grace {
                    sim.activate_aura(aura);
                }
            }
            if let Some(buff) = buff {
                sim.activate_aura(buff);
                sim.set_stacks(buff, 1);
            }
            sim.wait_travel_time(spell, move |sim| sim.deal_damage(&result));
        }),
    );
}

fn register_sunfire(sim: &mut Simulation, druid: &Druid, forms: Form) {
    let base = druid.base_rune_damage();
    let moonfury = druid.moonfury_multiplier();
    let direct_multiplier = moonfury * druid.improved_moonfire_multiplier();
    let (min, max) = (base * 1.3, base * 1.52);
    let per_tick = base * 0.65 * moonfury;
    let auras = druid.forms;

    let dot = DotConfig::new("Sunfire", 4, MOONFIRE_TICK_LENGTH)
        .with_coefficient(0.13)
        .on_snapshot(move |sim, dot, _| sim.snapshot_dot(dot, per_tick))
        .on_tick(move |sim, dot| {
            let outcome = balance_tick_outcome(sim, auras);
            sim.calc_and_deal_periodic_snapshot_damage(dot, outcome);
        });

    druid.register_spell(
        sim,
        forms,
        SpellConfig {
            school: SpellSchool::NATURE,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::RESET_ATTACK_SWING,
            cost: Cost::mana(0.21 * druid.base_mana),
            cast: CastConfig::instant(),
            bonus_crit: druid.improved_moonfire_crit_bonus(),
            crit_damage_bonus: druid.vengeance_crit_bonus(),
            bonus_coefficient: 0.15,
            dot: Some(dot),
            ..SpellConfig::new("Sunfire", ActionId::spell(414684))
        }
        .with_apply_effects(move |sim, spell, target| {
            let damage = sim.roll(min, max) * direct_multiplier;
            let result = sim.calc_and_deal_damage(spell, target, damage, OutcomeKind::MagicHitAndCrit);
            if result.landed() {
                if let Some(dot) = sim.dot_of(spell, target) {
                    sim.apply_dot(dot);
                }
            }
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::super::test_support::druid_sim;
    use super::super::{DruidConfig, DruidTalents};
    use super::*;

    #[test]
    fn test_highest_rank_by_level() {
        assert_eq!(highest_rank(&WRATH_RANKS, 60).unwrap().spell_id, 9912);
        assert_eq!(highest_rank(&WRATH_RANKS, 25).unwrap().spell_id, 5179);
        assert_eq!(highest_rank(&STARFIRE_RANKS, 59).unwrap().spell_id, 9876);
        assert!(highest_rank(&STARFIRE_RANKS, 19).is_none());
        assert_eq!(highest_rank(&MOONFIRE_RANKS, 60).unwrap().spell_id, 9835);
    }

    #[test]
    fn test_registered_rank_and_talented_cast_times() {
        let config = DruidConfig {
            talents: DruidTalents {
                improved_wrath: 5,
                improved_starfire: 5,
                ..Default::default()
            },
            ..Default::default()
        };
        let (sim, druid) = druid_sim(config, &[]);
        let wrath = sim.spell_by_label(druid.unit, "Wrath").unwrap();
        let starfire = sim.spell_by_label(druid.unit, "Starfire").unwrap();
        assert_eq!(sim.spell(wrath).config.action_id, ActionId::spell(9912));
        assert_eq!(sim.cast_time(wrath), Duration::from_millis(1500));
        assert_eq!(sim.cast_time(starfire), Duration::from_millis(3000));
    }

    #[test]
    fn test_wrath_damage_arrives_after_travel() {
        let (mut sim, druid) = druid_sim(DruidConfig::default(), &[(Stat::SpellHit, 20.0)]);
        let wrath = sim.spell_by_label(druid.unit, "Wrath").unwrap();
        let target = sim.primary_target();

        sim.cast(wrath, target).unwrap();
        sim.advance(Duration::from_secs(3));
        let metrics = &sim.spell(wrath).metrics;
        assert_eq!(metrics.casts, 1);
        assert_eq!(metrics.hits + metrics.misses, 0);

        sim.advance(Duration::from_secs(4));
        let metrics = &sim.spell(wrath).metrics;
        assert_eq!(metrics.hits + metrics.misses, 1);
    }

    #[test]
    fn test_moonfire_applies_dot_on_hit() {
        let (mut sim, druid) = druid_sim(DruidConfig::default(), &[(Stat::SpellHit, 20.0)]);
        let moonfire = sim.spell_by_label(druid.unit, "Moonfire").unwrap();
        let target = sim.primary_target();

        sim.cast(moonfire, target).unwrap();
        assert_eq!(sim.spell(moonfire).metrics.hits, 1);
        assert!(sim.is_dot_active(moonfire, target));
        sim.advance(Duration::from_secs(13));
        assert_eq!(sim.spell(moonfire).metrics.ticks, 4);
        assert!(!sim.is_dot_active(moonfire, target));
    }

    #[test]
    fn test_moonfire_ticks_do_not_crit_outside_moonkin() {
        let (mut sim, druid) = druid_sim(
            DruidConfig::default(),
            &[(Stat::SpellHit, 20.0), (Stat::SpellCrit, 100.0)],
        );
        let moonfire = sim.spell_by_label(druid.unit, "Moonfire").unwrap();
        let target = sim.primary_target();
        sim.cast(moonfire, target).unwrap();
        sim.advance(Duration::from_secs(13));
        assert_eq!(sim.spell(moonfire).metrics.crit_ticks, 0);
    }

    #[test]
    fn test_insect_swarm_needs_talent() {
        let (sim, druid) = druid_sim(DruidConfig::default(), &[]);
        assert!(sim.spell_by_label(druid.unit, "Insect Swarm").is_none());

        let config = DruidConfig {
            talents: DruidTalents {
                insect_swarm: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let (sim, druid) = druid_sim(config, &[]);
        let swarm = sim.spell_by_label(druid.unit, "Insect Swarm").unwrap();
        assert!(sim.spell(swarm).has_flag(SpellFlags::OMEN));
    }

    #[test]
    fn test_starsurge_buffs_next_starfire() {
        let config = DruidConfig {
            runes: vec![DruidRune::Starsurge],
            ..Default::default()
        };
        let (mut sim, druid) = druid_sim(config, &[]);
        let starsurge = sim.spell_by_label(druid.unit, "Starsurge").unwrap();
        let starfire = sim.spell_by_label(druid.unit, "Starfire").unwrap();
        let buff = druid.auras.starsurge.unwrap();
        let target = sim.primary_target();

        sim.cast(starsurge, target).unwrap();
        assert!(sim.is_aura_active(buff));
        assert_eq!(sim.cast_blocker(starsurge, target), Some("global cooldown"));

        sim.advance(Duration::from_secs(2));
        assert_eq!(sim.cast_blocker(starsurge, target), Some("on cooldown"));
        sim.cast(starfire, target).unwrap();
        sim.advance(Duration::from_secs(6));
        assert!(!sim.is_aura_active(buff));
    }

    fn starfire_damage(with_starsurge: bool) -> f64 {
        let config = DruidConfig {
            runes: vec![DruidRune::Starsurge],
            ..Default::default()
        };
        let (mut sim, druid) =
            druid_sim(config, &[(Stat::SpellHit, 20.0), (Stat::SpellCrit, -100.0)]);
        let starfire = sim.spell_by_label(druid.unit, "Starfire").unwrap();
        let target = sim.primary_target();
        if with_starsurge {
            sim.activate_aura(druid.auras.starsurge.unwrap());
        }

        sim.cast(starfire, target).unwrap();
        sim.advance(Duration::from_secs(4));
        let metrics = &sim.spell(starfire).metrics;
        assert_eq!((metrics.hits, metrics.crits), (1, 0));
        metrics.damage
    }

    #[test]
    fn test_starsurge_adds_eighty_percent_starfire_damage() {
        let plain = starfire_damage(false);
        let buffed = starfire_damage(true);
        assert!(plain > 0.0);
        assert!((buffed / plain - 1.8).abs() < 1e-9, "ratio {}", buffed / plain);
    }

    #[test]
    fn test_starsurge_bonus_fades_with_buff() {
        let config = DruidConfig {
            runes: vec![DruidRune::Starsurge],
            ..Default::default()
        };
        let (mut sim, druid) = druid_sim(config, &[]);
        let starfire = sim.spell_by_label(druid.unit, "Starfire").unwrap();
        let buff = druid.auras.starsurge.unwrap();

        sim.activate_aura(buff);
        assert!((sim.spell(starfire).config.damage_multiplier_additive - 1.8).abs() < 1e-9);
        sim.advance(Duration::from_secs(16));
        assert!(!sim.is_aura_active(buff));
        assert!((sim.spell(starfire).config.damage_multiplier_additive - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sunfire_cost_scales_with_base_mana() {
        let config = DruidConfig {
            runes: vec![DruidRune::Sunfire],
            ..Default::default()
        };
        let (sim, druid) = druid_sim(config, &[]);
        let sunfire = sim.spell_by_label(druid.unit, "Sunfire").unwrap();
        assert!((sim.spell_cost(sunfire) - 0.21 * 1244.0).abs() < 1e-6);
        assert!(sim.spell(sunfire).config.dot.is_some());
    }
}
