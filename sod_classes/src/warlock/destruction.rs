//! Destruction spells - Shadow Bolt, Immolate, Conflagrate, Incinerate, Shadowflame
//!
//! Like the druid spells, each ranked spell is registered once at the
//! highest rank the warlock knows.

use super::runes::WarlockRune;
use super::Warlock;
use crate::common::{highest_rank, Ranked};
use sod_core::prelude::*;
use std::time::Duration;

struct ShadowBoltRank {
    spell_id: u32,
    min: f64,
    max: f64,
    coefficient: f64,
    mana: f64,
    cast_ms: u64,
    level: u32,
}

impl Ranked for ShadowBoltRank {
    fn required_level(&self) -> u32 {
        self.level
    }
}

const fn bolt(
    spell_id: u32,
    min: f64,
    max: f64,
    coefficient: f64,
    mana: f64,
    cast_ms: u64,
    level: u32,
) -> ShadowBoltRank {
    ShadowBoltRank {
        spell_id,
        min,
        max,
        coefficient,
        mana,
        cast_ms,
        level,
    }
}

const SHADOW_BOLT_RANKS: [ShadowBoltRank; 9] = [
    bolt(686, 13.0, 18.0, 0.14, 25.0, 1700, 1),
    bolt(695, 26.0, 32.0, 0.299, 40.0, 2200, 6),
    bolt(705, 52.0, 61.0, 0.56, 70.0, 2800, 12),
    bolt(1088, 92.0, 104.0, 0.857, 110.0, 3000, 20),
    bolt(1106, 150.0, 170.0, 0.857, 160.0, 3000, 28),
    bolt(7641, 213.0, 240.0, 0.857, 210.0, 3000, 36),
    bolt(11659, 292.0, 327.0, 0.857, 265.0, 3000, 44),
    bolt(11660, 373.0, 415.0, 0.857, 315.0, 3000, 52),
    bolt(11661, 455.0, 507.0, 0.857, 370.0, 3000, 60),
];

struct ImmolateRank {
    spell_id: u32,
    base: f64,
    coefficient: f64,
    dot_total: f64,
    dot_coefficient: f64,
    mana: f64,
    level: u32,
}

impl Ranked for ImmolateRank {
    fn required_level(&self) -> u32 {
        self.level
    }
}

const IMMOLATE_RANKS: [ImmolateRank; 8] = [
    ImmolateRank { spell_id: 348, base: 11.0, coefficient: 0.058, dot_total: 20.0, dot_coefficient: 0.037, mana: 25.0, level: 1 },
    ImmolateRank { spell_id: 707, base: 24.0, coefficient: 0.125, dot_total: 40.0, dot_coefficient: 0.081, mana: 45.0, level: 10 },
    ImmolateRank { spell_id: 1094, base: 53.0, coefficient: 0.2, dot_total: 90.0, dot_coefficient: 0.13, mana: 90.0, level: 20 },
    ImmolateRank { spell_id: 2941, base: 101.0, coefficient: 0.2, dot_total: 165.0, dot_coefficient: 0.13, mana: 155.0, level: 30 },
    ImmolateRank { spell_id: 11665, base: 148.0, coefficient: 0.2, dot_total: 255.0, dot_coefficient: 0.13, mana: 220.0, level: 40 },
    ImmolateRank { spell_id: 11667, base: 208.0, coefficient: 0.2, dot_total: 365.0, dot_coefficient: 0.13, mana: 295.0, level: 50 },
    ImmolateRank { spell_id: 11668, base: 258.0, coefficient: 0.2, dot_total: 485.0, dot_coefficient: 0.13, mana: 370.0, level: 60 },
    ImmolateRank { spell_id: 25309, base: 279.0, coefficient: 0.2, dot_total: 510.0, dot_coefficient: 0.13, mana: 380.0, level: 60 },
];

const IMMOLATE_TICKS: u32 = 5;
const IMMOLATE_TICK_LENGTH: Duration = Duration::from_secs(3);

struct ConflagrateRank {
    spell_id: u32,
    min: f64,
    max: f64,
    mana: f64,
    level: u32,
}

impl Ranked for ConflagrateRank {
    fn required_level(&self) -> u32 {
        self.level
    }
}

const CONFLAGRATE_RANKS: [ConflagrateRank; 4] = [
    ConflagrateRank { spell_id: 17962, min: 249.0, max: 316.0, mana: 165.0, level: 40 },
    ConflagrateRank { spell_id: 18930, min: 319.0, max: 400.0, mana: 200.0, level: 48 },
    ConflagrateRank { spell_id: 18931, min: 395.0, max: 491.0, mana: 230.0, level: 54 },
    ConflagrateRank { spell_id: 18932, min: 447.0, max: 557.0, mana: 255.0, level: 60 },
];

/// Pandemic's extra crit damage on dot ticks
pub(crate) const PANDEMIC_CRIT_BONUS: f64 = 1.0;

// Shadowflame: shadow hit plus a fire dot, both scaled off the rune base damage
const SHADOWFLAME_DIRECT_SCALE: f64 = 0.64;
const SHADOWFLAME_DIRECT_COEFFICIENT: f64 = 0.715;
const SHADOWFLAME_TICK_SCALE: f64 = 0.24;
const SHADOWFLAME_TICK_COEFFICIENT: f64 = 0.022;

pub(crate) fn register_destruction_spells(sim: &mut Simulation, warlock: &Warlock) {
    register_shadow_bolt(sim, warlock);
    register_immolate(sim, warlock);
    if warlock.talents.conflagrate {
        register_conflagrate(sim, warlock);
    }
    if warlock.has_rune(WarlockRune::Incinerate) {
        register_incinerate(sim, warlock);
    }
    if warlock.has_rune(WarlockRune::Shadowflame) {
        register_shadowflame(sim, warlock);
    }
}

fn register_shadow_bolt(sim: &mut Simulation, warlock: &Warlock) {
    let Some(rank) = highest_rank(&SHADOW_BOLT_RANKS, warlock.level) else {
        return;
    };
    let (min, max) = (rank.min, rank.max);

    sim.register_spell(
        warlock.unit,
        SpellConfig {
            school: SpellSchool::SHADOW,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::RESET_ATTACK_SWING,
            cost: Cost::mana(rank.mana),
            cast: CastConfig::with_cast_time(Duration::from_millis(rank.cast_ms)),
            bonus_coefficient: rank.coefficient,
            missile_speed: 20.0,
            ..SpellConfig::new("Shadow Bolt", ActionId::spell(rank.spell_id))
        }
        .with_apply_effects(move |sim, spell, target| {
            let base = sim.roll(min, max);
            let result = sim.calc_damage(spell, target, base, OutcomeKind::MagicHitAndCrit);
            sim.wait_travel_time(spell, move |sim| sim.deal_damage(&result));
        }),
    );
}

fn register_immolate(sim: &mut Simulation, warlock: &Warlock) {
    let Some(rank) = highest_rank(&IMMOLATE_RANKS, warlock.level) else {
        return;
    };
    let direct = rank.base * (1.0 + warlock.improved_immolate_bonus());
    let per_tick = rank.dot_total / f64::from(IMMOLATE_TICKS);
    let tick_outcome = warlock.pandemic_tick_outcome();
    let pandemic = warlock.has_rune(WarlockRune::Pandemic);
    let unstable_affliction = warlock.has_rune(WarlockRune::UnstableAffliction);

    let dot = DotConfig::new("Immolate", IMMOLATE_TICKS, IMMOLATE_TICK_LENGTH)
        .with_coefficient(rank.dot_coefficient)
        .on_snapshot(move |sim, dot, _| sim.snapshot_dot(dot, per_tick))
        .on_tick(move |sim, dot| {
            // The direct hit keeps the normal crit bonus; only ticks get Pandemic's
            let spell = sim.dot(dot).spell;
            if pandemic {
                sim.spell_mut(spell).config.crit_damage_bonus += PANDEMIC_CRIT_BONUS;
            }
            sim.calc_and_deal_periodic_snapshot_damage(dot, tick_outcome);
            if pandemic {
                sim.spell_mut(spell).config.crit_damage_bonus -= PANDEMIC_CRIT_BONUS;
            }
        });

    sim.register_spell(
        warlock.unit,
        SpellConfig {
            school: SpellSchool::FIRE,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::BINARY | SpellFlags::RESET_ATTACK_SWING,
            cost: Cost::mana(rank.mana),
            cast: CastConfig::with_cast_time(Duration::from_secs(2)),
            bonus_coefficient: rank.coefficient,
            dot: Some(dot),
            ..SpellConfig::new("Immolate", ActionId::spell(rank.spell_id))
        }
        .with_apply_effects(move |sim, spell, target| {
            let result = sim.calc_and_deal_damage(spell, target, direct, OutcomeKind::MagicHitAndCrit);
            if !result.landed() {
                return;
            }
            if unstable_affliction {
                let caster = sim.spell(spell).caster;
                if let Some(ua) = sim.spell_by_label(caster, "Unstable Affliction") {
                    if let Some(dot) = sim.dot_of(ua, target) {
                        sim.deactivate_dot(dot);
                    }
                }
            }
            if let Some(dot) = sim.dot_of(spell, target) {
                sim.apply_dot(dot);
            }
        }),
    );
}

/// Immolate's dot on `target`, when it is running
pub(crate) fn active_immolate(sim: &Simulation, caster: UnitId, target: UnitId) -> Option<DotId> {
    let immolate = sim.spell_by_label(caster, "Immolate")?;
    sim.dot_of(immolate, target)
        .filter(|dot| sim.dot(*dot).is_active())
}

fn register_conflagrate(sim: &mut Simulation, warlock: &Warlock) {
    let Some(rank) = highest_rank(&CONFLAGRATE_RANKS, warlock.level) else {
        return;
    };
    let (min, max) = (rank.min, rank.max);
    let backdraft = warlock.auras.backdraft;

    sim.register_spell(
        warlock.unit,
        SpellConfig {
            school: SpellSchool::FIRE,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::RESET_ATTACK_SWING,
            cost: Cost::mana(rank.mana),
            cast: CastConfig::instant(),
            cooldown: Duration::from_secs(10),
            bonus_coefficient: 0.429,
            ..SpellConfig::new("Conflagrate", ActionId::spell(rank.spell_id))
        }
        .with_cast_condition(|sim, spell, target| {
            active_immolate(sim, sim.spell(spell).caster, target).is_some()
        })
        .with_apply_effects(move |sim, spell, target| {
            let base = sim.roll(min, max);
            let result = sim.calc_and_deal_damage(spell, target, base, OutcomeKind::MagicHitAndCrit);
            if !result.landed() {
                return;
            }
            match backdraft {
                Some(aura) => sim.activate_aura(aura),
                None => {
                    let caster = sim.spell(spell).caster;
                    if let Some(dot) = active_immolate(sim, caster, target) {
                        sim.deactivate_dot(dot);
                    }
                }
            }
        }),
    );
}

fn register_incinerate(sim: &mut Simulation, warlock: &Warlock) {
    let base = warlock.base_rune_damage();
    let (min, max) = (base * 2.22, base * 2.58);
    let buff = warlock.auras.incinerate;

    sim.register_spell(
        warlock.unit,
        SpellConfig {
            school: SpellSchool::FIRE,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::RESET_ATTACK_SWING,
            cost: Cost::mana(0.14 * warlock.base_mana),
            cast: CastConfig::with_cast_time(Duration::from_millis(2250)),
            bonus_coefficient: 0.714,
            missile_speed: 24.0,
            ..SpellConfig::new("Incinerate", ActionId::spell(412758))
        }
        .with_apply_effects(move |sim, spell, target| {
            let damage = sim.roll(min, max);
            let result = sim.calc_damage(spell, target, damage, OutcomeKind::MagicHitAndCrit);
            if result.landed() {
                if let Some(buff) = buff {
                    sim.activate_aura(buff);
                }
            }
            sim.wait_travel_time(spell, move |sim| sim.deal_damage(&result));
        }),
    );
}

/// Run `f` with the spell's school switched to fire; the dot half of
/// Shadowflame takes fire modifiers and resistances
fn as_fire<T>(sim: &mut Simulation, spell: SpellId, f: impl FnOnce(&mut Simulation) -> T) -> T {
    let school = sim.spell(spell).config.school;
    sim.spell_mut(spell).config.school = SpellSchool::FIRE;
    let out = f(sim);
    sim.spell_mut(spell).config.school = school;
    out
}

fn register_shadowflame(sim: &mut Simulation, warlock: &Warlock) {
    let base = warlock.base_rune_damage();
    let direct = base * SHADOWFLAME_DIRECT_SCALE;
    let per_tick = base * SHADOWFLAME_TICK_SCALE;
    let shadow_mastery = 1.0 + warlock.shadow_mastery_bonus();
    let emberstorm = 1.0 + 0.02 * f64::from(warlock.talents.emberstorm);

    let dot = DotConfig::new("Shadowflame", 4, Duration::from_secs(2))
        .with_coefficient(SHADOWFLAME_TICK_COEFFICIENT)
        .on_snapshot(move |sim, dot, _| {
            let spell = sim.dot(dot).spell;
            as_fire(sim, spell, |sim| sim.snapshot_dot(dot, per_tick));
            sim.dot_mut(dot).snapshot_base_damage *= emberstorm;
        })
        .on_tick(|sim, dot| {
            let spell = sim.dot(dot).spell;
            as_fire(sim, spell, |sim| {
                sim.calc_and_deal_periodic_snapshot_damage(dot, OutcomeKind::Tick)
            });
        });

    sim.register_spell(
        warlock.unit,
        SpellConfig {
            school: SpellSchool::SHADOW,
            proc_mask: ProcMask::SPELL_DAMAGE,
            flags: SpellFlags::RESET_ATTACK_SWING,
            cost: Cost::mana(0.27 * warlock.base_mana),
            cast: CastConfig::instant(),
            cooldown: Duration::from_secs(15),
            dot: Some(dot),
            ..SpellConfig::new("Shadowflame", ActionId::spell(426320))
        }
        .with_apply_effects(move |sim, spell, target| {
            let spell_power = sim.spell_power_for(spell);
            let base = (direct + SHADOWFLAME_DIRECT_COEFFICIENT * spell_power) * shadow_mastery;
            let result = sim.calc_damage(spell, target, base, OutcomeKind::MagicHitAndCrit);
            sim.deal_damage(&result);
            if result.landed() {
                if let Some(dot) = sim.dot_of(spell, target) {
                    sim.apply_dot(dot);
                }
            }
        }),
    );
}
