//! Imp - The warlock's fire-casting pet and its Firebolt rotation

use super::Warlock;
use crate::common::{highest_rank, Ranked};
use sod_core::prelude::*;
use sod_core::source::{build_stats, BaseStatsSource, BuffSource};
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// Imp stats at a level bracket
struct ImpStats {
    level: u32,
    strength: f64,
    agility: f64,
    stamina: f64,
    intellect: f64,
    spirit: f64,
    mana: f64,
}

impl Ranked for ImpStats {
    fn required_level(&self) -> u32 {
        self.level
    }
}

const IMP_STATS: [ImpStats; 4] = [
    ImpStats { level: 25, strength: 47.0, agility: 25.0, stamina: 49.0, intellect: 94.0, spirit: 95.0, mana: 149.0 },
    ImpStats { level: 40, strength: 70.0, agility: 29.0, stamina: 67.0, intellect: 163.0, spirit: 163.0, mana: 318.0 },
    ImpStats { level: 50, strength: 101.0, agility: 32.0, stamina: 71.0, intellect: 212.0, spirit: 211.0, mana: 476.0 },
    ImpStats { level: 60, strength: 122.0, agility: 35.0, stamina: 86.0, intellect: 264.0, spirit: 260.0, mana: 576.0 },
];

const IMP_MELEE_CRIT: f64 = 3.454;
const IMP_SPELL_CRIT: f64 = 0.9075;

/// Share of the owner's stats the Imp inherits
const STAMINA_INHERITANCE: f64 = 0.75;
const INTELLECT_INHERITANCE: f64 = 0.3;
const SPELL_DAMAGE_INHERITANCE: f64 = 0.15;

struct FireboltRank {
    spell_id: u32,
    min: f64,
    max: f64,
    coefficient: f64,
    mana: f64,
    level: u32,
}

impl Ranked for FireboltRank {
    fn required_level(&self) -> u32 {
        self.level
    }
}

const FIREBOLT_RANKS: [FireboltRank; 7] = [
    FireboltRank { spell_id: 3110, min: 7.0, max: 10.0, coefficient: 0.164, mana: 10.0, level: 1 },
    FireboltRank { spell_id: 7799, min: 14.0, max: 16.0, coefficient: 0.314, mana: 20.0, level: 8 },
    FireboltRank { spell_id: 7800, min: 25.0, max: 29.0, coefficient: 0.529, mana: 35.0, level: 18 },
    FireboltRank { spell_id: 7801, min: 36.0, max: 41.0, coefficient: 0.571, mana: 50.0, level: 28 },
    FireboltRank { spell_id: 7802, min: 52.0, max: 59.0, coefficient: 0.571, mana: 70.0, level: 38 },
    FireboltRank { spell_id: 11762, min: 72.0, max: 80.0, coefficient: 0.571, mana: 95.0, level: 48 },
    FireboltRank { spell_id: 11763, min: 85.0, max: 96.0, coefficient: 0.571, mana: 115.0, level: 58 },
];

/// The Imp's own conversions; crit comes from its stat table
fn imp_profile() -> ClassProfile {
    ClassProfile {
        name: "Imp".to_string(),
        base_spell_crit: 0.0,
        base_melee_crit: 0.0,
        intellect_per_spell_crit: 0.0,
        agility_per_melee_crit: 0.0,
        attack_power_per_strength: 1.0,
        attack_power_per_agility: 0.0,
        spirit_regen_base: 8.0,
        spirit_regen_divisor: 4.0,
    }
}

/// Stats the Imp takes over from its owner at summon time
fn inherited_stats(owner: &Unit) -> Stats {
    let school_power = owner
        .stat(Stat::FirePower)
        .max(owner.stat(Stat::ShadowPower));
    let spell_damage = owner.stat(Stat::SpellPower) + owner.stat(Stat::SpellDamage) + school_power;
    Stats::from_pairs(&[
        (Stat::Stamina, owner.stat(Stat::Stamina) * STAMINA_INHERITANCE),
        (Stat::Intellect, owner.stat(Stat::Intellect) * INTELLECT_INHERITANCE),
        (Stat::SpellDamage, spell_damage * SPELL_DAMAGE_INHERITANCE),
        (Stat::MeleeCrit, owner.stat(Stat::MeleeCrit)),
        (Stat::SpellCrit, owner.stat(Stat::SpellCrit)),
    ])
}

/// Add the Imp as a pet of `warlock` and start its Firebolt rotation
pub(crate) fn summon_imp(sim: &mut Simulation, warlock: &Warlock) -> Result<UnitId> {
    let table = highest_rank(&IMP_STATS, warlock.level)
        .or_else(|| IMP_STATS.first())
        .ok_or_else(|| SimError::InvalidConfig("no Imp stats".to_string()))?;

    let base = BaseStatsSource::new(
        "Imp",
        warlock.level,
        Stats::from_pairs(&[
            (Stat::Strength, table.strength),
            (Stat::Agility, table.agility),
            (Stat::Stamina, table.stamina),
            (Stat::Intellect, table.intellect),
            (Stat::Spirit, table.spirit),
            (Stat::Mana, table.mana),
            (Stat::MeleeCrit, IMP_MELEE_CRIT),
            (Stat::SpellCrit, IMP_SPELL_CRIT),
        ]),
    );
    let inherited = BuffSource::new(
        "imp_inheritance",
        "Demonic Inheritance",
        inherited_stats(sim.unit(warlock.unit)),
    );
    let stats = build_stats(&[&base, &inherited]);

    let pet = sim.add_unit(
        Unit::new("Imp", UnitKind::Pet { owner: warlock.unit }, warlock.level)
            .with_profile(imp_profile())
            .with_stats(stats),
    );
    register_firebolt(sim, warlock, pet);
    sim.unit_mut(pet).reset_resources();

    let rotation = PriorityRotation::build(sim, pet, &RotationConfig::from_labels(&["Firebolt"]))?;
    sim.set_rotation(pet, Rc::new(rotation));

    debug!(owner = warlock.unit.0, pet = pet.0, "imp summoned");
    Ok(pet)
}

fn register_firebolt(sim: &mut Simulation, warlock: &Warlock, pet: UnitId) {
    let Some(rank) = highest_rank(&FIREBOLT_RANKS, warlock.level) else {
        return;
    };
    let improved_imp = 1.0 + 0.1 * f64::from(warlock.talents.improved_imp);
    let (min, max) = (rank.min * improved_imp, rank.max * improved_imp);
    let cast_time = Duration::from_millis(2000)
        .saturating_sub(Duration::from_millis(500 * u64::from(warlock.talents.improved_firebolt)));

    sim.register_spell(
        pet,
        SpellConfig {
            school: SpellSchool::FIRE,
            proc_mask: ProcMask::SPELL_DAMAGE,
            cost: Cost::mana(rank.mana),
            cast: CastConfig {
                gcd: Duration::from_secs(1),
                ..CastConfig::with_cast_time(cast_time)
            },
            cooldown: Duration::from_millis(200),
            bonus_coefficient: rank.coefficient,
            ..SpellConfig::new("Firebolt", ActionId::spell(rank.spell_id))
        }
        .with_apply_effects(move |sim, spell, target| {
            let base = sim.roll(min, max);
            sim.calc_and_deal_damage(spell, target, base, OutcomeKind::MagicHitAndCrit);
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{warlock_sim, with_talents};
    use super::super::{WarlockConfig, WarlockTalents};
    use super::*;

    #[test]
    fn test_imp_is_a_pet_of_the_warlock() {
        let (mut sim, warlock) = warlock_sim(WarlockConfig::default(), &[]);
        let imp = warlock.summon_imp(&mut sim).unwrap();
        assert_eq!(sim.unit(imp).owner(), Some(warlock.unit));
        assert_eq!(sim.pets_of(warlock.unit), vec![imp]);
        assert!(sim.spell_by_label(imp, "Firebolt").is_some());
    }

    #[test]
    fn test_imp_inherits_owner_stats() {
        let (mut sim, warlock) = warlock_sim(
            WarlockConfig::default(),
            &[(Stat::Stamina, 100.0), (Stat::SpellPower, 200.0), (Stat::ShadowPower, 40.0)],
        );
        let imp = warlock.summon_imp(&mut sim).unwrap();
        let u = sim.unit(imp);
        assert!((u.stat(Stat::Stamina) - (86.0 + 75.0)).abs() < 1e-9);
        // Owner has 100 intellect
        assert!((u.stat(Stat::Intellect) - (264.0 + 30.0)).abs() < 1e-9);
        assert!((u.stat(Stat::SpellDamage) - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_firebolt_rank_by_level() {
        let mut sim = Simulation::with_defaults(5);
        let unit = sim.add_unit(Unit::new("Warlock", UnitKind::Player, 40));
        let warlock = super::super::register(&mut sim, unit, &WarlockConfig::default()).unwrap();
        let imp = warlock.summon_imp(&mut sim).unwrap();
        let firebolt = sim.spell_by_label(imp, "Firebolt").unwrap();
        assert_eq!(sim.spell(firebolt).config.action_id, ActionId::spell(7802));
        assert!((sim.unit(imp).stat(Stat::Strength) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_improved_firebolt_cast_time() {
        let (mut sim, warlock) = warlock_sim(
            with_talents(WarlockTalents {
                improved_firebolt: 2,
                ..Default::default()
            }),
            &[],
        );
        let imp = warlock.summon_imp(&mut sim).unwrap();
        let firebolt = sim.spell_by_label(imp, "Firebolt").unwrap();
        assert_eq!(sim.cast_time(firebolt), Duration::from_secs(1));
        assert_eq!(sim.gcd(firebolt), Duration::from_secs(1));
    }

    #[test]
    fn test_imp_casts_in_a_fight() {
        let (mut sim, warlock) = warlock_sim(WarlockConfig::default(), &[]);
        let imp = warlock.summon_imp(&mut sim).unwrap();
        sim.run();
        let firebolt = sim.spell_by_label(imp, "Firebolt").unwrap();
        assert!(sim.spell(firebolt).metrics.casts > 0);
    }
}
