//! Stats - Character sheet stats and engine-level pseudo stats

use crate::types::SpellSchool;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

/// A single character-sheet stat
///
/// Percent-based stats (hit, crit, haste, dodge) are stored as percentages,
/// e.g. `3.0` is 3% spell hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Strength,
    Agility,
    Stamina,
    Intellect,
    Spirit,
    SpellPower,
    SpellDamage,
    ArcanePower,
    FirePower,
    FrostPower,
    HolyPower,
    NaturePower,
    ShadowPower,
    Mp5,
    SpellHit,
    SpellCrit,
    SpellHaste,
    SpellPenetration,
    AttackPower,
    FeralAttackPower,
    MeleeHit,
    MeleeCrit,
    MeleeHaste,
    ArmorPenetration,
    Mana,
    Health,
    Armor,
    BonusArmor,
    Dodge,
    ArcaneResistance,
    FireResistance,
    FrostResistance,
    NatureResistance,
    ShadowResistance,
}

impl Stat {
    pub const COUNT: usize = 34;

    pub fn all() -> &'static [Stat] {
        use Stat::*;
        &[
            Strength,
            Agility,
            Stamina,
            Intellect,
            Spirit,
            SpellPower,
            SpellDamage,
            ArcanePower,
            FirePower,
            FrostPower,
            HolyPower,
            NaturePower,
            ShadowPower,
            Mp5,
            SpellHit,
            SpellCrit,
            SpellHaste,
            SpellPenetration,
            AttackPower,
            FeralAttackPower,
            MeleeHit,
            MeleeCrit,
            MeleeHaste,
            ArmorPenetration,
            Mana,
            Health,
            Armor,
            BonusArmor,
            Dodge,
            ArcaneResistance,
            FireResistance,
            FrostResistance,
            NatureResistance,
            ShadowResistance,
        ]
    }

    /// Config key for this stat, e.g. `spell_power`
    pub fn name(&self) -> &'static str {
        match self {
            Stat::Strength => "strength",
            Stat::Agility => "agility",
            Stat::Stamina => "stamina",
            Stat::Intellect => "intellect",
            Stat::Spirit => "spirit",
            Stat::SpellPower => "spell_power",
            Stat::SpellDamage => "spell_damage",
            Stat::ArcanePower => "arcane_power",
            Stat::FirePower => "fire_power",
            Stat::FrostPower => "frost_power",
            Stat::HolyPower => "holy_power",
            Stat::NaturePower => "nature_power",
            Stat::ShadowPower => "shadow_power",
            Stat::Mp5 => "mp5",
            Stat::SpellHit => "spell_hit",
            Stat::SpellCrit => "spell_crit",
            Stat::SpellHaste => "spell_haste",
            Stat::SpellPenetration => "spell_penetration",
            Stat::AttackPower => "attack_power",
            Stat::FeralAttackPower => "feral_attack_power",
            Stat::MeleeHit => "melee_hit",
            Stat::MeleeCrit => "melee_crit",
            Stat::MeleeHaste => "melee_haste",
            Stat::ArmorPenetration => "armor_penetration",
            Stat::Mana => "mana",
            Stat::Health => "health",
            Stat::Armor => "armor",
            Stat::BonusArmor => "bonus_armor",
            Stat::Dodge => "dodge",
            Stat::ArcaneResistance => "arcane_resistance",
            Stat::FireResistance => "fire_resistance",
            Stat::FrostResistance => "frost_resistance",
            Stat::NatureResistance => "nature_resistance",
            Stat::ShadowResistance => "shadow_resistance",
        }
    }

    pub fn from_name(name: &str) -> Option<Stat> {
        Stat::all().iter().copied().find(|s| s.name() == name)
    }

    /// School-specific spell power stat, if the school has one
    pub fn school_power(school: SpellSchool) -> Option<Stat> {
        match school {
            SpellSchool::ARCANE => Some(Stat::ArcanePower),
            SpellSchool::FIRE => Some(Stat::FirePower),
            SpellSchool::FROST => Some(Stat::FrostPower),
            SpellSchool::HOLY => Some(Stat::HolyPower),
            SpellSchool::NATURE => Some(Stat::NaturePower),
            SpellSchool::SHADOW => Some(Stat::ShadowPower),
            _ => None,
        }
    }

    /// Resistance stat guarding against a single school
    pub fn resistance(school: SpellSchool) -> Option<Stat> {
        match school {
            SpellSchool::ARCANE => Some(Stat::ArcaneResistance),
            SpellSchool::FIRE => Some(Stat::FireResistance),
            SpellSchool::FROST => Some(Stat::FrostResistance),
            SpellSchool::NATURE => Some(Stat::NatureResistance),
            SpellSchool::SHADOW => Some(Stat::ShadowResistance),
            _ => None,
        }
    }
}

/// Fixed-size stat array indexed by [`Stat`]
///
/// Serializes as a `stat = value` map with zero entries omitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct Stats([f64; Stat::COUNT]);

impl Default for Stats {
    fn default() -> Self {
        Stats([0.0; Stat::COUNT])
    }
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of `(stat, value)` pairs
    pub fn from_pairs(pairs: &[(Stat, f64)]) -> Self {
        let mut stats = Self::new();
        for (stat, value) in pairs {
            stats[*stat] += value;
        }
        stats
    }

    pub fn get(&self, stat: Stat) -> f64 {
        self.0[stat as usize]
    }

    pub fn add(&self, other: &Stats) -> Stats {
        let mut out = *self;
        out.add_assign(other);
        out
    }

    pub fn add_assign(&mut self, other: &Stats) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a += b;
        }
    }

    pub fn subtract(&self, other: &Stats) -> Stats {
        let mut out = *self;
        for (a, b) in out.0.iter_mut().zip(other.0.iter()) {
            *a -= b;
        }
        out
    }

    /// Multiply every stat by `factor`
    pub fn scale(&self, factor: f64) -> Stats {
        let mut out = *self;
        for v in out.0.iter_mut() {
            *v *= factor;
        }
        out
    }

    pub fn invert(&self) -> Stats {
        self.scale(-1.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }

    /// Iterate over non-zero entries
    pub fn iter(&self) -> impl Iterator<Item = (Stat, f64)> + '_ {
        Stat::all()
            .iter()
            .map(move |s| (*s, self.get(*s)))
            .filter(|(_, v)| *v != 0.0)
    }
}

impl Index<Stat> for Stats {
    type Output = f64;

    fn index(&self, stat: Stat) -> &f64 {
        &self.0[stat as usize]
    }
}

impl IndexMut<Stat> for Stats {
    fn index_mut(&mut self, stat: Stat) -> &mut f64 {
        &mut self.0[stat as usize]
    }
}

impl TryFrom<BTreeMap<String, f64>> for Stats {
    type Error = String;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut stats = Stats::new();
        for (key, value) in map {
            let stat = Stat::from_name(&key).ok_or_else(|| format!("unknown stat '{}'", key))?;
            stats[stat] = value;
        }
        Ok(stats)
    }
}

impl From<Stats> for BTreeMap<String, f64> {
    fn from(stats: Stats) -> Self {
        stats.iter().map(|(s, v)| (s.name().to_string(), v)).collect()
    }
}

/// Engine-level multipliers that never appear on the character sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PseudoStats {
    /// Multiplies all damage this unit deals
    pub damage_dealt_multiplier: f64,
    /// Per-school damage dealt multipliers, indexed by [`SpellSchool::index`]
    pub school_damage_dealt_multiplier: [f64; SpellSchool::COUNT],
    /// Multiplies periodic damage this unit deals
    pub periodic_damage_dealt_multiplier: f64,
    /// Multiplies all damage this unit takes
    pub damage_taken_multiplier: f64,
    pub school_damage_taken_multiplier: [f64; SpellSchool::COUNT],
    /// Extra multiplier on periodic damage taken, per school
    pub periodic_school_damage_taken_multiplier: [f64; SpellSchool::COUNT],
    /// Spell cast speed; cast times are divided by this
    pub cast_speed_multiplier: f64,
    /// Melee swing speed; swing times are divided by this
    pub melee_speed_multiplier: f64,
    /// Multiplies every resource cost
    pub cost_multiplier: f64,
    pub threat_multiplier: f64,
    /// Attack power gained per point of agility (Cat Form)
    pub agility_to_attack_power: f64,
    /// Whether feral attack power counts toward attack power
    pub feral_attack_power_active: bool,
}

impl Default for PseudoStats {
    fn default() -> Self {
        PseudoStats {
            damage_dealt_multiplier: 1.0,
            school_damage_dealt_multiplier: [1.0; SpellSchool::COUNT],
            periodic_damage_dealt_multiplier: 1.0,
            damage_taken_multiplier: 1.0,
            school_damage_taken_multiplier: [1.0; SpellSchool::COUNT],
            periodic_school_damage_taken_multiplier: [1.0; SpellSchool::COUNT],
            cast_speed_multiplier: 1.0,
            melee_speed_multiplier: 1.0,
            cost_multiplier: 1.0,
            threat_multiplier: 1.0,
            agility_to_attack_power: 0.0,
            feral_attack_power_active: false,
        }
    }
}

impl PseudoStats {
    pub fn school_dealt(&self, school: SpellSchool) -> f64 {
        self.school_damage_dealt_multiplier[school.index()]
    }

    pub fn school_taken(&self, school: SpellSchool) -> f64 {
        self.school_damage_taken_multiplier[school.index()]
    }

    pub fn periodic_school_taken(&self, school: SpellSchool) -> f64 {
        self.periodic_school_damage_taken_multiplier[school.index()]
    }
}
