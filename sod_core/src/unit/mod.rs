//! Unit - Players, pets and targets taking part in a simulation
//!
//! A unit stores raw character-sheet [`Stats`] plus per-stat multipliers.
//! Derived values (max mana, crit chance, attack power, armor) are computed
//! on access so that dynamic stat changes are always reflected.

mod auto_attack;
mod resources;

pub use auto_attack::{AutoAttackState, Weapon};
pub use resources::{EnergyBar, ManaBar, ResourceGain, ResourceKind, ResourceMetrics};

use crate::stats::{PseudoStats, Stat, Stats};
use crate::types::{AuraId, DotId, SpellId, SpellSchool, UnitId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    Player,
    Pet { owner: UnitId },
    Target,
}

/// Per-class stat conversion ratios and spirit regeneration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProfile {
    pub name: String,
    /// Spell crit percent before stats
    pub base_spell_crit: f64,
    pub base_melee_crit: f64,
    /// Intellect needed for 1% spell crit (0 disables the conversion)
    pub intellect_per_spell_crit: f64,
    pub agility_per_melee_crit: f64,
    pub attack_power_per_strength: f64,
    pub attack_power_per_agility: f64,
    /// Mana per regen tick from spirit: `spirit_regen_base + spirit / spirit_regen_divisor`
    pub spirit_regen_base: f64,
    pub spirit_regen_divisor: f64,
}

impl Default for ClassProfile {
    fn default() -> Self {
        ClassProfile {
            name: "Unit".to_string(),
            base_spell_crit: 0.0,
            base_melee_crit: 0.0,
            intellect_per_spell_crit: 0.0,
            agility_per_melee_crit: 0.0,
            attack_power_per_strength: 0.0,
            attack_power_per_agility: 0.0,
            spirit_regen_base: 0.0,
            spirit_regen_divisor: 0.0,
        }
    }
}

/// An in-progress cast with a cast time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hardcast {
    pub spell: SpellId,
    pub target: UnitId,
    pub ends_at: Duration,
}

#[derive(Debug, Clone)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub kind: UnitKind,
    pub level: u32,
    pub profile: ClassProfile,
    pub pseudo: PseudoStats,
    stats: Stats,
    stat_multipliers: [f64; Stat::COUNT],
    /// Class base mana at this level; mana costs are often a share of it
    pub base_mana: f64,
    pub mana: ManaBar,
    pub energy: Option<EnergyBar>,
    combo_points: u32,
    pub max_combo_points: u32,
    pub gcd_ready: Duration,
    pub hardcast: Option<Hardcast>,
    /// Channeled dot currently locking this unit
    pub channeling: Option<DotId>,
    pub auto_attack: AutoAttackState,
    pub resource_metrics: ResourceMetrics,
    pub damage_taken: f64,
    pub(crate) auras: Vec<AuraId>,
    pub(crate) spells: Vec<SpellId>,
    pub(crate) ready_generation: u64,
}

impl Unit {
    pub fn new(name: impl Into<String>, kind: UnitKind, level: u32) -> Self {
        Unit {
            id: UnitId(0),
            name: name.into(),
            kind,
            level,
            profile: ClassProfile::default(),
            pseudo: PseudoStats::default(),
            stats: Stats::new(),
            stat_multipliers: [1.0; Stat::COUNT],
            base_mana: 0.0,
            mana: ManaBar::default(),
            energy: None,
            combo_points: 0,
            max_combo_points: 5,
            gcd_ready: Duration::ZERO,
            hardcast: None,
            channeling: None,
            auto_attack: AutoAttackState::default(),
            resource_metrics: ResourceMetrics::default(),
            damage_taken: 0.0,
            auras: Vec::new(),
            spells: Vec::new(),
            ready_generation: 0,
        }
    }

    pub fn with_profile(mut self, profile: ClassProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_base_mana(mut self, base_mana: f64) -> Self {
        self.base_mana = base_mana;
        self
    }

    pub fn is_enemy(&self) -> bool {
        self.kind == UnitKind::Target
    }

    pub fn owner(&self) -> Option<UnitId> {
        match self.kind {
            UnitKind::Pet { owner } => Some(owner),
            _ => None,
        }
    }

    pub fn auras(&self) -> &[AuraId] {
        &self.auras
    }

    pub fn spells(&self) -> &[SpellId] {
        &self.spells
    }

    // === Stats ===

    /// Effective value of a stat after multipliers
    pub fn stat(&self, stat: Stat) -> f64 {
        self.stats[stat] * self.stat_multipliers[stat as usize]
    }

    /// All effective stats
    pub fn stats(&self) -> Stats {
        let mut out = self.stats;
        for stat in Stat::all() {
            out[*stat] *= self.stat_multipliers[*stat as usize];
        }
        out
    }

    pub fn add_stat(&mut self, stat: Stat, value: f64) {
        self.stats[stat] += value;
    }

    pub fn add_stats(&mut self, stats: &Stats) {
        self.stats.add_assign(stats);
    }

    /// Scale a stat, e.g. +4% strength is `multiply_stat(Stat::Strength, 1.04)`
    pub fn multiply_stat(&mut self, stat: Stat, factor: f64) {
        self.stat_multipliers[stat as usize] *= factor;
    }

    pub fn multiply_cast_speed(&mut self, factor: f64) {
        self.pseudo.cast_speed_multiplier *= factor;
    }

    pub fn multiply_melee_speed(&mut self, factor: f64) {
        self.pseudo.melee_speed_multiplier *= factor;
    }

    /// Cast times and the GCD are divided by this
    pub fn cast_speed(&self) -> f64 {
        self.pseudo.cast_speed_multiplier * (1.0 + self.stat(Stat::SpellHaste) / 100.0)
    }

    pub fn melee_speed(&self) -> f64 {
        self.pseudo.melee_speed_multiplier * (1.0 + self.stat(Stat::MeleeHaste) / 100.0)
    }

    pub fn max_mana(&self) -> f64 {
        self.stat(Stat::Mana) + attribute_bonus(self.stat(Stat::Intellect), 15.0)
    }

    pub fn max_health(&self) -> f64 {
        self.stat(Stat::Health) + attribute_bonus(self.stat(Stat::Stamina), 10.0)
    }

    /// Spell power for a school; multi-school spells use the best school
    pub fn spell_power(&self, school: SpellSchool) -> f64 {
        let generic = self.stat(Stat::SpellPower) + self.stat(Stat::SpellDamage);
        let school_bonus = school
            .schools()
            .filter_map(Stat::school_power)
            .map(|s| self.stat(s))
            .fold(0.0, f64::max);
        generic + school_bonus
    }

    pub fn spell_crit_percent(&self) -> f64 {
        let from_int = if self.profile.intellect_per_spell_crit > 0.0 {
            self.stat(Stat::Intellect) / self.profile.intellect_per_spell_crit
        } else {
            0.0
        };
        self.profile.base_spell_crit + self.stat(Stat::SpellCrit) + from_int
    }

    pub fn melee_crit_percent(&self) -> f64 {
        let from_agi = if self.profile.agility_per_melee_crit > 0.0 {
            self.stat(Stat::Agility) / self.profile.agility_per_melee_crit
        } else {
            0.0
        };
        self.profile.base_melee_crit + self.stat(Stat::MeleeCrit) + from_agi
    }

    pub fn spell_hit_percent(&self) -> f64 {
        self.stat(Stat::SpellHit)
    }

    pub fn melee_hit_percent(&self) -> f64 {
        self.stat(Stat::MeleeHit)
    }

    pub fn attack_power(&self) -> f64 {
        let mut ap = self.stat(Stat::AttackPower)
            + self.stat(Stat::Strength) * self.profile.attack_power_per_strength
            + self.stat(Stat::Agility)
                * (self.profile.attack_power_per_agility + self.pseudo.agility_to_attack_power);
        if self.pseudo.feral_attack_power_active {
            ap += self.stat(Stat::FeralAttackPower);
        }
        ap
    }

    pub fn armor(&self) -> f64 {
        self.stat(Stat::Armor) + self.stat(Stat::BonusArmor) + 2.0 * self.stat(Stat::Agility)
    }

    /// Resistance against a school; multi-school spells use the weakest resistance
    pub fn resistance(&self, school: SpellSchool) -> f64 {
        let weakest = school
            .schools()
            .map(|s| Stat::resistance(s).map(|r| self.stat(r)).unwrap_or(0.0))
            .fold(f64::INFINITY, f64::min);
        if weakest.is_finite() {
            weakest.max(0.0)
        } else {
            0.0
        }
    }

    // === Resources ===

    pub fn current_mana(&self) -> f64 {
        self.mana.current
    }

    pub fn mana_percent(&self) -> f64 {
        let max = self.max_mana();
        if max <= 0.0 {
            return 0.0;
        }
        self.mana.current / max * 100.0
    }

    pub fn spend_mana(&mut self, amount: f64, now: Duration) {
        if amount <= 0.0 {
            return;
        }
        self.mana.current = (self.mana.current - amount).max(0.0);
        self.mana.last_spend = Some(now);
        self.resource_metrics.mana_spent += amount;
    }

    /// Add mana up to the cap; returns the amount actually gained
    pub fn add_mana(&mut self, amount: f64, source: &str) -> f64 {
        let room = (self.max_mana() - self.mana.current).max(0.0);
        let gained = amount.min(room).max(0.0);
        self.mana.current += gained;
        self.resource_metrics
            .record_gain(ResourceKind::Mana, source, gained, amount - gained);
        gained
    }

    pub fn current_energy(&self) -> f64 {
        self.energy.as_ref().map(|e| e.current).unwrap_or(0.0)
    }

    pub fn spend_energy(&mut self, amount: f64) {
        if let Some(bar) = self.energy.as_mut() {
            bar.current = (bar.current - amount).max(0.0);
            self.resource_metrics.energy_spent += amount;
        }
    }

    pub fn add_energy(&mut self, amount: f64, source: &str) -> f64 {
        let Some(bar) = self.energy.as_mut() else {
            return 0.0;
        };
        let room = (bar.max - bar.current).max(0.0);
        let gained = amount.min(room).max(0.0);
        bar.current += gained;
        self.resource_metrics
            .record_gain(ResourceKind::Energy, source, gained, amount - gained);
        gained
    }

    pub fn combo_points(&self) -> u32 {
        self.combo_points
    }

    pub fn add_combo_points(&mut self, points: u32, source: &str) {
        let total = (self.combo_points + points).min(self.max_combo_points);
        let gained = total - self.combo_points;
        self.combo_points = total;
        self.resource_metrics.record_gain(
            ResourceKind::ComboPoints,
            source,
            gained as f64,
            (points - gained) as f64,
        );
    }

    /// Spend all combo points, returning how many were spent
    pub fn spend_combo_points(&mut self) -> u32 {
        std::mem::take(&mut self.combo_points)
    }

    /// Fill mana and energy and clear combo points and cast state
    pub fn reset_resources(&mut self) {
        self.mana.current = self.max_mana();
        self.mana.last_spend = None;
        if let Some(bar) = self.energy.as_mut() {
            bar.current = bar.max;
        }
        self.combo_points = 0;
        self.gcd_ready = Duration::ZERO;
        self.hardcast = None;
        self.channeling = None;
    }
}

/// Health or mana from an attribute: the first 20 points give 1 each
fn attribute_bonus(value: f64, per_point: f64) -> f64 {
    if value <= 20.0 {
        value.max(0.0)
    } else {
        20.0 + (value - 20.0) * per_point
    }
}
