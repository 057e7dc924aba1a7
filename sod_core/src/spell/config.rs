//! SpellConfig - Everything needed to register a spell

use crate::dot::DotConfig;
use crate::sim::Simulation;
use crate::types::{ActionId, ProcMask, SpellFlags, SpellId, SpellSchool, UnitId};
use std::rc::Rc;
use std::time::Duration;

/// Default global cooldown
pub const GCD_DEFAULT: Duration = Duration::from_millis(1500);
/// Haste can never push the GCD below this
pub const GCD_MIN: Duration = Duration::from_secs(1);

/// Runs when a cast completes: `(sim, spell, target)`
pub type ApplyEffects = Rc<dyn Fn(&mut Simulation, SpellId, UnitId)>;
/// Extra requirement checked before casting: `(sim, spell, target)`
pub type CastCondition = Rc<dyn Fn(&Simulation, SpellId, UnitId) -> bool>;

/// Resource cost of a spell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cost {
    None,
    /// Flat mana, scaled by a fixed multiplier (talents, runes)
    Mana { base: f64, multiplier: f64 },
    /// Energy; `refund` is the share returned when the ability fails to land
    Energy { base: f64, refund: f64 },
}

impl Cost {
    pub fn mana(base: f64) -> Self {
        Cost::Mana {
            base,
            multiplier: 1.0,
        }
    }

    pub fn energy(base: f64, refund: f64) -> Self {
        Cost::Energy { base, refund }
    }

    /// Cost before the spell and caster cost multipliers
    pub fn base_amount(&self) -> f64 {
        match self {
            Cost::None => 0.0,
            Cost::Mana { base, multiplier } => base * multiplier,
            Cost::Energy { base, .. } => *base,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastConfig {
    pub cast_time: Duration,
    /// Flat reduction applied before haste (Nature's Grace, Eclipse)
    pub cast_time_reduction: Duration,
    /// Zero for off-GCD abilities
    pub gcd: Duration,
    /// Cast time and GCD are not scaled by cast speed
    pub ignore_haste: bool,
}

impl Default for CastConfig {
    fn default() -> Self {
        CastConfig {
            cast_time: Duration::ZERO,
            cast_time_reduction: Duration::ZERO,
            gcd: GCD_DEFAULT,
            ignore_haste: false,
        }
    }
}

impl CastConfig {
    pub fn instant() -> Self {
        Self::default()
    }

    pub fn with_cast_time(cast_time: Duration) -> Self {
        CastConfig {
            cast_time,
            ..Default::default()
        }
    }

    /// One-second GCD unaffected by haste, as used by cat abilities
    pub fn energy_gcd() -> Self {
        CastConfig {
            gcd: GCD_MIN,
            ignore_haste: true,
            ..Default::default()
        }
    }

    pub fn off_gcd() -> Self {
        CastConfig {
            gcd: Duration::ZERO,
            ..Default::default()
        }
    }
}

#[derive(Clone)]
pub struct SpellConfig {
    pub label: String,
    pub action_id: ActionId,
    pub school: SpellSchool,
    pub proc_mask: ProcMask,
    pub flags: SpellFlags,
    pub cost: Cost,
    /// Additive cost multiplier; Clearcasting subtracts 1
    pub cost_multiplier: f64,
    pub cast: CastConfig,
    pub cooldown: Duration,
    pub damage_multiplier: f64,
    pub damage_multiplier_additive: f64,
    /// Extra crit chance in percent
    pub bonus_crit: f64,
    /// Extra hit chance in percent
    pub bonus_hit: f64,
    /// Bonus to the crit multiplier, see [`crate::combat::crit_multiplier`]
    pub crit_damage_bonus: f64,
    /// Spell power coefficient of the direct portion
    pub bonus_coefficient: f64,
    /// Yards per second; zero means the effect is instant
    pub missile_speed: f64,
    pub dot: Option<DotConfig>,
    pub extra_cast_condition: Option<CastCondition>,
    pub apply_effects: Option<ApplyEffects>,
}

impl Default for SpellConfig {
    fn default() -> Self {
        SpellConfig {
            label: String::new(),
            action_id: ActionId::default(),
            school: SpellSchool::PHYSICAL,
            proc_mask: ProcMask::empty(),
            flags: SpellFlags::empty(),
            cost: Cost::None,
            cost_multiplier: 1.0,
            cast: CastConfig::default(),
            cooldown: Duration::ZERO,
            damage_multiplier: 1.0,
            damage_multiplier_additive: 1.0,
            bonus_crit: 0.0,
            bonus_hit: 0.0,
            crit_damage_bonus: 0.0,
            bonus_coefficient: 0.0,
            missile_speed: 0.0,
            dot: None,
            extra_cast_condition: None,
            apply_effects: None,
        }
    }
}

impl std::fmt::Debug for SpellConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpellConfig")
            .field("label", &self.label)
            .field("action_id", &self.action_id)
            .field("school", &self.school)
            .field("flags", &self.flags)
            .field("cost", &self.cost)
            .field("cast", &self.cast)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

impl SpellConfig {
    pub fn new(label: impl Into<String>, action_id: ActionId) -> Self {
        SpellConfig {
            label: label.into(),
            action_id,
            ..Default::default()
        }
    }

    pub fn with_apply_effects(
        mut self,
        f: impl Fn(&mut Simulation, SpellId, UnitId) + 'static,
    ) -> Self {
        self.apply_effects = Some(Rc::new(f));
        self
    }

    pub fn with_cast_condition(
        mut self,
        f: impl Fn(&Simulation, SpellId, UnitId) -> bool + 'static,
    ) -> Self {
        self.extra_cast_condition = Some(Rc::new(f));
        self
    }

    /// Chain another condition after any existing one
    pub fn and_cast_condition(
        mut self,
        f: impl Fn(&Simulation, SpellId, UnitId) -> bool + 'static,
    ) -> Self {
        let previous = self.extra_cast_condition.take();
        self.extra_cast_condition = Some(Rc::new(move |sim, spell, target| {
            previous.as_ref().map_or(true, |p| p(sim, spell, target)) && f(sim, spell, target)
        }));
        self
    }
}
