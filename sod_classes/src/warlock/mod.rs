//! Warlock - Destruction and affliction spells, curses, runes and the Imp
//!
//! Registration mirrors the druid: auras first, then spells, then the
//! talent pass that adjusts registered spells, then triggers.

pub mod affliction;
pub mod destruction;
pub mod item_sets;
pub mod pet;
pub mod runes;
pub mod talents;

pub use runes::WarlockRune;
pub use talents::WarlockTalents;

use serde::{Deserialize, Serialize};
use sod_core::prelude::*;
use tracing::debug;

/// Warlock options of a player config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarlockConfig {
    #[serde(default)]
    pub talents: WarlockTalents,
    #[serde(default)]
    pub runes: Vec<WarlockRune>,
    /// Fight with the Imp out
    #[serde(default)]
    pub summon_imp: bool,
}

/// Auras that spells and triggers toggle, when the character has them
#[derive(Debug, Clone, Copy, Default)]
pub struct WarlockAuras {
    pub amplify_curse: Option<AuraId>,
    pub shadow_trance: Option<AuraId>,
    pub backdraft: Option<AuraId>,
    pub incinerate: Option<AuraId>,
    /// Haunt debuff on the primary target
    pub haunt: Option<AuraId>,
    /// Improved Shadow Bolt debuff on the primary target
    pub improved_shadow_bolt: Option<AuraId>,
}

/// A registered warlock: the ids and talent values its content closes over
#[derive(Debug, Clone)]
pub struct Warlock {
    pub unit: UnitId,
    pub level: u32,
    pub base_mana: f64,
    pub talents: WarlockTalents,
    pub runes: Vec<WarlockRune>,
    pub auras: WarlockAuras,
}

impl Warlock {
    pub fn has_rune(&self, rune: WarlockRune) -> bool {
        self.runes.contains(&rune)
    }

    /// Shadow Mastery: bonus to shadow damage, additive
    pub fn shadow_mastery_bonus(&self) -> f64 {
        0.02 * f64::from(self.talents.shadow_mastery)
    }

    /// Improved Immolate: bonus to Immolate's initial hit
    pub fn improved_immolate_bonus(&self) -> f64 {
        0.05 * f64::from(self.talents.improved_immolate)
    }

    /// Pandemic: dot ticks crit for +100%
    pub fn pandemic_tick_outcome(&self) -> OutcomeKind {
        if self.has_rune(WarlockRune::Pandemic) {
            OutcomeKind::SnapshotCrit
        } else {
            OutcomeKind::Tick
        }
    }

    /// Base damage of the level-scaled rune abilities (Incinerate, Haunt)
    pub fn base_rune_damage(&self) -> f64 {
        let level = f64::from(self.level);
        6.568597 + 0.672028 * level + 0.031721 * level * level
    }

    /// Summon the Imp as a pet of this warlock, with its own Firebolt rotation
    pub fn summon_imp(&self, sim: &mut Simulation) -> Result<UnitId> {
        pet::summon_imp(sim, self)
    }
}

/// Register every warlock feature for `unit` according to `config`
pub fn register(sim: &mut Simulation, unit: UnitId, config: &WarlockConfig) -> Result<Warlock> {
    if config.talents.improved_firebolt > 2 {
        return Err(SimError::InvalidConfig(format!(
            "Improved Firebolt has 2 ranks, got {}",
            config.talents.improved_firebolt
        )));
    }

    let (level, base_mana) = {
        let u = sim.unit(unit);
        (u.level, u.base_mana)
    };

    let mut warlock = Warlock {
        unit,
        level,
        base_mana,
        talents: config.talents.clone(),
        runes: config.runes.clone(),
        auras: WarlockAuras::default(),
    };

    // Auras that spells activate
    talents::register_talent_auras(sim, &mut warlock);
    runes::register_rune_auras(sim, &mut warlock);

    // Spells
    destruction::register_destruction_spells(sim, &warlock);
    affliction::register_affliction_spells(sim, &warlock);
    talents::apply_spell_talents(sim, &warlock);

    // Triggers watching the spells above
    talents::register_talent_triggers(sim, &warlock);
    runes::register_rune_triggers(sim, &warlock);

    debug!(
        unit = unit.0,
        level,
        runes = warlock.runes.len(),
        "warlock registered"
    );
    Ok(warlock)
}
