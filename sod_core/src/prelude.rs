//! Prelude module for convenient imports
//!
//! ```rust
//! use sod_core::prelude::*;
//! ```

// Core types
pub use crate::stats::{PseudoStats, Stat, Stats};
pub use crate::types::{
    ActionId, AuraId, DotId, HitOutcome, ProcMask, SpellFlags, SpellId, SpellSchool, UnitId,
};
pub use crate::unit::{ClassProfile, EnergyBar, ResourceKind, Unit, UnitKind, Weapon};

// Simulation
pub use crate::sim::Simulation;
pub use crate::spell::{CastConfig, Cost, SpellConfig};
pub use crate::combat::{OutcomeKind, SpellResult};

// Auras, procs and dots
pub use crate::aura::{permanent_aura, AuraConfig, ProcCallback, ProcTrigger};
pub use crate::dot::DotConfig;
pub use crate::item_set::{ItemSet, ItemSetRegistry};

// Rotations and running
pub use crate::rotation::{ActionConfig, Condition, Decision, PriorityRotation, Rotation, RotationConfig};
pub use crate::runner::SimRunner;
pub use crate::metrics::SimResult;

// Config and errors
pub use crate::config::{CombatConstants, EncounterConfig, SimConfig};
pub use crate::error::{Result, SimError};
