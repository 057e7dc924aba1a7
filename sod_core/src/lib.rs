//! sod_core - Event-driven combat engine for Season of Discovery class simulations
//!
//! This library provides:
//! - Simulation: units, spells, auras and dots on a time-ordered event queue
//! - Spell casting with GCD, cooldowns, resource costs and travel time
//! - Attack table resolution: spell hit/crit, melee tables, partial resists, armor
//! - Rotations: trait-based, with a TOML-driven priority list
//! - SimRunner: seeded multi-iteration runs aggregated into a SimResult

pub mod aura;
pub mod combat;
pub mod config;
pub mod defense;
pub mod dot;
pub mod error;
pub mod item_set;
pub mod log;
pub mod metrics;
pub mod prelude;
pub mod rotation;
pub mod runner;
pub mod sim;
pub mod source;
pub mod spell;
pub mod stats;
pub mod types;
pub mod unit;

// Re-export core types for convenience
pub use aura::{permanent_aura, Aura, AuraConfig, ProcCallback, ProcTrigger};
pub use combat::{OutcomeKind, SpellResult};
pub use config::{default_sim_config, CombatConstants, EncounterConfig, SimConfig};
pub use dot::{Dot, DotConfig};
pub use error::{Result, SimError};
pub use item_set::{ItemSet, ItemSetRegistry};
pub use metrics::{IterationResult, SimResult};
pub use rotation::{Decision, PriorityRotation, Rotation, RotationConfig};
pub use runner::SimRunner;
pub use sim::Simulation;
pub use spell::{Spell, SpellConfig};
pub use stats::{PseudoStats, Stat, Stats};
pub use types::{ActionId, AuraId, DotId, HitOutcome, ProcMask, SpellFlags, SpellId, SpellSchool, UnitId};
pub use unit::{ClassProfile, Unit, UnitKind};
