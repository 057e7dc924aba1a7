//! sod_classes - Druid and warlock content for the sod_core engine
//!
//! Every class feature is registered the same way: a rank or value table
//! feeds a closure, and the closure drives the engine (`calc_damage`,
//! `apply_dot`, `activate_aura`, ...). This crate provides:
//! - Druid: forms, balance and feral spells, talents, runes, item sets
//! - Warlock: destruction and affliction spells, curses, runes, the Imp
//! - PlayerConfig: TOML-described characters and the presets built on them

pub mod common;
pub mod druid;
pub mod player;
pub mod presets;
pub mod warlock;

pub use player::{build_player, Class, PlayerConfig};
pub use presets::PlayerPresets;

use sod_core::ItemSetRegistry;

/// Every item set known to the content layer
pub fn item_sets() -> ItemSetRegistry {
    let mut registry = ItemSetRegistry::new();
    druid::item_sets::register_all(&mut registry);
    warlock::item_sets::register_all(&mut registry);
    registry
}
