//! DoT (Damage over Time) system
//!
//! Each spell with a [`DotConfig`] owns one [`Dot`] per enemy unit.
//! Damage is snapshotted on application and replayed on every tick.

mod active;
mod tick;
mod types;

pub use active::Dot;
pub use types::{DotConfig, DotSnapshotHook, DotTickHook};
