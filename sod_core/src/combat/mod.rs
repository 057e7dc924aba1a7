//! Combat resolution - Attack table rolls and spell results

mod resolution;
mod result;

pub use resolution::{crit_multiplier, OutcomeKind};
pub use result::SpellResult;
