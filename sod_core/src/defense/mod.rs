//! Defense system - Armor, magic resistance and the attack table

mod armor;
mod attack_table;
mod resistance;

pub use armor::{armor_damage_modifier, armor_reduction_percent};
pub use attack_table::AttackTable;
pub use resistance::{
    average_resist_multiplier, binary_hit_chance, partial_resist_thresholds, resist_coefficient,
    roll_partial_resist, PartialResistThresholds, ResistInput,
};
