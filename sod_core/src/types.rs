//! Core identifiers and bitmask types shared across the engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a unit (player, pet or target) inside a [`crate::sim::Simulation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub usize);

/// Index of a registered spell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpellId(pub usize);

/// Index of a registered aura
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AuraId(pub usize);

/// Index of a registered damage-over-time effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DotId(pub usize);

/// Game identifier of an action, as shown in logs and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ActionId {
    pub spell_id: u32,
    /// Distinguishes variants of the same spell (e.g. the DoT half of Moonfire)
    #[serde(default)]
    pub tag: u32,
}

impl ActionId {
    pub const fn spell(spell_id: u32) -> Self {
        ActionId { spell_id, tag: 0 }
    }

    pub const fn with_tag(self, tag: u32) -> Self {
        ActionId {
            spell_id: self.spell_id,
            tag,
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tag == 0 {
            write!(f, "{{SpellID: {}}}", self.spell_id)
        } else {
            write!(f, "{{SpellID: {}, Tag: {}}}", self.spell_id, self.tag)
        }
    }
}

/// Generates a `u32`-backed flag set with set operations
macro_rules! bitmask {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            pub const fn empty() -> Self {
                Self(0)
            }

            pub const fn bits(self) -> u32 {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// True if every flag in `other` is set
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// True if any flag in `other` is set
            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            pub const fn intersection(self, other: Self) -> Self {
                Self(self.0 & other.0)
            }

            pub const fn difference(self, other: Self) -> Self {
                Self(self.0 & !other.0)
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self::Output {
                self.union(rhs)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                *self = self.union(rhs);
            }
        }
    };
}

bitmask!(
    /// Magic school(s) of a spell. Multi-school spells use the weakest resistance.
    SpellSchool
);

impl SpellSchool {
    pub const PHYSICAL: Self = Self(1 << 0);
    pub const ARCANE: Self = Self(1 << 1);
    pub const FIRE: Self = Self(1 << 2);
    pub const FROST: Self = Self(1 << 3);
    pub const HOLY: Self = Self(1 << 4);
    pub const NATURE: Self = Self(1 << 5);
    pub const SHADOW: Self = Self(1 << 6);

    /// Number of distinct single schools, used to size per-school arrays
    pub const COUNT: usize = 7;

    /// Index of the lowest set school, for per-school multiplier arrays
    pub fn index(self) -> usize {
        if self.0 == 0 {
            0
        } else {
            self.0.trailing_zeros() as usize
        }
    }

    /// Every single school contained in this mask
    pub fn schools(self) -> impl Iterator<Item = SpellSchool> {
        (0..Self::COUNT)
            .map(|i| SpellSchool(1 << i))
            .filter(move |s| self.intersects(*s))
    }

    pub fn is_physical(self) -> bool {
        self == Self::PHYSICAL
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::PHYSICAL => "Physical",
            Self::ARCANE => "Arcane",
            Self::FIRE => "Fire",
            Self::FROST => "Frost",
            Self::HOLY => "Holy",
            Self::NATURE => "Nature",
            Self::SHADOW => "Shadow",
            _ => "Multi",
        }
    }
}

bitmask!(
    /// What kind of event a spell represents, used to filter proc triggers
    ProcMask
);

impl ProcMask {
    pub const MELEE_MH_AUTO: Self = Self(1 << 0);
    pub const MELEE_MH_SPECIAL: Self = Self(1 << 1);
    pub const SPELL_DAMAGE: Self = Self(1 << 2);
    pub const SPELL_PROC: Self = Self(1 << 3);
    pub const SPELL_HEALING: Self = Self(1 << 4);

    pub const MELEE: Self = Self::MELEE_MH_AUTO.union(Self::MELEE_MH_SPECIAL);
    pub const MELEE_WHITE_HIT: Self = Self::MELEE_MH_AUTO;
    pub const SPELL: Self = Self::SPELL_DAMAGE.union(Self::SPELL_PROC);
}

bitmask!(
    /// Behavioral flags attached to a spell
    SpellFlags
);

impl SpellFlags {
    /// All-or-nothing spell: no partial resists, resistance lowers hit chance instead
    pub const BINARY: Self = Self(1 << 0);
    pub const CHANNELED: Self = Self(1 << 1);
    /// DoT without an initial hit; resistance counts a tenth for partial resists
    pub const PURE_DOT: Self = Self(1 << 2);
    pub const IGNORE_RESISTS: Self = Self(1 << 3);
    pub const IGNORE_ARMOR: Self = Self(1 << 4);
    pub const NO_ON_CAST_COMPLETE: Self = Self(1 << 5);
    pub const NO_METRICS: Self = Self(1 << 6);
    /// Casting delays the caster's next melee swing until the cast ends
    pub const RESET_ATTACK_SWING: Self = Self(1 << 7);
    /// Consumes Clearcasting
    pub const OMEN: Self = Self(1 << 8);
    /// Awards a combo point
    pub const BUILDER: Self = Self(1 << 9);
    /// Spends combo points
    pub const FINISHER: Self = Self(1 << 10);
    pub const NO_LOGS: Self = Self(1 << 11);
}

bitmask!(
    /// Result of an attack table roll
    HitOutcome
);

impl HitOutcome {
    pub const MISS: Self = Self(1 << 0);
    pub const HIT: Self = Self(1 << 1);
    pub const CRIT: Self = Self(1 << 2);
    pub const GLANCE: Self = Self(1 << 3);
    pub const DODGE: Self = Self(1 << 4);
    pub const PARTIAL_1_4: Self = Self(1 << 5);
    pub const PARTIAL_2_4: Self = Self(1 << 6);
    pub const PARTIAL_3_4: Self = Self(1 << 7);
    pub const TICK: Self = Self(1 << 8);

    pub const PARTIAL: Self = Self::PARTIAL_1_4
        .union(Self::PARTIAL_2_4)
        .union(Self::PARTIAL_3_4);
    pub const LANDED: Self = Self::HIT.union(Self::CRIT).union(Self::GLANCE).union(Self::TICK);

    pub fn landed(self) -> bool {
        self.intersects(Self::LANDED)
    }

    pub fn did_crit(self) -> bool {
        self.intersects(Self::CRIT)
    }

    pub fn did_glance(self) -> bool {
        self.intersects(Self::GLANCE)
    }

    pub fn label(self) -> &'static str {
        if self.contains(Self::MISS) {
            "Miss"
        } else if self.contains(Self::DODGE) {
            "Dodge"
        } else if self.contains(Self::CRIT) {
            "Crit"
        } else if self.contains(Self::GLANCE) {
            "Glance"
        } else if self.contains(Self::TICK) {
            "Tick"
        } else {
            "Hit"
        }
    }
}
