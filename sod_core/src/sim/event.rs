//! Scheduled events and their queue ordering

use super::Simulation;
use crate::types::{AuraId, DotId, UnitId};
use std::cmp::Ordering;
use std::time::Duration;

pub(crate) enum Event {
    AuraExpire { aura: AuraId, generation: u64 },
    DotTick { dot: DotId, generation: u64 },
    CastComplete { unit: UnitId },
    /// Deferred effect, e.g. a projectile landing
    Delayed(Box<dyn FnOnce(&mut Simulation)>),
    UnitReady { unit: UnitId, generation: u64 },
    ResourceTick,
    AutoAttack { unit: UnitId, generation: u64 },
}

impl Event {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Event::AuraExpire { .. } => "aura_expire",
            Event::DotTick { .. } => "dot_tick",
            Event::CastComplete { .. } => "cast_complete",
            Event::Delayed(_) => "delayed",
            Event::UnitReady { .. } => "unit_ready",
            Event::ResourceTick => "resource_tick",
            Event::AutoAttack { .. } => "auto_attack",
        }
    }
}

/// Queue entry; earlier time first, then insertion order
pub(crate) struct Scheduled {
    pub at: Duration,
    pub seq: u64,
    pub event: Event,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed so the max-heap pops the earliest event
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
