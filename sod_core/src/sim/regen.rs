//! Periodic mana and energy regeneration

use super::{Event, Simulation};
use crate::stats::Stat;
use std::time::Duration;

impl Simulation {
    fn regen_tick_length(&self) -> Duration {
        Duration::from_secs_f64(self.constants.regen.tick_seconds.max(0.1))
    }

    /// Time of the next mana/energy tick after now
    ///
    /// Ticks fall on whole multiples of the tick length from the pull.
    pub fn next_resource_tick(&self) -> Duration {
        let tick = self.regen_tick_length();
        let elapsed = (self.now().as_secs_f64() / tick.as_secs_f64()).floor() as u32;
        tick * (elapsed + 1)
    }

    pub(crate) fn schedule_resource_tick(&mut self) {
        let at = self.next_resource_tick();
        self.schedule(at, Event::ResourceTick);
    }

    pub(crate) fn handle_resource_tick(&mut self) {
        let now = self.now();
        let window = Duration::from_secs_f64(self.constants.regen.five_second_rule);
        let energy = self.constants.regen.energy_per_tick;
        let tick_seconds = self.constants.regen.tick_seconds;

        for unit in self.units.iter_mut().filter(|u| !u.is_enemy()) {
            if unit.max_mana() > 0.0 {
                let mp5 = unit.stat(Stat::Mp5) * tick_seconds / 5.0;
                if mp5 > 0.0 {
                    unit.add_mana(mp5, "MP5");
                }
                if unit.mana.outside_five_second_rule(now, window) {
                    let profile = &unit.profile;
                    let mut regen = profile.spirit_regen_base;
                    if profile.spirit_regen_divisor > 0.0 {
                        regen += unit.stat(Stat::Spirit) / profile.spirit_regen_divisor;
                    }
                    if regen > 0.0 {
                        unit.add_mana(regen, "Spirit Regen");
                    }
                }
            }
            if unit.energy.is_some() {
                unit.add_energy(energy, "Energy Regen");
            }
        }
        self.schedule_resource_tick();
    }
}
