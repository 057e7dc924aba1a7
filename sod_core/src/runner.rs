//! SimRunner - Runs many seeded iterations and aggregates the results

use crate::config::{default_constants, CombatConstants, SimConfig};
use crate::error::Result;
use crate::metrics::SimResult;
use crate::sim::Simulation;
use crate::types::UnitId;
use tracing::{debug, info, info_span};

#[derive(Debug, Clone)]
pub struct SimRunner {
    config: SimConfig,
    constants: CombatConstants,
}

impl SimRunner {
    pub fn new(config: SimConfig) -> Self {
        SimRunner {
            config,
            constants: default_constants(),
        }
    }

    pub fn with_constants(mut self, constants: CombatConstants) -> Self {
        self.constants = constants;
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run every iteration with seed `config.seed + i`
    ///
    /// `build` populates a fresh simulation and returns the player whose
    /// damage is measured. With `capture_log`, the first iteration's combat
    /// log is attached to the result.
    pub fn run<F>(&self, build: F) -> Result<SimResult>
    where
        F: Fn(&mut Simulation) -> Result<UnitId>,
    {
        self.config.validate()?;
        let iterations = self.config.iterations;
        let span = info_span!("simulation", iterations, seed = self.config.seed);
        let _enter = span.enter();

        let mut results = Vec::with_capacity(iterations as usize);
        let mut log = None;
        for i in 0..iterations {
            let seed = self.config.seed.wrapping_add(u64::from(i));
            let mut sim = Simulation::new(seed, &self.config.encounter, self.constants.clone());
            if i == 0 && self.config.capture_log {
                sim.enable_log();
            }
            let player = build(&mut sim)?;
            sim.run();

            let result = sim.iteration_result(player);
            debug!(iteration = i, seed, dps = result.dps, "iteration complete");
            if i == 0 {
                log = sim.take_log().map(|l| l.into_entries());
            }
            results.push(result);
        }

        let result = SimResult::aggregate(&results, log);
        info!(
            iterations,
            dps = result.dps.mean,
            stdev = result.dps.stdev,
            "simulation complete"
        );
        Ok(result)
    }
}
