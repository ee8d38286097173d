//! Fluent builder for constructing a [`Sim`].

use pf_agent::AgentPool;
use pf_core::{EventBuffer, SimConfig, SimRng, UnitRoll};
use pf_flow::FlowGraph;
use tracing::info;

use crate::{Sim, SimError, SimResult, Spawner};

/// XORed into the run seed for the spawn-decision stream so it does not
/// replay agent 0's stream.
const SPAWN_STREAM: u64 = 0x7370_6177_6e65_7221;

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`]: total ticks, seed, tick duration, …
/// - [`AgentPool`]: from [`pf_agent::AgentPoolBuilder`]
/// - [`FlowGraph`]: with every linked stage registered
///
/// # Optional inputs
///
/// | Method                | Default                                  |
/// |-----------------------|------------------------------------------|
/// | `.spawn_every(n)`     | No automatic spawns; use `Sim::spawn`    |
/// | `.roll_source(r)`     | Each agent's own seeded `AgentRng`       |
///
/// # Example
///
/// ```rust,ignore
/// let pool = AgentPoolBuilder::new(seed, StageKind::CheckIn).kind("std", profile, 20).build()?;
/// let mut flow = FlowGraph::from_order(&[StageKind::CheckIn, StageKind::Boarding])?;
/// flow.register(check_in)?;
/// flow.register(boarding)?;
/// let mut sim = SimBuilder::new(config, pool, flow).spawn_every(30).build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:         SimConfig,
    pool:           AgentPool,
    flow:           FlowGraph,
    spawn_interval: Option<u64>,
    rolls:          Option<Box<dyn UnitRoll>>,
}

impl SimBuilder {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, pool: AgentPool, flow: FlowGraph) -> Self {
        Self {
            config,
            pool,
            flow,
            spawn_interval: None,
            rolls:          None,
        }
    }

    /// Attempt one spawn every `ticks` ticks, starting with the first tick.
    pub fn spawn_every(mut self, ticks: u64) -> Self {
        self.spawn_interval = Some(ticks);
        self
    }

    /// Draw every service attempt from `rolls` instead of the per-agent RNGs.
    ///
    /// Attempts are resolved in ascending `AgentId` order within a tick, so
    /// a scripted source yields an exact, replayable run.
    pub fn roll_source<R: UnitRoll + 'static>(mut self, rolls: R) -> Self {
        self.rolls = Some(Box::new(rolls));
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        self.config.validate()?;
        self.flow.validate_registry()?;

        let spawner = match self.spawn_interval {
            Some(0) => {
                return Err(SimError::Config("spawn interval must be at least one tick".into()));
            }
            Some(n) => Some(Spawner::new(n)),
            None => None,
        };
        if self.pool.is_empty() {
            return Err(SimError::Config("agent pool is empty".into()));
        }

        info!(
            stages      = self.flow.order().len(),
            head        = %self.flow.head(),
            agents      = self.pool.len(),
            kinds       = self.pool.kind_count(),
            total_ticks = self.config.total_ticks,
            seed        = self.config.seed,
            "simulation built"
        );

        Ok(Sim {
            clock:   self.config.make_clock(),
            rng:     SimRng::new(self.config.seed ^ SPAWN_STREAM),
            config:  self.config,
            pool:    self.pool,
            flow:    self.flow,
            spawner,
            rolls:   self.rolls,
            events:  EventBuffer::new(),
            pending: Default::default(),
        })
    }
}
