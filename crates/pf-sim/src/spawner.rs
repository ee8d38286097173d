//! Fixed-cadence agent activation.

use pf_agent::AgentPool;
use pf_core::{AgentId, AgentKindId, EventBuffer, EventKind, SimRng};
use pf_flow::{FlowError, FlowGraph};
use tracing::debug;

/// Result of one spawner tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// Between spawn cadence points.
    NotDue,
    /// Every agent of the chosen kind is busy; the attempt is skipped.
    Exhausted(AgentKindId),
    /// Activated and queued at the head stage.
    Spawned(AgentId),
    /// Activated, but the head stage has no instance; already reclaimed.
    Dropped(FlowError),
}

/// Activates one pooled agent every `interval_ticks` ticks.
///
/// The countdown starts at zero, so the first attempt happens on the first
/// tick.  Skipped attempts are not carried over.
#[derive(Clone, Debug)]
pub struct Spawner {
    interval_ticks: u64,
    countdown:      u64,
    spawned:        u64,
    skipped:        u64,
}

impl Spawner {
    /// `interval_ticks` is clamped to at least one.
    pub fn new(interval_ticks: u64) -> Self {
        Self {
            interval_ticks: interval_ticks.max(1),
            countdown:      0,
            spawned:        0,
            skipped:        0,
        }
    }

    pub fn interval_ticks(&self) -> u64 {
        self.interval_ticks
    }

    /// Successful spawns so far.
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    /// Attempts skipped because the chosen kind was exhausted.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Advance the cadence by one tick and spawn if due.
    pub fn tick(
        &mut self,
        pool:   &mut AgentPool,
        flow:   &mut FlowGraph,
        rng:    &mut SimRng,
        events: &mut EventBuffer,
    ) -> SpawnOutcome {
        if self.countdown > 0 {
            self.countdown -= 1;
            return SpawnOutcome::NotDue;
        }
        self.countdown = self.interval_ticks - 1;

        let kind = pick_kind(pool, rng);
        let outcome = spawn(kind, pool, flow, events);
        match outcome {
            SpawnOutcome::Exhausted(kind) => {
                self.skipped += 1;
                debug!(kind = kind.0, "spawn skipped: pool exhausted");
            }
            SpawnOutcome::Spawned(_) | SpawnOutcome::Dropped(_) => self.spawned += 1,
            SpawnOutcome::NotDue => {}
        }
        outcome
    }
}

/// Uniform choice among the pool's kinds; no draw when there is only one.
fn pick_kind(pool: &AgentPool, rng: &mut SimRng) -> AgentKindId {
    match pool.kind_count() {
        0 | 1 => AgentKindId(0),
        n => AgentKindId(rng.pick(n) as u16),
    }
}

/// Activate the lowest free agent of `kind`, reset it, and route it to the
/// head stage.
pub(crate) fn spawn(
    kind:   AgentKindId,
    pool:   &mut AgentPool,
    flow:   &mut FlowGraph,
    events: &mut EventBuffer,
) -> SpawnOutcome {
    let Some(agent) = pool.acquire(kind) else {
        return SpawnOutcome::Exhausted(kind);
    };
    pool.agents[agent.index()].reset(flow.head());
    events.push(agent, EventKind::Spawned { kind });
    match flow.enter(agent, pool, events) {
        Ok(_) => SpawnOutcome::Spawned(agent),
        Err(e) => SpawnOutcome::Dropped(e),
    }
}
