//! The `Sim` struct and its tick loop.

use pf_agent::AgentPool;
use pf_core::{AgentId, AgentKindId, EventBuffer, EventKind, SimClock, SimConfig, SimRng, StageKind, Tick, UnitRoll};
use pf_flow::{FlowError, FlowGraph};
use pf_stage::Stage;
use tracing::warn;

use crate::spawner::{self, SpawnOutcome};
use crate::{SimError, SimObserver, SimResult, Spawner, TickSummary};

/// Counters and routing failures raised between ticks, reported with the
/// next tick's summary.
#[derive(Debug, Default)]
pub(crate) struct Pending {
    spawned:    usize,
    dropped:    usize,
    unroutable: Vec<FlowError>,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim` owns every piece of state (pool, stage graph, spawner, RNG) and
/// drives the five-phase tick loop described in the crate docs.  Nothing is
/// reached through globals: stages and the spawner get the pool and graph
/// passed in explicitly for each call.
///
/// Create via [`SimBuilder`][crate::SimBuilder] or
/// [`Scenario::builder`][crate::Scenario::builder].
pub struct Sim {
    /// Global configuration (total ticks, seed, tick duration, …).
    pub config: SimConfig,

    /// Simulation clock.  Tracks the current tick and maps to wall time.
    pub clock: SimClock,

    /// Every agent, active or not.
    pub pool: AgentPool,

    /// Stage links and the live stage registry.
    pub flow: FlowGraph,

    /// Automatic spawning; `None` means agents only enter via [`Sim::spawn`].
    pub spawner: Option<Spawner>,

    /// Simulation-level RNG (spawn kind choice).
    pub rng: SimRng,

    pub(crate) rolls:   Option<Box<dyn UnitRoll>>,
    pub(crate) events:  EventBuffer,
    pub(crate) pending: Pending,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Process one tick, deliver its events, and advance the clock.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickSummary> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        let summary = self.process_tick(now)?;

        for event in self.events.drain() {
            observer.on_event(now, &event);
        }
        for error in self.pending.unroutable.drain(..) {
            observer.on_unroutable(now, &error);
        }
        observer.on_tick_end(now, &summary);
        if self.config.output_interval_ticks > 0
            && now.0.is_multiple_of(self.config.output_interval_ticks)
        {
            observer.on_snapshot(now, &self.pool, &self.flow);
        }

        self.clock.advance();
        Ok(summary)
    }

    /// The tick that the next [`step`](Self::step) will process.
    #[inline]
    pub fn now(&self) -> Tick {
        self.clock.current_tick
    }

    /// Activate the lowest free agent of `kind` and queue it at the head
    /// stage immediately, outside the spawn cadence.
    ///
    /// Returns `Ok(None)` if every agent of that kind is busy.  A missing
    /// head stage drops the agent again and reports the routing miss.
    pub fn spawn(&mut self, kind: AgentKindId) -> SimResult<Option<AgentId>> {
        if kind.index() >= self.pool.kind_count() {
            return Err(SimError::Config(format!("unknown agent kind {}", kind.0)));
        }
        match spawner::spawn(kind, &mut self.pool, &mut self.flow, &mut self.events) {
            SpawnOutcome::Spawned(agent) => {
                self.pending.spawned += 1;
                Ok(Some(agent))
            }
            SpawnOutcome::Dropped(error) => {
                self.pending.spawned += 1;
                self.pending.dropped += 1;
                self.pending.unroutable.push(error.clone());
                Err(error.into())
            }
            SpawnOutcome::Exhausted(_) | SpawnOutcome::NotDue => Ok(None),
        }
    }

    /// Register a stage while the simulation is running.
    pub fn add_stage(&mut self, stage: Stage) -> SimResult<()> {
        self.flow.register(stage)?;
        Ok(())
    }

    /// Remove a stage while the simulation is running.
    ///
    /// Every agent still queued or in service there is dropped and returned
    /// to the pool.  Returns those agents (queue order, then service order),
    /// or `None` if no such stage was registered.  Agents later routed to
    /// `kind` take the routing-miss path.
    pub fn remove_stage(&mut self, kind: StageKind) -> Option<Vec<AgentId>> {
        let mut stage = self.flow.deregister(kind)?;
        let dropped = stage.drain();
        for &agent in &dropped {
            self.events.push(agent, EventKind::Dropped { stage: kind });
            self.pool.reclaim(agent);
            self.events.push(agent, EventKind::Reclaimed);
        }
        if !dropped.is_empty() {
            warn!(stage = %kind, dropped = dropped.len(), "stage removed while occupied; agents dropped");
        }
        self.pending.dropped += dropped.len();
        Some(dropped)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick(&mut self, now: Tick) -> SimResult<TickSummary> {
        let mut summary = TickSummary {
            tick:    now,
            spawned: std::mem::take(&mut self.pending.spawned),
            dropped: std::mem::take(&mut self.pending.dropped),
            ..TickSummary::default()
        };

        // ── Phase 1: spawn ────────────────────────────────────────────────
        if let Some(spawner) = self.spawner.as_mut() {
            match spawner.tick(&mut self.pool, &mut self.flow, &mut self.rng, &mut self.events) {
                SpawnOutcome::Spawned(_) => summary.spawned += 1,
                SpawnOutcome::Dropped(error) => {
                    summary.spawned += 1;
                    summary.dropped += 1;
                    self.pending.unroutable.push(error);
                }
                SpawnOutcome::Exhausted(_) | SpawnOutcome::NotDue => {}
            }
        }

        // ── Phase 2: admission + queue slots, every stage ─────────────────
        //
        // All stages admit before any stage sweeps, so a slot freed by this
        // tick's sweep is backfilled by the sweep itself, not next tick.
        summary.admitted = self.flow.admit_all(&mut self.pool, &mut self.events);

        // ── Phase 3: completion sweep, every stage ────────────────────────
        let report = self.flow.sweep_all(now, &mut self.pool, &mut self.events);
        summary.admitted  += report.backfilled;
        summary.completed  = report.completed;
        summary.finished   = report.finished;
        summary.dropped   += report.unroutable.len();
        self.pending.unroutable.extend(report.unroutable);

        // ── Phase 4: attempt timers ───────────────────────────────────────
        let (attempts, successes) = self.attempt_phase();
        summary.attempts  = attempts;
        summary.successes = successes;

        summary.active     = self.pool.total_active();
        summary.queued     = self.flow.total_queued();
        summary.in_service = self.flow.total_in_service();
        Ok(summary)
    }

    /// Tick every agent's attempt timer in ascending `AgentId` order.
    ///
    /// A success only marks the agent done at its stage; the next tick's
    /// sweep routes it.
    fn attempt_phase(&mut self) -> (usize, usize) {
        let mut attempts  = 0;
        let mut successes = 0;

        let (agents, rngs) = self.pool.split_mut();
        for agent in agents.iter_mut() {
            let id = agent.id();
            let outcome = match self.rolls.as_deref_mut() {
                Some(rolls) => agent.tick(rolls),
                None => agent.tick(rngs.get_mut(id)),
            };
            let Some(attempt) = outcome else { continue };
            attempts += 1;

            let stage = agent.current_stage();
            self.events.push(id, EventKind::Attempt {
                stage,
                roll:    attempt.roll,
                chance:  attempt.chance,
                success: attempt.success,
            });
            if attempt.success {
                successes += 1;
                if let Some(s) = self.flow.stage_instance(stage) {
                    s.mark_done(agent);
                }
            }
        }
        (attempts, successes)
    }
}
