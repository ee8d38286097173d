//! `FlowGraph`: stage links, the live stage registry, and the completion
//! dispatcher.
//!
//! The links are fixed at construction and validated: exactly one head, no
//! cycles, one terminal.  The registry (which stage *instances* exist) is
//! mutable at runtime; a stage that is linked but not registered makes any
//! agent routed towards it unroutable.

use std::collections::HashSet;

use pf_agent::AgentPool;
use pf_core::{AgentId, EventBuffer, EventKind, StageKind, Tick};
use pf_stage::Stage;
use tracing::{debug, warn};

use crate::{CompletionListener, FlowError, FlowResult, StageCompletion};

#[cfg(feature = "fx-hash")]
type StageMap<V> = rustc_hash::FxHashMap<StageKind, V>;
#[cfg(not(feature = "fx-hash"))]
type StageMap<V> = std::collections::HashMap<StageKind, V>;

/// What happened to an agent handed to [`FlowGraph::on_agent_finished`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Handoff {
    /// Re-enqueued at the given stage.
    Routed(StageKind),
    /// Past the terminal stage: `DoneAll` and back in the pool.
    Finished,
}

/// Outcome of one stage's completion sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Agents removed from a service slot.
    pub completed:  usize,
    /// Agents that moved on to another stage.
    pub routed:     usize,
    /// Agents that left the terminal stage.
    pub finished:   usize,
    /// Agents admitted into freed slots during the sweep.
    pub backfilled: usize,
    /// Routing failures; each agent listed here was dropped and reclaimed.
    pub unroutable: Vec<FlowError>,
}

impl SweepReport {
    /// Fold `other` into `self`.
    pub fn merge(&mut self, other: SweepReport) {
        self.completed  += other.completed;
        self.routed     += other.routed;
        self.finished   += other.finished;
        self.backfilled += other.backfilled;
        self.unroutable.extend(other.unroutable);
    }
}

/// A linear stage pipeline and the stages currently serving it.
pub struct FlowGraph {
    /// `stage -> successor`.  The terminal stage has no entry.
    links:     StageMap<StageKind>,
    /// Stages in chain order, head first.
    order:     Vec<StageKind>,
    stages:    StageMap<Stage>,
    listeners: Vec<Box<dyn CompletionListener>>,
}

impl FlowGraph {
    // ── Construction ──────────────────────────────────────────────────────

    /// Build a chain that visits `order` front to back.
    ///
    /// Listing a stage twice would make it its own ancestor and is reported
    /// as a cycle.
    pub fn from_order(order: &[StageKind]) -> FlowResult<Self> {
        let Some(&head) = order.first() else {
            return Err(FlowError::EmptyOrder);
        };
        let mut seen = HashSet::with_capacity(order.len());
        for &stage in order {
            if !seen.insert(stage) {
                return Err(FlowError::Cycle { stage });
            }
        }
        let links = order.windows(2).map(|w| (w[0], w[1])).collect();
        debug!(%head, len = order.len(), "stage chain built");
        Ok(Self::with_links(links, order.to_vec()))
    }

    /// Build from explicit `(stage, successor)` links.  `None` marks the
    /// terminal stage; a stage that only ever appears as a successor is
    /// terminal too.
    ///
    /// The links must form a single chain: one head, no cycles, every stage
    /// reachable from the head.
    pub fn from_links<I>(links: I) -> FlowResult<Self>
    where
        I: IntoIterator<Item = (StageKind, Option<StageKind>)>,
    {
        let mut map: StageMap<StageKind> = StageMap::default();
        let mut declared: Vec<StageKind> = Vec::new();
        let mut nodes: Vec<StageKind> = Vec::new();
        let mut targets: HashSet<StageKind> = HashSet::new();

        for (stage, next) in links {
            if declared.contains(&stage) {
                return Err(FlowError::DuplicateLink { stage });
            }
            declared.push(stage);
            push_unique(&mut nodes, stage);
            if let Some(next) = next {
                if next == stage {
                    return Err(FlowError::Cycle { stage });
                }
                map.insert(stage, next);
                targets.insert(next);
                push_unique(&mut nodes, next);
            }
        }
        if nodes.is_empty() {
            return Err(FlowError::EmptyOrder);
        }

        let mut heads: Vec<StageKind> = nodes.iter().copied().filter(|s| !targets.contains(s)).collect();
        heads.sort();
        if heads.len() > 1 {
            return Err(FlowError::MultipleHeads { heads });
        }
        let Some(&head) = heads.first() else {
            // Every node has a predecessor: the whole graph is a loop.
            let mut sorted = nodes.clone();
            sorted.sort();
            return Err(FlowError::Cycle { stage: sorted[0] });
        };

        let mut order = vec![head];
        let mut cursor = head;
        while let Some(&next) = map.get(&cursor) {
            if order.contains(&next) {
                return Err(FlowError::Cycle { stage: next });
            }
            order.push(next);
            cursor = next;
        }

        // With a single head, anything not on its chain sits in a detached
        // loop.
        let mut stray: Vec<StageKind> = nodes.into_iter().filter(|s| !order.contains(s)).collect();
        stray.sort();
        if let Some(&stage) = stray.first() {
            return Err(FlowError::Cycle { stage });
        }

        debug!(%head, len = order.len(), "stage chain built");
        Ok(Self::with_links(map, order))
    }

    fn with_links(links: StageMap<StageKind>, order: Vec<StageKind>) -> Self {
        Self {
            links,
            order,
            stages:    StageMap::default(),
            listeners: Vec::new(),
        }
    }

    // ── Topology ──────────────────────────────────────────────────────────

    /// Successor of `stage`, or `None` if it is terminal (or not linked).
    #[inline]
    pub fn next(&self, stage: StageKind) -> Option<StageKind> {
        self.links.get(&stage).copied()
    }

    /// First stage of the chain.  Every new agent starts here.
    #[inline]
    pub fn head(&self) -> StageKind {
        self.order[0]
    }

    /// Last stage of the chain.
    #[inline]
    pub fn terminal(&self) -> StageKind {
        self.order[self.order.len() - 1]
    }

    /// All linked stages, head first.
    pub fn order(&self) -> &[StageKind] {
        &self.order
    }

    pub fn is_linked(&self, stage: StageKind) -> bool {
        self.order.contains(&stage)
    }

    // ── Registry ──────────────────────────────────────────────────────────

    /// Add a stage instance.  Its kind must be part of the chain and not
    /// already registered.
    pub fn register(&mut self, stage: Stage) -> FlowResult<()> {
        let kind = stage.kind();
        if !self.is_linked(kind) {
            return Err(FlowError::NotInGraph { stage: kind });
        }
        if self.stages.contains_key(&kind) {
            return Err(FlowError::DuplicateStage { stage: kind });
        }
        debug!(stage = %kind, capacity = stage.capacity(), "stage registered");
        self.stages.insert(kind, stage);
        Ok(())
    }

    /// Remove and return the instance for `kind`.  The caller owns whatever
    /// agents were still queued or in service there.
    pub fn deregister(&mut self, kind: StageKind) -> Option<Stage> {
        let stage = self.stages.remove(&kind)?;
        debug!(stage = %kind, "stage deregistered");
        Some(stage)
    }

    /// Fail with `Unregistered` for the first linked stage that has no
    /// instance.
    pub fn validate_registry(&self) -> FlowResult<()> {
        match self.order.iter().find(|&k| !self.stages.contains_key(k)) {
            Some(&stage) => Err(FlowError::Unregistered { stage }),
            None => Ok(()),
        }
    }

    pub fn stage_instance(&self, kind: StageKind) -> Option<&Stage> {
        self.stages.get(&kind)
    }

    pub fn stage_instance_mut(&mut self, kind: StageKind) -> Option<&mut Stage> {
        self.stages.get_mut(&kind)
    }

    /// Registered stages in chain order.
    pub fn stages(&self) -> impl Iterator<Item = &Stage> + '_ {
        self.order.iter().filter_map(|k| self.stages.get(k))
    }

    // ── Listeners ─────────────────────────────────────────────────────────

    pub fn subscribe<L: CompletionListener + 'static>(&mut self, listener: L) {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // ── Routing ───────────────────────────────────────────────────────────

    /// Send a freshly spawned agent to the head stage.
    pub fn enter(&mut self, agent: AgentId, pool: &mut AgentPool, events: &mut EventBuffer) -> FlowResult<StageKind> {
        self.route_to(agent, self.head(), pool, events)
    }

    /// The single dispatch point for an agent that just left a service slot.
    ///
    /// - Terminal stage: the agent becomes `DoneAll` and is reclaimed.
    /// - Otherwise the agent moves to the successor's entry point and joins
    ///   the back of its queue; queue slots there are refreshed at once.
    /// - Successor not registered: the agent is dropped and reclaimed, and
    ///   `Unroutable` is returned.
    pub fn on_agent_finished(
        &mut self,
        agent:  AgentId,
        pool:   &mut AgentPool,
        events: &mut EventBuffer,
    ) -> FlowResult<Handoff> {
        let current = pool.agents[agent.index()].current_stage();
        match self.next(current) {
            Some(next) => self.route_to(agent, next, pool, events).map(Handoff::Routed),
            None => {
                pool.agents[agent.index()].finish_all();
                events.push(agent, EventKind::DoneAll);
                pool.reclaim(agent);
                events.push(agent, EventKind::Reclaimed);
                Ok(Handoff::Finished)
            }
        }
    }

    fn route_to(
        &mut self,
        agent:  AgentId,
        target: StageKind,
        pool:   &mut AgentPool,
        events: &mut EventBuffer,
    ) -> FlowResult<StageKind> {
        let Some(stage) = self.stages.get_mut(&target) else {
            warn!(%agent, stage = %target, "no instance for next stage; dropping agent");
            events.push(agent, EventKind::Dropped { stage: target });
            pool.reclaim(agent);
            events.push(agent, EventKind::Reclaimed);
            return Err(FlowError::Unroutable { agent, stage: target });
        };

        let a = &mut pool.agents[agent.index()];
        a.begin_moving(target, stage.entry_point());
        events.push(agent, EventKind::Moving { stage: target, position: stage.entry_point() });
        stage.enqueue(a, events);
        stage.refresh_positions(&mut pool.agents, events);
        Ok(target)
    }

    // ── Per-tick phases ───────────────────────────────────────────────────

    /// Admission and queue-slot refresh for every registered stage, in chain
    /// order.  Returns the number of agents admitted.
    pub fn admit_all(&mut self, pool: &mut AgentPool, events: &mut EventBuffer) -> usize {
        let mut admitted = 0;
        for kind in &self.order {
            if let Some(stage) = self.stages.get_mut(kind) {
                admitted += stage.admit(&mut pool.agents, events);
                stage.refresh_positions(&mut pool.agents, events);
            }
        }
        admitted
    }

    /// Completion sweep of one stage.
    ///
    /// For each finished agent, in active-set order: notify listeners, route
    /// it (fully, including any enqueue downstream), then backfill the freed
    /// slot from this stage's queue and close up the queue behind it.  A
    /// stage that is not registered sweeps nothing.
    pub fn sweep(&mut self, kind: StageKind, tick: Tick, pool: &mut AgentPool, events: &mut EventBuffer) -> SweepReport {
        let mut report = SweepReport::default();
        let next = self.next(kind);
        let mut cursor = 0;

        loop {
            let Some(stage) = self.stages.get_mut(&kind) else { break };
            let Some(agent) = stage.take_completed(&pool.agents, &mut cursor) else { break };
            report.completed += 1;

            let a = &pool.agents[agent.index()];
            let completion = StageCompletion {
                tick,
                agent,
                agent_kind: a.kind(),
                stage: kind,
                next,
                attempts: a.attempts(),
            };
            events.push(agent, EventKind::StageCompleted { stage: kind, next });
            for listener in &mut self.listeners {
                listener.on_stage_completed(&completion);
            }

            match self.on_agent_finished(agent, pool, events) {
                Ok(Handoff::Routed(_)) => report.routed += 1,
                Ok(Handoff::Finished) => report.finished += 1,
                Err(e) => report.unroutable.push(e),
            }

            if let Some(stage) = self.stages.get_mut(&kind) {
                if stage.backfill(&mut pool.agents, events).is_some() {
                    report.backfilled += 1;
                    stage.refresh_positions(&mut pool.agents, events);
                }
            }
        }
        report
    }

    /// Completion sweep of every registered stage, in chain order.
    pub fn sweep_all(&mut self, tick: Tick, pool: &mut AgentPool, events: &mut EventBuffer) -> SweepReport {
        let mut report = SweepReport::default();
        for i in 0..self.order.len() {
            let kind = self.order[i];
            report.merge(self.sweep(kind, tick, pool, events));
        }
        report
    }

    // ── Inspection ────────────────────────────────────────────────────────

    /// Agents waiting in any stage's queue.
    pub fn total_queued(&self) -> usize {
        self.stages.values().map(Stage::queue_len).sum()
    }

    /// Agents occupying any stage's service slots.
    pub fn total_in_service(&self) -> usize {
        self.stages.values().map(Stage::active_len).sum()
    }
}

fn push_unique(v: &mut Vec<StageKind>, stage: StageKind) {
    if !v.contains(&stage) {
        v.push(stage);
    }
}
