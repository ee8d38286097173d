//! The `Stage` scheduler.

use std::collections::VecDeque;

use pf_agent::Agent;
use pf_core::{AgentId, EventBuffer, EventKind, StageKind};

use crate::{QueueLayout, ServiceOverride, StageError, StageResult};

/// Running counters for one stage.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StageStats {
    /// Agents promoted from the queue into a service slot.
    pub admitted:   u64,
    /// Agents handed out by the completion sweep.
    pub completed:  u64,
    /// Longest wait queue observed.
    pub peak_queue: usize,
}

/// A service point with a FIFO wait queue and `capacity` service slots.
///
/// # Invariants
///
/// - `active.len() <= capacity` at all times.
/// - An agent is in at most one of `queue` / `active`.
/// - Queue order is arrival order; admission always takes the head.
///
/// The stage stores only `AgentId`s.  Methods that need to mutate an agent
/// borrow the pool's agent slice for the duration of the call.
#[derive(Debug)]
pub struct Stage {
    kind:     StageKind,
    capacity: usize,
    layout:   QueueLayout,
    service:  ServiceOverride,
    queue:    VecDeque<AgentId>,
    active:   Vec<AgentId>,
    stats:    StageStats,
}

impl Stage {
    /// Create an empty stage.  A capacity of zero is rejected.
    pub fn new(kind: StageKind, capacity: usize, layout: QueueLayout) -> StageResult<Self> {
        if capacity == 0 {
            return Err(StageError::ZeroCapacity(kind));
        }
        Ok(Self {
            kind,
            capacity,
            layout,
            service:  ServiceOverride::default(),
            queue:    VecDeque::new(),
            active:   Vec::with_capacity(capacity),
            stats:    StageStats::default(),
        })
    }

    /// Replace the visiting agents' service parameters at this stage.
    pub fn with_service(mut self, service: ServiceOverride) -> StageResult<Self> {
        service
            .validate()
            .map_err(|source| StageError::InvalidService { stage: self.kind, source })?;
        self.service = service;
        Ok(self)
    }

    // ── Arrivals ──────────────────────────────────────────────────────────

    /// Append `agent` to the tail of the wait queue.  Never refuses.
    pub fn enqueue(&mut self, agent: &mut Agent, events: &mut EventBuffer) {
        let id = agent.id();
        debug_assert!(!self.contains(id), "{id} enqueued twice at {}", self.kind);
        self.queue.push_back(id);
        let place = self.queue.len() - 1;
        agent.join_queue(place);
        self.stats.peak_queue = self.stats.peak_queue.max(self.queue.len());
        events.push(id, EventKind::Enqueued { stage: self.kind, place });
    }

    // ── ① Admission ───────────────────────────────────────────────────────

    /// Promote queue heads into free slots.  Returns the number admitted.
    pub fn admit(&mut self, agents: &mut [Agent], events: &mut EventBuffer) -> usize {
        let mut admitted = 0;
        while self.backfill(agents, events).is_some() {
            admitted += 1;
        }
        admitted
    }

    /// Admit at most one agent, if a slot is free and the queue is not empty.
    pub fn backfill(&mut self, agents: &mut [Agent], events: &mut EventBuffer) -> Option<AgentId> {
        if self.active.len() >= self.capacity {
            return None;
        }
        let id = self.queue.pop_front()?;
        let agent = &mut agents[id.index()];
        let service = self.service.apply(agent.profile());
        agent.start_processing(service);
        self.active.push(id);
        self.stats.admitted += 1;
        events.push(id, EventKind::Processing { stage: self.kind });
        Some(id)
    }

    // ── ② Queue positions ─────────────────────────────────────────────────

    /// Reassign every queued agent's place and slot position, in queue
    /// order.  Only agents whose slot actually changed produce an event.
    pub fn refresh_positions(&self, agents: &mut [Agent], events: &mut EventBuffer) {
        for (place, &id) in self.queue.iter().enumerate() {
            let position = self.layout.slot(place);
            if agents[id.index()].set_queue_slot(place, position) {
                events.push(id, EventKind::Positioned { stage: self.kind, place, position });
            }
        }
    }

    // ── ③ Completion ──────────────────────────────────────────────────────

    /// Flag `agent` as finished with this stage.
    ///
    /// Only marks the agent; removal and routing happen in the next
    /// completion sweep.  Returns `false` (and does nothing) if the agent is
    /// not in one of this stage's service slots.
    pub fn mark_done(&self, agent: &mut Agent) -> bool {
        if !self.active.contains(&agent.id()) {
            return false;
        }
        agent.complete_stage();
        true
    }

    /// Remove and return the next finished agent at or after `*cursor` in
    /// the active set.
    ///
    /// The sweep calls this repeatedly with the same cursor, routing each
    /// returned agent and calling [`backfill`](Self::backfill) in between.
    pub fn take_completed(&mut self, agents: &[Agent], cursor: &mut usize) -> Option<AgentId> {
        while *cursor < self.active.len() {
            let id = self.active[*cursor];
            if agents[id.index()].stage_complete() {
                self.active.remove(*cursor);
                self.stats.completed += 1;
                return Some(id);
            }
            *cursor += 1;
        }
        None
    }

    /// Empty the stage, returning queued agents (in order) followed by
    /// active ones.
    pub fn drain(&mut self) -> Vec<AgentId> {
        let mut all: Vec<AgentId> = self.queue.drain(..).collect();
        all.append(&mut self.active);
        all
    }

    // ── Inspection ────────────────────────────────────────────────────────

    #[inline]
    pub fn kind(&self) -> StageKind {
        self.kind
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn layout(&self) -> &QueueLayout {
        &self.layout
    }

    pub fn service(&self) -> &ServiceOverride {
        &self.service
    }

    #[inline]
    pub fn entry_point(&self) -> pf_core::Point3 {
        self.layout.entry_point
    }

    pub fn stats(&self) -> StageStats {
        self.stats
    }

    /// Waiting agents, head first.
    pub fn queued(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.queue.iter().copied()
    }

    /// Agents in service, in admission order.
    pub fn active(&self) -> &[AgentId] {
        &self.active
    }

    #[inline]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn free_slots(&self) -> usize {
        self.capacity - self.active.len()
    }

    /// `true` if `agent` is queued or in service here.
    pub fn contains(&self, agent: AgentId) -> bool {
        self.active.contains(&agent) || self.queue.contains(&agent)
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.active.is_empty()
    }
}
