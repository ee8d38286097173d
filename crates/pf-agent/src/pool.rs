//! Fixed-size agent storage: `AgentPool` (agents + free lists) and `AgentRngs`.
//!
//! # Why a separate `AgentRngs`?
//!
//! The attempt phase needs `&mut Agent` and `&mut AgentRng` for the same
//! index at the same time.  Keeping RNGs in their own `Vec` lets the caller
//! split-borrow them:
//!
//! ```ignore
//! let (agents, rngs) = pool.split_mut();
//! for agent in agents.iter_mut() {
//!     agent.tick(rngs.get_mut(agent.id()));
//! }
//! ```
//!
//! # Free lists
//!
//! Each kind keeps a `BTreeSet` of its inactive agent IDs.  `acquire` takes
//! the lowest ID, which is exactly what a front-to-back scan for the first
//! inactive agent would return, at O(log n) instead of O(n).

use std::collections::BTreeSet;

use pf_core::{AgentId, AgentKindId, AgentRng};
use tracing::debug;

use crate::{Agent, ServiceProfile};

// ── AgentRngs ─────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG state, indexed by `AgentId`.
pub struct AgentRngs {
    pub inner: Vec<AgentRng>,
}

impl AgentRngs {
    /// Allocate and seed `count` per-agent RNGs from `global_seed`.
    pub(crate) fn new(count: usize, global_seed: u64) -> Self {
        let inner = (0..count as u32)
            .map(|i| AgentRng::new(global_seed, AgentId(i)))
            .collect();
        Self { inner }
    }

    #[inline]
    pub fn get_mut(&mut self, agent: AgentId) -> &mut AgentRng {
        &mut self.inner[agent.index()]
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── AgentKind ─────────────────────────────────────────────────────────────────

/// A passenger archetype and its partition of the pool.
#[derive(Clone, Debug)]
pub struct AgentKind {
    pub name:    String,
    pub profile: ServiceProfile,
    /// Number of agents pre-allocated for this kind.
    pub size:    usize,
}

// ── AgentPool ─────────────────────────────────────────────────────────────────

/// Pre-allocated, fixed-size set of agents, partitioned by kind.
///
/// The pool never grows after construction.  Agents of kind `k` occupy a
/// contiguous ID range, in the order the kinds were registered.
pub struct AgentPool {
    /// Every agent, indexed by `AgentId`.
    pub agents: Vec<Agent>,

    /// Per-agent RNGs, separated for the split-borrow pattern.
    pub rngs: AgentRngs,

    kinds: Vec<AgentKind>,
    free:  Vec<BTreeSet<AgentId>>,
}

impl AgentPool {
    pub(crate) fn new(agents: Vec<Agent>, rngs: AgentRngs, kinds: Vec<AgentKind>) -> Self {
        let mut free = vec![BTreeSet::new(); kinds.len()];
        for agent in &agents {
            free[agent.kind().index()].insert(agent.id());
        }
        Self { agents, rngs, kinds, free }
    }

    // ── Allocation ────────────────────────────────────────────────────────

    /// Activate the lowest-ID inactive agent of `kind`.
    ///
    /// Returns `None` when every agent of that kind is already active (the
    /// caller treats this as back-pressure, not an error) or `kind` is
    /// unknown.  The agent's per-run state is **not** reset here.
    pub fn acquire(&mut self, kind: AgentKindId) -> Option<AgentId> {
        let id = self.free.get_mut(kind.index())?.pop_first()?;
        self.agents[id.index()].set_active(true);
        Some(id)
    }

    /// Deactivate `agent` and make it eligible for the next `acquire`.
    ///
    /// Returns `false` if the agent was already inactive or does not exist.
    pub fn reclaim(&mut self, agent: AgentId) -> bool {
        let Some(a) = self.agents.get_mut(agent.index()) else {
            return false;
        };
        if !a.is_active() {
            return false;
        }
        a.set_active(false);
        self.free[a.kind().index()].insert(agent);
        debug!(%agent, kind = a.kind().0, "agent reclaimed");
        true
    }

    // ── Access ────────────────────────────────────────────────────────────

    #[inline]
    pub fn get(&self, agent: AgentId) -> Option<&Agent> {
        self.agents.get(agent.index())
    }

    #[inline]
    pub fn get_mut(&mut self, agent: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(agent.index())
    }

    /// Split into the agent slice and the RNG store.
    pub fn split_mut(&mut self) -> (&mut [Agent], &mut AgentRngs) {
        (&mut self.agents, &mut self.rngs)
    }

    /// IDs of all currently active agents, ascending.
    pub fn active_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.iter().filter(|a| a.is_active()).map(Agent::id)
    }

    // ── Metadata ──────────────────────────────────────────────────────────

    /// Total number of agents across all kinds.
    #[inline]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn kinds(&self) -> &[AgentKind] {
        &self.kinds
    }

    pub fn kind(&self, kind: AgentKindId) -> Option<&AgentKind> {
        self.kinds.get(kind.index())
    }

    pub fn kind_count(&self) -> usize {
        self.kinds.len()
    }

    /// Inactive agents of `kind`.
    pub fn inactive_count(&self, kind: AgentKindId) -> usize {
        self.free.get(kind.index()).map_or(0, BTreeSet::len)
    }

    /// Active agents of `kind`.
    pub fn active_count(&self, kind: AgentKindId) -> usize {
        self.kind(kind).map_or(0, |k| k.size) - self.inactive_count(kind)
    }

    /// Active agents across all kinds.
    pub fn total_active(&self) -> usize {
        self.len() - self.free.iter().map(BTreeSet::len).sum::<usize>()
    }
}
