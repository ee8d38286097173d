//! Fluent builder for constructing an `AgentPool` in one step.
//!
//! # Usage
//!
//! ```rust
//! use pf_agent::{AgentPoolBuilder, ServiceProfile};
//! use pf_core::{AgentKindId, StageKind};
//!
//! let profile = ServiceProfile::new(50, 0.3, 0.1).unwrap();
//! let pool = AgentPoolBuilder::new(/*seed=*/ 42, StageKind::CheckIn)
//!     .kind("leisure", profile, 40)
//!     .kind("business", profile, 10)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(pool.len(), 50);
//! assert_eq!(pool.inactive_count(AgentKindId(1)), 10);
//! ```

use pf_core::{AgentId, AgentKindId, CoreError, CoreResult, StageKind};

use crate::{Agent, AgentKind, AgentPool, AgentRngs, ServiceProfile};

/// Fluent builder for [`AgentPool`].
///
/// All agents are allocated at build time, inactive, and reset to the first
/// stage; the pool never allocates again.
pub struct AgentPoolBuilder {
    seed:        u64,
    first_stage: StageKind,
    kinds:       Vec<AgentKind>,
}

impl AgentPoolBuilder {
    /// Create a builder using `seed` as the global RNG seed.  `first_stage`
    /// is only the initial value of each agent's stage; the spawner resets it
    /// to the flow graph's head on activation.
    pub fn new(seed: u64, first_stage: StageKind) -> Self {
        Self {
            seed,
            first_stage,
            kinds: Vec::new(),
        }
    }

    /// Register an agent kind with `size` pooled agents.
    pub fn kind(mut self, name: impl Into<String>, profile: ServiceProfile, size: usize) -> Self {
        self.kinds.push(AgentKind {
            name: name.into(),
            profile,
            size,
        });
        self
    }

    /// Validate and allocate.
    pub fn build(self) -> CoreResult<AgentPool> {
        if self.kinds.is_empty() {
            return Err(CoreError::Config("agent pool needs at least one kind".into()));
        }
        if self.kinds.len() > AgentKindId::INVALID.0 as usize {
            return Err(CoreError::Config("too many agent kinds".into()));
        }
        for kind in &self.kinds {
            if kind.size == 0 {
                return Err(CoreError::Config(format!(
                    "agent kind {:?} has a pool size of zero",
                    kind.name
                )));
            }
            kind.profile.validate()?;
        }

        let total: usize = self.kinds.iter().map(|k| k.size).sum();
        if AgentId::try_from(total).is_err() {
            return Err(CoreError::Config(format!("pool size {total} exceeds the AgentId range")));
        }

        let mut agents = Vec::with_capacity(total);
        for (k, kind) in self.kinds.iter().enumerate() {
            for _ in 0..kind.size {
                let id = AgentId(agents.len() as u32);
                agents.push(Agent::new(id, AgentKindId(k as u16), kind.profile, self.first_stage));
            }
        }

        let rngs = AgentRngs::new(total, self.seed);
        Ok(AgentPool::new(agents, rngs, self.kinds))
    }
}
