//! Random streams for service attempts and spawn decisions.
//!
//! Every pooled passenger owns a `SmallRng` whose seed is derived from the
//! run seed and its pool index:
//!
//!   stream_seed = run_seed ^ (agent_index * GOLDEN_GAMMA)
//!
//! `GOLDEN_GAMMA` is 2^64 / phi, so neighbouring indices land far apart in
//! seed space.  Recycling an agent does not reseed it; the stream simply
//! continues.  Given the same seed and tick count a run replays exactly.
//!
//! Attempt code draws through [`UnitRoll`], which lets tests and replays
//! swap in a [`ScriptedRolls`] sequence.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// A source of uniform draws in `[0, 1)`.
pub trait UnitRoll {
    fn roll(&mut self) -> f64;
}

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// One passenger's attempt stream.
pub struct AgentRng(SmallRng);

impl AgentRng {
    pub fn new(run_seed: u64, agent: AgentId) -> Self {
        let stream_seed = run_seed ^ (agent.0 as u64).wrapping_mul(GOLDEN_GAMMA);
        Self(SmallRng::seed_from_u64(stream_seed))
    }
}

impl UnitRoll for AgentRng {
    #[inline]
    fn roll(&mut self) -> f64 {
        self.0.r#gen()
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Run-level stream for decisions that belong to no single passenger.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    /// Uniform index in `0..n`.  `n` must be non-zero.
    #[inline]
    pub fn pick(&mut self, n: usize) -> usize {
        self.0.gen_range(0..n)
    }
}

impl UnitRoll for SimRng {
    #[inline]
    fn roll(&mut self) -> f64 {
        self.0.r#gen()
    }
}

// ── ScriptedRolls ─────────────────────────────────────────────────────────────

/// A fixed sequence of draws, replayed in order.
///
/// Once the script is exhausted every further roll returns `fallback`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRolls {
    script:   VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRolls {
    pub fn new(script: impl IntoIterator<Item = f64>) -> Self {
        Self {
            script:   script.into_iter().collect(),
            fallback: 0.0,
        }
    }

    /// Value returned after the script runs out.  Default: `0.0` (always
    /// succeeds).
    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    /// Draws still left in the script.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl UnitRoll for ScriptedRolls {
    fn roll(&mut self) -> f64 {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}
