//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter advanced once per
//! simulation step.  The mapping to simulated seconds is held in `SimClock`:
//!
//!   elapsed_ms = tick * tick_duration_ms
//!
//! Configuration expresses service and spawn intervals in seconds; they are
//! converted to whole ticks exactly once, at build time, so every countdown in
//! the tick loop is integer arithmetic and never drifts.

use std::fmt;

use crate::{CoreError, CoreResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// Index of a simulation step, counted from zero.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and simulated seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// How many simulated milliseconds one tick represents.
    pub tick_duration_ms: u32,
    /// The current tick, advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_duration_ms: u32) -> Self {
        Self {
            tick_duration_ms,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated milliseconds since tick 0.
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.current_tick.0 * self.tick_duration_ms as u64
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_ms() as f64 / 1_000.0
    }

    /// How many ticks span `secs` seconds?
    ///
    /// Rounds up (an attempt is never early) with a floor of one tick.
    /// Non-finite or non-positive durations are configuration errors.
    pub fn ticks_for_secs(&self, secs: f64) -> CoreResult<u64> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(CoreError::Config(format!(
                "interval must be a positive number of seconds, got {secs}"
            )));
        }
        let ms = (secs * 1_000.0).ceil() as u64;
        Ok(ms.div_ceil(self.tick_duration_ms.max(1) as u64).max(1))
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.elapsed_ms();
        let (mins, secs, millis) = (ms / 60_000, (ms / 1_000) % 60, ms % 1_000);
        write!(f, "{} ({:02}:{:02}.{:03})", self.current_tick, mins, secs, millis)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Run-level simulation configuration.
///
/// Usually embedded in a `pf-sim` scenario file and passed to the simulation
/// builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Simulated milliseconds per tick.  Default: 100.
    #[cfg_attr(feature = "serde", serde(default = "default_tick_duration_ms"))]
    pub tick_duration_ms: u32,

    /// Total ticks to simulate.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: u64,

    /// Report a snapshot every N ticks.  0 disables snapshots.
    #[cfg_attr(feature = "serde", serde(default))]
    pub output_interval_ticks: u64,
}

#[cfg(feature = "serde")]
fn default_tick_duration_ms() -> u32 {
    100
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_duration_ms)
    }

    /// Reject configurations the tick loop cannot run.
    pub fn validate(&self) -> CoreResult<()> {
        if self.tick_duration_ms == 0 {
            return Err(CoreError::Config("tick_duration_ms must be at least 1".into()));
        }
        Ok(())
    }
}
