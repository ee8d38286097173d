//! Simulation observer trait for presentation, progress, and data collection.

use pf_agent::AgentPool;
use pf_core::{AgentEvent, Tick};
use pf_flow::{FlowError, FlowGraph};

use crate::TickSummary;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
///         if tick.0 % self.interval == 0 {
///             println!("{tick}: {} queued, {} in service", summary.queued, summary.in_service);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// One agent lifecycle notification, in emission order.
    ///
    /// Events raised between ticks (a stage removed at runtime, a manual
    /// spawn) are delivered with the next tick.
    fn on_event(&mut self, _tick: Tick, _event: &AgentEvent) {}

    /// An agent could not be routed and was dropped.
    fn on_unroutable(&mut self, _tick: Tick, _error: &FlowError) {}

    /// Called at the end of each tick, after all events were delivered.
    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks) with read-only access to agents and stages.
    fn on_snapshot(&mut self, _tick: Tick, _pool: &AgentPool, _flow: &FlowGraph) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
