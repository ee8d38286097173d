//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use pf_agent::AgentPool;
use pf_core::{AgentEvent, SimConfig, Tick};
use pf_flow::FlowGraph;
use pf_sim::{SimObserver, TickSummary};

use crate::row::{AgentEventRow, StageSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes agent events, tick summaries, and stage
/// snapshots to any [`OutputWriter`] backend.
///
/// Events are buffered for the duration of a tick and written as one batch
/// at tick end.  Errors from the writer are stored internally because
/// `SimObserver` methods have no return value.  After `sim.run()` returns,
/// check for errors with [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:           W,
    tick_duration_ms: u32,
    pending:          Vec<AgentEventRow>,
    last_error:       Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for the
    /// tick-to-milliseconds conversion.
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            tick_duration_ms: config.tick_duration_ms,
            pending:          Vec::new(),
            last_error:       None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn elapsed_ms(&self, tick: Tick) -> u64 {
        tick.0 * self.tick_duration_ms as u64
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_event(&mut self, tick: Tick, event: &AgentEvent) {
        let row = AgentEventRow::from_event(tick.0, self.elapsed_ms(tick), event);
        self.pending.push(row);
    }

    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        if !self.pending.is_empty() {
            let result = self.writer.write_events(&self.pending);
            self.pending.clear();
            self.store_err(result);
        }
        let row = TickSummaryRow::from_summary(summary, self.elapsed_ms(tick));
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, _pool: &AgentPool, flow: &FlowGraph) {
        let rows: Vec<StageSnapshotRow> = flow
            .stages()
            .map(|stage| StageSnapshotRow::from_stage(tick.0, stage))
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_stage_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
