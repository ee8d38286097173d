//! The `OutputWriter` trait implemented by backend writers.

use crate::{AgentEventRow, OutputResult, StageSnapshotRow, TickSummaryRow};

/// A sink for simulation output.
///
/// Errors never interrupt the simulation: the observer stores them and
/// hands them out through [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write one tick's agent events, in emission order.
    fn write_events(&mut self, rows: &[AgentEventRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Write the per-stage rows of one snapshot.
    fn write_stage_snapshots(&mut self, rows: &[StageSnapshotRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
