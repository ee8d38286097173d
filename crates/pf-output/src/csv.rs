//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `agent_events.csv`
//! - `tick_summaries.csv`
//! - `stage_snapshots.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentEventRow, OutputResult, StageSnapshotRow, TickSummaryRow};

const EVENT_HEADER: [&str; 13] = [
    "tick", "elapsed_ms", "agent_id", "event", "stage", "place",
    "x", "y", "z", "roll", "chance", "success", "next_stage",
];

const SUMMARY_HEADER: [&str; 12] = [
    "tick", "elapsed_ms", "spawned", "admitted", "completed", "finished",
    "dropped", "attempts", "successes", "active", "queued", "in_service",
];

const STAGE_HEADER: [&str; 8] = [
    "tick", "stage", "capacity", "queued", "in_service", "admitted", "completed", "peak_queue",
];

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    events:    Writer<File>,
    summaries: Writer<File>,
    stages:    Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open (or truncate) the three CSV files, and
    /// write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut events = Writer::from_path(dir.join("agent_events.csv"))?;
        events.write_record(EVENT_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(SUMMARY_HEADER)?;

        let mut stages = Writer::from_path(dir.join("stage_snapshots.csv"))?;
        stages.write_record(STAGE_HEADER)?;

        Ok(Self {
            events,
            summaries,
            stages,
            finished: false,
        })
    }
}

/// Empty cell for `None`.
fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl OutputWriter for CsvWriter {
    fn write_events(&mut self, rows: &[AgentEventRow]) -> OutputResult<()> {
        for row in rows {
            self.events.write_record(&[
                row.tick.to_string(),
                row.elapsed_ms.to_string(),
                row.agent_id.to_string(),
                row.event.to_string(),
                cell(row.stage),
                cell(row.place),
                cell(row.position.map(|p| p.x)),
                cell(row.position.map(|p| p.y)),
                cell(row.position.map(|p| p.z)),
                cell(row.roll),
                cell(row.chance),
                cell(row.success.map(u8::from)),
                cell(row.next_stage),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.elapsed_ms.to_string(),
            row.spawned.to_string(),
            row.admitted.to_string(),
            row.completed.to_string(),
            row.finished.to_string(),
            row.dropped.to_string(),
            row.attempts.to_string(),
            row.successes.to_string(),
            row.active.to_string(),
            row.queued.to_string(),
            row.in_service.to_string(),
        ])?;
        Ok(())
    }

    fn write_stage_snapshots(&mut self, rows: &[StageSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.stages.write_record(&[
                row.tick.to_string(),
                row.stage.to_string(),
                row.capacity.to_string(),
                row.queued.to_string(),
                row.in_service.to_string(),
                row.admitted.to_string(),
                row.completed.to_string(),
                row.peak_queue.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.events.flush()?;
        self.summaries.flush()?;
        self.stages.flush()?;
        Ok(())
    }
}
