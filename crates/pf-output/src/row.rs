//! Plain data row types written by output backends.

use pf_core::{AgentEvent, EventKind, Point3, StageKind};
use pf_sim::TickSummary;
use pf_stage::Stage;

/// One agent lifecycle event, flattened.
///
/// Columns that do not apply to the event kind are `None` and written as
/// empty cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentEventRow {
    pub tick:       u64,
    pub elapsed_ms: u64,
    pub agent_id:   u32,
    pub event:      &'static str,
    pub stage:      Option<StageKind>,
    /// Queue place (0 = next to be admitted).
    pub place:      Option<usize>,
    pub position:   Option<Point3>,
    pub roll:       Option<f64>,
    pub chance:     Option<f64>,
    pub success:    Option<bool>,
    /// Successor chosen on stage completion; `None` at the terminal stage.
    pub next_stage: Option<StageKind>,
}

impl AgentEventRow {
    pub fn from_event(tick: u64, elapsed_ms: u64, event: &AgentEvent) -> Self {
        let mut row = Self {
            tick,
            elapsed_ms,
            agent_id:   event.agent.0,
            event:      event.kind.as_str(),
            stage:      event.kind.stage(),
            place:      None,
            position:   None,
            roll:       None,
            chance:     None,
            success:    None,
            next_stage: None,
        };
        match event.kind {
            EventKind::Moving { position, .. } => row.position = Some(position),
            EventKind::Enqueued { place, .. } => row.place = Some(place),
            EventKind::Positioned { place, position, .. } => {
                row.place    = Some(place);
                row.position = Some(position);
            }
            EventKind::Attempt { roll, chance, success, .. } => {
                row.roll    = Some(roll);
                row.chance  = Some(chance);
                row.success = Some(success);
            }
            EventKind::StageCompleted { next, .. } => row.next_stage = next,
            EventKind::Spawned { .. }
            | EventKind::Processing { .. }
            | EventKind::DoneAll
            | EventKind::Dropped { .. }
            | EventKind::Reclaimed => {}
        }
        row
    }
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:       u64,
    pub elapsed_ms: u64,
    pub spawned:    u64,
    pub admitted:   u64,
    pub completed:  u64,
    pub finished:   u64,
    pub dropped:    u64,
    pub attempts:   u64,
    pub successes:  u64,
    pub active:     u64,
    pub queued:     u64,
    pub in_service: u64,
}

impl TickSummaryRow {
    pub fn from_summary(summary: &TickSummary, elapsed_ms: u64) -> Self {
        Self {
            tick:       summary.tick.0,
            elapsed_ms,
            spawned:    summary.spawned as u64,
            admitted:   summary.admitted as u64,
            completed:  summary.completed as u64,
            finished:   summary.finished as u64,
            dropped:    summary.dropped as u64,
            attempts:   summary.attempts as u64,
            successes:  summary.successes as u64,
            active:     summary.active as u64,
            queued:     summary.queued as u64,
            in_service: summary.in_service as u64,
        }
    }
}

/// One stage's occupancy and running counters at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSnapshotRow {
    pub tick:       u64,
    pub stage:      StageKind,
    pub capacity:   u64,
    pub queued:     u64,
    pub in_service: u64,
    pub admitted:   u64,
    pub completed:  u64,
    pub peak_queue: u64,
}

impl StageSnapshotRow {
    pub fn from_stage(tick: u64, stage: &Stage) -> Self {
        let stats = stage.stats();
        Self {
            tick,
            stage:      stage.kind(),
            capacity:   stage.capacity() as u64,
            queued:     stage.queue_len() as u64,
            in_service: stage.active_len() as u64,
            admitted:   stats.admitted,
            completed:  stats.completed,
            peak_queue: stats.peak_queue as u64,
        }
    }
}
