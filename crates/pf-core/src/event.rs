//! Agent lifecycle notifications for the presentation layer.
//!
//! Stages, the flow graph and the spawner never call an observer directly.
//! They append [`AgentEvent`]s to an [`EventBuffer`] owned by the tick loop,
//! which drains it to the observer once per tick in emission order.

use crate::{AgentId, AgentKindId, Point3, StageKind};

/// What happened to an agent.
#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    /// Activated from the pool and reset.
    Spawned { kind: AgentKindId },

    /// Routed towards `stage` and placed at its entry point.
    Moving { stage: StageKind, position: Point3 },

    /// Appended to the tail of `stage`'s wait queue at `place`.
    Enqueued { stage: StageKind, place: usize },

    /// Queue slot changed (index 0 = next to be admitted).
    Positioned { stage: StageKind, place: usize, position: Point3 },

    /// Admitted from the queue into an active service slot.
    Processing { stage: StageKind },

    /// A service attempt resolved.  `chance` is the success probability the
    /// attempt was rolled against.
    Attempt { stage: StageKind, roll: f64, chance: f64, success: bool },

    /// Removed from `stage`'s active set by the completion sweep.
    StageCompleted { stage: StageKind, next: Option<StageKind> },

    /// Left the terminal stage; the pipeline is finished.
    DoneAll,

    /// Removed from the simulation without finishing (routing miss or the
    /// stage was removed).
    Dropped { stage: StageKind },

    /// Returned to the pool as inactive.
    Reclaimed,
}

impl EventKind {
    /// Stable snake-case label, used as a CSV column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Spawned { .. }        => "spawned",
            EventKind::Moving { .. }         => "moving",
            EventKind::Enqueued { .. }       => "enqueued",
            EventKind::Positioned { .. }     => "positioned",
            EventKind::Processing { .. }     => "processing",
            EventKind::Attempt { .. }        => "attempt",
            EventKind::StageCompleted { .. } => "stage_completed",
            EventKind::DoneAll               => "done_all",
            EventKind::Dropped { .. }        => "dropped",
            EventKind::Reclaimed             => "reclaimed",
        }
    }

    /// The stage this event refers to, if any.
    pub fn stage(&self) -> Option<StageKind> {
        match *self {
            EventKind::Moving { stage, .. }
            | EventKind::Enqueued { stage, .. }
            | EventKind::Positioned { stage, .. }
            | EventKind::Processing { stage }
            | EventKind::Attempt { stage, .. }
            | EventKind::StageCompleted { stage, .. }
            | EventKind::Dropped { stage } => Some(stage),
            EventKind::Spawned { .. } | EventKind::DoneAll | EventKind::Reclaimed => None,
        }
    }
}

/// One notification about one agent.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentEvent {
    pub agent: AgentId,
    pub kind:  EventKind,
}

/// Append-only event sink drained once per tick.
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Vec<AgentEvent>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, agent: AgentId, kind: EventKind) {
        self.events.push(AgentEvent { agent, kind });
    }

    /// Remove and yield every buffered event in emission order.
    pub fn drain(&mut self) -> std::vec::Drain<'_, AgentEvent> {
        self.events.drain(..)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AgentEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
