//! The per-passenger state machine.
//!
//! An agent drives its own service attempts: while `Processing`, a countdown
//! of `interval_ticks` elapses, then a single roll decides the attempt.  A
//! failure raises the success chance by the profile's increment (clamped to
//! 1.0) and restarts the countdown; a success is reported to the caller, who
//! hands it to the owning stage's `mark_done`.

use pf_core::{AgentId, AgentKindId, Point3, StageKind, UnitRoll};
use tracing::trace;

use crate::ServiceProfile;

/// Finite-state value of a passenger.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentState {
    /// Freshly reset; not yet routed.
    #[default]
    Idle,
    /// Routed to a stage and placed at its entry point.
    Moving,
    /// Waiting in a stage's FIFO.
    InQueue,
    /// Occupying one of a stage's service slots.
    Processing,
    /// Succeeded at the current stage; awaiting the completion sweep.
    Done,
    /// Left the terminal stage.
    DoneAll,
}

impl AgentState {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentState::Idle       => "idle",
            AgentState::Moving     => "moving",
            AgentState::InQueue    => "in_queue",
            AgentState::Processing => "processing",
            AgentState::Done       => "done",
            AgentState::DoneAll    => "done_all",
        }
    }
}

/// Outcome of one resolved service attempt.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Attempt {
    pub roll:    f64,
    /// The probability the roll was compared against.
    pub chance:  f64,
    pub success: bool,
}

/// One simulated passenger.
///
/// Owned by the [`AgentPool`][crate::AgentPool]; everything else refers to it
/// by [`AgentId`].
#[derive(Clone, Debug)]
pub struct Agent {
    id:             AgentId,
    kind:           AgentKindId,
    active:         bool,
    state:          AgentState,
    current_stage:  StageKind,
    position:       Point3,
    queue_place:    Option<usize>,
    /// Defaults of the agent's kind.
    profile:        ServiceProfile,
    /// Effective parameters at the current stage (kind defaults merged with
    /// any stage override).
    service:        ServiceProfile,
    chance:         f64,
    timer:          u64,
    stage_complete: bool,
    attempts:       u32,
    stages_done:    u32,
}

impl Agent {
    /// A new, inactive agent.
    pub fn new(id: AgentId, kind: AgentKindId, profile: ServiceProfile, first_stage: StageKind) -> Self {
        let mut agent = Self {
            id,
            kind,
            active: false,
            state: AgentState::Idle,
            current_stage: first_stage,
            position: Point3::ORIGIN,
            queue_place: None,
            profile,
            service: profile,
            chance: profile.base_success_rate,
            timer: profile.interval_ticks,
            stage_complete: false,
            attempts: 0,
            stages_done: 0,
        };
        agent.reset(first_stage);
        agent
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline] pub fn id(&self) -> AgentId { self.id }
    #[inline] pub fn kind(&self) -> AgentKindId { self.kind }
    #[inline] pub fn is_active(&self) -> bool { self.active }
    #[inline] pub fn state(&self) -> AgentState { self.state }
    #[inline] pub fn current_stage(&self) -> StageKind { self.current_stage }
    #[inline] pub fn position(&self) -> Point3 { self.position }
    #[inline] pub fn profile(&self) -> &ServiceProfile { &self.profile }
    #[inline] pub fn service(&self) -> &ServiceProfile { &self.service }

    /// Place in line at the current stage (0 = next to be admitted), or
    /// `None` when not queued.
    #[inline] pub fn queue_place(&self) -> Option<usize> { self.queue_place }

    /// Current per-attempt success probability.
    #[inline] pub fn success_chance(&self) -> f64 { self.chance }

    /// Ticks left before the next attempt.
    #[inline] pub fn ticks_to_attempt(&self) -> u64 { self.timer }

    /// `true` once the agent has succeeded at its current stage and is
    /// waiting to be swept.
    #[inline] pub fn stage_complete(&self) -> bool { self.stage_complete }

    /// Attempts made during the current stage visit.
    #[inline] pub fn attempts(&self) -> u32 { self.attempts }

    /// Stages completed since the last reset.
    #[inline] pub fn stages_done(&self) -> u32 { self.stages_done }

    // ── Pool transitions ──────────────────────────────────────────────────

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Clear all per-run state: first stage, `Idle`, base chance, full timer.
    pub fn reset(&mut self, first_stage: StageKind) {
        self.state          = AgentState::Idle;
        self.current_stage  = first_stage;
        self.position       = Point3::ORIGIN;
        self.queue_place    = None;
        self.service        = self.profile;
        self.chance         = self.profile.base_success_rate;
        self.timer          = self.profile.interval_ticks;
        self.stage_complete = false;
        self.attempts       = 0;
        self.stages_done    = 0;
    }

    // ── Stage transitions ─────────────────────────────────────────────────

    /// Route towards `stage`: no travel is modelled, the agent is placed at
    /// the stage's entry point immediately.
    pub fn begin_moving(&mut self, stage: StageKind, entry_point: Point3) {
        self.state          = AgentState::Moving;
        self.current_stage  = stage;
        self.position       = entry_point;
        self.stage_complete = false;
    }

    /// Enter the wait queue at `place`.
    pub fn join_queue(&mut self, place: usize) {
        self.state       = AgentState::InQueue;
        self.queue_place = Some(place);
    }

    /// Move to queue slot `place` at `position`.  Returns `true` if either
    /// changed.
    pub fn set_queue_slot(&mut self, place: usize, position: Point3) -> bool {
        let changed = self.queue_place != Some(place) || self.position != position;
        self.queue_place = Some(place);
        self.position    = position;
        changed
    }

    /// Occupy a service slot.  The attempt timer and success chance restart
    /// from `service`; nothing carries over from a previous stage.
    pub fn start_processing(&mut self, service: ServiceProfile) {
        self.state          = AgentState::Processing;
        self.service        = service;
        self.chance         = service.base_success_rate;
        self.timer          = service.interval_ticks;
        self.queue_place    = None;
        self.stage_complete = false;
        self.attempts       = 0;
    }

    /// Flag the current stage as finished.  Called by the owning stage.
    pub fn complete_stage(&mut self) {
        self.state          = AgentState::Done;
        self.stage_complete = true;
        self.stages_done   += 1;
    }

    /// Terminal: the pipeline has no further stage.
    pub fn finish_all(&mut self) {
        self.state          = AgentState::DoneAll;
        self.queue_place    = None;
        self.stage_complete = false;
    }

    // ── Attempts ──────────────────────────────────────────────────────────

    /// Advance the attempt countdown by one tick.
    ///
    /// Returns the resolved [`Attempt`] when the interval elapses, `None`
    /// otherwise (including when the agent is not processing or has already
    /// succeeded and awaits the sweep).
    pub fn tick<R: UnitRoll + ?Sized>(&mut self, rng: &mut R) -> Option<Attempt> {
        if !self.active || self.state != AgentState::Processing || self.stage_complete {
            return None;
        }
        self.timer = self.timer.saturating_sub(1);
        if self.timer > 0 {
            return None;
        }
        let attempt = self.attempt(rng);
        self.timer = self.service.interval_ticks;
        Some(attempt)
    }

    /// Resolve one attempt immediately.
    ///
    /// Success (`roll <= chance`) restores the chance to the base rate in
    /// preparation for the next stage visit; failure escalates it.
    pub fn attempt<R: UnitRoll + ?Sized>(&mut self, rng: &mut R) -> Attempt {
        let roll    = rng.roll();
        let chance  = self.chance;
        let success = roll <= chance;
        self.attempts += 1;
        if success {
            self.chance = self.service.base_success_rate;
        } else {
            self.chance = self.service.escalate(chance);
        }
        trace!(agent = %self.id, stage = %self.current_stage, roll, chance, success, "service attempt");
        Attempt { roll, chance, success }
    }
}
