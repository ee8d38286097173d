//! Subscription point for stage completions.

use pf_core::{AgentId, AgentKindId, StageKind, Tick};

/// One agent leaving one stage's service slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StageCompletion {
    pub tick:       Tick,
    pub agent:      AgentId,
    pub agent_kind: AgentKindId,
    pub stage:      StageKind,
    /// Where the graph will route the agent; `None` at the terminal stage.
    pub next:       Option<StageKind>,
    /// Attempts the agent needed at this stage.
    pub attempts:   u32,
}

/// External consumer of stage completions (scoring, economy, metrics…).
///
/// Called exactly once per agent per completed stage, before the agent is
/// routed onward.  Closures taking `&StageCompletion` implement this trait.
pub trait CompletionListener {
    fn on_stage_completed(&mut self, completion: &StageCompletion);
}

impl<F: FnMut(&StageCompletion)> CompletionListener for F {
    fn on_stage_completed(&mut self, completion: &StageCompletion) {
        self(completion)
    }
}
