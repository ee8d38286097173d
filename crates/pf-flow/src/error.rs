use pf_core::{AgentId, StageKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("stage order is empty")]
    EmptyOrder,

    #[error("stage graph contains a cycle through {stage}")]
    Cycle { stage: StageKind },

    #[error("stage {stage} has more than one successor")]
    DuplicateLink { stage: StageKind },

    #[error("stage graph has more than one head: {heads:?}")]
    MultipleHeads { heads: Vec<StageKind> },

    #[error("stage {stage} is not part of the stage graph")]
    NotInGraph { stage: StageKind },

    #[error("stage {stage} is registered twice")]
    DuplicateStage { stage: StageKind },

    #[error("stage {stage} is reachable but has no registered instance")]
    Unregistered { stage: StageKind },

    #[error("agent {agent} could not be routed: stage {stage} is not registered")]
    Unroutable { agent: AgentId, stage: StageKind },
}

pub type FlowResult<T> = Result<T, FlowError>;
