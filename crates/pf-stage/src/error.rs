use pf_core::{CoreError, StageKind};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StageError {
    #[error("stage {0} must have a capacity of at least 1")]
    ZeroCapacity(StageKind),

    #[error("stage {stage} has an invalid queue layout: {reason}")]
    InvalidLayout { stage: StageKind, reason: String },

    #[error("stage {stage} has an invalid service override: {source}")]
    InvalidService {
        stage:  StageKind,
        #[source]
        source: CoreError,
    },
}

pub type StageResult<T> = Result<T, StageError>;
