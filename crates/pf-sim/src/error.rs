use std::path::PathBuf;

use pf_core::CoreError;
use pf_flow::FlowError;
use pf_stage::StageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("scenario parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cannot read {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type SimResult<T> = Result<T, SimError>;
