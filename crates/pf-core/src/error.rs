//! Framework error type.
//!
//! Sub-crates define their own error enums and `pf-sim` wraps them all via
//! `From` impls so builder code can use `?` across crate boundaries.

use thiserror::Error;

use crate::AgentId;

/// The base error type for `pf-core` primitives.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("{what} must lie in (0, 1], got {value}")]
    InvalidProbability { what: &'static str, value: f64 },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `pf-core`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Validate that `value` is a usable per-attempt success probability.
///
/// Zero is rejected: an agent with `p = 0` and no increment would never
/// leave its stage.
pub fn check_probability(what: &'static str, value: f64) -> CoreResult<f64> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(CoreError::InvalidProbability { what, value })
    }
}
