//! Service parameters governing an agent's attempts at a stage.

use pf_core::error::check_probability;
use pf_core::{CoreError, CoreResult};

/// How an agent is serviced: one probabilistic attempt every
/// `interval_ticks`, starting at `base_success_rate` and gaining
/// `success_increment` after each failure (clamped to 1.0).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceProfile {
    pub interval_ticks:    u64,
    pub base_success_rate: f64,
    pub success_increment: f64,
}

impl ServiceProfile {
    /// Build a validated profile.
    ///
    /// Rejects a zero interval, a base rate outside `(0, 1]`, and a negative
    /// or non-finite increment.
    pub fn new(interval_ticks: u64, base_success_rate: f64, success_increment: f64) -> CoreResult<Self> {
        let profile = Self { interval_ticks, base_success_rate, success_increment };
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.interval_ticks == 0 {
            return Err(CoreError::Config("service interval must be at least one tick".into()));
        }
        check_probability("base_success_rate", self.base_success_rate)?;
        if !self.success_increment.is_finite() || self.success_increment < 0.0 {
            return Err(CoreError::Config(format!(
                "success_increment must be a non-negative number, got {}",
                self.success_increment
            )));
        }
        Ok(())
    }

    /// Chance after one more failed attempt at `chance`.
    #[inline]
    pub fn escalate(&self, chance: f64) -> f64 {
        (chance + self.success_increment).min(1.0)
    }
}
