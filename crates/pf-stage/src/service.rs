//! Per-stage overrides of an agent kind's service profile.

use pf_agent::ServiceProfile;
use pf_core::CoreResult;

/// Stage-specific replacements for the visiting agent's service parameters.
///
/// Any field left `None` falls back to the agent kind's own profile.  The
/// merged profile is what an agent is reset to when it is admitted.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceOverride {
    pub interval_ticks:    Option<u64>,
    pub base_success_rate: Option<f64>,
    pub success_increment: Option<f64>,
}

impl ServiceOverride {
    pub fn is_empty(&self) -> bool {
        self.interval_ticks.is_none()
            && self.base_success_rate.is_none()
            && self.success_increment.is_none()
    }

    /// Merge over `base`.
    pub fn apply(&self, base: &ServiceProfile) -> ServiceProfile {
        ServiceProfile {
            interval_ticks:    self.interval_ticks.unwrap_or(base.interval_ticks),
            base_success_rate: self.base_success_rate.unwrap_or(base.base_success_rate),
            success_increment: self.success_increment.unwrap_or(base.success_increment),
        }
    }

    /// Check the overridden fields in isolation, using an always-valid
    /// profile for the rest.
    pub fn validate(&self) -> CoreResult<()> {
        let neutral = ServiceProfile {
            interval_ticks:    1,
            base_success_rate: 1.0,
            success_increment: 0.0,
        };
        self.apply(&neutral).validate()
    }
}
