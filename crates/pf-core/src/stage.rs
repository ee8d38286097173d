//! The closed set of pipeline stage kinds shared by every crate.
//!
//! The enum carries no ordering of its own: which stage follows which is
//! decided solely by the `FlowGraph` in `pf-flow`.  "No further stage" is
//! expressed as `Option<StageKind>::None` rather than a sentinel variant.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// A named service point in the passenger pipeline.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StageKind {
    /// Ticket and identity check at the desk.
    CheckIn,
    /// Hold-baggage drop.
    BagDrop,
    /// Security screening.
    Security,
    /// Border / passport control.
    Passport,
    /// Gate boarding.
    Boarding,
}

impl StageKind {
    /// Every variant, in declaration order.
    pub const ALL: [StageKind; 5] = [
        StageKind::CheckIn,
        StageKind::BagDrop,
        StageKind::Security,
        StageKind::Passport,
        StageKind::Boarding,
    ];

    /// Snake-case label, matching the serde representation and CSV output.
    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::CheckIn  => "check_in",
            StageKind::BagDrop  => "bag_drop",
            StageKind::Security => "security",
            StageKind::Passport => "passport",
            StageKind::Boarding => "boarding",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| CoreError::Config(format!("unknown stage kind {s:?}")))
    }
}
