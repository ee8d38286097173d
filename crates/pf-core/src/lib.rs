//! `pf-core`: foundational types for the `paxflow` passenger-flow simulator.
//!
//! This crate is a dependency of every other `pf-*` crate.  It has no `pf-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                              |
//! |-----------|-------------------------------------------------------|
//! | [`ids`]   | `AgentId`, `AgentKindId`                              |
//! | [`stage`] | `StageKind`: the closed set of pipeline stages        |
//! | [`geo`]   | `Point3`, queue-slot arithmetic                       |
//! | [`time`]  | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`rng`]   | `AgentRng` (per-agent), `SimRng` (global), `UnitRoll` |
//! | [`event`] | `AgentEvent`, `EventKind`, `EventBuffer`              |
//! | [`error`] | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | `Serialize`/`Deserialize` on all public types (used by `pf-sim`'s scenario loader). |

pub mod error;
pub mod event;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod stage;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use event::{AgentEvent, EventBuffer, EventKind};
pub use geo::Point3;
pub use ids::{AgentId, AgentKindId};
pub use rng::{AgentRng, ScriptedRolls, SimRng, UnitRoll};
pub use stage::StageKind;
pub use time::{SimClock, SimConfig, Tick};
