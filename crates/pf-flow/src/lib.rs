//! `pf-flow`: the stage graph and the single dispatcher that moves agents
//! between stages.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`graph`]    | `FlowGraph`: links, registry, `on_agent_finished`, sweep |
//! | [`listener`] | `CompletionListener`, `StageCompletion`                  |
//! | [`error`]    | `FlowError`, `FlowResult<T>`                             |
//!
//! # Routing model
//!
//! The graph is a single chain with one head and one terminal sink.  When a
//! stage's sweep hands out a finished agent, the graph looks up the
//! successor and either re-enqueues the agent there or, at the end of the
//! chain, marks it `DoneAll` and returns it to the pool.  Each hand-off runs
//! to completion before the sweep looks at the next finished agent.
//!
//! # Cargo features
//!
//! | Feature   | Effect                                              |
//! |-----------|-----------------------------------------------------|
//! | `fx-hash` | FxHash instead of SipHash for the stage-keyed maps. |

pub mod error;
pub mod graph;
pub mod listener;

#[cfg(test)]
mod tests;

pub use error::{FlowError, FlowResult};
pub use graph::{FlowGraph, Handoff, SweepReport};
pub use listener::{CompletionListener, StageCompletion};
