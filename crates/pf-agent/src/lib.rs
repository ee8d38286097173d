//! `pf-agent`: passenger state machine and pooled agent storage.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`agent`]   | `Agent`, `AgentState`, `Attempt`: per-passenger state machine |
//! | [`profile`] | `ServiceProfile`: interval, base success rate, increment      |
//! | [`pool`]    | `AgentPool` (fixed-size, per-kind free lists), `AgentRngs`    |
//! | [`builder`] | `AgentPoolBuilder` (fluent construction)                      |
//!
//! # Lifecycle
//!
//! ```text
//! inactive ──acquire+reset──▶ Idle ─▶ Moving ─▶ InQueue ─▶ Processing ─▶ Done ─┐
//!    ▲                                  ▲                                      │
//!    │                                  └──────────── next stage ◀─────────────┤
//!    └────────────── reclaim ◀──────── DoneAll ◀──────── terminal ◀────────────┘
//! ```
//!
//! The pool exclusively owns every `Agent`.  Stages and the flow graph only
//! hold `AgentId`s and borrow the pool's slice when they need to mutate one.

pub mod agent;
pub mod builder;
pub mod pool;
pub mod profile;


pub use agent::{Agent, AgentState, Attempt};
pub use builder::AgentPoolBuilder;
pub use pool::{AgentKind, AgentPool, AgentRngs};
pub use profile::ServiceProfile;
