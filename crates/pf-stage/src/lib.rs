//! `pf-stage`: one service point: a FIFO wait queue feeding a fixed number
//! of service slots.
//!
//! # Crate layout
//!
//! | Module      | Contents                                               |
//! |-------------|--------------------------------------------------------|
//! | [`stage`]   | `Stage`: admission, queue refresh, completion hand-out |
//! | [`layout`]  | `QueueLayout`: entry point and queue-slot geometry     |
//! | [`service`] | `ServiceOverride`: per-stage service parameters        |
//! | [`error`]   | `StageError`, `StageResult<T>`                         |
//!
//! # Per-tick protocol
//!
//! ```text
//! ① admit            : fill free slots from the queue head (strict FIFO)
//! ② refresh_positions: reassign queue places 0..n in queue order
//! ③ take_completed   : hand each finished agent to the flow graph,
//!    backfill           then refill its slot from the queue immediately
//! ```
//!
//! The stage never routes agents itself; step ③ is driven by `pf-flow`.

pub mod error;
pub mod layout;
pub mod service;
pub mod stage;


pub use error::{StageError, StageResult};
pub use layout::QueueLayout;
pub use service::ServiceOverride;
pub use stage::{Stage, StageStats};
