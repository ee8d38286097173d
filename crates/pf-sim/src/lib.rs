//! `pf-sim`: tick loop orchestrator for the paxflow simulator.
//!
//! # Tick phases
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Spawn    : on the spawn cadence, activate the lowest free agent of a
//!                 (uniformly chosen) kind and route it to the head stage.
//!   ② Admit    : every stage, chain order: fill free slots from the queue
//!                 head, then refresh queue slots.
//!   ③ Sweep    : every stage, chain order: for each finished agent notify
//!                 listeners, route it, backfill the freed slot.
//!   ④ Attempts : every processing agent's timer counts down one tick; an
//!                 elapsed timer rolls an attempt; success marks the agent
//!                 done at its stage (routed by the next tick's sweep).
//!   ⑤ Report   : buffered AgentEvents go to the observer, then the
//!                 TickSummary.
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use pf_sim::{NoopObserver, Scenario};
//!
//! let scenario = Scenario::from_json_str(&std::fs::read_to_string("airport.json")?)?;
//! let mut sim = scenario.builder()?.build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod scenario;
pub mod sim;
pub mod spawner;
pub mod summary;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use scenario::{KindConfig, Scenario, StageConfig};
pub use sim::Sim;
pub use spawner::{SpawnOutcome, Spawner};
pub use summary::TickSummary;
