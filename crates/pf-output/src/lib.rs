//! `pf-output`: simulation output writers for the paxflow simulator.
//!
//! The CSV backend creates three files in the output directory:
//!
//! | File                  | One row per                                  |
//! |-----------------------|----------------------------------------------|
//! | `agent_events.csv`    | agent lifecycle event                        |
//! | `tick_summaries.csv`  | tick                                         |
//! | `stage_snapshots.csv` | registered stage, every snapshot interval    |
//!
//! Writers implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `pf_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pf_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = SimOutputObserver::new(writer, &config);
//! sim.run(&mut obs).unwrap();
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{AgentEventRow, StageSnapshotRow, TickSummaryRow};
pub use writer::OutputWriter;
