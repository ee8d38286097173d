//! terminal: a small airport departure hall for the paxflow simulator.
//!
//! Passengers of two kinds walk a five-stage chain (check-in, bag drop,
//! security, passport, boarding).  Every completed stage credits a fare to
//! a ledger subscribed to the flow graph.  Output lands in
//! `output/terminal/`.
//!
//! ```text
//! cargo run -p terminal                       # embedded scenario
//! cargo run -p terminal -- my_scenario.json   # scenario from disk
//! RUST_LOG=pf_flow=debug cargo run -p terminal
//! ```

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pf_agent::AgentPool;
use pf_core::{StageKind, Tick};
use pf_flow::{FlowGraph, StageCompletion};
use pf_output::{CsvWriter, OutputWriter, SimOutputObserver};
use pf_sim::{Scenario, SimObserver, TickSummary};

// ── Scenario ──────────────────────────────────────────────────────────────────

const OUTPUT_DIR: &str = "output/terminal";

// 100 ms ticks, 10 simulated minutes.  Business passengers are served faster
// and skip most of the retry ramp; security is the bottleneck.
const DEFAULT_SCENARIO: &str = r#"{
    "sim": {
        "tick_duration_ms":      100,
        "total_ticks":           6000,
        "seed":                  42,
        "output_interval_ticks": 600
    },
    "stage_order":    ["check_in", "bag_drop", "security", "passport", "boarding"],
    "spawn_interval": 3.0,
    "kinds": [
        { "name": "leisure",  "pool_size": 40, "base_success_rate": 0.25,
          "success_increment": 0.15, "service_interval": 2.0 },
        { "name": "business", "pool_size": 15, "base_success_rate": 0.6,
          "success_increment": 0.2,  "service_interval": 1.0 }
    ],
    "stages": [
        { "kind": "check_in", "capacity": 3,
          "entry_point":  { "x": 0.0, "y": 0.0, "z": 0.0 },
          "queue_origin": { "x": 0.0, "y": 0.0, "z": -2.0 },
          "queue_direction": { "x": 0.0, "y": 0.0, "z": -1.0 } },
        { "kind": "bag_drop", "capacity": 2,
          "entry_point":  { "x": 12.0, "y": 0.0, "z": 0.0 },
          "queue_origin": { "x": 12.0, "y": 0.0, "z": -2.0 },
          "queue_direction": { "x": 0.0, "y": 0.0, "z": -1.0 } },
        { "kind": "security", "capacity": 2, "service_interval": 4.0,
          "base_success_rate": 0.4,
          "entry_point":  { "x": 24.0, "y": 0.0, "z": 0.0 },
          "queue_origin": { "x": 24.0, "y": 0.0, "z": -2.0 },
          "queue_direction": { "x": 0.0, "y": 0.0, "z": -1.0 },
          "queue_spacing": 1.0 },
        { "kind": "passport", "capacity": 2,
          "entry_point":  { "x": 36.0, "y": 0.0, "z": 0.0 },
          "queue_origin": { "x": 36.0, "y": 0.0, "z": -2.0 },
          "queue_direction": { "x": 0.0, "y": 0.0, "z": -1.0 } },
        { "kind": "boarding", "capacity": 6,
          "entry_point":  { "x": 48.0, "y": 0.0, "z": 0.0 },
          "queue_origin": { "x": 48.0, "y": 0.0, "z": -2.0 },
          "queue_direction": { "x": 0.0, "y": 0.0, "z": -1.0 } }
    ]
}"#;

// ── Fare ledger ───────────────────────────────────────────────────────────────

/// Fare credited when a passenger clears `stage`, in cents.
fn stage_fare(stage: StageKind) -> u64 {
    match stage {
        StageKind::CheckIn  => 0,
        StageKind::BagDrop  => 2_500,
        StageKind::Security => 450,
        StageKind::Passport => 0,
        StageKind::Boarding => 1_200,
    }
}

#[derive(Default, Debug)]
struct FareLedger {
    per_stage:  [u64; StageKind::ALL.len()],
    total:      u64,
    retries:    u64,
    boardings:  u64,
}

impl FareLedger {
    fn credit(&mut self, completion: &StageCompletion) {
        let fare = stage_fare(completion.stage);
        self.per_stage[completion.stage as usize] += fare;
        self.total   += fare;
        self.retries += completion.attempts.saturating_sub(1) as u64;
        if completion.next.is_none() {
            self.boardings += 1;
        }
    }
}

// ── Observer wrapper ──────────────────────────────────────────────────────────

/// Forwards to the CSV observer and keeps running totals for the report.
struct TallyObserver<W: OutputWriter> {
    inner:       SimOutputObserver<W>,
    spawned:     usize,
    finished:    usize,
    dropped:     usize,
    attempts:    usize,
    peak_queued: usize,
    snapshots:   usize,
}

impl<W: OutputWriter> TallyObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self {
            inner,
            spawned:     0,
            finished:    0,
            dropped:     0,
            attempts:    0,
            peak_queued: 0,
            snapshots:   0,
        }
    }
}

impl<W: OutputWriter> SimObserver for TallyObserver<W> {
    fn on_event(&mut self, tick: Tick, event: &pf_core::AgentEvent) {
        self.inner.on_event(tick, event);
    }

    fn on_unroutable(&mut self, tick: Tick, error: &pf_flow::FlowError) {
        tracing::warn!(tick = tick.0, %error, "passenger dropped");
    }

    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        self.spawned     += summary.spawned;
        self.finished    += summary.finished;
        self.dropped     += summary.dropped;
        self.attempts    += summary.attempts;
        self.peak_queued  = self.peak_queued.max(summary.queued);
        self.inner.on_tick_end(tick, summary);
    }

    fn on_snapshot(&mut self, tick: Tick, pool: &AgentPool, flow: &FlowGraph) {
        self.snapshots += 1;
        info!(
            tick = tick.0,
            active = pool.total_active(),
            queued = flow.total_queued(),
            in_service = flow.total_in_service(),
            "snapshot"
        );
        self.inner.on_snapshot(tick, pool, flow);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 1. Scenario: first CLI argument, or the embedded default.
    let scenario = match std::env::args().nth(1) {
        Some(path) => Scenario::load_json(&path).with_context(|| format!("loading {path}"))?,
        None => Scenario::from_json_str(DEFAULT_SCENARIO)?,
    };
    let config = scenario.sim.clone();
    println!("=== terminal: paxflow departure hall ===");
    println!(
        "Stages: {}  |  Ticks: {} ({} ms each)  |  Seed: {}",
        scenario.stage_order.len(),
        config.total_ticks,
        config.tick_duration_ms,
        config.seed,
    );

    // 2. Build the sim and subscribe the ledger.
    let mut sim = scenario.builder()?.build()?;
    let ledger = Rc::new(RefCell::new(FareLedger::default()));
    {
        let ledger = Rc::clone(&ledger);
        sim.flow.subscribe(move |c: &StageCompletion| ledger.borrow_mut().credit(c));
    }

    // 3. Output.
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = TallyObserver::new(SimOutputObserver::new(writer, &config));

    // 4. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 5. Report.
    println!();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!(
        "  spawned {}  |  boarded {}  |  dropped {}  |  attempts {}  |  peak queued {}",
        obs.spawned, obs.finished, obs.dropped, obs.attempts, obs.peak_queued,
    );
    if let Some(spawner) = &sim.spawner {
        println!("  spawns skipped (pool exhausted): {}", spawner.skipped());
    }
    println!("  CSV written to {OUTPUT_DIR}/ ({} snapshots)", obs.snapshots);
    println!();

    println!("{:<10} {:>5} {:>7} {:>8} {:>9} {:>6} {:>10}",
        "Stage", "Cap", "Queued", "Service", "Completed", "Peak", "Fares");
    println!("{}", "-".repeat(61));
    let ledger = ledger.borrow();
    for stage in sim.flow.stages() {
        let stats = stage.stats();
        println!(
            "{:<10} {:>5} {:>7} {:>8} {:>9} {:>6} {:>10.2}",
            stage.kind().as_str(),
            stage.capacity(),
            stage.queue_len(),
            stage.active_len(),
            stats.completed,
            stats.peak_queue,
            ledger.per_stage[stage.kind() as usize] as f64 / 100.0,
        );
    }
    println!();

    for kind in sim.pool.kinds() {
        info!(kind = %kind.name, size = kind.size, "pool partition");
    }

    let report = serde_json::json!({
        "fares_cents":  ledger.total,
        "boardings":    ledger.boardings,
        "retries":      ledger.retries,
        "still_active": sim.pool.total_active(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
