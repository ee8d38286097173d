//! JSON scenario files: everything needed to build a [`Sim`][crate::Sim].
//!
//! ```json
//! {
//!   "sim":            { "tick_duration_ms": 100, "total_ticks": 6000, "seed": 7 },
//!   "stage_order":    ["check_in", "security", "boarding"],
//!   "spawn_interval": 2.0,
//!   "kinds": [
//!     { "name": "leisure", "pool_size": 30, "base_success_rate": 0.3,
//!       "success_increment": 0.1, "service_interval": 1.5 }
//!   ],
//!   "stages": [
//!     { "kind": "check_in", "capacity": 2, "queue_spacing": 1.5 },
//!     { "kind": "security", "capacity": 1, "base_success_rate": 0.5 },
//!     { "kind": "boarding", "capacity": 4 }
//!   ]
//! }
//! ```
//!
//! Durations are in seconds and are converted to whole ticks (rounded up,
//! at least one) when the builder is made.

use std::path::Path;

use pf_agent::{AgentPoolBuilder, ServiceProfile};
use pf_core::{Point3, SimConfig, StageKind};
use pf_flow::{FlowError, FlowGraph};
use pf_stage::{QueueLayout, ServiceOverride, Stage};
use serde::{Deserialize, Serialize};

use crate::{SimBuilder, SimError, SimResult};

fn default_spacing() -> f32 {
    1.5
}

fn default_direction() -> Point3 {
    Point3::FORWARD
}

/// One service point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    pub kind:     StageKind,
    pub capacity: usize,

    #[serde(default = "default_spacing")]
    pub queue_spacing:   f32,
    #[serde(default)]
    pub entry_point:     Point3,
    #[serde(default)]
    pub queue_origin:    Point3,
    #[serde(default = "default_direction")]
    pub queue_direction: Point3,

    /// Overrides for visiting agents; unset fields use the agent kind's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_success_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_increment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_interval:  Option<f64>,
}

/// One passenger archetype and its share of the pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KindConfig {
    pub name:              String,
    pub pool_size:         usize,
    pub base_success_rate: f64,
    pub success_increment: f64,
    /// Seconds between attempts.
    pub service_interval:  f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub sim:            SimConfig,
    pub stage_order:    Vec<StageKind>,
    pub stages:         Vec<StageConfig>,
    pub kinds:          Vec<KindConfig>,
    /// Seconds between spawn attempts.
    pub spawn_interval: f64,
}

impl Scenario {
    /// Parse and validate.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Read, parse, and validate a scenario file.
    pub fn load_json(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every setting without building anything.
    ///
    /// Reports the first problem found: bad timing, a kind with no agents or
    /// an invalid profile, a stage with zero capacity or a bad override, an
    /// empty or cyclic stage order, a stage configured twice or not in the
    /// order, and a stage in the order with no configuration.
    pub fn validate(&self) -> SimResult<()> {
        self.sim.validate()?;
        let clock = self.sim.make_clock();
        clock.ticks_for_secs(self.spawn_interval)?;

        if self.kinds.is_empty() {
            return Err(SimError::Config("scenario defines no agent kinds".into()));
        }
        for kind in &self.kinds {
            self.kind_profile(kind)?;
        }

        let flow = FlowGraph::from_order(&self.stage_order)?;
        let mut seen: Vec<StageKind> = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            if seen.contains(&stage.kind) {
                return Err(FlowError::DuplicateStage { stage: stage.kind }.into());
            }
            if !flow.is_linked(stage.kind) {
                return Err(FlowError::NotInGraph { stage: stage.kind }.into());
            }
            seen.push(stage.kind);
            self.stage(stage)?;
        }
        if let Some(&missing) = self.stage_order.iter().find(|&k| !seen.contains(k)) {
            return Err(FlowError::Unregistered { stage: missing }.into());
        }
        Ok(())
    }

    /// Build the pool and stage graph and return a builder with the spawn
    /// cadence set.
    pub fn builder(&self) -> SimResult<SimBuilder> {
        let clock = self.sim.make_clock();

        let mut flow = FlowGraph::from_order(&self.stage_order)?;
        for config in &self.stages {
            flow.register(self.stage(config)?)?;
        }

        let mut pool = AgentPoolBuilder::new(self.sim.seed, flow.head());
        for kind in &self.kinds {
            pool = pool.kind(kind.name.clone(), self.kind_profile(kind)?, kind.pool_size);
        }
        let pool = pool.build()?;

        let spawn_ticks = clock.ticks_for_secs(self.spawn_interval)?;
        Ok(SimBuilder::new(self.sim.clone(), pool, flow).spawn_every(spawn_ticks))
    }

    fn kind_profile(&self, kind: &KindConfig) -> SimResult<ServiceProfile> {
        if kind.pool_size == 0 {
            return Err(SimError::Config(format!("agent kind '{}' has pool_size 0", kind.name)));
        }
        let interval = self.sim.make_clock().ticks_for_secs(kind.service_interval)?;
        Ok(ServiceProfile::new(interval, kind.base_success_rate, kind.success_increment)?)
    }

    fn stage(&self, config: &StageConfig) -> SimResult<Stage> {
        let layout = QueueLayout::new(
            config.kind,
            config.entry_point,
            config.queue_origin,
            config.queue_direction,
            config.queue_spacing,
        )?;
        let interval_ticks = match config.service_interval {
            Some(secs) => Some(self.sim.make_clock().ticks_for_secs(secs)?),
            None => None,
        };
        let service = ServiceOverride {
            interval_ticks,
            base_success_rate: config.base_success_rate,
            success_increment: config.success_increment,
        };
        Ok(Stage::new(config.kind, config.capacity, layout)?.with_service(service)?)
    }
}
