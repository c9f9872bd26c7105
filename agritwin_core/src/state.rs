//! Shared simulation state - the single synchronized store.
//!
//! One mutex guards the combined {grid, drone, mission tracker, last
//! snapshot} unit. The periodic orchestrator step and every control
//! operation run under that lock, so no reader ever observes a
//! completion percentage computed against a different generation of the
//! scanned set, and a reset can never interleave with an in-flight
//! step. The step body never awaits while holding the lock.

use crate::config::FarmConfig;
use crate::drone::{DecisionState, Drone, DroneStatus};
use crate::error::SimError;
use crate::field::{timestamp_ms, FieldGrid, Zone};
use crate::mission::{MissionId, MissionStatus, MissionTracker};
use crate::telemetry::{TelemetrySnapshot, POOR_NDVI_THRESHOLD};
use agritwin_env::TwinContext;
use serde::Serialize;
use std::sync::Mutex;
use tracing::{debug, info};

/// Read-model of the mission counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionSummary {
    /// Mission generation the counters belong to
    pub mission_id: MissionId,

    /// Number of zones in the field partition
    pub total_zones: usize,

    /// Distinct zones scanned so far
    pub scanned_zones: usize,

    /// Distinct poor zones detected so far
    pub poor_zones: usize,

    /// Mission lifecycle status
    pub status: MissionStatus,

    /// Completion percentage, rounded to 2 decimals
    pub completion_percentage: f64,

    /// Whether the periodic step is driving this mission
    pub is_running: bool,
}

/// What a status query observes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusReport {
    /// No scan has ever occurred yet
    Initializing,

    /// Live telemetry is available
    Live {
        drone: TelemetrySnapshot,
        mission: MissionSummary,
        last_updated_ms: u64,
    },
}

/// Everything the lock protects, as one unit.
struct SimulationWorld {
    grid: FieldGrid,
    drone: Drone,
    tracker: MissionTracker,
    mission_id: MissionId,
    /// Counts resets, for deriving deterministic mission ids
    generation: u64,
    last_snapshot: Option<TelemetrySnapshot>,
}

impl SimulationWorld {
    fn summary(&self) -> MissionSummary {
        MissionSummary {
            mission_id: self.mission_id,
            total_zones: self.tracker.total_zones(),
            scanned_zones: self.tracker.scanned_zone_count(),
            poor_zones: self.tracker.poor_zone_count(),
            status: self.tracker.status(),
            completion_percentage: self.tracker.completion_percentage(),
            is_running: self.tracker.is_running(),
        }
    }
}

/// The synchronized store the orchestrator writes and request handlers
/// read and control.
pub struct SharedSimulationState {
    inner: Mutex<SimulationWorld>,
}

impl SharedSimulationState {
    /// Builds the world: grid, drone at base, fresh mission tracker.
    ///
    /// Fails only on an invalid field partition.
    pub fn new<C: TwinContext>(config: &FarmConfig, ctx: &C) -> Result<Self, SimError> {
        let grid = FieldGrid::new(&config.field, ctx)?;
        let drone = Drone::new(grid.width(), grid.height());
        let tracker = MissionTracker::new(grid.zone_count());
        let mission_id = derive_mission_id(ctx, 0);

        info!(
            zones = grid.zone_count(),
            width = grid.width(),
            height = grid.height(),
            mission_id = %mission_id,
            "field grid created"
        );

        Ok(Self {
            inner: Mutex::new(SimulationWorld {
                grid,
                drone,
                tracker,
                mission_id,
                generation: 0,
                last_snapshot: None,
            }),
        })
    }

    /// Executes one orchestrator step under the lock.
    ///
    /// Returns the freshly published snapshot, or `None` for a skipped
    /// cycle (mission paused, scan not yet due, or drone out of
    /// bounds). Skipped cycles are not errors.
    pub fn advance<C: TwinContext>(&self, ctx: &C) -> Option<TelemetrySnapshot> {
        let mut world = self.inner.lock().unwrap();
        let world = &mut *world;

        if !world.tracker.is_running() {
            return None;
        }

        // A running mission never leaves the drone grounded
        world.drone.launch();
        world.drone.tick();

        // Return-to-base: the drone recharges within the same cycle,
        // like the physical dock swap it models.
        if world.drone.status() == DroneStatus::Returning {
            debug!(battery = world.drone.battery(), "drone returning to base");
            world.drone.recharge();
        }

        let now = ctx.now();
        if !world.drone.should_scan(now) {
            return None;
        }

        let zone_id = world.drone.scan(&world.grid, now)?;
        let zone = world.grid.zone(zone_id)?;
        let ndvi = world.grid.simulate_health(zone, ctx);

        let effect = world.tracker.record_scan(zone_id, ndvi);
        if effect.poor_detected {
            info!(zone_id, ndvi, "poor zone detected");
        }
        if effect.completed {
            info!(mission_id = %world.mission_id, "mission completed");
        }

        // Decision tags reflect the condition on every scan, not its
        // first occurrence: a rescan of a still-poor zone re-announces
        // it, and post-completion snapshots stay tagged completed. The
        // ScanEffect edges above only gate the log lines.
        if ndvi < POOR_NDVI_THRESHOLD {
            world.drone.set_decision(DecisionState::PoorZoneDetected);
        }
        if world.tracker.completion_percentage() >= 100.0 {
            world.drone.set_decision(DecisionState::MissionCompleted);
        }

        let now_ms = timestamp_ms(ctx);
        world.grid.touch(zone_id, now_ms);

        let snapshot = TelemetrySnapshot::capture(
            ctx,
            &world.drone,
            &world.tracker,
            world.mission_id,
            zone_id,
            ndvi,
        );
        world.last_snapshot = Some(snapshot.clone());
        Some(snapshot)
    }

    /// Status query: the latest snapshot plus mission counters, or
    /// `Initializing` when no scan has ever occurred.
    pub fn status(&self) -> StatusReport {
        let world = self.inner.lock().unwrap();
        match &world.last_snapshot {
            None => StatusReport::Initializing,
            Some(snapshot) => StatusReport::Live {
                drone: snapshot.clone(),
                mission: world.summary(),
                last_updated_ms: snapshot.timestamp_ms,
            },
        }
    }

    /// All zone records (for the read boundary).
    pub fn zones(&self) -> Vec<Zone> {
        self.inner.lock().unwrap().grid.snapshot_zones()
    }

    /// Mission counters on their own.
    pub fn mission(&self) -> MissionSummary {
        self.inner.lock().unwrap().summary()
    }

    /// Clone of the drone state (diagnostics and tests).
    pub fn drone(&self) -> Drone {
        self.inner.lock().unwrap().drone.clone()
    }

    /// Resumes the mission. Progress is retained; the drone launches if
    /// it is sitting at base.
    pub fn start(&self) {
        let mut world = self.inner.lock().unwrap();
        world.tracker.start();
        world.drone.launch();
        info!(mission_id = %world.mission_id, "mission started");
    }

    /// Pauses the mission; progress is retained.
    pub fn stop(&self) {
        let mut world = self.inner.lock().unwrap();
        world.tracker.stop();
        info!(mission_id = %world.mission_id, "mission stopped");
    }

    /// Starts a fresh mission generation.
    ///
    /// Atomically rebuilds the tracker from the current grid, resets
    /// the drone to construction defaults, clears the last snapshot,
    /// and issues a new mission id. Holding the same lock as `advance`
    /// means a reset can never expose a half-reset world.
    pub fn reset<C: TwinContext>(&self, ctx: &C) {
        let mut world = self.inner.lock().unwrap();
        world.generation += 1;
        world.tracker = MissionTracker::new(world.grid.zone_count());
        world.drone.reset();
        world.mission_id = derive_mission_id(ctx, world.generation);
        world.last_snapshot = None;
        info!(mission_id = %world.mission_id, generation = world.generation, "mission reset");
    }
}

/// Mission ids are random in production and seed-derived in simulation
/// so reruns reproduce them.
fn derive_mission_id<C: TwinContext>(ctx: &C, generation: u64) -> MissionId {
    match ctx.seed() {
        0 => MissionId::new(),
        seed => MissionId::from_seed(seed.wrapping_add(generation)),
    }
}
