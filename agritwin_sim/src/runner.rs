//! Scenario runner - drives whole missions on virtual time.
//!
//! Every run advances the virtual clock by one scan interval per tick,
//! so each tick performs one scan. Wall-clock cadence is irrelevant
//! here; only the step semantics are under test.

use crate::context::SimContext;
use crate::scenarios::ScenarioId;

use agritwin_core::{
    DecisionState, Drone, FarmConfig, FieldConfig, MissionStatus, SharedSimulationState,
    StatusReport, TelemetrySnapshot,
};
use tracing::{debug, info};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Total ticks executed
    pub total_ticks: u64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default)]
pub struct ScenarioMetrics {
    /// Snapshots published by the step
    pub snapshots_published: u64,

    /// Distinct zones scanned at the end of the run
    pub zones_scanned: usize,

    /// Distinct poor zones detected
    pub poor_zones: usize,

    /// Recharge events observed in snapshots
    pub recharges: u64,

    /// Tick at which the mission first reached 100%
    pub completed_at_tick: Option<u64>,
}

/// Runs mission scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Tick budget per mission phase
    max_ticks: u64,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_ticks: 120,
        }
    }

    /// Sets the tick budget per mission phase.
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        match scenario {
            ScenarioId::FullSweep => self.run_full_sweep(),
            ScenarioId::LowBattery => self.run_low_battery(),
            ScenarioId::ResetCycle => self.run_reset_cycle(),
        }
    }

    /// Default 100x100 field, 25 zones. One full sweep takes 100 ticks
    /// and never gets near the battery threshold.
    ///
    /// Asserts: completion reaches exactly 100%, every zone is scanned,
    /// progress is monotone, battery stays in range.
    fn run_full_sweep(&self) -> ScenarioResult {
        let ctx = SimContext::new(self.seed);
        let state = match SharedSimulationState::new(&FarmConfig::default(), &ctx) {
            Ok(state) => state,
            Err(err) => return self.failed_setup(ScenarioId::FullSweep, &err.to_string()),
        };
        state.start();

        let mut metrics = ScenarioMetrics::default();
        let snapshots = drive(&state, &ctx, self.max_ticks, &mut metrics);

        let mut failures = Vec::new();
        check_battery_bounds(&snapshots, &mut failures);
        check_monotone_progress(&snapshots, &mut failures);

        let mission = state.mission();
        metrics.zones_scanned = mission.scanned_zones;
        metrics.poor_zones = mission.poor_zones;

        if mission.completion_percentage != 100.0 {
            failures.push(format!(
                "completion {:.2}% after {} ticks",
                mission.completion_percentage, self.max_ticks
            ));
        }
        if mission.scanned_zones != mission.total_zones {
            failures.push(format!(
                "scanned {}/{} zones",
                mission.scanned_zones, mission.total_zones
            ));
        }
        if mission.status != MissionStatus::Completed {
            failures.push(format!("mission status {:?}", mission.status));
        }
        if metrics.completed_at_tick.is_none() {
            failures.push("no MISSION_COMPLETED snapshot observed".to_string());
        }

        info!(
            "full_sweep complete: {} snapshots, {}/{} zones, {} poor",
            metrics.snapshots_published,
            mission.scanned_zones,
            mission.total_zones,
            mission.poor_zones
        );
        self.finish(ScenarioId::FullSweep, self.max_ticks, metrics, failures)
    }

    /// 200x200 field, 100 zones. The battery reaches the threshold at
    /// tick 160, long before the 400-tick sweep finishes, forcing a
    /// return-and-recharge mid-mission.
    ///
    /// Asserts: no published battery ever drops below the threshold,
    /// and every recharge lands the drone at base fully charged.
    fn run_low_battery(&self) -> ScenarioResult {
        let config = FarmConfig {
            field: FieldConfig {
                width: 200,
                height: 200,
                zone_size: 20,
            },
            ..FarmConfig::default()
        };
        let ticks = self.max_ticks.max(400);

        let ctx = SimContext::new(self.seed);
        let state = match SharedSimulationState::new(&config, &ctx) {
            Ok(state) => state,
            Err(err) => return self.failed_setup(ScenarioId::LowBattery, &err.to_string()),
        };
        state.start();

        let mut metrics = ScenarioMetrics::default();
        let snapshots = drive(&state, &ctx, ticks, &mut metrics);

        let mut failures = Vec::new();
        check_battery_bounds(&snapshots, &mut failures);

        let min_battery = snapshots
            .iter()
            .map(|s| s.battery)
            .fold(f64::INFINITY, f64::min);
        if min_battery < Drone::LOW_BATTERY_THRESHOLD {
            failures.push(format!(
                "published battery {min_battery} below return threshold"
            ));
        }
        if metrics.recharges < 2 {
            failures.push(format!("only {} recharges in {} ticks", metrics.recharges, ticks));
        }
        // Every battery jump must be a full recharge at base
        for pair in snapshots.windows(2) {
            let snapshot = &pair[1];
            if snapshot.battery > pair[0].battery
                && (snapshot.battery != Drone::FULL_BATTERY
                    || (snapshot.position.x, snapshot.position.y) != (0, 0))
            {
                failures.push(format!(
                    "recharge snapshot at ({}, {}) with battery {}",
                    snapshot.position.x, snapshot.position.y, snapshot.battery
                ));
            }
        }

        let mission = state.mission();
        metrics.zones_scanned = mission.scanned_zones;
        metrics.poor_zones = mission.poor_zones;
        if mission.scanned_zones == 0 {
            failures.push("no zones scanned".to_string());
        }

        info!(
            "low_battery complete: {} recharges, min published battery {:.1}",
            metrics.recharges, min_battery
        );
        self.finish(ScenarioId::LowBattery, ticks, metrics, failures)
    }

    /// Completes a mission, resets, and runs a second generation.
    ///
    /// Asserts: the reset restores construction defaults atomically,
    /// issues a fresh mission id, and the second generation completes
    /// with every snapshot tagged by the new id.
    fn run_reset_cycle(&self) -> ScenarioResult {
        let ctx = SimContext::new(self.seed);
        let state = match SharedSimulationState::new(&FarmConfig::default(), &ctx) {
            Ok(state) => state,
            Err(err) => return self.failed_setup(ScenarioId::ResetCycle, &err.to_string()),
        };
        state.start();

        let mut metrics = ScenarioMetrics::default();
        drive(&state, &ctx, self.max_ticks, &mut metrics);

        let mut failures = Vec::new();
        let first = state.mission();
        if first.status != MissionStatus::Completed {
            failures.push(format!("first generation ended {:?}", first.status));
        }

        state.reset(&ctx);

        let fresh = state.mission();
        if fresh.mission_id == first.mission_id {
            failures.push("reset reused the mission id".to_string());
        }
        if fresh.scanned_zones != 0
            || fresh.poor_zones != 0
            || fresh.status != MissionStatus::NotStarted
            || fresh.is_running
        {
            failures.push(format!("reset left stale counters: {fresh:?}"));
        }
        let drone = state.drone();
        if drone.battery() != Drone::FULL_BATTERY || drone.position() != (0, 0) {
            failures.push(format!(
                "reset left drone at {:?} with battery {}",
                drone.position(),
                drone.battery()
            ));
        }
        if !matches!(state.status(), StatusReport::Initializing) {
            failures.push("reset did not clear the last snapshot".to_string());
        }

        // Second generation from a cold start
        state.start();
        let second_snapshots = drive(&state, &ctx, self.max_ticks, &mut metrics);

        if second_snapshots
            .iter()
            .any(|s| s.mission_id != fresh.mission_id)
        {
            failures.push("second generation published a stale mission id".to_string());
        }
        let second = state.mission();
        metrics.zones_scanned = second.scanned_zones;
        metrics.poor_zones = second.poor_zones;
        if second.completion_percentage != 100.0 {
            failures.push(format!(
                "second generation completion {:.2}%",
                second.completion_percentage
            ));
        }

        info!(
            "reset_cycle complete: second generation at {:.0}%",
            second.completion_percentage
        );
        self.finish(ScenarioId::ResetCycle, self.max_ticks * 2, metrics, failures)
    }

    fn finish(
        &self,
        scenario: ScenarioId,
        total_ticks: u64,
        metrics: ScenarioMetrics,
        failures: Vec<String>,
    ) -> ScenarioResult {
        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: failures.is_empty(),
            total_ticks,
            failure_reason: if failures.is_empty() {
                None
            } else {
                Some(failures.join("; "))
            },
            metrics,
        }
    }

    fn failed_setup(&self, scenario: ScenarioId, reason: &str) -> ScenarioResult {
        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: false,
            total_ticks: 0,
            failure_reason: Some(format!("setup failed: {reason}")),
            metrics: ScenarioMetrics::default(),
        }
    }
}

/// Advances the clock one scan interval per tick and steps the state,
/// collecting the published snapshots.
fn drive(
    state: &SharedSimulationState,
    ctx: &SimContext,
    ticks: u64,
    metrics: &mut ScenarioMetrics,
) -> Vec<TelemetrySnapshot> {
    let mut snapshots = Vec::new();
    let mut prev_battery = Drone::FULL_BATTERY;
    for tick in 0..ticks {
        ctx.advance_time(Drone::SCAN_INTERVAL);
        let Some(snapshot) = state.advance(ctx) else {
            continue;
        };
        metrics.snapshots_published += 1;
        // Battery only ever increases at the dock
        if snapshot.battery > prev_battery {
            metrics.recharges += 1;
        }
        prev_battery = snapshot.battery;
        if snapshot.decision_state == DecisionState::MissionCompleted
            && metrics.completed_at_tick.is_none()
        {
            metrics.completed_at_tick = Some(tick);
            debug!(tick, "mission completed");
        }
        snapshots.push(snapshot);
    }
    snapshots
}

fn check_battery_bounds(snapshots: &[TelemetrySnapshot], failures: &mut Vec<String>) {
    if let Some(bad) = snapshots
        .iter()
        .find(|s| !(0.0..=Drone::FULL_BATTERY).contains(&s.battery))
    {
        failures.push(format!("battery {} out of range", bad.battery));
    }
}

fn check_monotone_progress(snapshots: &[TelemetrySnapshot], failures: &mut Vec<String>) {
    for pair in snapshots.windows(2) {
        if pair[1].mission_progress < pair[0].mission_progress {
            failures.push(format!(
                "progress regressed from {} to {}",
                pair[0].mission_progress, pair[1].mission_progress
            ));
            return;
        }
    }
}
