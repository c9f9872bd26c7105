//! Drone state machine.
//!
//! The drone is cyclic across missions: it launches from base, sweeps
//! the field in a boustrophedon raster, and returns to base either when
//! the sweep is complete or when the battery runs low. Scanning is
//! rate-limited by wall-clock time, independent of tick cadence, since
//! ticks may run faster than useful scan resolution.

use crate::field::FieldGrid;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Flight status of the drone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DroneStatus {
    Idle,
    Flying,
    Scanning,
    Returning,
}

impl std::fmt::Display for DroneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DroneStatus::Idle => "IDLE",
            DroneStatus::Flying => "FLYING",
            DroneStatus::Scanning => "SCANNING",
            DroneStatus::Returning => "RETURNING",
        };
        write!(f, "{s}")
    }
}

/// Diagnostic tag describing the drone's last decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionState {
    Patrol,
    LowBatteryReturn,
    PoorZoneDetected,
    MissionCompleted,
    Recharged,
}

impl std::fmt::Display for DecisionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DecisionState::Patrol => "PATROL",
            DecisionState::LowBatteryReturn => "LOW_BATTERY_RETURN",
            DecisionState::PoorZoneDetected => "POOR_ZONE_DETECTED",
            DecisionState::MissionCompleted => "MISSION_COMPLETED",
            DecisionState::Recharged => "RECHARGED",
        };
        write!(f, "{s}")
    }
}

/// The simulated survey drone.
///
/// Mutated only by its own tick/scan logic and the explicit
/// `recharge`/`reset` operations the orchestrator invokes.
#[derive(Debug, Clone)]
pub struct Drone {
    x: u32,
    y: u32,
    altitude: u32,
    battery: f64,
    status: DroneStatus,
    decision_state: DecisionState,
    last_scan_time: Option<Duration>,
    field_width: u32,
    field_height: u32,
}

impl Drone {
    /// Distance covered per tick, in meters.
    pub const STEP_SIZE: u32 = 10;
    /// Battery drained per tick, in percent points.
    pub const BATTERY_DRAIN: f64 = 0.5;
    /// Battery level at or below which the drone aborts and returns.
    pub const LOW_BATTERY_THRESHOLD: f64 = 20.0;
    /// Battery level after a recharge at base.
    pub const FULL_BATTERY: f64 = 100.0;
    /// Minimum wall-clock time between scans.
    pub const SCAN_INTERVAL: Duration = Duration::from_secs(5);
    /// Fixed survey altitude, in meters.
    pub const CRUISE_ALTITUDE: u32 = 30;

    /// Creates a drone at base, charged, idle.
    pub fn new(field_width: u32, field_height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            altitude: Self::CRUISE_ALTITUDE,
            battery: Self::FULL_BATTERY,
            status: DroneStatus::Idle,
            decision_state: DecisionState::Patrol,
            last_scan_time: None,
            field_width,
            field_height,
        }
    }

    /// Current position in field coordinates.
    pub fn position(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// Survey altitude in meters.
    pub fn altitude(&self) -> u32 {
        self.altitude
    }

    /// Battery level in [0, 100].
    pub fn battery(&self) -> f64 {
        self.battery
    }

    /// Current flight status.
    pub fn status(&self) -> DroneStatus {
        self.status
    }

    /// Current diagnostic tag.
    pub fn decision_state(&self) -> DecisionState {
        self.decision_state
    }

    /// Monotonic time of the last scan, if any scan happened yet.
    pub fn last_scan_time(&self) -> Option<Duration> {
        self.last_scan_time
    }

    /// Takes off for a sweep: Idle becomes Flying.
    pub fn launch(&mut self) {
        if self.status == DroneStatus::Idle {
            self.status = DroneStatus::Flying;
        }
    }

    /// Advances one simulation tick.
    ///
    /// Moves while airborne, always drains battery, and forces a
    /// low-battery return that overrides whatever the move decided.
    pub fn tick(&mut self) {
        self.decision_state = DecisionState::Patrol;

        if matches!(self.status, DroneStatus::Flying | DroneStatus::Scanning) {
            self.advance();
        }

        self.battery = (self.battery - Self::BATTERY_DRAIN).max(0.0);

        if self.battery <= Self::LOW_BATTERY_THRESHOLD {
            self.status = DroneStatus::Returning;
            self.decision_state = DecisionState::LowBatteryReturn;
        }
    }

    /// One raster step: advance x; on overflow wrap to the next row.
    ///
    /// Running past the last row means the sweep covered the whole
    /// field, so the drone turns back. The raster guarantees full
    /// coverage without revisiting a row before the next is started.
    fn advance(&mut self) {
        if self.x + Self::STEP_SIZE < self.field_width {
            self.x += Self::STEP_SIZE;
        } else {
            self.x = 0;
            self.y += Self::STEP_SIZE;
        }

        if self.y >= self.field_height {
            self.status = DroneStatus::Returning;
        }
    }

    /// Whether enough wall-clock time has passed for the next scan.
    pub fn should_scan(&self, now: Duration) -> bool {
        match self.last_scan_time {
            None => true,
            Some(last) => now.saturating_sub(last) >= Self::SCAN_INTERVAL,
        }
    }

    /// Scans the zone under the current position.
    ///
    /// Stamps the scan time and switches to Scanning regardless of the
    /// lookup outcome; out of bounds yields `None`.
    pub fn scan(&mut self, grid: &FieldGrid, now: Duration) -> Option<u32> {
        let zone_id = grid.locate(self.x, self.y).map(|z| z.id);
        self.last_scan_time = Some(now);
        self.status = DroneStatus::Scanning;
        zone_id
    }

    /// Return-to-base: back at origin, recharged, idle.
    ///
    /// Battery increases only here, and only to exactly full.
    pub fn recharge(&mut self) {
        self.x = 0;
        self.y = 0;
        self.battery = Self::FULL_BATTERY;
        self.status = DroneStatus::Idle;
        self.decision_state = DecisionState::Recharged;
    }

    /// Restores construction defaults, clearing scan history.
    pub fn reset(&mut self) {
        *self = Self::new(self.field_width, self.field_height);
    }

    pub(crate) fn set_decision(&mut self, decision: DecisionState) {
        self.decision_state = decision;
    }

    #[cfg(test)]
    pub(crate) fn set_battery(&mut self, battery: f64) {
        self.battery = battery;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldConfig;
    use crate::testctx::ManualContext;

    fn airborne_drone() -> Drone {
        let mut drone = Drone::new(100, 100);
        drone.launch();
        drone
    }

    #[test]
    fn test_initial_state() {
        let drone = Drone::new(100, 100);
        assert_eq!(drone.position(), (0, 0));
        assert_eq!(drone.battery(), 100.0);
        assert_eq!(drone.status(), DroneStatus::Idle);
        assert_eq!(drone.altitude(), 30);
        assert!(drone.last_scan_time().is_none());
    }

    #[test]
    fn test_idle_drone_drains_but_does_not_move() {
        let mut drone = Drone::new(100, 100);
        drone.tick();
        assert_eq!(drone.position(), (0, 0));
        assert_eq!(drone.battery(), 99.5);
    }

    #[test]
    fn test_raster_sweep_wraps_to_next_row() {
        let mut drone = airborne_drone();
        for _ in 0..9 {
            drone.tick();
        }
        assert_eq!(drone.position(), (90, 0));

        drone.tick();
        assert_eq!(drone.position(), (0, 10));
        assert_eq!(drone.status(), DroneStatus::Flying);
    }

    #[test]
    fn test_full_sweep_ends_returning() {
        let mut drone = airborne_drone();
        for _ in 0..100 {
            drone.tick();
        }
        assert_eq!(drone.status(), DroneStatus::Returning);
        assert_eq!(drone.battery(), 50.0);
    }

    #[test]
    fn test_low_battery_overrides_move_decision() {
        let mut drone = airborne_drone();
        drone.set_battery(20.5);
        drone.tick();
        assert_eq!(drone.battery(), 20.0);
        assert_eq!(drone.status(), DroneStatus::Returning);
        assert_eq!(drone.decision_state(), DecisionState::LowBatteryReturn);
    }

    #[test]
    fn test_battery_never_negative() {
        let mut drone = airborne_drone();
        drone.set_battery(0.2);
        drone.tick();
        assert_eq!(drone.battery(), 0.0);
    }

    #[test]
    fn test_should_scan_rate_limited_by_clock() {
        let ctx = ManualContext::new();
        let grid = crate::field::FieldGrid::new(&FieldConfig::default(), &ctx).unwrap();
        let mut drone = airborne_drone();

        assert!(drone.should_scan(Duration::ZERO));
        drone.scan(&grid, Duration::from_secs(10));

        assert!(!drone.should_scan(Duration::from_secs(14)));
        assert!(drone.should_scan(Duration::from_secs(15)));
    }

    #[test]
    fn test_scan_out_of_bounds_still_stamps() {
        let ctx = ManualContext::new();
        let grid = crate::field::FieldGrid::new(&FieldConfig::default(), &ctx).unwrap();
        let mut drone = airborne_drone();

        // Push past the field: sweep complete
        for _ in 0..100 {
            drone.tick();
        }
        assert_eq!(drone.position(), (0, 100));

        let zone = drone.scan(&grid, Duration::from_secs(1));
        assert!(zone.is_none());
        assert_eq!(drone.last_scan_time(), Some(Duration::from_secs(1)));
        assert_eq!(drone.status(), DroneStatus::Scanning);
    }

    #[test]
    fn test_recharge_restores_base_state() {
        let mut drone = airborne_drone();
        for _ in 0..100 {
            drone.tick();
        }
        assert_eq!(drone.status(), DroneStatus::Returning);

        drone.recharge();
        assert_eq!(drone.position(), (0, 0));
        assert_eq!(drone.battery(), 100.0);
        assert_eq!(drone.status(), DroneStatus::Idle);
        assert_eq!(drone.decision_state(), DecisionState::Recharged);
    }

    #[test]
    fn test_reset_clears_scan_history() {
        let ctx = ManualContext::new();
        let grid = crate::field::FieldGrid::new(&FieldConfig::default(), &ctx).unwrap();
        let mut drone = airborne_drone();
        drone.scan(&grid, Duration::from_secs(3));
        drone.tick();

        drone.reset();
        assert_eq!(drone.status(), DroneStatus::Idle);
        assert_eq!(drone.battery(), 100.0);
        assert!(drone.last_scan_time().is_none());
    }
}
