//! Telemetry value objects published by the simulation.

use crate::drone::{DecisionState, Drone, DroneStatus};
use crate::mission::{MissionId, MissionTracker};
use agritwin_env::{FarmId, TelemetryRow, TwinContext};
use serde::{Deserialize, Serialize};

/// NDVI above this labels a zone "Good".
pub const GOOD_NDVI_THRESHOLD: f64 = 0.65;
/// NDVI at or below this labels a zone "Poor" (and flags it).
pub const POOR_NDVI_THRESHOLD: f64 = 0.4;

/// Qualitative vegetation health derived from an NDVI score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthLabel {
    Good,
    Moderate,
    Poor,
}

impl HealthLabel {
    /// Buckets an NDVI score.
    ///
    /// Boundaries are exclusive upward: exactly 0.65 is Moderate and
    /// exactly 0.4 is Poor.
    pub fn from_ndvi(ndvi: f64) -> Self {
        if ndvi > GOOD_NDVI_THRESHOLD {
            HealthLabel::Good
        } else if ndvi > POOR_NDVI_THRESHOLD {
            HealthLabel::Moderate
        } else {
            HealthLabel::Poor
        }
    }
}

impl std::fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthLabel::Good => "Good",
            HealthLabel::Moderate => "Moderate",
            HealthLabel::Poor => "Poor",
        };
        write!(f, "{s}")
    }
}

/// Drone position in field coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

/// Immutable snapshot of one successful scan cycle.
///
/// Only the most recent snapshot is retained in shared state; there is
/// no in-memory history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Wall-clock timestamp, ms since the Unix epoch
    pub timestamp_ms: u64,

    /// Drone status at publish time
    pub status: DroneStatus,

    /// Battery level, rounded to 2 decimals
    pub battery: f64,

    /// Drone position at publish time
    pub position: Position,

    /// Zone that was scanned this cycle
    pub zone_id: u32,

    /// Simulated NDVI score, rounded to 3 decimals
    pub ndvi_score: f64,

    /// Health label derived from the NDVI score
    pub health_label: HealthLabel,

    /// Drone decision tag at publish time
    pub decision_state: DecisionState,

    /// Mission completion percentage at publish time
    pub mission_progress: f64,

    /// Number of poor zones detected so far this mission
    pub poor_zones_detected: usize,

    /// Mission generation this snapshot belongs to
    pub mission_id: MissionId,
}

impl TelemetrySnapshot {
    /// Assembles a snapshot from the state of one completed scan cycle.
    pub fn capture<C: TwinContext>(
        ctx: &C,
        drone: &Drone,
        tracker: &MissionTracker,
        mission_id: MissionId,
        zone_id: u32,
        ndvi: f64,
    ) -> Self {
        let (x, y) = drone.position();
        Self {
            timestamp_ms: crate::field::timestamp_ms(ctx),
            status: drone.status(),
            battery: round2(drone.battery()),
            position: Position { x, y },
            zone_id,
            ndvi_score: round3(ndvi),
            health_label: HealthLabel::from_ndvi(ndvi),
            decision_state: drone.decision_state(),
            mission_progress: tracker.completion_percentage(),
            poor_zones_detected: tracker.poor_zone_count(),
            mission_id,
        }
    }

    /// Flattens into the persistence row layout.
    pub fn to_row(&self, farm_id: FarmId) -> TelemetryRow {
        TelemetryRow {
            farm_id,
            zone_id: self.zone_id,
            drone_status: self.status.to_string(),
            battery: self.battery,
            position_x: self.position.x,
            position_y: self.position.y,
            ndvi_score: self.ndvi_score,
            health_label: self.health_label.to_string(),
        }
    }
}

/// Rounds to 2 decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds to 3 decimal places.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_boundaries() {
        // Exactly at the cutoffs falls into the lower bucket
        assert_eq!(HealthLabel::from_ndvi(0.65), HealthLabel::Moderate);
        assert_eq!(HealthLabel::from_ndvi(0.4), HealthLabel::Poor);

        assert_eq!(HealthLabel::from_ndvi(0.651), HealthLabel::Good);
        assert_eq!(HealthLabel::from_ndvi(0.401), HealthLabel::Moderate);
        assert_eq!(HealthLabel::from_ndvi(0.0), HealthLabel::Poor);
        assert_eq!(HealthLabel::from_ndvi(1.0), HealthLabel::Good);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round2(99.456), 99.46);
        assert_eq!(round3(0.72049), 0.72);
        assert_eq!(round3(0.1234), 0.123);
    }

    #[test]
    fn test_status_wire_strings() {
        assert_eq!(
            serde_json::to_string(&DroneStatus::Returning).unwrap(),
            "\"RETURNING\""
        );
        assert_eq!(
            serde_json::to_string(&DecisionState::LowBatteryReturn).unwrap(),
            "\"LOW_BATTERY_RETURN\""
        );
        assert_eq!(DroneStatus::Scanning.to_string(), "SCANNING");
    }
}
