//! Common types for the AgriTwin environment abstraction.

use serde::{Deserialize, Serialize};

/// Identifier of the farm a telemetry record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FarmId(pub u32);

impl FarmId {
    /// Returns the inner numeric id.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for FarmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "farm-{}", self.0)
    }
}

/// Flat telemetry record handed to the persistence sink.
///
/// This is a transport-layer value - one row per successful scan, with
/// the column layout the durable store expects. The richer in-memory
/// snapshot stays inside the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRow {
    /// Farm this record belongs to
    pub farm_id: FarmId,

    /// Zone that was scanned
    pub zone_id: u32,

    /// Drone status at scan time (wire string, e.g. "SCANNING")
    pub drone_status: String,

    /// Battery level, rounded to 2 decimals
    pub battery: f64,

    /// Drone x position at scan time
    pub position_x: u32,

    /// Drone y position at scan time
    pub position_y: u32,

    /// Simulated NDVI score, rounded to 3 decimals
    pub ndvi_score: f64,

    /// Health label derived from the NDVI score
    pub health_label: String,
}
