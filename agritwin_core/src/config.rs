//! Configuration for a digital-twin instance.

use agritwin_env::FarmId;
use serde::{Deserialize, Serialize};

/// Geometry of the simulated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Field width in meters
    pub width: u32,

    /// Field height in meters
    pub height: u32,

    /// Side length of each square zone in meters
    pub zone_size: u32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            zone_size: 20,
        }
    }
}

/// Configuration for one farm twin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FarmConfig {
    /// Farm the telemetry rows are attributed to
    pub farm_id: FarmId,

    /// Field geometry
    pub field: FieldConfig,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            // Pilot farm id; later linked to a real farm registry
            farm_id: FarmId(101),
            field: FieldConfig::default(),
        }
    }
}
