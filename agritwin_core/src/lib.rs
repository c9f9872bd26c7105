//! AgriTwin Core - Drone Digital-Twin Simulation
//!
//! This library models one farm as a live digital twin:
//! 1. **FieldGrid**: a rectangular field partitioned into fixed square
//!    zones, each with immutable ecological parameters and a noisy
//!    per-query health reading
//! 2. **Drone**: a cyclic state machine sweeping the field in a raster
//!    pattern with timing-gated scans and a battery model
//! 3. **Orchestration**: a periodically driven step that ticks the
//!    drone, records scans in the mission tracker, and publishes an
//!    immutable telemetry snapshot into state shared with concurrent
//!    readers
//!
//! All clock and randomness access goes through
//! [`agritwin_env::TwinContext`], so the whole twin runs bit-for-bit
//! reproducibly under a seeded context.

pub mod config;
pub mod drone;
pub mod error;
pub mod field;
pub mod mission;
pub mod orchestrator;
pub mod state;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testctx;

// Re-export key types for convenience
pub use config::{FarmConfig, FieldConfig};
pub use drone::{DecisionState, Drone, DroneStatus};
pub use error::SimError;
pub use field::{FieldGrid, Zone};
pub use mission::{MissionId, MissionStatus, MissionTracker, ScanEffect};
pub use orchestrator::SimulationOrchestrator;
pub use state::{MissionSummary, SharedSimulationState, StatusReport};
pub use telemetry::{HealthLabel, Position, TelemetrySnapshot};
