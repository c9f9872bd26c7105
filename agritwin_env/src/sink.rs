//! Persistence sink boundary for telemetry records.

use crate::error::EnvError;
use crate::types::TelemetryRow;
use async_trait::async_trait;

/// Destination for telemetry rows produced by the simulation.
///
/// Delivery is best-effort and fire-and-forget: the simulation loop
/// never waits on a sink, and a failed save is logged at the boundary,
/// never raised back into the core.
///
/// # Implementations
///
/// - **Production**: an adapter over whatever durable store the deploy
///   uses (out of scope for this workspace)
/// - **Simulation**: `MemorySink` / `LoggingSink` in `agritwin_sim`
#[async_trait]
pub trait TelemetrySink: Send + Sync + 'static {
    /// Stores one telemetry row.
    async fn save(&self, row: &TelemetryRow) -> Result<(), EnvError>;
}
