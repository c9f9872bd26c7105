//! Telemetry sinks for simulated and live runs.

use agritwin_env::{EnvError, TelemetryRow, TelemetrySink};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::info;

/// In-memory sink recording every row it receives.
///
/// The deterministic harness and the integration tests use this to
/// assert on what the simulation would have persisted.
pub struct MemorySink {
    rows: Mutex<Vec<TelemetryRow>>,
}

impl MemorySink {
    /// Creates an empty, shareable sink.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(Vec::new()),
        })
    }

    /// Rows received so far.
    pub fn rows(&self) -> Vec<TelemetryRow> {
        self.rows.lock().unwrap().clone()
    }

    /// Number of rows received so far.
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Whether no row has arrived yet.
    pub fn is_empty(&self) -> bool {
        self.rows.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl TelemetrySink for MemorySink {
    async fn save(&self, row: &TelemetryRow) -> Result<(), EnvError> {
        self.rows.lock().unwrap().push(row.clone());
        Ok(())
    }
}

/// Sink that logs each row instead of persisting it.
///
/// Used by `--live` mode, where no durable store is wired up.
pub struct LoggingSink;

impl LoggingSink {
    /// Creates a shareable logging sink.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self)
    }
}

#[async_trait]
impl TelemetrySink for LoggingSink {
    async fn save(&self, row: &TelemetryRow) -> Result<(), EnvError> {
        info!(
            farm_id = %row.farm_id,
            zone_id = row.zone_id,
            ndvi = row.ndvi_score,
            health = %row.health_label,
            battery = row.battery,
            "telemetry row"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agritwin_env::FarmId;

    fn sample_row() -> TelemetryRow {
        TelemetryRow {
            farm_id: FarmId(101),
            zone_id: 3,
            drone_status: "SCANNING".to_string(),
            battery: 98.5,
            position_x: 30,
            position_y: 0,
            ndvi_score: 0.575,
            health_label: "Moderate".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_sink_records_rows() {
        let sink = MemorySink::shared();
        assert!(sink.is_empty());

        sink.save(&sample_row()).await.unwrap();
        sink.save(&sample_row()).await.unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.rows()[0].zone_id, 3);
    }
}
