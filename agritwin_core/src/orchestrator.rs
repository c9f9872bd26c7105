//! Simulation orchestrator - the periodically driven step.
//!
//! One long-lived background task runs the step at a fixed period,
//! concurrently with any number of request handlers touching the shared
//! state. The step's core transition never blocks on external I/O:
//! telemetry rows are handed to the persistence sink through a bounded
//! channel drained by a separate forwarder task, so a slow or absent
//! store cannot stall simulation cadence or starve the lock.

use crate::state::SharedSimulationState;
use crate::telemetry::TelemetrySnapshot;
use agritwin_env::{FarmId, TelemetryRow, TelemetrySink, TwinContext};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

/// Drives the drone/mission step and publishes telemetry.
pub struct SimulationOrchestrator<C: TwinContext> {
    ctx: Arc<C>,
    state: Arc<SharedSimulationState>,
    farm_id: FarmId,
    telemetry_tx: mpsc::Sender<TelemetryRow>,
}

impl<C: TwinContext> SimulationOrchestrator<C> {
    /// Wall-clock period between steps.
    pub const TICK_PERIOD: Duration = Duration::from_secs(2);
    /// Rows buffered towards the sink before best-effort dropping.
    const SINK_QUEUE_DEPTH: usize = 64;

    /// Creates the orchestrator and spawns its sink forwarder task.
    pub fn new(
        ctx: Arc<C>,
        state: Arc<SharedSimulationState>,
        farm_id: FarmId,
        sink: Arc<dyn TelemetrySink>,
    ) -> Self {
        let (telemetry_tx, telemetry_rx) = mpsc::channel(Self::SINK_QUEUE_DEPTH);
        spawn_sink_forwarder(ctx.as_ref(), sink, telemetry_rx);
        Self {
            ctx,
            state,
            farm_id,
            telemetry_tx,
        }
    }

    /// The shared state this orchestrator drives.
    pub fn state(&self) -> Arc<SharedSimulationState> {
        Arc::clone(&self.state)
    }

    /// Executes one step and hands any snapshot to the sink.
    ///
    /// Delivery is `try_send`: if the queue is full the row is dropped,
    /// which is acceptable - durability of any one telemetry record is
    /// not required for correctness.
    pub fn step(&self) -> Option<TelemetrySnapshot> {
        let snapshot = self.state.advance(self.ctx.as_ref())?;
        if let Err(err) = self.telemetry_tx.try_send(snapshot.to_row(self.farm_id)) {
            debug!(error = %err, "telemetry row dropped");
        }
        Some(snapshot)
    }

    /// Runs the periodic loop until `shutdown` flips true or its sender
    /// is dropped.
    ///
    /// Scheduling is a coarse sleep-based interval; drift between
    /// periods is expected and acceptable.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        debug!(period = ?Self::TICK_PERIOD, "simulation loop started");
        loop {
            tokio::select! {
                _ = self.ctx.sleep(Self::TICK_PERIOD) => {
                    self.step();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("simulation loop stopped");
    }

    /// Spawns the loop as a background task tied to process lifecycle.
    ///
    /// Send `true` on the returned handle (or drop it) to stop.
    pub fn spawn_loop(self: Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let orchestrator = Arc::clone(&self);
        self.ctx.spawn("simulation-loop", async move {
            orchestrator.run(shutdown_rx).await;
        });
        shutdown_tx
    }
}

/// Drains telemetry rows into the sink, logging failures at the
/// boundary instead of raising them into the simulation loop.
fn spawn_sink_forwarder<C: TwinContext>(
    ctx: &C,
    sink: Arc<dyn TelemetrySink>,
    mut rx: mpsc::Receiver<TelemetryRow>,
) {
    ctx.spawn("telemetry-sink", async move {
        while let Some(row) = rx.recv().await {
            if let Err(err) = sink.save(&row).await {
                warn!(error = %err, farm_id = %row.farm_id, "telemetry save failed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FarmConfig;
    use crate::drone::Drone;
    use crate::state::StatusReport;
    use crate::testctx::ManualContext;
    use agritwin_env::{EnvError, TokioContext};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingSink {
        rows: Mutex<Vec<TelemetryRow>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(Vec::new()),
            })
        }

        fn rows(&self) -> Vec<TelemetryRow> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TelemetrySink for RecordingSink {
        async fn save(&self, row: &TelemetryRow) -> Result<(), EnvError> {
            self.rows.lock().unwrap().push(row.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl TelemetrySink for FailingSink {
        async fn save(&self, _row: &TelemetryRow) -> Result<(), EnvError> {
            Err(EnvError::unavailable("store offline"))
        }
    }

    fn orchestrator_with_sink(
        sink: Arc<dyn TelemetrySink>,
    ) -> (SimulationOrchestrator<ManualContext>, Arc<ManualContext>) {
        let ctx = Arc::new(ManualContext::new());
        let state = Arc::new(
            SharedSimulationState::new(&FarmConfig::default(), ctx.as_ref()).unwrap(),
        );
        state.start();
        let orchestrator =
            SimulationOrchestrator::new(Arc::clone(&ctx), state, FarmId(101), sink);
        (orchestrator, ctx)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_step_forwards_row_to_sink() {
        let sink = RecordingSink::new();
        let (orchestrator, ctx) = orchestrator_with_sink(sink.clone());

        ctx.advance(Drone::SCAN_INTERVAL);
        let snapshot = orchestrator.step().expect("first scan due");

        // The forwarder task delivers asynchronously
        for _ in 0..100 {
            if !sink.rows().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let rows = sink.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], snapshot.to_row(FarmId(101)));
        assert_eq!(rows[0].drone_status, "SCANNING");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_sink_failure_does_not_break_stepping() {
        let (orchestrator, ctx) = orchestrator_with_sink(Arc::new(FailingSink));

        for _ in 0..5 {
            ctx.advance(Drone::SCAN_INTERVAL);
            assert!(orchestrator.step().is_some());
        }
        // 5 scans at x = 10..50 span 3 distinct 20 m zones
        match orchestrator.state().status() {
            StatusReport::Live { mission, .. } => assert_eq!(mission.scanned_zones, 3),
            StatusReport::Initializing => panic!("expected live status"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_loop_stops_on_shutdown() {
        let ctx = TokioContext::shared();
        let state = Arc::new(
            SharedSimulationState::new(&FarmConfig::default(), ctx.as_ref()).unwrap(),
        );
        state.start();
        let orchestrator = Arc::new(SimulationOrchestrator::new(
            Arc::clone(&ctx),
            state,
            FarmId(101),
            RecordingSink::new(),
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let looper = Arc::clone(&orchestrator);
        let handle = tokio::spawn(async move {
            looper.run(shutdown_rx).await;
        });

        // A few periods pass on the auto-advancing test clock
        tokio::time::sleep(Duration::from_secs(7)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        // The very first step scans (no prior scan exists)
        assert!(matches!(
            orchestrator.state().status(),
            StatusReport::Live { .. }
        ));
    }
}
