//! AgriTwin Simulation CLI
//!
//! Run deterministic mission scenarios, or drive the twin live on the
//! real clock with telemetry logged to stdout.

use agritwin_core::{FarmConfig, SharedSimulationState, SimulationOrchestrator};
use agritwin_env::TokioContext;
use agritwin_sim::scenarios::ScenarioId;
use agritwin_sim::{LoggingSink, ScenarioResult, ScenarioRunner};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// AgriTwin deterministic simulation CLI
#[derive(Parser, Debug)]
#[command(name = "agritwin-sim")]
#[command(about = "Run drone digital-twin simulation scenarios", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (full_sweep, low_battery, reset_cycle, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Tick budget per mission phase
    #[arg(short, long, default_value = "120")]
    ticks: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Run live on the real clock for this many seconds instead of
    /// running scenarios
    #[arg(long)]
    live: Option<u64>,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if let Some(seconds) = args.live {
        run_live(seconds);
        return;
    }

    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!("Available scenarios: full_sweep, low_battery, reset_cycle, all");
            std::process::exit(1);
        })]
    };

    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64
    } else {
        args.seed
    };

    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = ScenarioRunner::new(seed).with_max_ticks(args.ticks);

        for scenario in &scenarios {
            let result = runner.run(*scenario);

            if !args.json {
                if result.passed {
                    info!("PASS {} (seed={})", scenario.name(), seed);
                } else {
                    error!(
                        "FAIL {} (seed={}): {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }
            all_results.push(result);
        }
    }

    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "ticks": r.total_ticks,
                    "snapshots": r.metrics.snapshots_published,
                    "zones_scanned": r.metrics.zones_scanned,
                    "poor_zones": r.metrics.poor_zones,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap());
    } else if failed_count == 0 {
        info!("All {} scenario runs passed", total);
    } else {
        error!("{}/{} scenario runs failed", failed_count, total);
        for result in all_results.iter().filter(|r| !r.passed) {
            error!(
                "  - {} seed={}: {}",
                result.scenario.name(),
                result.seed,
                result.failure_reason.as_deref().unwrap_or("unknown")
            );
        }
    }

    if failed_count > 0 {
        std::process::exit(1);
    }
}

/// Runs the twin on the real clock for a bounded time, logging every
/// telemetry row.
fn run_live(seconds: u64) {
    let runtime = tokio::runtime::Runtime::new().expect("Failed to build tokio runtime");
    runtime.block_on(async {
        let config = FarmConfig::default();
        let ctx = TokioContext::shared();
        let state = match SharedSimulationState::new(&config, ctx.as_ref()) {
            Ok(state) => Arc::new(state),
            Err(err) => {
                error!("invalid field configuration: {err}");
                std::process::exit(1);
            }
        };

        let orchestrator = Arc::new(SimulationOrchestrator::new(
            Arc::clone(&ctx),
            Arc::clone(&state),
            config.farm_id,
            LoggingSink::shared(),
        ));

        info!(seconds, farm_id = %config.farm_id, "live run starting");
        state.start();
        let shutdown = orchestrator.spawn_loop();

        tokio::time::sleep(Duration::from_secs(seconds)).await;
        let _ = shutdown.send(true);
        // Let the sink forwarder drain
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mission = state.mission();
        info!(
            scanned = mission.scanned_zones,
            total = mission.total_zones,
            poor = mission.poor_zones,
            completion = mission.completion_percentage,
            "live run finished"
        );
    });
}
