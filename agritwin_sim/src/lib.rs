//! AgriTwin Deterministic Simulation Harness
//!
//! This crate runs the drone digital twin in a fully controlled
//! environment where every source of non-determinism is intercepted:
//! - **Time**: a virtual clock the runner advances manually
//! - **Randomness**: all health noise and zone parameters derived from
//!   a single 64-bit seed
//! - **Persistence**: telemetry rows land in an in-memory sink
//!
//! Any failing run is reproducible bit-for-bit from its seed number.
//!
//! # Usage
//!
//! ```ignore
//! use agritwin_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let runner = ScenarioRunner::new(42);
//! let result = runner.run(ScenarioId::FullSweep);
//! assert!(result.passed);
//! ```

mod context;
mod runner;
pub mod scenarios;
mod sink;

pub use context::SimContext;
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use sink::{LoggingSink, MemorySink};
