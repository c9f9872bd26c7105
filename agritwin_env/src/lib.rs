//! AgriTwin Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" seam that lets the digital-twin core
//! run in both **Production** (tokio, thread RNG, wall clock) and
//! **Simulation** (virtual clock, seeded RNG) environments.
//!
//! # Core Concept
//!
//! Every source of non-determinism the simulation touches is routed
//! through [`TwinContext`]:
//! - Time (`now()`, `system_time()`, `sleep()`)
//! - Randomness (`uniform()` noise sampling)
//! - Task spawning (`spawn()`)
//!
//! By deriving all entropy from a single 64-bit seed, any simulated run
//! becomes reproducible bit-for-bit from its seed number.
//!
//! The persistence boundary is abstracted the same way: the core hands
//! flat [`TelemetryRow`] records to a [`TelemetrySink`] and never learns
//! whether they landed in a real store, a test buffer, or the log.

mod context;
mod error;
mod sink;
mod tokio_impl;
mod types;

pub use context::TwinContext;
pub use error::EnvError;
pub use sink::TelemetrySink;
pub use tokio_impl::TokioContext;
pub use types::{FarmId, TelemetryRow};
