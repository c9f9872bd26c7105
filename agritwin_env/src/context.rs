//! Core environment context trait for the AgriTwin simulation.

use async_trait::async_trait;
use std::future::Future;
use std::time::{Duration, SystemTime};

/// The central interface for environment interaction.
///
/// This trait abstracts the "real world" so that the digital-twin core
/// can run in both production and simulation environments.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`, thread RNG
/// - **Simulation**: `SimContext` (in `agritwin_sim`) - virtual clock,
///   `ChaCha8Rng(seed)`
///
/// # Determinism
///
/// Scan rate-limiting and health noise both flow through this trait, so
/// a seeded implementation makes every sweep reproducible.
#[async_trait]
pub trait TwinContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// Drives the drone's scan rate-limiting. In simulation this is the
    /// virtual clock time.
    fn now(&self) -> Duration;

    /// Returns the wall-clock time used for telemetry timestamps.
    ///
    /// In simulation, derived from virtual clock + a fixed epoch offset.
    fn system_time(&self) -> SystemTime;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`.
    /// In simulation: advances the virtual clock.
    async fn sleep(&self, duration: Duration);

    /// Spawns a background task.
    fn spawn<F>(&self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Draws a uniform sample from `[lo, hi)`.
    ///
    /// All ecological randomness (zone parameters, per-scan health
    /// noise) comes through here, never from ambient RNG state.
    fn uniform(&self, lo: f64, hi: f64) -> f64;

    /// Returns the context's seed (for logging/debugging).
    ///
    /// In production, returns 0 (not seeded).
    /// In simulation, returns the master seed.
    fn seed(&self) -> u64;
}
