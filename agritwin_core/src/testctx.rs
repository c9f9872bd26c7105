//! Hand-driven context for unit tests.
//!
//! The clock only moves when a test advances it, and noise samples can
//! be scripted ahead of time; unscripted samples fall back to the range
//! midpoint so zone parameters stay deterministic.

use agritwin_env::TwinContext;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub(crate) struct ManualContext {
    virtual_time_ns: Mutex<u64>,
    scripted_noise: Mutex<VecDeque<f64>>,
    epoch: SystemTime,
}

impl ManualContext {
    pub(crate) fn new() -> Self {
        Self {
            virtual_time_ns: Mutex::new(0),
            scripted_noise: Mutex::new(VecDeque::new()),
            // 2024-01-01 00:00:00 UTC
            epoch: UNIX_EPOCH + Duration::from_secs(1_704_067_200),
        }
    }

    pub(crate) fn advance(&self, duration: Duration) {
        let mut time = self.virtual_time_ns.lock().unwrap();
        *time += duration.as_nanos() as u64;
    }

    /// Queues the next value `uniform()` will return.
    pub(crate) fn push_noise(&self, value: f64) {
        self.scripted_noise.lock().unwrap().push_back(value);
    }
}

#[async_trait]
impl TwinContext for ManualContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(*self.virtual_time_ns.lock().unwrap())
    }

    fn system_time(&self) -> SystemTime {
        self.epoch + self.now()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }

    fn spawn<F>(&self, name: &str, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let _name = name.to_string();
        tokio::spawn(future);
    }

    fn uniform(&self, lo: f64, hi: f64) -> f64 {
        if let Some(value) = self.scripted_noise.lock().unwrap().pop_front() {
            return value;
        }
        (lo + hi) / 2.0
    }

    fn seed(&self) -> u64 {
        0
    }
}
