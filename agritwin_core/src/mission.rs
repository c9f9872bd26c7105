//! Mission tracking - aggregate counters for one sweep attempt.

use crate::telemetry::{round2, POOR_NDVI_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Identifier of one mission generation.
///
/// A fresh id is issued on every reset, so any reader can tell which
/// generation a published snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissionId(pub Uuid);

impl MissionId {
    /// Creates a new random MissionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a deterministic MissionId from a seed (for simulation).
    pub fn from_seed(seed: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&seed.to_le_bytes());
        bytes[8..16].copy_from_slice(&seed.wrapping_mul(0x517c_c1b7_2722_0a95).to_le_bytes());
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for MissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Lifecycle status of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionStatus {
    NotStarted,
    InProgress,
    Completed,
    Stopped,
}

impl std::fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MissionStatus::NotStarted => "NOT_STARTED",
            MissionStatus::InProgress => "IN_PROGRESS",
            MissionStatus::Completed => "COMPLETED",
            MissionStatus::Stopped => "STOPPED",
        };
        write!(f, "{s}")
    }
}

/// First-occurrence edges of recording one scan.
///
/// These gate one-shot log events; published decision tags are derived
/// from the conditions themselves, not from these flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanEffect {
    /// The zone was added to the poor set by this scan (first time)
    pub poor_detected: bool,

    /// This scan pushed completion to 100%
    pub completed: bool,
}

/// Aggregate counters for one sweep attempt of the field.
#[derive(Debug, Clone)]
pub struct MissionTracker {
    total_zones: usize,
    scanned_zones: HashSet<u32>,
    poor_zones: HashSet<u32>,
    status: MissionStatus,
    completion_percentage: f64,
    is_running: bool,
}

impl MissionTracker {
    /// Creates a fresh tracker for a field with `total_zones` zones.
    pub fn new(total_zones: usize) -> Self {
        Self {
            total_zones,
            scanned_zones: HashSet::new(),
            poor_zones: HashSet::new(),
            status: MissionStatus::NotStarted,
            completion_percentage: 0.0,
            is_running: false,
        }
    }

    /// Number of zones the mission has to cover.
    pub fn total_zones(&self) -> usize {
        self.total_zones
    }

    /// Number of distinct zones scanned so far.
    pub fn scanned_zone_count(&self) -> usize {
        self.scanned_zones.len()
    }

    /// Whether a zone has been scanned this mission.
    pub fn is_scanned(&self, zone_id: u32) -> bool {
        self.scanned_zones.contains(&zone_id)
    }

    /// Number of distinct poor zones detected so far.
    pub fn poor_zone_count(&self) -> usize {
        self.poor_zones.len()
    }

    /// Ids of the poor zones detected so far.
    pub fn poor_zones(&self) -> impl Iterator<Item = u32> + '_ {
        self.poor_zones.iter().copied()
    }

    /// Current mission status.
    pub fn status(&self) -> MissionStatus {
        self.status
    }

    /// Completion percentage, rounded to 2 decimals, non-decreasing
    /// within one mission generation.
    pub fn completion_percentage(&self) -> f64 {
        self.completion_percentage
    }

    /// Whether the periodic step is currently driving this mission.
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Records a successful scan of `zone_id` with the given reading.
    pub fn record_scan(&mut self, zone_id: u32, ndvi: f64) -> ScanEffect {
        self.scanned_zones.insert(zone_id);

        let poor_detected = ndvi < POOR_NDVI_THRESHOLD && self.poor_zones.insert(zone_id);

        self.completion_percentage = round2(
            100.0 * self.scanned_zones.len() as f64 / self.total_zones.max(1) as f64,
        );

        let completed =
            self.completion_percentage >= 100.0 && self.status != MissionStatus::Completed;
        if completed {
            self.status = MissionStatus::Completed;
        }

        ScanEffect {
            poor_detected,
            completed,
        }
    }

    /// Resumes the mission; progress is retained.
    pub fn start(&mut self) {
        self.is_running = true;
        self.status = MissionStatus::InProgress;
    }

    /// Pauses the mission; progress is retained.
    pub fn stop(&mut self) {
        self.is_running = false;
        self.status = MissionStatus::Stopped;
    }
}
