//! Field grid - the spatial model of the farm.
//!
//! The grid partitions a rectangular field into fixed square zones.
//! Each zone carries ecological parameters frozen at construction;
//! health readings are sampled per query with fresh noise, so two scans
//! of the same zone are independent observations.

use crate::config::FieldConfig;
use crate::error::SimError;
use agritwin_env::TwinContext;
use serde::{Deserialize, Serialize};

/// Lower bound of the randomized base health at zone creation.
const BASE_HEALTH_MIN: f64 = 0.55;
/// Upper bound of the randomized base health at zone creation.
const BASE_HEALTH_MAX: f64 = 0.85;
/// Upper bound of the randomized stress factor at zone creation.
const STRESS_FACTOR_MAX: f64 = 0.25;
/// Half-width of the per-scan health noise band.
const HEALTH_NOISE: f64 = 0.05;

/// One square cell of the field with its simulated ecological state.
///
/// Immutable after construction except for `last_updated_ms`, which is
/// stamped on each successful scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone id, unique within the grid
    pub id: u32,

    /// Covered x interval `[start, end)` in meters
    pub x_range: (u32, u32),

    /// Covered y interval `[start, end)` in meters
    pub y_range: (u32, u32),

    /// Baseline vegetation health in [0.55, 0.85]
    pub base_health: f64,

    /// Environmental stress subtracted from every reading, in [0, 0.25]
    pub stress_factor: f64,

    /// Timestamp (ms since epoch) of the last scan touching this zone
    pub last_updated_ms: u64,
}

/// The zone partition of one farm field.
pub struct FieldGrid {
    width: u32,
    height: u32,
    zone_size: u32,
    /// Zones indexed by id
    zones: Vec<Zone>,
}

impl FieldGrid {
    /// Builds the grid, randomizing per-zone parameters through `ctx`.
    ///
    /// Fails when the dimensions are zero, when the field does not tile
    /// exactly into square zones, or when zero zones would result. An
    /// inconsistent partition is never allowed to exist.
    pub fn new<C: TwinContext>(config: &FieldConfig, ctx: &C) -> Result<Self, SimError> {
        let FieldConfig {
            width,
            height,
            zone_size,
        } = *config;

        if width == 0 || height == 0 || zone_size == 0 {
            return Err(SimError::EmptyField {
                width,
                height,
                zone_size,
            });
        }
        if width % zone_size != 0 || height % zone_size != 0 {
            return Err(SimError::UnevenPartition {
                width,
                height,
                zone_size,
            });
        }

        let created_ms = timestamp_ms(ctx);
        let mut zones = Vec::with_capacity(((width / zone_size) * (height / zone_size)) as usize);
        let mut zone_id = 0u32;

        for x in (0..width).step_by(zone_size as usize) {
            for y in (0..height).step_by(zone_size as usize) {
                zones.push(Zone {
                    id: zone_id,
                    x_range: (x, x + zone_size),
                    y_range: (y, y + zone_size),
                    base_health: ctx.uniform(BASE_HEALTH_MIN, BASE_HEALTH_MAX),
                    stress_factor: ctx.uniform(0.0, STRESS_FACTOR_MAX),
                    last_updated_ms: created_ms,
                });
                zone_id += 1;
            }
        }

        debug_assert!(!zones.is_empty());
        Ok(Self {
            width,
            height,
            zone_size,
            zones,
        })
    }

    /// Field width in meters.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Field height in meters.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of zones in the partition.
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// All zone ids, in grid order.
    pub fn zone_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.zones.iter().map(|z| z.id)
    }

    /// Returns the zone with the given id.
    pub fn zone(&self, id: u32) -> Option<&Zone> {
        self.zones.get(id as usize)
    }

    /// Clones out all zone records (for the read boundary).
    pub fn snapshot_zones(&self) -> Vec<Zone> {
        self.zones.clone()
    }

    /// Maps a position to its containing zone.
    ///
    /// Containment is half-open `[start, end)` on both axes; a position
    /// at or past the field edge yields `None`, not an error.
    pub fn locate(&self, x: u32, y: u32) -> Option<&Zone> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let col = x / self.zone_size;
        let row = y / self.zone_size;
        let rows = self.height / self.zone_size;
        self.zones.get((col * rows + row) as usize)
    }

    /// Samples a noisy NDVI reading for `zone`.
    ///
    /// Noise is drawn fresh on every call; repeat scans of the same zone
    /// are independent samples.
    pub fn simulate_health<C: TwinContext>(&self, zone: &Zone, ctx: &C) -> f64 {
        let noise = ctx.uniform(-HEALTH_NOISE, HEALTH_NOISE);
        (zone.base_health - zone.stress_factor + noise).clamp(0.0, 1.0)
    }

    /// Stamps a zone's `last_updated_ms` after a successful scan.
    pub fn touch(&mut self, zone_id: u32, now_ms: u64) {
        if let Some(zone) = self.zones.get_mut(zone_id as usize) {
            zone.last_updated_ms = now_ms;
        }
    }
}

/// Milliseconds since the Unix epoch on the context's wall clock.
pub(crate) fn timestamp_ms<C: TwinContext>(ctx: &C) -> u64 {
    ctx.system_time()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testctx::ManualContext;

    fn grid_25() -> (FieldGrid, ManualContext) {
        let ctx = ManualContext::new();
        let grid = FieldGrid::new(&FieldConfig::default(), &ctx).unwrap();
        (grid, ctx)
    }

    #[test]
    fn test_default_field_has_25_zones() {
        let (grid, _ctx) = grid_25();
        assert_eq!(grid.zone_count(), 25);

        // Exact partition: every id present once, ranges tile the field
        let mut covered = 0u32;
        for zone in grid.snapshot_zones() {
            assert_eq!(zone.x_range.1 - zone.x_range.0, 20);
            assert_eq!(zone.y_range.1 - zone.y_range.0, 20);
            covered += 400;
        }
        assert_eq!(covered, 100 * 100);
    }

    #[test]
    fn test_zone_parameters_within_bounds() {
        let (grid, _ctx) = grid_25();
        for zone in grid.snapshot_zones() {
            assert!((BASE_HEALTH_MIN..=BASE_HEALTH_MAX).contains(&zone.base_health));
            assert!((0.0..=STRESS_FACTOR_MAX).contains(&zone.stress_factor));
        }
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        let ctx = ManualContext::new();

        let zero = FieldConfig {
            width: 0,
            height: 100,
            zone_size: 20,
        };
        assert!(matches!(
            FieldGrid::new(&zero, &ctx),
            Err(SimError::EmptyField { .. })
        ));

        let uneven = FieldConfig {
            width: 110,
            height: 100,
            zone_size: 20,
        };
        assert!(matches!(
            FieldGrid::new(&uneven, &ctx),
            Err(SimError::UnevenPartition { .. })
        ));

        let zero_zone = FieldConfig {
            width: 100,
            height: 100,
            zone_size: 0,
        };
        assert!(matches!(
            FieldGrid::new(&zero_zone, &ctx),
            Err(SimError::EmptyField { .. })
        ));
    }

    #[test]
    fn test_locate_half_open_containment() {
        let (grid, _ctx) = grid_25();

        let origin = grid.locate(0, 0).unwrap();
        assert_eq!(origin.x_range, (0, 20));
        assert_eq!(origin.y_range, (0, 20));

        // 20 belongs to the next zone, not the first
        let next = grid.locate(20, 0).unwrap();
        assert_eq!(next.x_range, (20, 40));

        // Interior point
        let inner = grid.locate(19, 19).unwrap();
        assert_eq!(inner.id, origin.id);
    }

    #[test]
    fn test_locate_out_of_bounds_is_none() {
        let (grid, _ctx) = grid_25();
        assert!(grid.locate(100, 0).is_none());
        assert!(grid.locate(0, 100).is_none());
        assert!(grid.locate(500, 500).is_none());
    }

    #[test]
    fn test_simulate_health_clamped_and_noisy() {
        let (grid, ctx) = grid_25();
        let zone = grid.zone(0).unwrap();

        // Scripted noise: two different samples for the same zone
        ctx.push_noise(-0.05);
        ctx.push_noise(0.04);
        let first = grid.simulate_health(zone, &ctx);
        let second = grid.simulate_health(zone, &ctx);
        assert_ne!(first, second);

        for _ in 0..50 {
            let ndvi = grid.simulate_health(zone, &ctx);
            assert!((0.0..=1.0).contains(&ndvi));
        }
    }

    #[test]
    fn test_touch_stamps_last_updated() {
        let (mut grid, _ctx) = grid_25();
        grid.touch(3, 42_000);
        assert_eq!(grid.zone(3).unwrap().last_updated_ms, 42_000);

        // Unknown id is a no-op
        grid.touch(9999, 1);
    }
}
