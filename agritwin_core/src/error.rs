//! Error types for the simulation core.

use thiserror::Error;

/// Errors that can occur while building or driving the digital twin.
///
/// Grid construction is the only fallible path: the system refuses to
/// create an inconsistent world rather than run with a corrupt
/// partition. Control operations are total over valid state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// Field dimension or zone size is zero
    #[error("Field dimensions must be positive: {width}x{height}, zone size {zone_size}")]
    EmptyField {
        width: u32,
        height: u32,
        zone_size: u32,
    },

    /// Field dimensions do not tile exactly into square zones
    #[error("Field {width}x{height} is not a multiple of zone size {zone_size}")]
    UnevenPartition {
        width: u32,
        height: u32,
        zone_size: u32,
    },
}
