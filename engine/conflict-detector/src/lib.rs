//! # ConflictDetector
//!
//! Closest-approach evaluation for pairs of aircraft as performed by the ADS-B
//! surveillance cycle. Given two vehicle snapshots the detector computes the
//! time to closest approach, the miss-distance vector at that instant, and
//! classifies the encounter as a separation conflict and/or a probable collision.
//!
//! The detector is a pure value type: it holds only the configured minimum
//! separation and never touches shared simulation state.

pub mod detector;
pub mod error;
pub mod snapshot;


pub use detector::{ConflictDetector, ConflictResult};
pub use error::ConflictError;
pub use snapshot::VehicleSnapshot;

/// Default minimum horizontal/vertical separation in meters
pub const DEFAULT_MINIMUM_SEPARATION_M: f64 = 100.0;
