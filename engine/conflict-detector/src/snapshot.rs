//! Immutable per-cycle view of a vehicle

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// State of one aircraft as captured by a surveillance cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    /// Aircraft identifier
    pub id: u32,

    /// Position in meters
    pub position: DVec3,

    /// Velocity in meters per second
    pub velocity: DVec3,

    /// Physical size (wingspan) in meters
    pub size: f64,
}

impl VehicleSnapshot {
    pub fn new(id: u32, position: DVec3, velocity: DVec3, size: f64) -> Self {
        Self { id, position, velocity, size }
    }

    /// Ground speed magnitude in meters per second
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// Straight-line distance to another vehicle in meters
    pub fn distance_to(&self, other: &VehicleSnapshot) -> f64 {
        self.position.distance(other.position)
    }
}
