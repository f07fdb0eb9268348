//! Closest-approach and miss-distance computation

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::ConflictError;
use crate::snapshot::VehicleSnapshot;
use crate::DEFAULT_MINIMUM_SEPARATION_M;

/// Outcome of evaluating one pair of aircraft
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConflictResult {
    /// Seconds until closest approach; negative when it is already in the past
    pub time_to_closest_approach: f64,

    /// Separation at closest approach in meters. When the approach is not in
    /// the future this is the current separation.
    pub miss_distance: f64,

    /// Miss-distance vector at closest approach (zero when not converging)
    pub miss_distance_vector: DVec3,

    /// Miss distance falls below the minimum separation
    pub is_conflict: bool,

    /// Miss distance falls below the sum of both half-sizes
    pub is_probable_collision: bool,
}

impl ConflictResult {
    /// Closest approach lies in the future
    pub fn is_converging(&self) -> bool {
        self.time_to_closest_approach > 0.0
    }

    /// Converging with zero lateral offset
    pub fn is_head_on(&self) -> bool {
        self.is_converging() && self.miss_distance == 0.0
    }
}

/// Stateless ADS-B encounter evaluator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConflictDetector {
    minimum_separation: f64,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MINIMUM_SEPARATION_M)
    }
}

impl ConflictDetector {
    pub fn new(minimum_separation: f64) -> Self {
        Self { minimum_separation }
    }

    pub fn minimum_separation(&self) -> f64 {
        self.minimum_separation
    }

    /// Evaluate an encounter between two vehicles.
    ///
    /// Returns [`ConflictError::DegenerateVelocity`] when the relative velocity
    /// is zero; callers skip conflict evaluation for that cycle.
    pub fn evaluate(
        &self,
        first: &VehicleSnapshot,
        second: &VehicleSnapshot,
    ) -> Result<ConflictResult, ConflictError> {
        let relative_position = first.position - second.position;
        let relative_velocity = first.velocity - second.velocity;

        let closing_rate_sq = relative_velocity.dot(relative_velocity);
        if closing_rate_sq == 0.0 {
            return Err(ConflictError::DegenerateVelocity { first: first.id, second: second.id });
        }

        let time_to_closest_approach = -relative_position.dot(relative_velocity) / closing_rate_sq;

        if time_to_closest_approach <= 0.0 {
            return Ok(ConflictResult {
                time_to_closest_approach,
                miss_distance: relative_position.length(),
                miss_distance_vector: DVec3::ZERO,
                is_conflict: false,
                is_probable_collision: false,
            });
        }

        let direction = relative_velocity / closing_rate_sq.sqrt();
        let miss_distance_vector = direction.cross(relative_position.cross(direction));
        let miss_distance = miss_distance_vector.length();

        let unresolved_region = self.minimum_separation - miss_distance;
        let collision_distance = first.size / 2.0 + second.size / 2.0;
        let collision_region = collision_distance - miss_distance;

        Ok(ConflictResult {
            time_to_closest_approach,
            miss_distance,
            miss_distance_vector,
            is_conflict: unresolved_region > 0.0,
            is_probable_collision: collision_region > 0.0,
        })
    }
}
