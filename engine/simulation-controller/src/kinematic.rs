//! Straight-line kinematic aircraft used for scenarios and demos

use std::f64::consts::FRAC_PI_2;
use std::time::Duration;

use conflict_detector::VehicleSnapshot;
use glam::{DQuat, DVec3};

use crate::aircraft::{FlightControl, Vehicle};

/// Yaw rate applied while evading, in radians per second
pub const EVASIVE_TURN_RATE_RAD_S: f64 = 0.25;

/// Total heading change of one evasive maneuver
pub const EVASIVE_TURN_LIMIT_RAD: f64 = FRAC_PI_2;

/// Default aircraft size (wingspan) in meters
pub const DEFAULT_AIRCRAFT_SIZE_M: f64 = 20.0;

/// Constant-velocity vehicle whose flight-control computer evades with a
/// right-hand turn
#[derive(Debug, Clone)]
pub struct KinematicAircraft {
    id: u32,
    initial_position: DVec3,
    initial_velocity: DVec3,
    position: DVec3,
    velocity: DVec3,
    size: f64,

    evading: bool,
    turned: f64,
    evasive_commands: u32,
    distance_covered: f64,
    visited: Vec<DVec3>,
}

impl KinematicAircraft {
    pub fn new(id: u32, position: DVec3, velocity: DVec3) -> Self {
        Self::with_size(id, position, velocity, DEFAULT_AIRCRAFT_SIZE_M)
    }

    pub fn with_size(id: u32, position: DVec3, velocity: DVec3, size: f64) -> Self {
        Self {
            id,
            initial_position: position,
            initial_velocity: velocity,
            position,
            velocity,
            size,
            evading: false,
            turned: 0.0,
            evasive_commands: 0,
            distance_covered: 0.0,
            visited: Vec::new(),
        }
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn distance_covered(&self) -> f64 {
        self.distance_covered
    }

    /// Number of evasive maneuvers actually started
    pub fn evasive_commands(&self) -> u32 {
        self.evasive_commands
    }
}

impl Vehicle for KinematicAircraft {
    fn id(&self) -> u32 {
        self.id
    }

    fn snapshot(&self) -> VehicleSnapshot {
        VehicleSnapshot::new(self.id, self.position, self.velocity, self.size)
    }

    fn advance(&mut self, dt: Duration) {
        let dt = dt.as_secs_f64();

        if self.evading && self.turned < EVASIVE_TURN_LIMIT_RAD {
            let step = (EVASIVE_TURN_RATE_RAD_S * dt).min(EVASIVE_TURN_LIMIT_RAD - self.turned);
            self.velocity = DQuat::from_rotation_z(-step) * self.velocity;
            self.turned += step;
        }

        self.position += self.velocity * dt;
        self.distance_covered += self.velocity.length() * dt;
    }

    fn reset(&mut self) {
        self.position = self.initial_position;
        self.velocity = self.initial_velocity;
        self.distance_covered = 0.0;
    }
}

impl FlightControl for KinematicAircraft {
    fn apply_evasive_maneuver(&mut self) {
        if self.evading {
            return;
        }
        self.evading = true;
        self.turned = 0.0;
        self.evasive_commands += 1;
    }

    fn is_evading(&self) -> bool {
        self.evading
    }

    fn append_visited(&mut self, position: DVec3) {
        self.visited.push(position);
    }

    fn visited(&self) -> &[DVec3] {
        &self.visited
    }

    fn reset_control(&mut self) {
        self.evading = false;
        self.turned = 0.0;
        self.evasive_commands = 0;
        self.visited.clear();
    }
}
