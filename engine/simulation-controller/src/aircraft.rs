//! Aircraft collaborator interfaces
//!
//! The flight model and flight-control logic live outside the simulation core.
//! The core only reads [`VehicleSnapshot`]s, advances vehicles by a time step,
//! and issues evasive-maneuver commands through [`FlightControl`].

use std::sync::Arc;
use std::time::Duration;

use conflict_detector::VehicleSnapshot;
use glam::DVec3;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Flight-dynamics side of an aircraft
pub trait Vehicle {
    fn id(&self) -> u32;

    /// Current position, velocity and size
    fn snapshot(&self) -> VehicleSnapshot;

    /// Integrate the flight model forward by `dt`
    fn advance(&mut self, dt: Duration);

    /// Return to the initial kinematic state
    fn reset(&mut self);
}

/// Flight-control computer side of an aircraft
pub trait FlightControl {
    /// Start the evasive maneuver. Repeated calls while evading have no effect.
    fn apply_evasive_maneuver(&mut self);

    fn is_evading(&self) -> bool;

    /// Append a point to the path history
    fn append_visited(&mut self, position: DVec3);

    fn visited(&self) -> &[DVec3];

    /// Clear evasion state and path history
    fn reset_control(&mut self);
}

/// A complete aircraft as driven by the simulation loops
pub trait Aircraft: Vehicle + FlightControl + Send {}

impl<T: Vehicle + FlightControl + Send> Aircraft for T {}

/// Aircraft shared between loop threads; locked one at a time
pub type SharedAircraft = Arc<Mutex<Box<dyn Aircraft>>>;

/// Recorded flight path of one aircraft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftTrack {
    pub id: u32,
    pub points: Vec<DVec3>,
}

/// Ordered set of aircraft taking part in a run
#[derive(Clone, Default)]
pub struct Fleet {
    aircraft: Vec<SharedAircraft>,
}

impl Fleet {
    pub fn new(aircraft: Vec<Box<dyn Aircraft>>) -> Self {
        Self { aircraft: aircraft.into_iter().map(|a| Arc::new(Mutex::new(a))).collect() }
    }

    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SharedAircraft> {
        self.aircraft.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedAircraft> {
        self.aircraft.iter()
    }

    /// Snapshot every aircraft, holding each lock only for its own read
    pub fn snapshots(&self) -> Vec<VehicleSnapshot> {
        self.aircraft.iter().map(|a| a.lock().snapshot()).collect()
    }

    pub fn tracks(&self) -> Vec<AircraftTrack> {
        self.aircraft
            .iter()
            .map(|a| {
                let aircraft = a.lock();
                AircraftTrack { id: aircraft.id(), points: aircraft.visited().to_vec() }
            })
            .collect()
    }

    /// Restore every aircraft to its initial state. Only call with loops stopped.
    pub fn reset(&self) {
        for aircraft in &self.aircraft {
            let mut aircraft = aircraft.lock();
            aircraft.reset();
            aircraft.reset_control();
        }
    }
}

impl std::fmt::Debug for Fleet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fleet").field("aircraft", &self.aircraft.len()).finish()
    }
}
