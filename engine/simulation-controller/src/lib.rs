//! # SimulationController
//!
//! Runs the collision avoidance simulation. In realtime mode the controller
//! starts four fixed-rate loops on dedicated threads (physics, ADS-B
//! surveillance, FPS pacing and rendering) that share one
//! [`simulation_clock::SimulationState`]. In batch mode it steps physics and
//! surveillance on the calling thread as fast as possible, which makes runs
//! reproducible.
//!
//! Aircraft, rendering and flight path export are collaborators supplied by the
//! caller through the traits in [`aircraft`], [`render`] and [`export`].

pub mod aircraft;
pub mod controller;
pub mod error;
pub mod export;
pub mod kinematic;
pub mod pacing;
pub mod physics;
pub mod render;
pub mod surveillance;
pub mod termination;


#[cfg(test)]
mod integration_tests;

#[cfg(test)]
mod test_support;

pub use aircraft::{Aircraft, AircraftTrack, FlightControl, Fleet, SharedAircraft, Vehicle};
pub use controller::{BatchOutcome, RunReport, SimulationController};
pub use error::ControllerError;
pub use export::{CsvPathExporter, ExportError, PathExporter};
pub use kinematic::KinematicAircraft;
pub use render::{NullRenderer, RenderFrame, Renderer};
pub use termination::{StopSignal, TerminationCondition, TerminationReason};

/// Re-export commonly used types
pub use conflict_detector::{ConflictDetector, ConflictResult, VehicleSnapshot};
pub use simulation_clock::{ExecutionMode, SettingsHandle, SimulationSettings, SimulationState};
