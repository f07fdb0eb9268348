//! Error types for SimulationController

use simulation_clock::ClockError;
use thiserror::Error;

/// Errors surfaced by the controller's public operations
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Another simulation instance is already running")]
    AlreadyRunning,

    #[error("No simulation is running")]
    NotRunning,

    #[error("At least two aircraft are required, got {count}")]
    InsufficientAircraft { count: usize },

    #[error("Clock error: {0}")]
    Clock(#[from] ClockError),
}
