//! # SimulationClock
//!
//! Timing backbone of the collision avoidance simulator.
//!
//! This crate owns the one object every execution loop shares, [`SimulationState`],
//! and the self-correcting fixed-rate scheduler, [`FixedRateLoop`], that the
//! physics, ADS-B surveillance, pacing and render loops are all built on. Cadence
//! targets come from [`SimulationSettings`], handed in explicitly through a
//! [`SettingsHandle`] and refreshed while the simulation runs.

pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;
pub mod state;


pub use clock::{CancellationToken, Cycle, FixedRateLoop, LoopHandle, LoopStats};
pub use config::{SettingsHandle, SimulationSettings};
pub use error::ClockError;
pub use metrics::{LoopMetrics, LoopMetricsSnapshot};
pub use state::{ExecutionMode, SimulationState, StateSnapshot};

/// Current version of the SimulationClock
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default physics step (100Hz)
pub const DEFAULT_PHYSICS_PERIOD_MS: u64 = 10;

/// Default ADS-B surveillance cadence (1Hz)
pub const DEFAULT_SURVEILLANCE_PERIOD_MS: u64 = 1000;

/// Default render cadence (100Hz)
pub const DEFAULT_RENDER_PERIOD_MS: u64 = 10;

/// Default FPS measurement window
pub const DEFAULT_PACING_PERIOD_MS: u64 = 1000;
