//! UAV Simulation Service Library
//!
//! Configuration loading, logging setup, signal handling and the built-in
//! scenario for the `uav-sim` binary.

use anyhow::{Context, Result};

pub mod cli;
pub mod config;
pub mod logging;
pub mod scenario;
pub mod service;
pub mod signals;

pub use cli::Cli;
pub use config::{RunMode, ServiceConfig};
pub use logging::initialize_logging_with_config;
pub use service::{build_controller, run_simulation, RunSummary};
pub use signals::register_stop_signals;

/// Load configuration from an optional file, the environment and CLI flags
pub fn load_configuration(cli: &Cli) -> Result<ServiceConfig> {
    let mut config =
        config::load_config(cli.config.as_deref()).context("Failed to load service configuration")?;
    cli.apply_to(&mut config);
    config::validate_config(&config)?;
    Ok(config)
}
