//! UAV collision avoidance simulation runner
//!
//! Loads configuration, installs logging and signal handlers, then runs the
//! default two-aircraft scenario in realtime or batch mode.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use uav_sim_service::config::save_config;
use uav_sim_service::{
    build_controller, initialize_logging_with_config, load_configuration, register_stop_signals,
    run_simulation, scenario, Cli,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_configuration(&cli)?;
    if let Some(path) = &cli.write_config {
        save_config(&config, path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    initialize_logging_with_config(&config.logging).context("Failed to initialize logging")?;

    info!("Starting UAV simulation v{}", env!("CARGO_PKG_VERSION"));
    info!(mode = ?config.run.mode, "Configuration loaded successfully");

    let mut controller = build_controller(&config.run);
    register_stop_signals(&controller.stop_signal())?;

    let summary = run_simulation(&mut controller, &config, scenario::default_fleet())?;

    info!("Run summary: {}", serde_json::to_string(&summary)?);
    info!("UAV simulation shutdown complete");
    Ok(())
}
