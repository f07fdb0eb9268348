//! Drives one simulation run from a loaded configuration

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use simulation_clock::SettingsHandle;
use simulation_controller::{Fleet, RunReport, SimulationController, TerminationReason};

use crate::config::{RunMode, RunSettings, ServiceConfig};

/// How often the main thread checks a realtime run for termination
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Outcome of a run, logged as JSON on exit
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: RunMode,
    pub reason: Option<TerminationReason>,
    pub collision: bool,
    pub report: Option<RunReport>,
}

/// Controller configured for the run settings
pub fn build_controller(run: &RunSettings) -> SimulationController {
    let controller = SimulationController::new();
    match (run.mode, run.duration_secs) {
        (RunMode::Realtime, Some(secs)) => controller.with_time_budget(Duration::from_secs(secs)),
        _ => controller,
    }
}

/// Run `fleet` to termination and tear the run down
pub fn run_simulation(
    controller: &mut SimulationController,
    config: &ServiceConfig,
    fleet: Fleet,
) -> Result<RunSummary> {
    let settings = SettingsHandle::new(config.simulation.clone());

    match config.run.mode {
        RunMode::Realtime => {
            controller
                .start_realtime(fleet, settings)
                .context("Failed to start realtime simulation")?;
            info!("Simulation running. Press Ctrl+C to stop.");

            let reason = controller.wait_for_termination(POLL_INTERVAL);
            let collision = controller.state().map(|state| state.collision()).unwrap_or(false);
            let report = controller.stop();

            Ok(RunSummary { mode: RunMode::Realtime, reason, collision, report })
        }
        RunMode::Batch => {
            let duration = Duration::from_secs(config.run.batch_duration_secs());
            let outcome = controller
                .start_batch(fleet, settings, duration)
                .context("Failed to run batch simulation")?;

            Ok(RunSummary {
                mode: RunMode::Batch,
                reason: Some(outcome.reason),
                collision: outcome.collision,
                report: Some(outcome.report),
            })
        }
    }
}
