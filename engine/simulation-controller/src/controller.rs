//! Core SimulationController implementation

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use simulation_clock::{
    CancellationToken, ClockError, Cycle, ExecutionMode, FixedRateLoop, LoopHandle, LoopStats,
    SettingsHandle, SimulationSettings, SimulationState,
};
use tracing::{error, info, warn};

use crate::aircraft::Fleet;
use crate::error::ControllerError;
use crate::export::{CsvPathExporter, PathExporter};
use crate::pacing::PacingTask;
use crate::physics::PhysicsTask;
use crate::render::{NullRenderer, RenderTask, Renderer};
use crate::surveillance::SurveillanceTask;
use crate::termination::{StopSignal, TerminationCondition, TerminationReason};

/// Wall-clock accounting for a finished run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Simulated time covered by physics cycles
    pub simulated_time: Duration,

    /// Wall-clock time from start until the physics loop stopped
    pub real_time_with_pauses: Duration,

    /// Wall-clock time spent paused
    pub paused_time: Duration,
}

impl RunReport {
    /// Wall-clock time excluding pauses
    pub fn real_time(&self) -> Duration {
        self.real_time_with_pauses.saturating_sub(self.paused_time)
    }

    /// Simulated seconds per real second; `None` when no real time elapsed
    pub fn efficiency(&self) -> Option<f64> {
        let real_time = self.real_time();
        if real_time.is_zero() {
            None
        } else {
            Some(self.simulated_time.as_secs_f64() / real_time.as_secs_f64())
        }
    }

    fn log(&self) {
        let real_time = self.real_time().as_secs_f64();
        info!("Time simulated: {:.2}s", self.simulated_time.as_secs_f64());

        if self.paused_time.is_zero() {
            info!("Time elapsed: {:.2}s", real_time);
        } else {
            info!(
                "Time elapsed: {:.2}s ({:.2}s with pauses)",
                real_time,
                self.real_time_with_pauses.as_secs_f64()
            );
        }

        if let Some(efficiency) = self.efficiency() {
            info!("Time efficiency: {:.2}%", efficiency * 100.0);
        }
    }
}

/// Result of a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub reason: TerminationReason,
    pub physics_cycle_count: u64,
    pub surveillance_cycle_count: u64,
    pub collision: bool,
    pub conflict_first_caused: bool,
    pub conflict_second_caused: bool,
    pub report: RunReport,
}

struct RealtimeLoops {
    physics: LoopHandle,
    others: Vec<LoopHandle>,
}

impl RealtimeLoops {
    fn spawn(
        state: &Arc<SimulationState>,
        fleet: &Fleet,
        settings: &SettingsHandle,
        renderer: &Arc<dyn Renderer>,
    ) -> Result<Self, ClockError> {
        let physics = FixedRateLoop::new(
            PhysicsTask::new(state.clone(), fleet.clone()),
            CancellationToken::new(),
        )
        .spawn()?;

        let mut others = Vec::with_capacity(3);
        let spawned = (|| -> Result<(), ClockError> {
            others.push(
                FixedRateLoop::new(
                    SurveillanceTask::new(state.clone(), fleet.clone(), settings.clone()),
                    CancellationToken::new(),
                )
                .spawn()?,
            );
            others.push(
                FixedRateLoop::new(PacingTask::new(state.clone()), CancellationToken::new()).spawn()?,
            );
            others.push(
                FixedRateLoop::new(
                    RenderTask::new(state.clone(), fleet.clone(), renderer.clone()),
                    CancellationToken::new(),
                )
                .spawn()?,
            );
            Ok(())
        })();

        let loops = Self { physics, others };
        if let Err(e) = spawned {
            loops.shutdown();
            return Err(e);
        }
        Ok(loops)
    }

    fn cancel(&self) {
        self.physics.cancel();
        for handle in &self.others {
            handle.cancel();
        }
    }

    fn shutdown(self) {
        self.cancel();
        join_logged(self.physics);
        for handle in self.others {
            join_logged(handle);
        }
    }
}

fn join_logged(handle: LoopHandle) -> Option<LoopStats> {
    match handle.join() {
        Ok(stats) => Some(stats),
        Err(e) => {
            error!("Failed to join loop: {}", e);
            None
        }
    }
}

struct ActiveRun {
    state: Arc<SimulationState>,
    fleet: Fleet,
    settings: SettingsHandle,
    condition: TerminationCondition,
    started_at: Instant,
    loops: Option<RealtimeLoops>,
    last_polled_cycle: u64,
}

/// Owns one simulation run at a time and the loops driving it.
///
/// Lifecycle: `Idle -> Running -> (Paused <-> Running)* -> Stopping -> Idle`.
pub struct SimulationController {
    renderer: Arc<dyn Renderer>,
    exporter: Option<Arc<dyn PathExporter>>,
    realtime_budget: Option<Duration>,
    stop_signal: StopSignal,
    run: Option<ActiveRun>,
}

impl Default for SimulationController {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationController {
    pub fn new() -> Self {
        Self {
            renderer: Arc::new(NullRenderer),
            exporter: None,
            realtime_budget: None,
            stop_signal: StopSignal::new(),
            run: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Replace the CSV exporter that writes to the configured `export_dir`
    pub fn with_exporter(mut self, exporter: Arc<dyn PathExporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// End realtime runs once this much simulated time has elapsed
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.realtime_budget = Some(budget);
        self
    }

    /// Handle for requesting a manual stop from another thread
    pub fn stop_signal(&self) -> StopSignal {
        self.stop_signal.clone()
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn mode(&self) -> Option<ExecutionMode> {
        self.run.as_ref().map(|run| run.state.mode())
    }

    /// Shared state of the active run, for UI collaborators
    pub fn state(&self) -> Option<Arc<SimulationState>> {
        self.run.as_ref().map(|run| run.state.clone())
    }

    fn validate_start(
        &self,
        fleet: &Fleet,
        settings: &SettingsHandle,
    ) -> Result<SimulationSettings, ControllerError> {
        if self.run.is_some() {
            return Err(ControllerError::AlreadyRunning);
        }
        if fleet.len() < 2 {
            return Err(ControllerError::InsufficientAircraft { count: fleet.len() });
        }
        let snapshot = settings.snapshot();
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Start the four paced loops on dedicated threads
    pub fn start_realtime(
        &mut self,
        fleet: Fleet,
        settings: SettingsHandle,
    ) -> Result<(), ControllerError> {
        let snapshot = self.validate_start(&fleet, &settings)?;
        info!(aircraft = fleet.len(), "Starting realtime simulation");

        self.stop_signal.clear();
        let state = Arc::new(SimulationState::new(ExecutionMode::Realtime, &snapshot));
        let loops = RealtimeLoops::spawn(&state, &fleet, &settings, &self.renderer)?;

        self.run = Some(ActiveRun {
            state,
            fleet,
            settings,
            condition: TerminationCondition::new(self.realtime_budget, self.stop_signal.clone()),
            started_at: Instant::now(),
            loops: Some(loops),
            last_polled_cycle: 0,
        });
        Ok(())
    }

    /// Run unpaced on the calling thread until collision, time exhaustion or
    /// a manual stop, then tear down
    pub fn start_batch(
        &mut self,
        fleet: Fleet,
        settings: SettingsHandle,
        total_simulated_time: Duration,
    ) -> Result<BatchOutcome, ControllerError> {
        let snapshot = self.validate_start(&fleet, &settings)?;
        info!(
            aircraft = fleet.len(),
            "Starting prerender simulation of {:.2}s",
            total_simulated_time.as_secs_f64()
        );

        self.stop_signal.clear();
        let state = Arc::new(SimulationState::new(ExecutionMode::Batch, &snapshot));
        let run = ActiveRun {
            state: state.clone(),
            fleet,
            settings,
            condition: TerminationCondition::new(
                Some(total_simulated_time),
                self.stop_signal.clone(),
            ),
            started_at: Instant::now(),
            loops: None,
            last_polled_cycle: 0,
        };

        let reason = self.drive_batch(&run, total_simulated_time);

        let final_state = state.snapshot();
        let report = self.teardown(run);
        info!(%reason, physics_cycles = final_state.physics_cycle_count, "Prerender simulation finished");

        Ok(BatchOutcome {
            reason,
            physics_cycle_count: final_state.physics_cycle_count,
            surveillance_cycle_count: final_state.surveillance_cycle_count,
            collision: final_state.collision,
            conflict_first_caused: final_state.conflict_first_caused,
            conflict_second_caused: final_state.conflict_second_caused,
            report,
        })
    }

    fn drive_batch(&self, run: &ActiveRun, total_simulated_time: Duration) -> TerminationReason {
        let mut physics = PhysicsTask::new(run.state.clone(), run.fleet.clone());
        let mut surveillance =
            SurveillanceTask::new(run.state.clone(), run.fleet.clone(), run.settings.clone());

        // due on the first step
        let mut since_surveillance = run.state.surveillance_period();

        while run.state.simulated_time() < total_simulated_time {
            if self.stop_signal.is_raised() {
                return TerminationReason::ManualStop;
            }

            // step sizes follow settings refreshed by the surveillance cycle
            let time_step = run.state.physics_period();
            physics.step(time_step);

            if since_surveillance >= run.state.surveillance_period() {
                surveillance.cycle();
                since_surveillance = Duration::ZERO;
                if let Some(reason) = run.condition.evaluate(&run.state) {
                    return reason;
                }
            }
            since_surveillance += time_step;
        }

        TerminationReason::TimeExhausted
    }

    /// Stop the active run. Returns `None` when idle.
    pub fn stop(&mut self) -> Option<RunReport> {
        let run = self.run.take()?;
        Some(self.teardown(run))
    }

    fn teardown(&self, run: ActiveRun) -> RunReport {
        let ActiveRun { state, fleet, settings, started_at, loops, .. } = run;
        info!("Stopping {:?} simulation", state.mode());

        // physics stops first; its exit instant closes the wall-clock window
        let (stopped_at, others) = match loops {
            Some(RealtimeLoops { physics, others }) => {
                physics.cancel();
                for handle in &others {
                    handle.cancel();
                }
                let stopped_at =
                    join_logged(physics).map(|stats| stats.stopped_at).unwrap_or_else(Instant::now);
                (stopped_at, others)
            }
            None => (Instant::now(), Vec::new()),
        };

        state.finish_pause_at(stopped_at);
        let report = RunReport {
            simulated_time: state.simulated_time(),
            real_time_with_pauses: stopped_at.saturating_duration_since(started_at),
            paused_time: state.accumulated_pause_duration(),
        };
        report.log();

        self.export_paths(&fleet, &settings);

        for handle in others {
            join_logged(handle);
        }

        state.finish_run();
        report
    }

    fn export_paths(&self, fleet: &Fleet, settings: &SettingsHandle) {
        let tracks = fleet.tracks();
        let result = match &self.exporter {
            Some(exporter) => exporter.export(&tracks),
            None => CsvPathExporter::new(settings.snapshot().export_dir).export(&tracks),
        };

        match result {
            Ok(files) => info!("Exported {} flight paths", files.len()),
            Err(e) => warn!("Flight path export failed: {}", e),
        }
    }

    /// Pause or resume the active run. Returns the paused state, or `None` when idle.
    pub fn toggle_pause(&self) -> Option<bool> {
        self.run.as_ref().map(|run| run.state.toggle_pause())
    }

    /// Switch per-cycle ADS-B position reports on or off. Returns the new
    /// setting, or `None` when idle.
    pub fn toggle_adsb_report(&self) -> Option<bool> {
        self.run.as_ref().map(|run| run.state.toggle_adsb_report())
    }

    /// Request and immediately apply a reset of the active run
    pub fn reset(&mut self) -> Result<(), ControllerError> {
        let run = self.run.as_ref().ok_or(ControllerError::NotRunning)?;
        run.state.request_reset();
        self.apply_pending_reset()?;
        Ok(())
    }

    /// Consume a pending reset request: stop the loops, zero the run, restore
    /// the aircraft and restart. Returns whether a reset was applied.
    pub fn apply_pending_reset(&mut self) -> Result<bool, ControllerError> {
        let Some(run) = self.run.as_mut() else {
            return Ok(false);
        };
        if !run.state.reset_requested() {
            return Ok(false);
        }

        info!("Resetting simulation");
        if let Some(loops) = run.loops.take() {
            loops.shutdown();
        }

        run.state.apply_reset();
        run.fleet.reset();
        run.started_at = Instant::now();
        run.last_polled_cycle = 0;

        if run.state.is_realtime() {
            run.loops =
                Some(RealtimeLoops::spawn(&run.state, &run.fleet, &run.settings, &self.renderer)?);
        }
        Ok(true)
    }

    /// Apply pending resets and evaluate the termination condition once per
    /// new surveillance cycle
    pub fn poll_termination(&mut self) -> Option<TerminationReason> {
        if let Err(e) = self.apply_pending_reset() {
            error!("Failed to apply reset: {}", e);
        }

        let run = self.run.as_mut()?;
        let cycle = run.state.surveillance_cycle_count();
        if cycle == run.last_polled_cycle && !self.stop_signal.is_raised() {
            return None;
        }
        run.last_polled_cycle = cycle;
        run.condition.evaluate(&run.state)
    }

    /// Block until the active realtime run reaches its termination condition
    pub fn wait_for_termination(&mut self, poll_interval: Duration) -> Option<TerminationReason> {
        while self.run.is_some() {
            if let Some(reason) = self.poll_termination() {
                return Some(reason);
            }
            thread::sleep(poll_interval);
        }
        None
    }
}

impl Drop for SimulationController {
    fn drop(&mut self) {
        if self.run.is_some() {
            self.stop();
        }
    }
}
