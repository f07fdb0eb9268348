//! Shared simulation state
//!
//! One [`SimulationState`] exists per run. Composite fields live behind a single
//! `parking_lot::Mutex`; cycle counters are atomics with exactly one writer each
//! (their owning loop) so they can be read without the guard.
//!
//! The guard is only ever held for the duration of a field read or a
//! read-modify-write. Never sleep or call into aircraft collaborators with it held.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::SimulationSettings;

/// How the controller advances simulated time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Wall-clock paced loops on dedicated threads
    Realtime,
    /// Unpaced single-threaded stepping
    Batch,
}

#[derive(Debug)]
struct StateInner {
    is_running: bool,
    is_paused: bool,
    reset_requested: bool,

    pause_started_at: Option<Instant>,
    accumulated_pause: Duration,

    physics_period: Duration,
    surveillance_period: Duration,
    render_period: Duration,
    pacing_period: Duration,
    minimum_separation: f64,

    collision: bool,
    conflict_first_caused: bool,
    conflict_second_caused: bool,

    frames_per_second: f64,
    adsb_report: bool,
}

impl StateInner {
    fn new(settings: &SimulationSettings) -> Self {
        Self {
            is_running: true,
            is_paused: false,
            reset_requested: false,
            pause_started_at: None,
            accumulated_pause: Duration::ZERO,
            physics_period: settings.physics_period(),
            surveillance_period: settings.surveillance_period(),
            render_period: settings.render_period(),
            pacing_period: settings.pacing_period(),
            minimum_separation: settings.minimum_separation_m,
            collision: false,
            conflict_first_caused: false,
            conflict_second_caused: false,
            frames_per_second: 0.0,
            adsb_report: settings.adsb_report,
        }
    }

    fn fold_pause(&mut self, now: Instant) {
        if let Some(started) = self.pause_started_at.take() {
            self.accumulated_pause += now.saturating_duration_since(started);
        }
    }

    fn clear_logical(&mut self) {
        self.is_paused = false;
        self.reset_requested = false;
        self.pause_started_at = None;
        self.accumulated_pause = Duration::ZERO;
        self.collision = false;
        self.conflict_first_caused = false;
        self.conflict_second_caused = false;
        self.frames_per_second = 0.0;
    }
}

/// Consistent copy of the shared state taken under the guard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub mode: ExecutionMode,
    pub is_running: bool,
    pub is_paused: bool,
    pub reset_requested: bool,
    pub physics_cycle_count: u64,
    pub surveillance_cycle_count: u64,
    pub accumulated_pause_duration: Duration,
    pub collision: bool,
    pub conflict_first_caused: bool,
    pub conflict_second_caused: bool,
    pub frames_per_second: f64,
}

/// The single object shared by every simulation loop
#[derive(Debug)]
pub struct SimulationState {
    mode: ExecutionMode,
    inner: Mutex<StateInner>,

    physics_cycles: AtomicU64,
    simulated_nanos: AtomicU64,
    surveillance_cycles: AtomicU64,
    rendered_frames: AtomicU64,
}

impl SimulationState {
    /// Create the state for a new run; the run starts out running and unpaused
    pub fn new(mode: ExecutionMode, settings: &SimulationSettings) -> Self {
        Self {
            mode,
            inner: Mutex::new(StateInner::new(settings)),
            physics_cycles: AtomicU64::new(0),
            simulated_nanos: AtomicU64::new(0),
            surveillance_cycles: AtomicU64::new(0),
            rendered_frames: AtomicU64::new(0),
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn is_realtime(&self) -> bool {
        self.mode == ExecutionMode::Realtime
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().is_running
    }

    pub fn is_paused(&self) -> bool {
        self.inner.lock().is_paused
    }

    // Pause accounting

    /// Toggle pause using the current wall-clock instant
    pub fn toggle_pause(&self) -> bool {
        self.toggle_pause_at(Instant::now())
    }

    /// Toggle pause at an explicit instant. Returns whether the state is paused
    /// afterwards. Pausing a run that is not running is a no-op.
    pub fn toggle_pause_at(&self, now: Instant) -> bool {
        let mut inner = self.inner.lock();
        if inner.is_paused {
            inner.fold_pause(now);
            inner.is_paused = false;
        } else if inner.is_running {
            inner.pause_started_at = Some(now);
            inner.is_paused = true;
        }
        inner.is_paused
    }

    /// Fold an in-progress pause into the accumulated total without resuming
    pub fn finish_pause_at(&self, now: Instant) {
        let mut inner = self.inner.lock();
        if inner.is_paused {
            inner.fold_pause(now);
            inner.pause_started_at = Some(now);
        }
    }

    pub fn accumulated_pause_duration(&self) -> Duration {
        self.inner.lock().accumulated_pause
    }

    // Reset protocol

    /// Ask the controller to reset the run. Idempotent, callable from any thread.
    pub fn request_reset(&self) {
        self.inner.lock().reset_requested = true;
    }

    pub fn reset_requested(&self) -> bool {
        self.inner.lock().reset_requested
    }

    /// Consume a pending reset request.
    ///
    /// Must only be called by the controller while no loop is running: it
    /// zeroes the cycle counters that loops otherwise own exclusively.
    /// Returns `false` when no reset was pending.
    pub fn apply_reset(&self) -> bool {
        let mut inner = self.inner.lock();
        if !inner.reset_requested {
            return false;
        }
        inner.clear_logical();
        self.zero_counters();
        true
    }

    /// Return to the idle state at the end of a run
    pub fn finish_run(&self) {
        let mut inner = self.inner.lock();
        inner.clear_logical();
        inner.is_running = false;
        self.zero_counters();
    }

    fn zero_counters(&self) {
        self.physics_cycles.store(0, Ordering::SeqCst);
        self.simulated_nanos.store(0, Ordering::SeqCst);
        self.surveillance_cycles.store(0, Ordering::SeqCst);
        self.rendered_frames.store(0, Ordering::SeqCst);
    }

    // Cadence and thresholds

    /// Refresh cadence targets and thresholds from a settings snapshot
    pub fn apply_settings(&self, settings: &SimulationSettings) {
        let mut inner = self.inner.lock();
        inner.physics_period = settings.physics_period();
        inner.surveillance_period = settings.surveillance_period();
        inner.render_period = settings.render_period();
        inner.pacing_period = settings.pacing_period();
        inner.minimum_separation = settings.minimum_separation_m;
    }

    pub fn physics_period(&self) -> Duration {
        self.inner.lock().physics_period
    }

    pub fn surveillance_period(&self) -> Duration {
        self.inner.lock().surveillance_period
    }

    pub fn render_period(&self) -> Duration {
        self.inner.lock().render_period
    }

    pub fn pacing_period(&self) -> Duration {
        self.inner.lock().pacing_period
    }

    pub fn minimum_separation(&self) -> f64 {
        self.inner.lock().minimum_separation
    }

    // Sticky collision flags

    pub fn collision(&self) -> bool {
        self.inner.lock().collision
    }

    /// Returns `true` only for the call that set the flag
    pub fn register_collision(&self) -> bool {
        let mut inner = self.inner.lock();
        !std::mem::replace(&mut inner.collision, true)
    }

    pub fn conflict_first_caused(&self) -> bool {
        self.inner.lock().conflict_first_caused
    }

    pub fn mark_first_cause(&self) -> bool {
        let mut inner = self.inner.lock();
        !std::mem::replace(&mut inner.conflict_first_caused, true)
    }

    pub fn conflict_second_caused(&self) -> bool {
        self.inner.lock().conflict_second_caused
    }

    pub fn mark_second_cause(&self) -> bool {
        let mut inner = self.inner.lock();
        !std::mem::replace(&mut inner.conflict_second_caused, true)
    }

    // Reporting

    pub fn adsb_report(&self) -> bool {
        self.inner.lock().adsb_report
    }

    pub fn toggle_adsb_report(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.adsb_report = !inner.adsb_report;
        inner.adsb_report
    }

    pub fn frames_per_second(&self) -> f64 {
        self.inner.lock().frames_per_second
    }

    /// Written by the pacing loop only
    pub fn set_frames_per_second(&self, fps: f64) {
        self.inner.lock().frames_per_second = fps;
    }

    // Cycle counters

    pub fn physics_cycle_count(&self) -> u64 {
        self.physics_cycles.load(Ordering::SeqCst)
    }

    /// Count one physics step of `dt` simulated time. Written by the physics
    /// loop only; returns the new cycle count.
    pub fn record_physics_step(&self, dt: Duration) -> u64 {
        let dt_ns = u64::try_from(dt.as_nanos()).unwrap_or(u64::MAX);
        self.simulated_nanos.fetch_add(dt_ns, Ordering::SeqCst);
        self.physics_cycles.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn surveillance_cycle_count(&self) -> u64 {
        self.surveillance_cycles.load(Ordering::SeqCst)
    }

    /// Written by the surveillance loop only
    pub fn increment_surveillance_cycles(&self) -> u64 {
        self.surveillance_cycles.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn rendered_frames(&self) -> u64 {
        self.rendered_frames.load(Ordering::SeqCst)
    }

    /// Written by the render loop only
    pub fn record_frame(&self) -> u64 {
        self.rendered_frames.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Simulated time covered by the physics steps executed so far, each at
    /// the step size it actually used
    pub fn simulated_time(&self) -> Duration {
        Duration::from_nanos(self.simulated_nanos.load(Ordering::SeqCst))
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let inner = self.inner.lock();
        StateSnapshot {
            mode: self.mode,
            is_running: inner.is_running,
            is_paused: inner.is_paused,
            reset_requested: inner.reset_requested,
            physics_cycle_count: self.physics_cycle_count(),
            surveillance_cycle_count: self.surveillance_cycle_count(),
            accumulated_pause_duration: inner.accumulated_pause,
            collision: inner.collision,
            conflict_first_caused: inner.conflict_first_caused,
            conflict_second_caused: inner.conflict_second_caused,
            frames_per_second: inner.frames_per_second,
        }
    }
}
