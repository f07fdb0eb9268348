//! FPS measurement loop

use std::sync::Arc;
use std::time::{Duration, Instant};

use simulation_clock::{Cycle, SimulationState};

/// Converts the render loop's frame counter into a frames-per-second figure
pub struct PacingTask {
    state: Arc<SimulationState>,
    last_frames: u64,
    /// Start of the current measurement window; unset until the first cycle
    last_measured: Option<Instant>,
}

impl PacingTask {
    pub fn new(state: Arc<SimulationState>) -> Self {
        Self { state, last_frames: 0, last_measured: None }
    }
}

impl Cycle for PacingTask {
    fn name(&self) -> &'static str {
        "pacing"
    }

    fn period(&self) -> Duration {
        self.state.pacing_period()
    }

    fn cycle(&mut self) {
        let now = Instant::now();
        let frames = self.state.rendered_frames();

        // the first cycle only opens the window
        if let Some(last_measured) = self.last_measured {
            let window = now.saturating_duration_since(last_measured);
            if !window.is_zero() {
                // counters drop back to zero on reset
                let fps = frames.saturating_sub(self.last_frames) as f64 / window.as_secs_f64();
                self.state.set_frames_per_second(fps);
                metrics::gauge!("uav_sim_fps", fps);
            }
        }

        self.last_frames = frames;
        self.last_measured = Some(now);
    }
}
