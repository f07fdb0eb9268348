//! Render loop and renderer collaborator

use std::sync::Arc;
use std::time::Duration;

use conflict_detector::VehicleSnapshot;
use simulation_clock::{Cycle, SimulationState};

use crate::aircraft::Fleet;

/// Everything a renderer needs to draw one frame
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub aircraft: Vec<VehicleSnapshot>,
    pub frames_per_second: f64,
    pub is_paused: bool,
    pub collision: bool,
    pub physics_cycle_count: u64,
}

/// External drawing surface
pub trait Renderer: Send + Sync {
    fn redraw(&self, frame: &RenderFrame);
}

/// Renderer for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn redraw(&self, _frame: &RenderFrame) {}
}

pub struct RenderTask {
    state: Arc<SimulationState>,
    fleet: Fleet,
    renderer: Arc<dyn Renderer>,
}

impl RenderTask {
    pub fn new(state: Arc<SimulationState>, fleet: Fleet, renderer: Arc<dyn Renderer>) -> Self {
        Self { state, fleet, renderer }
    }
}

impl Cycle for RenderTask {
    fn name(&self) -> &'static str {
        "render"
    }

    fn period(&self) -> Duration {
        self.state.render_period()
    }

    fn cycle(&mut self) {
        let snapshot = self.state.snapshot();
        let frame = RenderFrame {
            aircraft: self.fleet.snapshots(),
            frames_per_second: snapshot.frames_per_second,
            is_paused: snapshot.is_paused,
            collision: snapshot.collision,
            physics_cycle_count: snapshot.physics_cycle_count,
        };

        self.renderer.redraw(&frame);
        self.state.record_frame();
    }
}
