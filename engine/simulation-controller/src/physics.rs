//! Physics loop: advances every aircraft by one time step per cycle

use std::sync::Arc;
use std::time::Duration;

use simulation_clock::{Cycle, SimulationState};

use crate::aircraft::Fleet;

pub struct PhysicsTask {
    state: Arc<SimulationState>,
    fleet: Fleet,
}

impl PhysicsTask {
    pub fn new(state: Arc<SimulationState>, fleet: Fleet) -> Self {
        Self { state, fleet }
    }

    /// Advance all aircraft by `dt` of simulated time. Paused runs do not move.
    pub fn step(&mut self, dt: Duration) {
        if self.state.is_paused() {
            return;
        }

        for aircraft in self.fleet.iter() {
            aircraft.lock().advance(dt);
        }

        self.state.record_physics_step(dt);
        metrics::counter!("uav_sim_physics_cycles_total", 1);
    }
}

impl Cycle for PhysicsTask {
    fn name(&self) -> &'static str {
        "physics"
    }

    fn period(&self) -> Duration {
        self.state.physics_period()
    }

    fn cycle(&mut self) {
        let dt = self.state.physics_period();
        self.step(dt);
    }
}
