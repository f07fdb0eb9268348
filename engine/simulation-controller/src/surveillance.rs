//! ADS-B surveillance loop
//!
//! Each cycle snapshots all aircraft, evaluates every pair with the
//! [`ConflictDetector`], commands evasive maneuvers and records path history.
//! This loop is the only producer of the conflict and collision flags.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use conflict_detector::{ConflictDetector, ConflictResult, VehicleSnapshot};
use simulation_clock::{Cycle, SettingsHandle, SimulationState};
use tracing::{debug, info, warn};

use crate::aircraft::Fleet;

/// A probable collision is registered once closest approach falls within this
/// many surveillance periods: the next look, plus one cycle of snapshot lag.
pub const COLLISION_HORIZON_CYCLES: f64 = 2.0;

pub struct SurveillanceTask {
    state: Arc<SimulationState>,
    fleet: Fleet,
    settings: SettingsHandle,
    /// Aircraft already commanded to evade during this run
    commanded: HashSet<u32>,
}

impl SurveillanceTask {
    pub fn new(state: Arc<SimulationState>, fleet: Fleet, settings: SettingsHandle) -> Self {
        Self { state, fleet, settings, commanded: HashSet::new() }
    }

    /// Number of evasive commands issued so far
    pub fn commands_issued(&self) -> usize {
        self.commanded.len()
    }

    fn evaluate_pair(
        &mut self,
        detector: &ConflictDetector,
        first_index: usize,
        second_index: usize,
        first: &VehicleSnapshot,
        second: &VehicleSnapshot,
    ) -> Option<ConflictResult> {
        let result = match detector.evaluate(first, second) {
            Ok(result) => result,
            Err(e) => {
                debug!("Skipping conflict evaluation: {}", e);
                return None;
            }
        };

        debug!(
            first = first.id,
            second = second.id,
            "Time to closest approach: {:.2}s",
            result.time_to_closest_approach
        );

        if !result.is_converging() {
            return Some(result);
        }

        debug!(
            first = first.id,
            second = second.id,
            separation = first.distance_to(second),
            "Miss distance at closest approach: {:.2}m",
            result.miss_distance
        );

        if result.is_head_on() {
            warn!(first = first.id, second = second.id, "Head-on collision course detected");
        }

        if result.is_conflict {
            metrics::counter!("uav_sim_conflicts_total", 1);
            warn!(
                first = first.id,
                second = second.id,
                miss_distance = result.miss_distance,
                time_to_closest_approach = result.time_to_closest_approach,
                "Conflict condition detected"
            );
            self.mark_cause(first_index);
            self.mark_cause(second_index);
            self.command_evasion(first_index, first.id);
        }

        if result.is_probable_collision {
            warn!(
                first = first.id,
                second = second.id,
                time_to_closest_approach = result.time_to_closest_approach,
                "Probable collision detected"
            );

            let horizon = self.state.surveillance_period().as_secs_f64() * COLLISION_HORIZON_CYCLES;
            if result.time_to_closest_approach <= horizon && self.state.register_collision() {
                metrics::counter!("uav_sim_collisions_total", 1);
                warn!(first = first.id, second = second.id, "Collision registered");
            }
        }

        Some(result)
    }

    fn mark_cause(&self, index: usize) {
        let newly_set = match index {
            0 => self.state.mark_first_cause(),
            1 => self.state.mark_second_cause(),
            _ => false,
        };
        if newly_set {
            info!("Aircraft at position {} involved in a conflict", index);
        }
    }

    fn command_evasion(&mut self, index: usize, id: u32) {
        if self.commanded.contains(&id) {
            return;
        }
        let Some(aircraft) = self.fleet.get(index) else {
            return;
        };

        let mut aircraft = aircraft.lock();
        if !aircraft.is_evading() {
            aircraft.apply_evasive_maneuver();
            info!(aircraft = id, "Evasive maneuver commanded");
        }
        self.commanded.insert(id);
    }
}

impl Cycle for SurveillanceTask {
    fn name(&self) -> &'static str {
        "adsb"
    }

    fn period(&self) -> Duration {
        self.state.surveillance_period()
    }

    fn cycle(&mut self) {
        if self.state.is_paused() {
            return;
        }

        let adsb_cycle = self.state.increment_surveillance_cycles();
        metrics::counter!("uav_sim_adsb_cycles_total", 1);

        self.state.apply_settings(&self.settings.snapshot());

        let snapshots = self.fleet.snapshots();
        let detector = ConflictDetector::new(self.state.minimum_separation());

        for i in 0..snapshots.len() {
            for j in (i + 1)..snapshots.len() {
                self.evaluate_pair(&detector, i, j, &snapshots[i], &snapshots[j]);
            }
        }

        let report = self.state.adsb_report();
        let (fps, physics_cycle) = (self.state.frames_per_second(), self.state.physics_cycle_count());

        for (aircraft, snapshot) in self.fleet.iter().zip(&snapshots) {
            let mut aircraft = aircraft.lock();
            aircraft.append_visited(snapshot.position);

            if report {
                info!(
                    aircraft = snapshot.id,
                    speed = snapshot.speed(),
                    x = snapshot.position.x,
                    y = snapshot.position.y,
                    z = snapshot.position.z,
                    evading = aircraft.is_evading(),
                    fps,
                    adsb_cycle,
                    physics_cycle,
                    "ADS-B report"
                );
            }
        }
    }
}
