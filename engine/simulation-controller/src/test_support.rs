//! Shared fixtures for controller tests

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use glam::DVec3;
use parking_lot::Mutex;

use simulation_clock::SettingsHandle;

use crate::aircraft::{Aircraft, AircraftTrack, FlightControl, Fleet, Vehicle};
use crate::export::{ExportError, PathExporter};
use crate::kinematic::KinematicAircraft;
use crate::VehicleSnapshot;

/// Aircraft that counts evasive commands but never actually evades, and never
/// reports itself as evading
pub struct NonEvadingAircraft {
    inner: KinematicAircraft,
    commands: Arc<AtomicU32>,
}

impl NonEvadingAircraft {
    pub fn new(id: u32, position: DVec3, velocity: DVec3) -> (Self, Arc<AtomicU32>) {
        let commands = Arc::new(AtomicU32::new(0));
        let aircraft = Self { inner: KinematicAircraft::new(id, position, velocity), commands: commands.clone() };
        (aircraft, commands)
    }
}

impl Vehicle for NonEvadingAircraft {
    fn id(&self) -> u32 {
        self.inner.id()
    }

    fn snapshot(&self) -> VehicleSnapshot {
        self.inner.snapshot()
    }

    fn advance(&mut self, dt: Duration) {
        self.inner.advance(dt);
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

impl FlightControl for NonEvadingAircraft {
    fn apply_evasive_maneuver(&mut self) {
        self.commands.fetch_add(1, Ordering::SeqCst);
    }

    fn is_evading(&self) -> bool {
        false
    }

    fn append_visited(&mut self, position: DVec3) {
        self.inner.append_visited(position);
    }

    fn visited(&self) -> &[DVec3] {
        self.inner.visited()
    }

    fn reset_control(&mut self) {
        self.inner.reset_control();
    }
}

/// Two non-evading aircraft on a head-on course along the x axis
pub fn head_on_pair(separation: f64, speed: f64) -> (Fleet, Arc<AtomicU32>, Arc<AtomicU32>) {
    let (a, a_commands) =
        NonEvadingAircraft::new(0, DVec3::new(0.0, 0.0, 1000.0), DVec3::new(speed, 0.0, 0.0));
    let (b, b_commands) =
        NonEvadingAircraft::new(1, DVec3::new(separation, 0.0, 1000.0), DVec3::new(-speed, 0.0, 0.0));
    let aircraft: Vec<Box<dyn Aircraft>> = vec![Box::new(a), Box::new(b)];
    (Fleet::new(aircraft), a_commands, b_commands)
}

/// Two kinematic aircraft on parallel tracks `offset` meters apart
pub fn parallel_pair(offset: f64) -> Fleet {
    let aircraft: Vec<Box<dyn Aircraft>> = vec![
        Box::new(KinematicAircraft::new(0, DVec3::new(0.0, 0.0, 1000.0), DVec3::new(80.0, 0.0, 0.0))),
        Box::new(KinematicAircraft::new(1, DVec3::new(0.0, offset, 1000.0), DVec3::new(60.0, 0.0, 0.0))),
    ];
    Fleet::new(aircraft)
}

/// Kinematic aircraft that edits the shared settings after a fixed number of
/// advances
pub struct SettingsEditingAircraft {
    inner: KinematicAircraft,
    settings: SettingsHandle,
    remaining: u32,
    physics_period_ms: u64,
}

impl SettingsEditingAircraft {
    pub fn new(inner: KinematicAircraft, settings: SettingsHandle, after: u32, physics_period_ms: u64) -> Self {
        Self { inner, settings, remaining: after, physics_period_ms }
    }
}

impl Vehicle for SettingsEditingAircraft {
    fn id(&self) -> u32 {
        self.inner.id()
    }

    fn snapshot(&self) -> VehicleSnapshot {
        self.inner.snapshot()
    }

    fn advance(&mut self, dt: Duration) {
        self.inner.advance(dt);
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                let period = self.physics_period_ms;
                self.settings.update(|s| s.physics_period_ms = period).unwrap();
            }
        }
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

impl FlightControl for SettingsEditingAircraft {
    fn apply_evasive_maneuver(&mut self) {
        self.inner.apply_evasive_maneuver();
    }

    fn is_evading(&self) -> bool {
        self.inner.is_evading()
    }

    fn append_visited(&mut self, position: DVec3) {
        self.inner.append_visited(position);
    }

    fn visited(&self) -> &[DVec3] {
        self.inner.visited()
    }

    fn reset_control(&mut self) {
        self.inner.reset_control();
    }
}

/// Exporter keeping tracks in memory
#[derive(Default)]
pub struct RecordingExporter {
    pub exports: Mutex<Vec<Vec<AircraftTrack>>>,
}

impl PathExporter for RecordingExporter {
    fn export(&self, tracks: &[AircraftTrack]) -> Result<Vec<PathBuf>, ExportError> {
        self.exports.lock().push(tracks.to_vec());
        Ok(Vec::new())
    }
}

/// Exporter that always fails
pub struct FailingExporter;

impl PathExporter for FailingExporter {
    fn export(&self, _tracks: &[AircraftTrack]) -> Result<Vec<PathBuf>, ExportError> {
        Err(ExportError::CreateDir {
            path: PathBuf::from("/unwritable"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        })
    }
}
