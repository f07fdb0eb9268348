//! Configuration for SimulationClock

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::ClockError;
use crate::{
    DEFAULT_PACING_PERIOD_MS, DEFAULT_PHYSICS_PERIOD_MS, DEFAULT_RENDER_PERIOD_MS,
    DEFAULT_SURVEILLANCE_PERIOD_MS,
};

/// Tunable cadence and threshold settings for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Physics integration step in milliseconds (default: 10ms = 100Hz)
    pub physics_period_ms: u64,

    /// ADS-B surveillance cycle in milliseconds (default: 1000ms)
    pub surveillance_period_ms: u64,

    /// Render cycle in milliseconds (default: 10ms = 100Hz)
    pub render_period_ms: u64,

    /// Window over which rendered frames are counted into an FPS figure
    pub pacing_period_ms: u64,

    /// Separation below which a conflict is declared, in meters
    pub minimum_separation_m: f64,

    /// Emit an ADS-B telemetry line for every aircraft each surveillance cycle
    pub adsb_report: bool,

    /// Directory receiving flight path CSV exports on stop
    pub export_dir: PathBuf,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            physics_period_ms: DEFAULT_PHYSICS_PERIOD_MS,
            surveillance_period_ms: DEFAULT_SURVEILLANCE_PERIOD_MS,
            render_period_ms: DEFAULT_RENDER_PERIOD_MS,
            pacing_period_ms: DEFAULT_PACING_PERIOD_MS,
            minimum_separation_m: 100.0,
            adsb_report: false,
            export_dir: PathBuf::from("logs/visited"),
        }
    }
}

impl SimulationSettings {
    /// Get physics step as Duration
    pub fn physics_period(&self) -> Duration {
        Duration::from_millis(self.physics_period_ms)
    }

    /// Get surveillance cadence as Duration
    pub fn surveillance_period(&self) -> Duration {
        Duration::from_millis(self.surveillance_period_ms)
    }

    /// Get render cadence as Duration
    pub fn render_period(&self) -> Duration {
        Duration::from_millis(self.render_period_ms)
    }

    /// Get FPS measurement window as Duration
    pub fn pacing_period(&self) -> Duration {
        Duration::from_millis(self.pacing_period_ms)
    }

    /// Physics steps per simulated second
    pub fn physics_frequency(&self) -> f64 {
        1000.0 / self.physics_period_ms as f64
    }

    /// Reject settings no loop can run with
    pub fn validate(&self) -> Result<(), ClockError> {
        if self.physics_period_ms == 0 {
            return Err(ClockError::InvalidConfig("physics_period_ms must be positive".into()));
        }
        if self.surveillance_period_ms == 0 {
            return Err(ClockError::InvalidConfig("surveillance_period_ms must be positive".into()));
        }
        if self.render_period_ms == 0 {
            return Err(ClockError::InvalidConfig("render_period_ms must be positive".into()));
        }
        if self.pacing_period_ms == 0 {
            return Err(ClockError::InvalidConfig("pacing_period_ms must be positive".into()));
        }
        if !self.minimum_separation_m.is_finite() || self.minimum_separation_m < 0.0 {
            return Err(ClockError::InvalidConfig(format!(
                "Invalid minimum separation: {}",
                self.minimum_separation_m
            )));
        }
        Ok(())
    }

    /// Load settings from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ClockError> {
        let content = std::fs::read_to_string(path)?;
        let settings: SimulationSettings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ClockError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Shared, hot-reloadable settings passed explicitly into a run.
///
/// The surveillance loop takes one snapshot per cycle; writers replace values
/// between cycles.
#[derive(Debug, Clone, Default)]
pub struct SettingsHandle {
    inner: Arc<RwLock<SimulationSettings>>,
}

impl SettingsHandle {
    pub fn new(settings: SimulationSettings) -> Self {
        Self { inner: Arc::new(RwLock::new(settings)) }
    }

    /// Copy of the current settings
    pub fn snapshot(&self) -> SimulationSettings {
        self.inner.read().clone()
    }

    /// Apply an in-place change. Invalid results are rejected and the previous
    /// settings are kept.
    pub fn update<F>(&self, change: F) -> Result<(), ClockError>
    where
        F: FnOnce(&mut SimulationSettings),
    {
        let mut guard = self.inner.write();
        let mut candidate = guard.clone();
        change(&mut candidate);
        candidate.validate()?;
        *guard = candidate;
        Ok(())
    }
}

impl From<SimulationSettings> for SettingsHandle {
    fn from(settings: SimulationSettings) -> Self {
        Self::new(settings)
    }
}
