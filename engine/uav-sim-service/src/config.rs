//! Service configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use simulation_clock::SimulationSettings;

/// Simulated seconds covered by a batch run when no duration is configured
pub const DEFAULT_BATCH_DURATION_SECS: u64 = 60;

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Loop cadences, separation threshold and export directory
    pub simulation: SimulationSettings,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Execution mode and time budget
    pub run: RunSettings,
}

/// How the simulation is driven
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Paced loops on dedicated threads
    #[default]
    Realtime,
    /// Unpaced, deterministic stepping on the main thread
    Batch,
}

/// Run-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub mode: RunMode,

    /// Simulated seconds to run for. Realtime runs without a budget continue
    /// until a collision or a stop signal.
    pub duration_secs: Option<u64>,
}

impl RunSettings {
    /// Time budget for a batch run
    pub fn batch_duration_secs(&self) -> u64 {
        self.duration_secs.unwrap_or(DEFAULT_BATCH_DURATION_SECS)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "compact".to_string() }
    }
}

/// Load configuration from an optional TOML file and the process environment
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let mut config = match path {
        Some(path) => load_from_file(path)?,
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    Ok(config)
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
}

/// Save configuration to a TOML file
pub fn save_config(config: &ServiceConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write config file: {:?}", path))
}

/// Override configuration from `UAV_*` variables resolved through `lookup`
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(level) = lookup("UAV_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Some(format) = lookup("UAV_LOG_FORMAT") {
        config.logging.format = format;
    }

    if let Some(export_dir) = lookup("UAV_EXPORT_DIR") {
        config.simulation.export_dir = PathBuf::from(export_dir);
    }

    if let Some(report) = lookup("UAV_ADSB_REPORT") {
        config.simulation.adsb_report =
            report.parse().with_context(|| format!("Invalid UAV_ADSB_REPORT: {}", report))?;
    }

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    // Validate log level
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level)),
    }

    // Validate log format
    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => return Err(anyhow::anyhow!("Invalid log format: {}", config.logging.format)),
    }

    if config.run.duration_secs == Some(0) {
        return Err(anyhow::anyhow!("Run duration must be positive"));
    }

    config.simulation.validate().context("Invalid simulation settings")?;

    Ok(())
}
