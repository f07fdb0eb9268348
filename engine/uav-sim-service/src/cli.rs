//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

use crate::config::{RunMode, ServiceConfig};

#[derive(Debug, Parser)]
#[command(name = "uav-sim", version, about = "UAV collision avoidance simulation")]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Execution mode
    #[arg(short, long, value_enum)]
    pub mode: Option<RunMode>,

    /// Simulated seconds to run for
    #[arg(short, long)]
    pub duration: Option<u64>,

    /// Log an ADS-B report for every aircraft each surveillance cycle
    #[arg(long)]
    pub adsb_report: bool,

    /// Log level, overriding the config file and UAV_LOG_LEVEL
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write the effective configuration to this file and exit
    #[arg(long, value_name = "PATH")]
    pub write_config: Option<PathBuf>,
}

impl Cli {
    /// Flags take precedence over the config file and environment
    pub fn apply_to(&self, config: &mut ServiceConfig) {
        if let Some(mode) = self.mode {
            config.run.mode = mode;
        }
        if let Some(duration) = self.duration {
            config.run.duration_secs = Some(duration);
        }
        if self.adsb_report {
            config.simulation.adsb_report = true;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
