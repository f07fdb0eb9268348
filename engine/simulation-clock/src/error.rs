//! Error types for SimulationClock

use thiserror::Error;

/// Errors that can occur in the SimulationClock
#[derive(Error, Debug)]
pub enum ClockError {
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("Settings file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Failed to spawn {name} loop thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} loop thread panicked")]
    LoopPanicked { name: &'static str },
}
