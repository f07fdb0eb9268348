//! Error types for ConflictDetector

use thiserror::Error;

/// Errors that can occur while evaluating an encounter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConflictError {
    /// Both vehicles move with identical velocity; closest approach is undefined
    #[error("Degenerate relative velocity between aircraft {first} and {second}")]
    DegenerateVelocity { first: u32, second: u32 },
}
