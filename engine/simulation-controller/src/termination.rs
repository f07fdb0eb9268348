//! Run termination condition

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use simulation_clock::SimulationState;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    CollisionDetected,
    TimeExhausted,
    ManualStop,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::CollisionDetected => write!(f, "collision_detected"),
            TerminationReason::TimeExhausted => write!(f, "time_exhausted"),
            TerminationReason::ManualStop => write!(f, "manual_stop"),
        }
    }
}

/// Stop request that can be raised from any thread (signal handler, UI)
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Underlying flag, for registration with signal handlers
    pub fn flag(&self) -> Arc<AtomicBool> {
        self.0.clone()
    }
}

/// The single check deciding whether a run should end, evaluated by the
/// controller once per surveillance cycle
#[derive(Debug, Clone)]
pub struct TerminationCondition {
    time_budget: Option<Duration>,
    stop_signal: StopSignal,
}

impl TerminationCondition {
    pub fn new(time_budget: Option<Duration>, stop_signal: StopSignal) -> Self {
        Self { time_budget, stop_signal }
    }

    pub fn evaluate(&self, state: &SimulationState) -> Option<TerminationReason> {
        if state.collision() {
            return Some(TerminationReason::CollisionDetected);
        }
        if self.stop_signal.is_raised() {
            return Some(TerminationReason::ManualStop);
        }
        match self.time_budget {
            Some(budget) if state.simulated_time() >= budget => Some(TerminationReason::TimeExhausted),
            _ => None,
        }
    }
}
