//! Metrics collection for fixed-rate loops

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Point-in-time view of one loop's cadence statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoopMetricsSnapshot {
    /// Cycles executed
    pub cycles: u64,

    /// Cycles whose execution exceeded the period
    pub overruns: u64,

    /// Duration of the last cycle in nanoseconds
    pub last_cycle_ns: u64,

    /// Average cycle duration in nanoseconds
    pub avg_cycle_ns: u64,

    /// Maximum cycle duration in nanoseconds
    pub max_cycle_ns: u64,
}

impl LoopMetricsSnapshot {
    /// Fraction of cycles that overran their period
    pub fn overrun_ratio(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.overruns as f64 / self.cycles as f64
        }
    }
}

/// Lock-free per-loop statistics written by the loop thread only
#[derive(Debug, Default)]
pub struct LoopMetrics {
    cycles: AtomicU64,
    overruns: AtomicU64,
    last_cycle_ns: AtomicU64,
    total_cycle_ns: AtomicU64,
    max_cycle_ns: AtomicU64,
}

impl LoopMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed cycle
    pub fn record_cycle(&self, duration: Duration, overran: bool) {
        let duration_ns = duration.as_nanos() as u64;

        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.last_cycle_ns.store(duration_ns, Ordering::Relaxed);
        self.total_cycle_ns.fetch_add(duration_ns, Ordering::Relaxed);
        if overran {
            self.overruns.fetch_add(1, Ordering::Relaxed);
        }

        let mut max_duration = self.max_cycle_ns.load(Ordering::Relaxed);
        while duration_ns > max_duration {
            match self.max_cycle_ns.compare_exchange_weak(
                max_duration,
                duration_ns,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => max_duration = current,
            }
        }
    }

    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        let cycles = self.cycles.load(Ordering::Relaxed);
        let total = self.total_cycle_ns.load(Ordering::Relaxed);

        LoopMetricsSnapshot {
            cycles,
            overruns: self.overruns.load(Ordering::Relaxed),
            last_cycle_ns: self.last_cycle_ns.load(Ordering::Relaxed),
            avg_cycle_ns: if cycles > 0 { total / cycles } else { 0 },
            max_cycle_ns: self.max_cycle_ns.load(Ordering::Relaxed),
        }
    }
}
