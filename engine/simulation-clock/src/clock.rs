//! Self-correcting fixed-rate loop

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::ClockError;
use crate::metrics::{LoopMetrics, LoopMetricsSnapshot};

/// One unit of periodic work driven by a [`FixedRateLoop`]
pub trait Cycle: Send + 'static {
    /// Loop name, also used as the thread name
    fn name(&self) -> &'static str;

    /// Current target period. Re-read after every cycle so cadence changes
    /// take effect on the next sleep.
    fn period(&self) -> Duration;

    /// Execute one cycle. Never interrupted once started.
    fn cycle(&mut self);
}

#[derive(Debug, Default)]
struct TokenInner {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

/// Cooperative cancellation flag shared between the controller and a loop
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let mut cancelled = self.inner.cancelled.lock();
        *cancelled = true;
        self.inner.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock()
    }

    /// Sleep for `duration` unless cancelled first. Returns whether the token
    /// is cancelled when the sleep ends.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut cancelled = self.inner.cancelled.lock();
        while !*cancelled {
            if self.inner.wake.wait_until(&mut cancelled, deadline).timed_out() {
                break;
            }
        }
        *cancelled
    }
}

/// Summary returned when a loop thread exits
#[derive(Debug, Clone)]
pub struct LoopStats {
    pub name: &'static str,
    pub stopped_at: Instant,
    pub metrics: LoopMetricsSnapshot,
}

/// Fixed-rate scheduler: `cycle(); sleep(max(0, period - elapsed))`.
///
/// Drift from cycle cost is absorbed by the shortened sleep. Missed cycles are
/// never caught up; an overrunning cycle is followed immediately by the next.
pub struct FixedRateLoop<C: Cycle> {
    task: C,
    token: CancellationToken,
    metrics: LoopMetrics,
}

impl<C: Cycle> FixedRateLoop<C> {
    pub fn new(task: C, token: CancellationToken) -> Self {
        Self { task, token, metrics: LoopMetrics::new() }
    }

    /// Run on the current thread until the token is cancelled
    pub fn run(mut self) -> LoopStats {
        let name = self.task.name();
        tracing::debug!("Starting {} loop", name);

        while !self.token.is_cancelled() {
            let cycle_start = Instant::now();
            self.task.cycle();
            let elapsed = cycle_start.elapsed();

            let period = self.task.period();
            let overran = elapsed > period;
            self.metrics.record_cycle(elapsed, overran);
            metrics::counter!("uav_sim_loop_cycles_total", 1, "loop" => name);

            if self.token.is_cancelled() {
                break;
            }

            match period.checked_sub(elapsed) {
                Some(remaining) if !remaining.is_zero() => {
                    if self.token.sleep(remaining) {
                        break;
                    }
                }
                _ => {
                    metrics::counter!("uav_sim_loop_overruns_total", 1, "loop" => name);
                    tracing::trace!("{} cycle took {:?}, target was {:?}", name, elapsed, period);
                }
            }
        }

        let metrics = self.metrics.snapshot();
        tracing::debug!(cycles = metrics.cycles, overruns = metrics.overruns, "{} loop stopped", name);

        LoopStats { name, stopped_at: Instant::now(), metrics }
    }

    /// Run on a dedicated, named thread
    pub fn spawn(self) -> Result<LoopHandle, ClockError> {
        let name = self.task.name();
        let token = self.token.clone();

        let thread = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || self.run())
            .map_err(|source| ClockError::Spawn { name, source })?;

        Ok(LoopHandle { name, token, thread })
    }
}

/// Controller-side handle to a spawned loop
pub struct LoopHandle {
    name: &'static str,
    token: CancellationToken,
    thread: JoinHandle<LoopStats>,
}

impl LoopHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Request cancellation; the loop exits at its next sleep boundary
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the loop thread to finish its in-flight cycle and exit
    pub fn join(self) -> Result<LoopStats, ClockError> {
        self.thread.join().map_err(|_| ClockError::LoopPanicked { name: self.name })
    }
}
