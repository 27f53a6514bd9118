//! Per-tick CPU usage accounting.
//!
//! The graph owns one [`UsageProfiler`] and brackets every `update_all`
//! walk with it. Timing needs a monotonic cycle counter, which the
//! library cannot name portably (SysTick, the M33 cycle counter, a
//! free-running timer), so the application injects one with
//! [`set_cycle_source`](UsageProfiler::set_cycle_source). Until it
//! does, CPU queries report zero. Pool occupancy queries live on
//! [`AudioBlockPool`](crate::block::AudioBlockPool) itself.

use core::sync::atomic::{AtomicU32, Ordering};

/// Tracks how much of each block period the node walk consumes, plus
/// the count of tick overruns.
///
/// Counters are atomics so the second core can poll usage without
/// touching the graph.
pub struct UsageProfiler {
    cycle_source: Option<fn() -> u32>,
    cycles_per_tick: u32,
    /// Cycles consumed by the most recent completed tick.
    last_cycles: AtomicU32,
    /// Worst tick observed since the last reset.
    max_cycles: AtomicU32,
    /// Ticks that fired before the previous walk finished.
    overruns: AtomicU32,
}

impl UsageProfiler {
    pub(crate) const fn new() -> Self {
        UsageProfiler {
            cycle_source: None,
            cycles_per_tick: 0,
            last_cycles: AtomicU32::new(0),
            max_cycles: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
        }
    }

    /// Install a monotonic cycle counter and the cycle budget of one
    /// block period (e.g. `cpu_hz * 128 / 44_100`).
    ///
    /// The counter may wrap; elapsed time is computed with wrapping
    /// subtraction, so any free-running 32-bit counter works.
    pub fn set_cycle_source(&mut self, source: fn() -> u32, cycles_per_tick: u32) {
        self.cycle_source = Some(source);
        self.cycles_per_tick = cycles_per_tick;
    }

    /// CPU usage of the most recent tick, in percent of the block period.
    pub fn cpu_usage(&self) -> f32 {
        self.percent(self.last_cycles.load(Ordering::Relaxed))
    }

    /// Worst-case CPU usage observed since the last
    /// [`reset_cpu_usage_max`](Self::reset_cpu_usage_max), in percent.
    pub fn cpu_usage_max(&self) -> f32 {
        self.percent(self.max_cycles.load(Ordering::Relaxed))
    }

    /// Forget the worst-case measurement.
    pub fn reset_cpu_usage_max(&self) {
        self.max_cycles
            .store(self.last_cycles.load(Ordering::Relaxed), Ordering::Relaxed);
    }

    /// Number of ticks that re-entered the scheduler before the prior
    /// walk finished.
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }

    pub(crate) fn record_overrun(&self) {
        self.overruns.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn begin_tick(&self) -> u32 {
        match self.cycle_source {
            Some(source) => source(),
            None => 0,
        }
    }

    pub(crate) fn end_tick(&self, started: u32) {
        let Some(source) = self.cycle_source else {
            return;
        };
        let elapsed = source().wrapping_sub(started);
        self.last_cycles.store(elapsed, Ordering::Relaxed);
        self.max_cycles.fetch_max(elapsed, Ordering::Relaxed);
    }

    fn percent(&self, cycles: u32) -> f32 {
        if self.cycles_per_tick == 0 {
            return 0.0;
        }
        cycles as f32 * 100.0 / self.cycles_per_tick as f32
    }
}
