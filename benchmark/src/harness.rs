// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Batched timing harness.
//!
//! A measurement is a warm-up phase followed by `batches` timed batches of
//! `iters_per_batch` back-to-back calls. Each batch yields one sample: the
//! elapsed monotonic time divided by the iteration count, in nanoseconds.
//! Timestamps are fenced so the compiler cannot move kernel work across them.

use std::sync::atomic::{compiler_fence, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use latsurf_core::MAX_BATCHES;
use serde::{Deserialize, Serialize};

/// Calls made before the first timed batch.
pub const WARMUP_ITERATIONS: u64 = 100_000;

/// A batch should exceed the clock resolution by at least this factor.
pub const RESOLUTION_HEADROOM: u64 = 10;

/// Source of monotonic nanosecond timestamps.
pub trait Clock {
    fn now_ns(&self) -> u64;
}

/// `std::time::Instant` measured against a process-wide anchor.
///
/// On Linux this is `CLOCK_MONOTONIC`; elsewhere the platform's
/// high-resolution monotonic counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

fn anchor() -> Instant {
    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    *ANCHOR.get_or_init(Instant::now)
}

impl Clock for MonotonicClock {
    #[inline(always)]
    fn now_ns(&self) -> u64 {
        anchor().elapsed().as_nanos() as u64
    }
}

/// Shape of a measurement: how many samples, and calls per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPlan {
    pub batches: u64,
    pub iters_per_batch: u64,
}

impl BatchPlan {
    /// Create a plan. An iteration count of zero is treated as one, and
    /// `batches` is capped at [`MAX_BATCHES`].
    pub fn new(batches: u64, iters_per_batch: u64) -> Self {
        Self {
            batches: batches.min(MAX_BATCHES),
            iters_per_batch: iters_per_batch.max(1),
        }
    }

    /// Total timed calls.
    pub fn total_calls(&self) -> u64 {
        self.batches.saturating_mul(self.iters_per_batch)
    }
}

impl Default for BatchPlan {
    fn default() -> Self {
        Self::new(20_000, 64)
    }
}

/// A benchmark harness for measuring per-call latency.
#[derive(Debug, Clone)]
pub struct BenchmarkHarness {
    warmup_iterations: u64,
    plan: BatchPlan,
}

impl BenchmarkHarness {
    /// Create a harness with the default warm-up and batch plan.
    pub fn new() -> Self {
        Self {
            warmup_iterations: WARMUP_ITERATIONS,
            plan: BatchPlan::default(),
        }
    }

    /// Set the number of warm-up calls.
    pub fn warmup(mut self, iterations: u64) -> Self {
        self.warmup_iterations = iterations;
        self
    }

    /// Set the number of timed batches (samples), capped at [`MAX_BATCHES`].
    pub fn batches(mut self, batches: u64) -> Self {
        self.plan.batches = batches.min(MAX_BATCHES);
        self
    }

    /// Set the calls per batch. Zero is treated as one.
    pub fn iters_per_batch(mut self, iters: u64) -> Self {
        self.plan.iters_per_batch = iters.max(1);
        self
    }

    /// Replace the whole batch plan.
    pub fn with_plan(mut self, plan: BatchPlan) -> Self {
        self.plan = BatchPlan::new(plan.batches, plan.iters_per_batch);
        self
    }

    pub fn plan(&self) -> BatchPlan {
        self.plan
    }

    pub fn warmup_iterations(&self) -> u64 {
        self.warmup_iterations
    }

    /// Run against the monotonic clock.
    pub fn run<F>(&self, unit: F) -> Vec<u32>
    where
        F: FnMut(),
    {
        self.run_with_clock(&MonotonicClock, unit)
    }

    /// Run against an arbitrary clock.
    ///
    /// Returns exactly `batches` samples. The warm-up runs even when no
    /// batches are requested.
    pub fn run_with_clock<C, F>(&self, clock: &C, mut unit: F) -> Vec<u32>
    where
        C: Clock,
        F: FnMut(),
    {
        let BatchPlan {
            batches,
            iters_per_batch,
        } = self.plan;
        let iters = iters_per_batch.max(1);

        // Sample storage is allocated before timing starts. The cap keeps the
        // count within `usize` on 32-bit targets.
        let batches = batches.min(MAX_BATCHES);
        let mut samples = Vec::with_capacity(batches as usize);

        for _ in 0..self.warmup_iterations {
            unit();
        }

        for _ in 0..batches {
            compiler_fence(Ordering::SeqCst);
            let start = clock.now_ns();
            compiler_fence(Ordering::SeqCst);

            for _ in 0..iters {
                unit();
            }

            compiler_fence(Ordering::SeqCst);
            let end = clock.now_ns();
            compiler_fence(Ordering::SeqCst);

            samples.push(per_call_ns(end.saturating_sub(start), iters));
        }

        tracing::debug!(
            batches,
            iters,
            warmup = self.warmup_iterations,
            "measurement finished"
        );
        samples
    }
}

impl Default for BenchmarkHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(always)]
fn per_call_ns(elapsed_ns: u64, iters: u64) -> u32 {
    u32::try_from(elapsed_ns / iters).unwrap_or(u32::MAX)
}

/// Measure `unit` with the default warm-up.
///
/// Produces `batch_count` samples, each the average per-call time in
/// nanoseconds over `iters_per_batch` consecutive calls.
pub fn measure<F>(unit: F, batch_count: u64, iters_per_batch: u64) -> Vec<u32>
where
    F: FnMut(),
{
    BenchmarkHarness::new()
        .batches(batch_count)
        .iters_per_batch(iters_per_batch)
        .run(unit)
}

/// Smallest non-zero tick observed on `clock` over `rounds` attempts.
///
/// Returns 0 if the clock never advanced.
pub fn resolution_of<C: Clock>(clock: &C, rounds: u32) -> u64 {
    const MAX_SPINS: u32 = 1_000_000;
    let mut best = u64::MAX;
    for _ in 0..rounds {
        let t0 = clock.now_ns();
        let mut t1 = clock.now_ns();
        let mut spins = 0;
        while t1 == t0 && spins < MAX_SPINS {
            t1 = clock.now_ns();
            spins += 1;
        }
        if t1 > t0 {
            best = best.min(t1 - t0);
        }
    }
    if best == u64::MAX {
        0
    } else {
        best
    }
}

/// Resolution of the monotonic clock in nanoseconds.
pub fn estimate_resolution_ns() -> u64 {
    resolution_of(&MonotonicClock, 64)
}

/// True when a batch of `iters` calls at `mean_ns` each is too short to
/// rise clearly above a clock of `resolution_ns`.
pub fn batch_too_coarse(mean_ns: f64, iters: u64, resolution_ns: u64) -> bool {
    let batch_ns = mean_ns * iters.max(1) as f64;
    batch_ns < (resolution_ns.saturating_mul(RESOLUTION_HEADROOM)) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    /// Clock driven by the unit under test.
    #[derive(Clone, Default)]
    struct ManualClock(Rc<Cell<u64>>);

    impl ManualClock {
        fn advance(&self, ns: u64) {
            self.0.set(self.0.get().saturating_add(ns));
        }
    }

    impl Clock for ManualClock {
        fn now_ns(&self) -> u64 {
            self.0.get()
        }
    }

    /// Clock that moves a fixed step every time it is read.
    struct SteppingClock {
        now: Cell<u64>,
        step: u64,
    }

    impl Clock for SteppingClock {
        fn now_ns(&self) -> u64 {
            let t = self.now.get();
            self.now.set(t + self.step);
            t
        }
    }

    #[test]
    fn test_zero_batches_still_warms_up() {
        let mut calls = 0u64;
        let samples = BenchmarkHarness::new()
            .warmup(25)
            .batches(0)
            .iters_per_batch(8)
            .run(|| calls += 1);
        assert!(samples.is_empty());
        assert_eq!(calls, 25);
    }

    #[test]
    fn test_zero_iters_behaves_as_one() {
        let mut calls = 0u64;
        let harness = BenchmarkHarness::new().warmup(3).batches(10).iters_per_batch(0);
        assert_eq!(harness.plan().iters_per_batch, 1);

        let samples = harness.run(|| calls += 1);
        assert_eq!(samples.len(), 10);
        assert_eq!(calls, 3 + 10);
    }

    #[test]
    fn test_one_sample_per_batch() {
        let mut calls = 0u64;
        let samples = BenchmarkHarness::new()
            .warmup(0)
            .batches(37)
            .iters_per_batch(5)
            .run(|| calls += 1);
        assert_eq!(samples.len(), 37);
        assert_eq!(calls, 37 * 5);
    }

    #[test]
    fn test_sample_is_per_call_average() {
        let clock = ManualClock::default();
        let ticker = clock.clone();
        let samples = BenchmarkHarness::new()
            .warmup(10)
            .batches(4)
            .iters_per_batch(16)
            .run_with_clock(&clock, || ticker.advance(7));
        assert_eq!(samples, vec![7; 4]);
    }

    #[test]
    fn test_integer_division_truncates() {
        // Two reads per batch, 100ns apart, over 3 calls.
        let clock = SteppingClock {
            now: Cell::new(0),
            step: 100,
        };
        let samples = BenchmarkHarness::new()
            .warmup(0)
            .batches(2)
            .iters_per_batch(3)
            .run_with_clock(&clock, || {});
        assert_eq!(samples, vec![33, 33]);
    }

    #[test]
    fn test_long_batches_saturate() {
        let clock = ManualClock::default();
        let ticker = clock.clone();
        let samples = BenchmarkHarness::new()
            .warmup(0)
            .batches(1)
            .iters_per_batch(1)
            .run_with_clock(&clock, || ticker.advance(u64::from(u32::MAX) + 10));
        assert_eq!(samples, vec![u32::MAX]);
    }

    #[test]
    fn test_busy_wait_mean_tracks_wait() {
        let wait = Duration::from_micros(20);
        let samples = BenchmarkHarness::new()
            .warmup(5)
            .batches(50)
            .iters_per_batch(4)
            .run(|| {
                let start = Instant::now();
                while start.elapsed() < wait {
                    std::hint::spin_loop();
                }
            });

        let mean = samples.iter().map(|&s| s as f64).sum::<f64>() / samples.len() as f64;
        assert!(mean >= 20_000.0, "mean {} below the wait", mean);
        assert!(mean < 2_000_000.0, "mean {} far above the wait", mean);
    }

    #[test]
    fn test_measure_returns_batch_count_samples() {
        let mut acc = 0u64;
        let samples = measure(|| acc = std::hint::black_box(acc.wrapping_add(1)), 12, 64);
        assert_eq!(samples.len(), 12);
        assert_eq!(acc, WARMUP_ITERATIONS + 12 * 64);
    }

    #[test]
    fn test_repeated_measure_has_stable_length() {
        let unit = || {
            std::hint::black_box(17u64.rotate_left(3));
        };
        let first = measure(unit, 40, 8);
        let second = measure(unit, 40, 8);
        assert_eq!(first.len(), second.len());
        assert_eq!(first.len(), 40);
    }

    #[test]
    fn test_batches_capped() {
        let harness = BenchmarkHarness::new().batches(u64::MAX);
        assert_eq!(harness.plan().batches, MAX_BATCHES);
        assert_eq!(BatchPlan::new(MAX_BATCHES + 1, 4).batches, MAX_BATCHES);
        assert_eq!(BatchPlan::new(MAX_BATCHES, 4).batches, MAX_BATCHES);

        let plan = BatchPlan::new(u64::MAX, 1);
        let harness = BenchmarkHarness::new().with_plan(plan);
        assert_eq!(harness.plan().batches, MAX_BATCHES);
    }

    #[test]
    fn test_monotonic_clock_never_goes_back() {
        let clock = MonotonicClock;
        let mut last = clock.now_ns();
        for _ in 0..10_000 {
            let now = clock.now_ns();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn test_resolution_of_stepping_clock() {
        let clock = SteppingClock {
            now: Cell::new(0),
            step: 40,
        };
        assert_eq!(resolution_of(&clock, 8), 40);
        assert!(estimate_resolution_ns() > 0);
    }

    #[test]
    fn test_batch_too_coarse() {
        assert!(batch_too_coarse(2.0, 1, 30));
        assert!(!batch_too_coarse(2.0, 256, 30));
        assert!(!batch_too_coarse(5.0, 64, 0));
    }

    #[test]
    fn test_plan_clamps_and_counts() {
        let plan = BatchPlan::new(100, 0);
        assert_eq!(plan.iters_per_batch, 1);
        assert_eq!(plan.total_calls(), 100);
        assert_eq!(BatchPlan::default(), BatchPlan::new(20_000, 64));
    }
}
