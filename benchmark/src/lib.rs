// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Latency Surface Benchmarking
//!
//! Times kernels compiled under one code shape and records the result.
//!
//! # Pieces
//!
//! - **Harness**: warm-up, then fenced batches timed on the monotonic clock
//! - **Metrics**: sample summary and the run manifest
//! - **Reporter**: single-column `ns` CSV plus a JSON manifest beside it
//! - **Workloads**: the fixed per-kernel inputs the driver measures

pub mod affinity;
pub mod harness;
pub mod metrics;
pub mod reporter;
pub mod workload;

pub use harness::{measure, BatchPlan, BenchmarkHarness, Clock, MonotonicClock};
pub use metrics::{RunManifest, SampleSummary, SystemInfo};
pub use reporter::{ReporterError, SampleReporter};
pub use workload::Workload;
