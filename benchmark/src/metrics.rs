// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Summary and provenance records for a measurement run.
//!
//! The sample CSV stays a single column; everything needed to attribute it
//! to a kernel, a build variant and a host lives in the [`RunManifest`].

use chrono::{DateTime, Utc};
use latsurf_core::{BuildRecord, KernelKind};
use serde::{Deserialize, Serialize};
use sysinfo::System;
use uuid::Uuid;

use crate::harness::BatchPlan;

/// Count and mean of a sample sequence, plus its extremes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub count: usize,
    pub mean_ns: f64,
    pub min_ns: u32,
    pub max_ns: u32,
}

impl SampleSummary {
    /// Summarise samples in nanoseconds. An empty slice has mean 0.
    pub fn from_samples(samples: &[u32]) -> Self {
        if samples.is_empty() {
            return Self {
                count: 0,
                mean_ns: 0.0,
                min_ns: 0,
                max_ns: 0,
            };
        }

        let sum: u64 = samples.iter().map(|&s| u64::from(s)).sum();
        Self {
            count: samples.len(),
            mean_ns: sum as f64 / samples.len() as f64,
            min_ns: samples.iter().copied().min().unwrap_or(0),
            max_ns: samples.iter().copied().max().unwrap_or(0),
        }
    }

    /// The one-line stderr summary the driver prints.
    pub fn summary_line(&self) -> String {
        format!("samples={} mean_ns={:.3}", self.count, self.mean_ns)
    }

    /// Format latency in human-readable form (auto-selects ns/μs/ms).
    pub fn format_latency(ns: f64) -> String {
        if ns < 1_000.0 {
            format!("{:.2}ns", ns)
        } else if ns < 1_000_000.0 {
            format!("{:.2}μs", ns / 1_000.0)
        } else if ns < 1_000_000_000.0 {
            format!("{:.2}ms", ns / 1_000_000.0)
        } else {
            format!("{:.2}s", ns / 1_000_000_000.0)
        }
    }
}

/// System information captured at measurement time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version (Linux)
    pub kernel_version: Option<String>,
    /// CPU model name
    pub cpu_model: String,
    /// Number of logical CPUs
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    pub hostname: String,
    pub arch: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().trim().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

/// Provenance of one sample file, written next to it as `<out>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kernel: KernelKind,
    pub build: BuildRecord,
    pub plan: BatchPlan,
    pub warmup_iterations: u64,
    pub summary: SampleSummary,
    /// CPU the measuring thread was pinned to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_cpu: Option<usize>,
    /// Monotonic clock resolution observed before the run.
    pub clock_resolution_ns: u64,
    pub system_info: SystemInfo,
}

impl RunManifest {
    /// Manifest for a run of this binary's active build.
    pub fn new(
        kernel: KernelKind,
        plan: BatchPlan,
        warmup_iterations: u64,
        summary: SampleSummary,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kernel,
            build: BuildRecord::current(),
            plan,
            warmup_iterations,
            summary,
            pinned_cpu: None,
            clock_resolution_ns: 0,
            system_info: SystemInfo::collect(),
        }
    }

    pub fn with_pinned_cpu(mut self, cpu: Option<usize>) -> Self {
        self.pinned_cpu = cpu;
        self
    }

    pub fn with_clock_resolution(mut self, resolution_ns: u64) -> Self {
        self.clock_resolution_ns = resolution_ns;
        self
    }
}
