// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Measurement driver.
//!
//! Measures one kernel under the code shape this binary was built with and
//! writes the samples as a single-column CSV. The only stdout/stderr output
//! besides logs is the final `samples=<n> mean_ns=<mean>` line on stderr.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use latsurf_benchmark::affinity::pin_current_thread;
use latsurf_benchmark::harness::{batch_too_coarse, estimate_resolution_ns, WARMUP_ITERATIONS};
use latsurf_benchmark::{BenchmarkHarness, RunManifest, SampleReporter, SampleSummary, Workload};
use latsurf_core::{BuildRecord, KernelKind, MAX_BATCHES};

#[derive(Parser)]
#[command(name = "latsurf-bench")]
#[command(version, about = "Measure per-call latency of one kernel under this build's code shape")]
struct Args {
    /// Kernel to measure: parser, ring or obook
    kernel: KernelKind,

    /// Sample CSV to write
    #[arg(default_value = "data/runs/out.csv")]
    out: PathBuf,

    /// Number of timed batches (samples)
    #[arg(default_value_t = 20_000, value_parser = clap::value_parser!(u64).range(1..=MAX_BATCHES))]
    batches: u64,

    /// Kernel calls per batch
    #[arg(default_value_t = 64, value_parser = clap::value_parser!(u64).range(1..))]
    iters: u64,

    /// Untimed calls before the first batch
    #[arg(long, default_value_t = WARMUP_ITERATIONS)]
    warmup: u64,

    /// Pin the measuring thread to this CPU (Linux only)
    #[arg(long, value_name = "CPU")]
    pin_cpu: Option<usize>,

    /// Skip writing `<out>.json`
    #[arg(long)]
    no_manifest: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    if let Some(cpu) = args.pin_cpu {
        pin_current_thread(cpu).with_context(|| format!("pinning to CPU {cpu}"))?;
    }

    let build = BuildRecord::current();
    tracing::info!(
        kernel = %args.kernel,
        variant = %build.tag,
        batches = args.batches,
        iters = args.iters,
        "measuring"
    );
    if args.kernel == KernelKind::OrderBook && build.levels_degraded {
        tracing::warn!("sorted-levels kernel is the placeholder in this build; every lookup misses");
    }

    let resolution_ns = estimate_resolution_ns();
    tracing::debug!(resolution_ns, "clock resolution");

    let harness = BenchmarkHarness::new()
        .warmup(args.warmup)
        .batches(args.batches)
        .iters_per_batch(args.iters);

    // The reporter creates the output directory; fail before measuring if it can't.
    let reporter = SampleReporter::new(&args.out)
        .with_context(|| format!("preparing {}", args.out.display()))?;

    let mut workload = Workload::new(args.kernel);
    let samples = workload.measure(&harness);
    let summary = SampleSummary::from_samples(&samples);

    if batch_too_coarse(summary.mean_ns, args.iters, resolution_ns) {
        tracing::warn!(
            resolution_ns,
            iters = args.iters,
            mean_ns = summary.mean_ns,
            "batches are close to the clock resolution; raise iters"
        );
    }

    reporter.write_samples(&samples)?;
    if !args.no_manifest {
        let manifest = RunManifest::new(args.kernel, harness.plan(), args.warmup, summary)
            .with_pinned_cpu(args.pin_cpu)
            .with_clock_resolution(resolution_ns);
        let path = reporter.write_manifest(&manifest)?;
        tracing::debug!(path = %path.display(), run_id = %manifest.run_id, "wrote manifest");
    }

    tracing::info!(
        mean = %SampleSummary::format_latency(summary.mean_ns),
        min_ns = summary.min_ns,
        max_ns = summary.max_ns,
        "done"
    );
    eprintln!("{}", summary.summary_line());
    Ok(())
}
