// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `latsurf validate` command - Validate a sweep plan.

use latsurf_core::SweepPlanLoader;

pub fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating sweep plan");

    match SweepPlanLoader::load_file(file) {
        Ok(plan) => {
            let variants = plan.variants();
            println!("✓ Sweep plan is valid");
            println!();
            println!("Grid:");
            println!("  Kernels:   {}", join(&plan.kernels));
            let unroll: Vec<_> = plan.unroll.iter().map(|u| u.value()).collect();
            let prefetch: Vec<_> = plan.prefetch.iter().map(|p| p.value()).collect();
            let align: Vec<_> = plan.align.iter().map(|a| a.value()).collect();
            println!("  Unroll:    {}", join(&unroll));
            println!("  Prefetch:  {}", join(&prefetch));
            println!("  Flatten:   {}", join(&plan.flatten));
            println!("  Layout:    {}", join(&plan.layout));
            println!("  Align:     {}", join(&align));
            println!();
            println!(
                "Measurement: {} batches x {} iterations per batch",
                plan.batches, plan.iters_per_batch
            );
            println!("Output:      {}", plan.output_dir.display());
            println!();
            println!(
                "Variants ({}), {} runs in total:",
                variants.len(),
                plan.run_count()
            );
            for cfg in &variants {
                let marker = if cfg.is_baseline() { " (baseline)" } else { "" };
                println!("  - {}{}", cfg.tag(), marker);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Sweep plan validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}

fn join<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
