// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `latsurf sweep` command - Build and measure every variant of a plan.

use std::path::Path;

use latsurf_core::{SweepPlan, SweepPlanLoader};

use crate::sweep::SweepRunner;

pub fn execute(
    plan_path: Option<&str>,
    workspace: &Path,
    cargo: Option<&Path>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let plan = match plan_path {
        Some(path) => SweepPlanLoader::load_file(path)?,
        None => SweepPlan::default(),
    };

    tracing::info!(
        variants = plan.variants().len(),
        runs = plan.run_count(),
        output = %plan.output_dir.display(),
        "Sweep plan loaded"
    );

    let mut runner = SweepRunner::new(plan, workspace);
    if let Some(cargo) = cargo {
        runner = runner.with_cargo(cargo);
    }

    if dry_run {
        for variant in runner.planned() {
            println!(
                "build {} -> {}",
                variant.config.tag(),
                runner.binary_path(&variant.config).display()
            );
            println!("  target-dir {}", variant.target_dir.display());
            for (kernel, csv) in &variant.runs {
                println!("  run {} -> {}", kernel, csv.display());
            }
        }
        return Ok(());
    }

    let index = runner.run()?;
    let failures = index.failures();

    println!(
        "Sweep finished: {} runs, {} failed. Index: {}",
        index.runs.len(),
        failures,
        runner.index_path().display()
    );

    if failures > 0 {
        return Err(format!("{failures} kernel runs failed").into());
    }
    Ok(())
}
