// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Build-and-measure sweep over the configuration grid.
//!
//! Each variant is a separate release build of `latsurf-bench` with the
//! `LATSURF_*` variables set, in its own target directory so builds never
//! invalidate each other. Variants run one after another; the index at
//! `{output_dir}/sweep.json` is rewritten after every variant.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Instant;

use latsurf_benchmark::reporter::{load_manifest, manifest_path_for};
use latsurf_core::{BuildConfig, KernelKind, SweepPlan};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Package and binary built per variant.
pub const BENCH_PACKAGE: &str = "latsurf-benchmark";
pub const BENCH_BIN: &str = "latsurf-bench";

/// File name of the sweep index inside the output directory.
pub const INDEX_FILE: &str = "sweep.json";

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Build of variant {tag} failed: {stderr}")]
    BuildFailed { tag: String, stderr: String },

    #[error("Built binary missing at {path}")]
    BinaryMissing { path: PathBuf },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize sweep index: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One kernel run in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub kernel: KernelKind,
    pub config: BuildConfig,
    pub tag: String,
    pub csv: PathBuf,
    pub binary_size: u64,
    /// Exit code of the driver; `None` if it was killed by a signal.
    pub exit_code: Option<i32>,
    pub success: bool,
    /// Mean from the run's manifest, when one was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_ns: Option<f64>,
}

/// Contents of `sweep.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepIndex {
    pub batches: u64,
    pub iters_per_batch: u64,
    pub runs: Vec<SweepEntry>,
}

impl SweepIndex {
    pub fn failures(&self) -> usize {
        self.runs.iter().filter(|r| !r.success).count()
    }

    pub fn save(&self, path: &Path) -> Result<(), SweepError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| SweepError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    #[cfg(test)]
    pub fn load(path: &Path) -> Result<Self, SweepError> {
        let text = fs::read_to_string(path).map_err(|source| SweepError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// A build step the sweep will perform.
#[derive(Debug, Clone)]
pub struct PlannedVariant {
    pub config: BuildConfig,
    pub target_dir: PathBuf,
    pub runs: Vec<(KernelKind, PathBuf)>,
}

/// Drives builds and runs for a [`SweepPlan`].
pub struct SweepRunner {
    plan: SweepPlan,
    workspace: PathBuf,
    cargo: PathBuf,
}

impl SweepRunner {
    /// Runner building from the workspace at `workspace`.
    ///
    /// Uses `$CARGO` when set (as it is under `cargo run`), else `cargo`.
    pub fn new(plan: SweepPlan, workspace: impl Into<PathBuf>) -> Self {
        let cargo = std::env::var_os("CARGO")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("cargo"));
        Self {
            plan,
            workspace: workspace.into(),
            cargo,
        }
    }

    /// Use a specific cargo executable.
    pub fn with_cargo(mut self, cargo: impl Into<PathBuf>) -> Self {
        self.cargo = cargo.into();
        self
    }

    /// Target directory for one variant.
    pub fn target_dir(&self, config: &BuildConfig) -> PathBuf {
        self.workspace
            .join("target")
            .join("latsurf")
            .join(config.tag())
    }

    /// Path of the driver binary a variant build produces.
    pub fn binary_path(&self, config: &BuildConfig) -> PathBuf {
        self.target_dir(config)
            .join("release")
            .join(format!("{BENCH_BIN}{}", std::env::consts::EXE_SUFFIX))
    }

    pub fn index_path(&self) -> PathBuf {
        self.plan.output_dir.join(INDEX_FILE)
    }

    /// Everything the sweep would do, without doing it.
    pub fn planned(&self) -> Vec<PlannedVariant> {
        self.plan
            .variants()
            .into_iter()
            .map(|config| PlannedVariant {
                target_dir: self.target_dir(&config),
                runs: self
                    .plan
                    .kernels
                    .iter()
                    .map(|&k| (k, self.plan.csv_path(k, &config)))
                    .collect(),
                config,
            })
            .collect()
    }

    /// The cargo invocation for one variant.
    pub fn build_command(&self, config: &BuildConfig) -> Command {
        let mut cmd = Command::new(&self.cargo);
        cmd.current_dir(&self.workspace)
            .arg("build")
            .arg("--release")
            .arg("-p")
            .arg(BENCH_PACKAGE)
            .arg("--bin")
            .arg(BENCH_BIN)
            .arg("--target-dir")
            .arg(self.target_dir(config))
            .envs(config.env_vars());
        cmd
    }

    /// Build one variant and return its binary path and size.
    pub fn build_variant(&self, config: &BuildConfig) -> Result<(PathBuf, u64), SweepError> {
        let tag = config.tag();
        tracing::info!(variant = %tag, "building");

        let start = Instant::now();
        let output = self.build_command(config).output().map_err(|source| {
            SweepError::Spawn {
                program: self.cargo.display().to_string(),
                source,
            }
        })?;

        if !output.status.success() {
            return Err(SweepError::BuildFailed {
                tag,
                stderr: tail(&output),
            });
        }

        let binary = self.binary_path(config);
        let size = fs::metadata(&binary)
            .map_err(|_| SweepError::BinaryMissing {
                path: binary.clone(),
            })?
            .len();

        tracing::debug!(
            variant = %tag,
            elapsed_ms = start.elapsed().as_millis(),
            binary_size = size,
            "build finished"
        );
        Ok((binary, size))
    }

    /// Run one kernel with a built driver.
    pub fn run_kernel(
        &self,
        binary: &Path,
        kernel: KernelKind,
        csv: &Path,
    ) -> Result<Output, SweepError> {
        tracing::info!(kernel = %kernel, csv = %csv.display(), "running");
        Command::new(binary)
            .arg(kernel.as_str())
            .arg(csv)
            .arg(self.plan.batches.to_string())
            .arg(self.plan.iters_per_batch.to_string())
            .output()
            .map_err(|source| SweepError::Spawn {
                program: binary.display().to_string(),
                source,
            })
    }

    /// Build and run every variant.
    ///
    /// A failed build aborts the sweep. A failed run is recorded in the
    /// index and the sweep moves on.
    pub fn run(&self) -> Result<SweepIndex, SweepError> {
        let out_dir = &self.plan.output_dir;
        fs::create_dir_all(out_dir).map_err(|source| SweepError::Io {
            path: out_dir.clone(),
            source,
        })?;

        let mut index = SweepIndex {
            batches: self.plan.batches,
            iters_per_batch: self.plan.iters_per_batch,
            runs: Vec::with_capacity(self.plan.run_count()),
        };

        for variant in self.planned() {
            let (binary, binary_size) = self.build_variant(&variant.config)?;

            for (kernel, csv) in variant.runs {
                let output = self.run_kernel(&binary, kernel, &csv)?;
                let success = output.status.success();
                if !success {
                    tracing::warn!(
                        kernel = %kernel,
                        variant = %variant.config.tag(),
                        stderr = %tail(&output),
                        "run failed"
                    );
                }

                let mean_ns = load_manifest(manifest_path_for(&csv))
                    .ok()
                    .filter(|_| success)
                    .map(|m| m.summary.mean_ns);

                index.runs.push(SweepEntry {
                    kernel,
                    config: variant.config,
                    tag: variant.config.tag(),
                    csv,
                    binary_size,
                    exit_code: output.status.code(),
                    success,
                    mean_ns,
                });
            }

            index.save(&self.index_path())?;
        }

        Ok(index)
    }
}

/// Last few lines of a process's stderr.
fn tail(output: &Output) -> String {
    const LINES: usize = 20;
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().collect();
    lines[lines.len().saturating_sub(LINES)..].join("\n")
}
