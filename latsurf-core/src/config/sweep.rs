// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML sweep plan parser with strict validation.
//!
//! A sweep plan lists the values to try on every configuration axis. Each
//! point of the cartesian product is compiled as its own binary and measured
//! on every listed kernel. Any invalid field is a HardValidationError.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::BuildConfig;
use crate::error::{HardValidationError, SurfaceError, SurfaceResult};
use crate::types::{
    AlignBytes, KernelKind, LayoutKind, PrefetchDistance, UnrollFactor, MAX_BATCHES,
};

/// Raw plan as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSweepPlan {
    #[serde(default = "default_kernels")]
    kernels: Vec<String>,
    #[serde(default = "default_unroll")]
    unroll: Vec<usize>,
    #[serde(default = "default_prefetch")]
    prefetch: Vec<usize>,
    #[serde(default = "default_flatten")]
    flatten: Vec<bool>,
    #[serde(default = "default_layout")]
    layout: Vec<String>,
    #[serde(default = "default_align")]
    align: Vec<usize>,
    #[serde(default = "default_batches")]
    batches: u64,
    #[serde(default = "default_iters_per_batch")]
    iters_per_batch: u64,
    #[serde(default = "default_output_dir")]
    output_dir: String,
}

fn default_kernels() -> Vec<String> {
    KernelKind::ALL.iter().map(|k| k.as_str().to_string()).collect()
}

fn default_unroll() -> Vec<usize> {
    vec![1, 2, 4, 8]
}

fn default_prefetch() -> Vec<usize> {
    vec![0, 8, 16]
}

fn default_flatten() -> Vec<bool> {
    vec![false, true]
}

fn default_layout() -> Vec<String> {
    vec!["aos".to_string(), "soa".to_string()]
}

fn default_align() -> Vec<usize> {
    vec![0, 64]
}

fn default_batches() -> u64 {
    20_000
}

fn default_iters_per_batch() -> u64 {
    64
}

fn default_output_dir() -> String {
    "data/runs".to_string()
}

impl Default for RawSweepPlan {
    fn default() -> Self {
        Self {
            kernels: default_kernels(),
            unroll: default_unroll(),
            prefetch: default_prefetch(),
            flatten: default_flatten(),
            layout: default_layout(),
            align: default_align(),
            batches: default_batches(),
            iters_per_batch: default_iters_per_batch(),
            output_dir: default_output_dir(),
        }
    }
}

/// Validated sweep plan.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub kernels: Vec<KernelKind>,
    pub unroll: Vec<UnrollFactor>,
    pub prefetch: Vec<PrefetchDistance>,
    pub flatten: Vec<bool>,
    pub layout: Vec<LayoutKind>,
    pub align: Vec<AlignBytes>,
    pub batches: u64,
    pub iters_per_batch: u64,
    pub output_dir: PathBuf,
}

impl Default for SweepPlan {
    fn default() -> Self {
        // The defaults are valid by construction.
        match SweepPlanLoader::validate(RawSweepPlan::default()) {
            Ok(plan) => plan,
            Err(e) => unreachable!("default sweep plan is invalid: {e}"),
        }
    }
}

impl SweepPlan {
    /// Every configuration in the plan, baseline first, without duplicates.
    ///
    /// The baseline is always included so every sweep has a reference point.
    pub fn variants(&self) -> Vec<BuildConfig> {
        let mut seen = HashSet::new();
        let mut variants = vec![BuildConfig::BASELINE];
        seen.insert(BuildConfig::BASELINE);

        for u in &self.unroll {
            for pf in &self.prefetch {
                for &bf in &self.flatten {
                    for &la in &self.layout {
                        for al in &self.align {
                            let cfg = BuildConfig {
                                unroll: u.value(),
                                prefetch: pf.value(),
                                flatten: bf,
                                layout: la,
                                align: al.value(),
                            };
                            if seen.insert(cfg) {
                                variants.push(cfg);
                            }
                        }
                    }
                }
            }
        }

        variants
    }

    /// Number of kernel runs the plan will perform.
    pub fn run_count(&self) -> usize {
        self.variants().len() * self.kernels.len()
    }

    /// CSV path for one kernel run; the baseline gets the `_base` suffix.
    pub fn csv_path(&self, kernel: KernelKind, config: &BuildConfig) -> PathBuf {
        let suffix = if config.is_baseline() {
            "base".to_string()
        } else {
            config.tag()
        };
        self.output_dir.join(format!("{}_{}.csv", kernel, suffix))
    }
}

/// Sweep plan loader with strict validation.
pub struct SweepPlanLoader;

impl SweepPlanLoader {
    /// Load and validate a plan from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> SurfaceResult<SweepPlan> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SurfaceError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SurfaceError::Io {
            context: "reading sweep plan",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate a plan from a YAML string.
    pub fn load_string(content: &str) -> SurfaceResult<SweepPlan> {
        let raw: RawSweepPlan =
            serde_yaml::from_str(content).map_err(|e| SurfaceError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    fn validate(raw: RawSweepPlan) -> SurfaceResult<SweepPlan> {
        let kernels = raw
            .kernels
            .iter()
            .map(|k| k.parse::<KernelKind>())
            .collect::<Result<Vec<_>, _>>()?;
        let kernels = non_empty("kernels", dedup(kernels))?;

        let unroll = raw
            .unroll
            .into_iter()
            .map(UnrollFactor::new)
            .collect::<Result<Vec<_>, _>>()?;
        let prefetch = raw
            .prefetch
            .into_iter()
            .map(PrefetchDistance::new)
            .collect::<Result<Vec<_>, _>>()?;
        let layout = raw
            .layout
            .iter()
            .map(|l| l.parse::<LayoutKind>())
            .collect::<Result<Vec<_>, _>>()?;
        let align = raw
            .align
            .into_iter()
            .map(AlignBytes::new)
            .collect::<Result<Vec<_>, _>>()?;

        if raw.batches == 0 || raw.batches > MAX_BATCHES {
            return Err(HardValidationError::InvalidFieldValue {
                field: "batches",
                value: raw.batches.to_string(),
                reason: format!("Must be between 1 and {}", MAX_BATCHES),
            }
            .into());
        }

        if raw.iters_per_batch == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "iters_per_batch",
                value: "0".to_string(),
                reason: "Must be a positive integer".to_string(),
            }
            .into());
        }

        if raw.output_dir.trim().is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "output_dir",
                value: raw.output_dir,
                reason: "Output directory cannot be empty".to_string(),
            }
            .into());
        }

        let plan = SweepPlan {
            kernels,
            unroll: non_empty("unroll", dedup(unroll))?,
            prefetch: non_empty("prefetch", dedup(prefetch))?,
            flatten: non_empty("flatten", dedup(raw.flatten))?,
            layout: non_empty("layout", dedup(layout))?,
            align: non_empty("align", dedup(align))?,
            batches: raw.batches,
            iters_per_batch: raw.iters_per_batch,
            output_dir: PathBuf::from(raw.output_dir),
        };

        tracing::debug!(
            variants = plan.variants().len(),
            kernels = plan.kernels.len(),
            "Sweep plan validated"
        );

        Ok(plan)
    }
}

/// Drop repeated values, keeping first occurrences in order.
fn dedup<T: PartialEq>(values: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(values.len());
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

fn non_empty<T>(field: &'static str, values: Vec<T>) -> Result<Vec<T>, HardValidationError> {
    if values.is_empty() {
        return Err(HardValidationError::EmptyAxis { field });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_PLAN: &str = r#"
kernels: [obook, parser]
unroll: [1, 4]
prefetch: [0]
flatten: [false, true]
layout: [aos]
align: [0]
batches: 500
iters_per_batch: 16
output_dir: /tmp/latsurf-runs
"#;

    #[test]
    fn test_valid_plan() {
        let plan = SweepPlanLoader::load_string(SMALL_PLAN).unwrap();
        assert_eq!(plan.kernels, vec![KernelKind::OrderBook, KernelKind::Parser]);
        assert_eq!(plan.batches, 500);
        assert_eq!(plan.iters_per_batch, 16);
        assert_eq!(plan.variants().len(), 4);
        assert_eq!(plan.run_count(), 8);
    }

    #[test]
    fn test_defaults_applied() {
        let plan = SweepPlanLoader::load_string("{}").unwrap();
        assert_eq!(plan.kernels.len(), 3);
        assert_eq!(plan.batches, 20_000);
        assert_eq!(plan.iters_per_batch, 64);
        assert_eq!(plan.output_dir, PathBuf::from("data/runs"));
        // 4 unroll * 3 prefetch * 2 flatten * 2 layout * 2 align
        assert_eq!(plan.variants().len(), 96);
    }

    #[test]
    fn test_baseline_first_and_unique() {
        let plan = SweepPlanLoader::load_string(SMALL_PLAN).unwrap();
        let variants = plan.variants();
        assert!(variants[0].is_baseline());
        let unique: HashSet<_> = variants.iter().collect();
        assert_eq!(unique.len(), variants.len());
    }

    #[test]
    fn test_baseline_added_when_not_in_grid() {
        let yaml = "unroll: [8]\nprefetch: [16]\nflatten: [true]\nlayout: [soa]\nalign: [64]\n";
        let plan = SweepPlanLoader::load_string(yaml).unwrap();
        let variants = plan.variants();
        assert_eq!(variants.len(), 2);
        assert!(variants[0].is_baseline());
        assert_eq!(variants[1].tag(), "u8_p16_b1_l0_a64");
    }

    #[test]
    fn test_csv_paths() {
        let plan = SweepPlanLoader::load_string(SMALL_PLAN).unwrap();
        let base = plan.csv_path(KernelKind::Ring, &BuildConfig::BASELINE);
        assert_eq!(base, PathBuf::from("/tmp/latsurf-runs/ring_base.csv"));
        let cfg = BuildConfig::new(4, 0, true, LayoutKind::Aos, 0).unwrap();
        assert_eq!(
            plan.csv_path(KernelKind::OrderBook, &cfg),
            PathBuf::from("/tmp/latsurf-runs/obook_u4_p0_b1_l1_a0.csv")
        );
    }

    #[test]
    fn test_unknown_kernel_rejected() {
        let result = SweepPlanLoader::load_string("kernels: [parser, btree]\n");
        assert!(matches!(result, Err(SurfaceError::UnknownKernel { .. })));
    }

    #[test]
    fn test_invalid_alignment_rejected() {
        let result = SweepPlanLoader::load_string("align: [0, 48]\n");
        assert!(matches!(
            result,
            Err(SurfaceError::HardValidation(
                HardValidationError::UnsupportedAlignment { bytes: 48 }
            ))
        ));
    }

    #[test]
    fn test_empty_axis_rejected() {
        let result = SweepPlanLoader::load_string("unroll: []\n");
        assert!(matches!(
            result,
            Err(SurfaceError::HardValidation(HardValidationError::EmptyAxis {
                field: "unroll"
            }))
        ));
    }

    #[test]
    fn test_zero_batches_rejected() {
        assert!(SweepPlanLoader::load_string("batches: 0\n").is_err());
        assert!(SweepPlanLoader::load_string("iters_per_batch: 0\n").is_err());
    }

    #[test]
    fn test_batches_above_cap_rejected() {
        let at_cap = format!("batches: {}\n", MAX_BATCHES);
        assert_eq!(SweepPlanLoader::load_string(&at_cap).unwrap().batches, MAX_BATCHES);
        let over = format!("batches: {}\n", MAX_BATCHES + 1);
        assert!(SweepPlanLoader::load_string(&over).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = SweepPlanLoader::load_string("unrol: [1]\n");
        assert!(matches!(result, Err(SurfaceError::ConfigParse { .. })));
    }

    #[test]
    fn test_duplicates_collapsed() {
        let plan = SweepPlanLoader::load_string("unroll: [2, 2, 4]\nkernels: [ring, ring]\n").unwrap();
        assert_eq!(plan.unroll.len(), 2);
        assert_eq!(plan.kernels, vec![KernelKind::Ring]);
    }

    #[test]
    fn test_missing_file() {
        let result = SweepPlanLoader::load_file("/definitely/not/here.yaml");
        assert!(matches!(result, Err(SurfaceError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("plan.yaml");
        std::fs::write(&path, SMALL_PLAN).unwrap();
        let plan = SweepPlanLoader::load_file(&path).unwrap();
        assert_eq!(plan.kernels.len(), 2);
    }
}
