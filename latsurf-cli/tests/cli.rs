// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! End-to-end tests of the `latsurf` binary.

use std::fs;
use std::process::Command;

use latsurf_core::BuildConfig;
use tempfile::TempDir;

fn latsurf() -> Command {
    Command::new(env!("CARGO_BIN_EXE_latsurf"))
}

#[test]
fn test_config_json_is_active_build() {
    let output = latsurf().args(["config", "--json"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["tag"], BuildConfig::ACTIVE.tag());
    assert_eq!(value["config"]["unroll"], BuildConfig::ACTIVE.unroll);
}

#[test]
fn test_validate_accepts_good_plan() {
    let temp_dir = TempDir::new().unwrap();
    let plan = temp_dir.path().join("plan.yaml");
    fs::write(&plan, "kernels: [parser]\nunroll: [1, 2]\nprefetch: [0]\n").unwrap();

    let output = latsurf().arg("validate").arg(&plan).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("u1_p0_b0_l1_a0 (baseline)"), "{stdout}");
}

#[test]
fn test_validate_rejects_bad_plan() {
    let temp_dir = TempDir::new().unwrap();
    let plan = temp_dir.path().join("plan.yaml");
    fs::write(&plan, "unroll: [0]\n").unwrap();

    let output = latsurf().arg("validate").arg(&plan).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("validation failed"));

    let missing = latsurf()
        .arg("validate")
        .arg(temp_dir.path().join("missing.yaml"))
        .output()
        .unwrap();
    assert!(!missing.status.success());
}

#[test]
fn test_sweep_dry_run_lists_builds_and_runs() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("runs");
    let plan = temp_dir.path().join("plan.yaml");
    fs::write(
        &plan,
        format!(
            "kernels: [parser, obook]\nunroll: [4]\nprefetch: [8]\nflatten: [true]\n\
             layout: [aos]\nalign: [64]\noutput_dir: {}\n",
            out.display()
        ),
    )
    .unwrap();

    let output = latsurf()
        .args(["sweep", "--dry-run", "--plan"])
        .arg(&plan)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().filter(|l| l.starts_with("build ")).count(), 2);
    assert!(stdout.contains("parser_base.csv"));
    assert!(stdout.contains("obook_u4_p8_b1_l1_a64.csv"));
    let target_dirs: Vec<&str> = stdout
        .lines()
        .filter_map(|l| l.trim().strip_prefix("target-dir "))
        .collect();
    assert_eq!(target_dirs.len(), 2);
    assert!(target_dirs[0].ends_with(&BuildConfig::BASELINE.tag()));
    assert!(target_dirs[1].ends_with("u4_p8_b1_l1_a64"));
    // A dry run touches nothing.
    assert!(!out.exists());
}

#[test]
fn test_sweep_uses_given_cargo() {
    let temp_dir = TempDir::new().unwrap();
    let plan = temp_dir.path().join("plan.yaml");
    fs::write(
        &plan,
        format!(
            "kernels: [parser]\nunroll: [1]\nprefetch: [0]\noutput_dir: {}\n",
            temp_dir.path().join("runs").display()
        ),
    )
    .unwrap();

    let output = latsurf()
        .args(["sweep", "--plan"])
        .arg(&plan)
        .arg("--workspace")
        .arg(temp_dir.path())
        .arg("--cargo")
        .arg(temp_dir.path().join("no-such-cargo"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no-such-cargo"), "stderr: {stderr}");
}
