// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Resolves the code-shape configuration of this build.
//!
//! Reads the `LATSURF_*` environment variables, validates them and writes
//! `$OUT_DIR/build_config.rs`, which `src/config/active.rs` includes. An
//! invalid value fails the build.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const UNROLL: &str = "LATSURF_UNROLL";
const PREFETCH: &str = "LATSURF_PREFETCH";
const FLATTEN: &str = "LATSURF_FLATTEN";
const LAYOUT: &str = "LATSURF_LAYOUT";
const ALIGN: &str = "LATSURF_ALIGN";

fn read_usize(key: &str, default: usize, max: usize) -> Result<usize, String> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };
    let value: usize = raw
        .trim()
        .parse()
        .map_err(|_| format!("{key}={raw:?} is not a non-negative integer"))?;
    if value > max {
        return Err(format!("{key}={value} exceeds the maximum of {max}"));
    }
    Ok(value)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=build.rs");
    for key in [UNROLL, PREFETCH, FLATTEN, LAYOUT, ALIGN] {
        println!("cargo:rerun-if-env-changed={key}");
    }

    let unroll = read_usize(UNROLL, 1, 64)?;
    if unroll == 0 {
        return Err(format!("{UNROLL} must be at least 1").into());
    }

    let prefetch = read_usize(PREFETCH, 0, 4096)?;

    let flatten = match env::var(FLATTEN).as_deref().map(str::trim) {
        Err(_) | Ok("") | Ok("0") | Ok("false") => false,
        Ok("1") | Ok("true") => true,
        Ok(other) => return Err(format!("{FLATTEN}={other:?} must be 0/1 or false/true").into()),
    };

    let aos = match env::var(LAYOUT)
        .map(|v| v.trim().to_ascii_lowercase())
        .as_deref()
    {
        Err(_) | Ok("") | Ok("aos") | Ok("1") => true,
        Ok("soa") | Ok("0") => false,
        Ok(other) => return Err(format!("{LAYOUT}={other:?} must be aos or soa").into()),
    };

    let align = read_usize(ALIGN, 0, 128)?;
    let align_type = match align {
        0 => "Natural",
        16 => "Align16",
        32 => "Align32",
        64 => "Align64",
        128 => "Align128",
        other => {
            return Err(format!("{ALIGN}={other} must be one of 0, 16, 32, 64, 128").into())
        }
    };

    let mut out = String::new();
    writeln!(out, "// Generated by latsurf-core/build.rs. Do not edit.")?;
    writeln!(out, "pub const UNROLL: usize = {unroll};")?;
    writeln!(out, "pub const PREFETCH: usize = {prefetch};")?;
    writeln!(out, "pub const FLATTEN: bool = {flatten};")?;
    writeln!(
        out,
        "pub const LAYOUT: LayoutKind = LayoutKind::{};",
        if aos { "Aos" } else { "Soa" }
    )?;
    writeln!(out, "pub const ALIGN: usize = {align};")?;
    writeln!(
        out,
        "pub type ActiveShape = Shape<{unroll}, {prefetch}, {}, {}, {align_type}>;",
        if flatten { "Flattened" } else { "Branchy" },
        if aos { "Aos" } else { "Soa" },
    )?;

    let out_dir = env::var("OUT_DIR")?;
    fs::write(Path::new(&out_dir).join("build_config.rs"), out)?;

    Ok(())
}
