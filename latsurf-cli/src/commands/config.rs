// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `latsurf config` command - Show the active build configuration.

use std::fmt::Write as _;

use latsurf_core::config::{ENV_ALIGN, ENV_FLATTEN, ENV_LAYOUT, ENV_PREFETCH, ENV_UNROLL};
use latsurf_core::BuildRecord;

pub fn execute(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let record = BuildRecord::current();
    tracing::debug!(variant = %record.tag, "Reporting build configuration");

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", render(&record));
    }
    Ok(())
}

fn render(record: &BuildRecord) -> String {
    let cfg = &record.config;
    let mut out = String::new();
    let _ = writeln!(out, "Build Configuration ({})", record.tag);
    let _ = writeln!(out, "  Unroll:       {:<6} ({ENV_UNROLL})", cfg.unroll);
    let _ = writeln!(out, "  Prefetch:     {:<6} ({ENV_PREFETCH})", cfg.prefetch);
    let _ = writeln!(out, "  Flatten:      {:<6} ({ENV_FLATTEN})", cfg.flatten);
    let _ = writeln!(out, "  Layout:       {:<6} ({ENV_LAYOUT})", cfg.layout.as_str());
    let _ = writeln!(out, "  Align:        {:<6} ({ENV_ALIGN})", cfg.align);
    let _ = writeln!(
        out,
        "  Levels:       {}",
        if record.levels_degraded {
            "placeholder (no-match)"
        } else {
            "enabled"
        }
    );
    let _ = writeln!(out, "  Version:      {}", record.crate_version);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use latsurf_core::BuildConfig;

    #[test]
    fn test_render_lists_every_axis() {
        let record = BuildRecord {
            config: BuildConfig::BASELINE,
            tag: BuildConfig::BASELINE.tag(),
            levels_degraded: true,
            crate_version: "0.1.0".to_string(),
        };
        let text = render(&record);
        assert!(text.starts_with("Build Configuration (u1_p0_b0_l1_a0)"));
        for var in [ENV_UNROLL, ENV_PREFETCH, ENV_FLATTEN, ENV_LAYOUT, ENV_ALIGN] {
            assert!(text.contains(var), "missing {var}");
        }
        assert!(text.contains("aos"));
        assert!(text.contains("placeholder"));
    }
}
