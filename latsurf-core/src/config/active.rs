// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! The configuration this binary was built with.
//!
//! Values come from `build.rs` and are immutable for the process lifetime.
//! [`BuildConfig`] is the value-level record of a configuration, used to
//! attribute sample files to the variant that produced them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HardValidationError;
use crate::kernels::levels;
use crate::types::{AlignBytes, LayoutKind, PrefetchDistance, UnrollFactor};

/// Constants resolved by the build script.
pub mod generated {
    #[allow(unused_imports)]
    use crate::shape::{
        Align128, Align16, Align32, Align64, Aos, Branchy, Flattened, Natural, Shape, Soa,
    };
    use crate::types::LayoutKind;

    include!(concat!(env!("OUT_DIR"), "/build_config.rs"));
}

pub use generated::ActiveShape;

/// Environment variable read by the build script for the unroll factor.
pub const ENV_UNROLL: &str = "LATSURF_UNROLL";
/// Environment variable read by the build script for the prefetch distance.
pub const ENV_PREFETCH: &str = "LATSURF_PREFETCH";
/// Environment variable read by the build script for branch flattening.
pub const ENV_FLATTEN: &str = "LATSURF_FLATTEN";
/// Environment variable read by the build script for the memory layout.
pub const ENV_LAYOUT: &str = "LATSURF_LAYOUT";
/// Environment variable read by the build script for over-alignment.
pub const ENV_ALIGN: &str = "LATSURF_ALIGN";

/// One point in the configuration space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Loop unroll factor (1 = no unrolling).
    pub unroll: usize,
    /// Prefetch distance in elements (0 = disabled).
    pub prefetch: usize,
    /// Branch-flattened selection.
    pub flatten: bool,
    /// Memory layout of the level book.
    pub layout: LayoutKind,
    /// Over-alignment in bytes (0 = natural).
    pub align: usize,
}

impl BuildConfig {
    /// The configuration compiled into this binary.
    pub const ACTIVE: BuildConfig = BuildConfig {
        unroll: generated::UNROLL,
        prefetch: generated::PREFETCH,
        flatten: generated::FLATTEN,
        layout: generated::LAYOUT,
        align: generated::ALIGN,
    };

    /// Defaults for every axis.
    pub const BASELINE: BuildConfig = BuildConfig {
        unroll: 1,
        prefetch: 0,
        flatten: false,
        layout: LayoutKind::Aos,
        align: 0,
    };

    /// Create a validated configuration.
    pub fn new(
        unroll: usize,
        prefetch: usize,
        flatten: bool,
        layout: LayoutKind,
        align: usize,
    ) -> Result<Self, HardValidationError> {
        Ok(Self {
            unroll: UnrollFactor::new(unroll)?.value(),
            prefetch: PrefetchDistance::new(prefetch)?.value(),
            flatten,
            layout,
            align: AlignBytes::new(align)?.value(),
        })
    }

    pub fn is_baseline(&self) -> bool {
        *self == Self::BASELINE
    }

    /// Short variant tag, `u{unroll}_p{prefetch}_b{flatten}_l{aos}_a{align}`.
    pub fn tag(&self) -> String {
        format!(
            "u{}_p{}_b{}_l{}_a{}",
            self.unroll,
            self.prefetch,
            u8::from(self.flatten),
            self.layout.tag_digit(),
            self.align
        )
    }

    /// Environment a build needs to reproduce this configuration.
    pub fn env_vars(&self) -> [(&'static str, String); 5] {
        [
            (ENV_UNROLL, self.unroll.to_string()),
            (ENV_PREFETCH, self.prefetch.to_string()),
            (ENV_FLATTEN, u8::from(self.flatten).to_string()),
            (ENV_LAYOUT, self.layout.as_str().to_string()),
            (ENV_ALIGN, self.align.to_string()),
        ]
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::BASELINE
    }
}

impl fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unroll={} prefetch={} flatten={} layout={} align={}",
            self.unroll, self.prefetch, self.flatten, self.layout, self.align
        )
    }
}

/// Everything a sample file needs to be attributed to its build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRecord {
    pub config: BuildConfig,
    pub tag: String,
    /// True when the sorted-levels kernel is the no-match placeholder.
    pub levels_degraded: bool,
    pub crate_version: String,
}

impl BuildRecord {
    /// Record for the running binary.
    pub fn current() -> Self {
        let config = BuildConfig::ACTIVE;
        Self {
            config,
            tag: config.tag(),
            levels_degraded: levels::DEGRADED,
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::CodeShape;

    #[test]
    fn test_baseline_tag() {
        assert_eq!(BuildConfig::BASELINE.tag(), "u1_p0_b0_l1_a0");
        assert!(BuildConfig::default().is_baseline());
    }

    #[test]
    fn test_tag_encodes_every_axis() {
        let cfg = BuildConfig::new(8, 16, true, LayoutKind::Soa, 64).unwrap();
        assert_eq!(cfg.tag(), "u8_p16_b1_l0_a64");
        assert!(!cfg.is_baseline());
    }

    #[test]
    fn test_new_validates() {
        assert!(BuildConfig::new(0, 0, false, LayoutKind::Aos, 0).is_err());
        assert!(BuildConfig::new(1, 0, false, LayoutKind::Aos, 48).is_err());
        assert!(BuildConfig::new(1, 5000, false, LayoutKind::Aos, 0).is_err());
    }

    #[test]
    fn test_env_vars_round_trip_through_layout_parse() {
        let cfg = BuildConfig::new(2, 8, true, LayoutKind::Soa, 32).unwrap();
        let vars = cfg.env_vars();
        assert_eq!(vars[0], (ENV_UNROLL, "2".to_string()));
        assert_eq!(vars[2], (ENV_FLATTEN, "1".to_string()));
        assert_eq!(vars[3].1.parse::<LayoutKind>().unwrap(), LayoutKind::Soa);
    }

    #[test]
    fn test_active_shape_matches_constants() {
        let active = BuildConfig::ACTIVE;
        assert_eq!(<ActiveShape as CodeShape>::UNROLL, active.unroll);
        assert_eq!(<ActiveShape as CodeShape>::PREFETCH, active.prefetch);
        assert_eq!(
            <<ActiveShape as CodeShape>::Select as crate::shape::Select>::FLATTENED,
            active.flatten
        );
        assert_eq!(
            <<ActiveShape as CodeShape>::Layout as crate::shape::Layout>::KIND,
            active.layout
        );
        assert_eq!(
            <<ActiveShape as CodeShape>::Align as crate::shape::Align>::BYTES,
            active.align
        );
        assert!(BuildConfig::new(
            active.unroll,
            active.prefetch,
            active.flatten,
            active.layout,
            active.align
        )
        .is_ok());
    }

    #[test]
    fn test_build_record_reports_feature_state() {
        let record = BuildRecord::current();
        assert_eq!(record.tag, BuildConfig::ACTIVE.tag());
        assert_eq!(record.levels_degraded, cfg!(not(feature = "levels")));
    }
}
