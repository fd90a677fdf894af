// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated configuration values.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by construction.
//! All types validate their invariants at creation time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HardValidationError, SurfaceError};

/// Largest unroll factor accepted for a build.
pub const MAX_UNROLL: usize = 64;
/// Largest prefetch distance (in elements) accepted for a build.
pub const MAX_PREFETCH: usize = 4096;
/// Most timed batches in one run (1 GiB of samples).
pub const MAX_BATCHES: u64 = 1 << 28;
/// Over-alignments with a matching marker type in [`crate::shape::align`].
pub const SUPPORTED_ALIGNMENTS: [usize; 5] = [0, 16, 32, 64, 128];

/// The kernels the driver knows how to measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KernelKind {
    /// Message-field checksum scan.
    Parser,
    /// Power-of-two ring write with release publish.
    Ring,
    /// Sorted price-level lookup.
    OrderBook,
}

impl KernelKind {
    /// Every kernel, in the order sweeps run them.
    pub const ALL: [KernelKind; 3] = [KernelKind::Parser, KernelKind::Ring, KernelKind::OrderBook];

    /// Selector string used on the command line and in file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            KernelKind::Parser => "parser",
            KernelKind::Ring => "ring",
            KernelKind::OrderBook => "obook",
        }
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KernelKind {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parser" => Ok(KernelKind::Parser),
            "ring" => Ok(KernelKind::Ring),
            "obook" => Ok(KernelKind::OrderBook),
            other => Err(SurfaceError::UnknownKernel {
                name: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for KernelKind {
    type Error = SurfaceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KernelKind> for String {
    fn from(kind: KernelKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Memory layout of the level book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Array of structures: one record per level.
    Aos,
    /// Structure of arrays: one vector per field.
    Soa,
}

impl LayoutKind {
    /// Lower-case name used in plans and environment variables.
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutKind::Aos => "aos",
            LayoutKind::Soa => "soa",
        }
    }

    /// The `l` digit of a variant tag: 1 for AoS, 0 for SoA.
    pub fn tag_digit(&self) -> u8 {
        match self {
            LayoutKind::Aos => 1,
            LayoutKind::Soa => 0,
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = HardValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aos" | "1" => Ok(LayoutKind::Aos),
            "soa" | "0" => Ok(LayoutKind::Soa),
            _ => Err(HardValidationError::UnknownLayout {
                value: s.to_string(),
            }),
        }
    }
}

/// Validated loop unroll factor (1..=64).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct UnrollFactor(usize);

impl UnrollFactor {
    /// Create a new UnrollFactor with validation.
    pub fn new(factor: usize) -> Result<Self, HardValidationError> {
        if factor == 0 || factor > MAX_UNROLL {
            return Err(HardValidationError::InvalidFieldValue {
                field: "unroll",
                value: factor.to_string(),
                reason: format!("Must be between 1 and {}", MAX_UNROLL),
            });
        }
        Ok(Self(factor))
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for UnrollFactor {
    type Error = HardValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UnrollFactor> for usize {
    fn from(factor: UnrollFactor) -> Self {
        factor.0
    }
}

/// Validated prefetch distance in elements. Zero disables prefetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PrefetchDistance(usize);

impl PrefetchDistance {
    /// Create a new PrefetchDistance with validation.
    pub fn new(distance: usize) -> Result<Self, HardValidationError> {
        if distance > MAX_PREFETCH {
            return Err(HardValidationError::InvalidFieldValue {
                field: "prefetch",
                value: distance.to_string(),
                reason: format!("Must not exceed {} elements", MAX_PREFETCH),
            });
        }
        Ok(Self(distance))
    }

    pub fn value(&self) -> usize {
        self.0
    }

    pub fn is_enabled(&self) -> bool {
        self.0 != 0
    }
}

impl TryFrom<usize> for PrefetchDistance {
    type Error = HardValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PrefetchDistance> for usize {
    fn from(distance: PrefetchDistance) -> Self {
        distance.0
    }
}

/// Validated over-alignment in bytes. Zero means natural alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct AlignBytes(usize);

impl AlignBytes {
    /// Create a new AlignBytes with validation.
    pub fn new(bytes: usize) -> Result<Self, HardValidationError> {
        if !SUPPORTED_ALIGNMENTS.contains(&bytes) {
            return Err(HardValidationError::UnsupportedAlignment { bytes });
        }
        Ok(Self(bytes))
    }

    pub fn value(&self) -> usize {
        self.0
    }

    pub fn is_natural(&self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<usize> for AlignBytes {
    type Error = HardValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AlignBytes> for usize {
    fn from(bytes: AlignBytes) -> Self {
        bytes.0
    }
}
