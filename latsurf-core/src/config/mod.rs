// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Configuration: the build-time code shape and the runtime sweep plan.

mod active;
mod sweep;

pub use active::{
    generated, ActiveShape, BuildConfig, BuildRecord, ENV_ALIGN, ENV_FLATTEN, ENV_LAYOUT,
    ENV_PREFETCH, ENV_UNROLL,
};
pub use sweep::{SweepPlan, SweepPlanLoader};
