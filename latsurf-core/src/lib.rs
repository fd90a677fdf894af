//! Latency Surface Core Library
//!
//! Compile-time code-shape policies and the kernels they specialise.
//! A kernel is written once, generic over a [`shape::CodeShape`], and the
//! build script picks the shape a binary measures ([`config::ActiveShape`]).
//! Every shape yields the same results; only the generated code differs.

pub mod config;
pub mod error;
pub mod kernels;
pub mod shape;
pub mod types;

// Re-export commonly used types
pub use config::{ActiveShape, BuildConfig, BuildRecord, SweepPlan, SweepPlanLoader};
pub use error::{HardValidationError, SurfaceError, SurfaceResult};
pub use kernels::{LevelBook, LevelHit, MessageView, Ring};
pub use shape::{CodeShape, Shape};
pub use types::{
    AlignBytes, KernelKind, LayoutKind, PrefetchDistance, UnrollFactor, MAX_BATCHES,
};
