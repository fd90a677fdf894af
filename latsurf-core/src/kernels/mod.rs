// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Example kernels.
//!
//! Each kernel is generic over a [`crate::shape::CodeShape`] and produces the
//! same result under every shape.

pub mod levels;
pub mod ring;
pub mod scan;

pub use levels::{find_level, upper_bound, AosBook, Level, LevelBook, LevelHit, SoaBook};
pub use ring::Ring;
pub use scan::{scan, MessageView};
