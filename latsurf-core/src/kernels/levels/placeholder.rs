// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Stand-in lookup for builds without the `levels` feature.
//!
//! Same signatures as the real kernel, but every call reports
//! [`LevelHit::NO_MATCH`] so a degraded build can never pass off a plausible
//! answer as a real one.

use super::{LevelBook, LevelHit};
use crate::shape::{BookOf, CodeShape};

#[inline]
pub fn find_level<C: CodeShape>(book: &BookOf<C>, target: f32) -> LevelHit {
    find_level_in::<C, BookOf<C>>(book, target)
}

#[inline]
pub fn find_level_in<C: CodeShape, B: LevelBook>(book: &B, target: f32) -> LevelHit {
    let _ = (book, target);
    LevelHit::NO_MATCH
}
