// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Linear last-true scan over every level.

use super::{LevelBook, LevelHit};
use crate::shape::unroll::for_each_index;
use crate::shape::{BookOf, CodeShape, Select};

/// Look up `target` in the book type selected by shape `C`.
#[inline]
pub fn find_level<C: CodeShape>(book: &BookOf<C>, target: f32) -> LevelHit {
    find_level_in::<C, BookOf<C>>(book, target)
}

/// Look up `target` in any book, using the unroll, prefetch and select
/// policies of `C`.
///
/// Every level is visited. Each one whose price is `<= target` replaces the
/// running best through `select`, so on a sorted book the final value is the
/// deepest qualifying level.
#[inline]
pub fn find_level_in<C: CodeShape, B: LevelBook>(book: &B, target: f32) -> LevelHit {
    let mut best_idx = LevelHit::NO_INDEX;
    let mut best_qty = 0u32;

    for_each_index(book.len(), C::UNROLL, |i| {
        book.prefetch_price(i, C::PREFETCH);
        let take = book.price(i) <= target;
        best_idx = C::Select::select(take, i as u32, best_idx);
        // Keep the quantity of whichever level is currently the best.
        best_qty = C::Select::select(take, book.qty(i), best_qty);
    });

    LevelHit {
        index: best_idx,
        qty: best_qty,
    }
}
