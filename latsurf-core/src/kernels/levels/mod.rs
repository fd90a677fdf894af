// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Sorted price-level lookup.
//!
//! Given levels sorted ascending by price and a target price, find the
//! deepest (highest-index) level whose price is `<= target` together with its
//! quantity. Both layouts expose the same [`LevelBook`] query surface and give
//! identical answers for identical content.
//!
//! # Duplicate prices
//!
//! When several levels share the maximal qualifying price, the lookup returns
//! the one with the **highest index**. The linear kernel keeps the last
//! qualifying level it sees, and [`upper_bound`] is a last-true search, so the
//! rule is the same for both routines, both layouts and both select policies.

use serde::{Deserialize, Serialize};

use crate::shape::{Align, Aligned, AlignedBuf, Select};

#[cfg(feature = "levels")]
mod lookup;
#[cfg(not(feature = "levels"))]
mod placeholder;

#[cfg(feature = "levels")]
pub use lookup::{find_level, find_level_in};
#[cfg(not(feature = "levels"))]
pub use placeholder::{find_level, find_level_in};

/// Whether this build carries the placeholder lookup instead of the real one.
pub const DEGRADED: bool = cfg!(not(feature = "levels"));

/// One price level.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Level {
    pub price: f32,
    pub qty: u32,
    pub id: u32,
}

/// Result of a level lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelHit {
    /// Index of the matching level, or [`LevelHit::NO_INDEX`].
    pub index: u32,
    /// Quantity at that level, 0 on no match.
    pub qty: u32,
}

impl LevelHit {
    /// Out-of-range sentinel index.
    pub const NO_INDEX: u32 = u32::MAX;

    /// No level qualified (or the lookup is a degraded placeholder).
    pub const NO_MATCH: LevelHit = LevelHit {
        index: Self::NO_INDEX,
        qty: 0,
    };

    pub fn is_match(&self) -> bool {
        self.index != Self::NO_INDEX
    }

    pub fn index(&self) -> Option<usize> {
        self.is_match().then_some(self.index as usize)
    }

    /// Compact 32-bit encoding: index in the upper 16 bits (`0xFFFF` for no
    /// match), quantity in the lower 16 bits. Both fields are truncated.
    pub fn packed(&self) -> u32 {
        let idx_bits = if self.is_match() {
            self.index & 0xFFFF
        } else {
            0xFFFF
        };
        (idx_bits << 16) | (self.qty & 0xFFFF)
    }
}

/// Most levels a book holds, so every index stays below
/// [`LevelHit::NO_INDEX`].
pub const MAX_LEVELS: usize = LevelHit::NO_INDEX as usize;

/// Leading levels that fit in a book.
fn indexable(levels: &[Level]) -> &[Level] {
    let kept = levels.len().min(MAX_LEVELS);
    if kept < levels.len() {
        tracing::warn!(given = levels.len(), kept, "book truncated to MAX_LEVELS");
    }
    &levels[..kept]
}

/// Query surface shared by both memory layouts.
pub trait LevelBook {
    /// Build a book from levels already sorted ascending by price.
    ///
    /// Only the first [`MAX_LEVELS`] levels are kept.
    fn from_levels(levels: &[Level]) -> Self
    where
        Self: Sized;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn price(&self, i: usize) -> f32;

    fn qty(&self, i: usize) -> u32;

    /// Hint the price of level `i + distance` (clamped to the last level).
    fn prefetch_price(&self, i: usize, distance: usize);
}

/// Array-of-structures book: price, quantity and id of a level are adjacent.
///
/// Each record is padded to `A::BYTES` when over-alignment is requested, so
/// no record straddles an alignment boundary.
#[derive(Debug, Clone)]
pub struct AosBook<A: Align> {
    levels: Vec<Aligned<Level, A>>,
}

impl<A: Align> AosBook<A> {
    pub fn records(&self) -> &[Aligned<Level, A>] {
        &self.levels
    }
}

impl<A: Align> LevelBook for AosBook<A> {
    fn from_levels(levels: &[Level]) -> Self {
        Self {
            levels: indexable(levels).iter().copied().map(Aligned::new).collect(),
        }
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline(always)]
    fn price(&self, i: usize) -> f32 {
        self.levels[i].price
    }

    #[inline(always)]
    fn qty(&self, i: usize) -> u32 {
        self.levels[i].qty
    }

    #[inline(always)]
    fn prefetch_price(&self, i: usize, distance: usize) {
        crate::shape::prefetch::prefetch_ahead(&self.levels, i, distance);
    }
}

/// Structure-of-arrays book: one column per field, indices aligned across
/// columns. Column starts honour `A`; elements keep their natural stride.
#[derive(Debug, Clone)]
pub struct SoaBook<A: Align> {
    price: AlignedBuf<f32, A>,
    qty: AlignedBuf<u32, A>,
    id: AlignedBuf<u32, A>,
}

impl<A: Align> SoaBook<A> {
    pub fn prices(&self) -> &[f32] {
        &self.price
    }

    pub fn ids(&self) -> &[u32] {
        &self.id
    }
}

impl<A: Align> LevelBook for SoaBook<A> {
    fn from_levels(levels: &[Level]) -> Self {
        let levels = indexable(levels);
        let price: Vec<f32> = levels.iter().map(|l| l.price).collect();
        let qty: Vec<u32> = levels.iter().map(|l| l.qty).collect();
        let id: Vec<u32> = levels.iter().map(|l| l.id).collect();
        Self {
            price: AlignedBuf::from_slice(&price),
            qty: AlignedBuf::from_slice(&qty),
            id: AlignedBuf::from_slice(&id),
        }
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.price.len()
    }

    #[inline(always)]
    fn price(&self, i: usize) -> f32 {
        self.price[i]
    }

    #[inline(always)]
    fn qty(&self, i: usize) -> u32 {
        self.qty[i]
    }

    #[inline(always)]
    fn prefetch_price(&self, i: usize, distance: usize) {
        crate::shape::prefetch::prefetch_ahead(&self.price, i, distance);
    }
}

/// Last-true binary search for `price <= target`.
///
/// Reference routine for the linear kernel; the `lo`/`hi` updates go through
/// `S::select`, so the flattened policy narrows the range without branching on
/// the comparison.
pub fn upper_bound<S: Select, B: LevelBook>(book: &B, target: f32) -> LevelHit {
    let mut lo: isize = 0;
    let mut hi: isize = book.len() as isize - 1;

    while lo <= hi {
        let mid = lo + ((hi - lo) >> 1);
        let le = book.price(mid as usize) <= target;
        lo = S::select(le, mid + 1, lo);
        hi = S::select(le, hi, mid - 1);
    }

    if hi < 0 {
        LevelHit::NO_MATCH
    } else {
        LevelHit {
            index: hi as u32,
            qty: book.qty(hi as usize),
        }
    }
}

/// Driver workload: `n` levels priced `100.0 + 0.05 * i`, qty `i % 500 + 1`.
pub fn ladder(n: usize) -> Vec<Level> {
    (0..n)
        .map(|i| Level {
            price: 100.0 + 0.05 * i as f32,
            qty: (i % 500) as u32 + 1,
            id: i as u32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Align64, Branchy, Flattened, Natural};

    fn three() -> Vec<Level> {
        vec![
            Level { price: 10.0, qty: 1, id: 100 },
            Level { price: 20.0, qty: 2, id: 101 },
            Level { price: 30.0, qty: 3, id: 102 },
        ]
    }

    #[test]
    fn test_packed_encoding() {
        assert_eq!(LevelHit { index: 1, qty: 2 }.packed(), 0x0001_0002);
        assert_eq!(LevelHit::NO_MATCH.packed(), 0xFFFF_0000);
        assert_eq!(LevelHit { index: 0x1_0003, qty: 0x2_0004 }.packed(), 0x0003_0004);
    }

    #[test]
    fn test_book_indices_stay_below_sentinel() {
        let last = LevelHit { index: (MAX_LEVELS - 1) as u32, qty: 1 };
        assert!(last.is_match());
        assert_eq!(last.index(), Some(MAX_LEVELS - 1));
        assert_eq!(indexable(&three()), &three()[..]);
        assert!(indexable(&[]).is_empty());
    }

    #[test]
    fn test_hit_accessors() {
        assert_eq!(LevelHit::NO_MATCH.index(), None);
        assert!(!LevelHit::NO_MATCH.is_match());
        assert_eq!(LevelHit { index: 4, qty: 9 }.index(), Some(4));
    }

    #[test]
    fn test_layouts_hold_same_content() {
        let levels = three();
        let aos = AosBook::<Align64>::from_levels(&levels);
        let soa = SoaBook::<Align64>::from_levels(&levels);
        assert_eq!(aos.len(), soa.len());
        for i in 0..levels.len() {
            assert_eq!(aos.price(i), soa.price(i));
            assert_eq!(aos.qty(i), soa.qty(i));
        }
        assert_eq!(soa.ids(), &[100, 101, 102]);
        assert_eq!(aos.records()[2].id, 102);
        assert_eq!(aos.records().as_ptr() as usize % 64, 0);
        assert_eq!(soa.prices().as_ptr() as usize % 64, 0);
    }

    #[test]
    fn test_upper_bound_examples() {
        let book = SoaBook::<Natural>::from_levels(&three());
        for hit in [
            upper_bound::<Branchy, _>(&book, 20.0),
            upper_bound::<Flattened, _>(&book, 20.0),
        ] {
            assert_eq!(hit, LevelHit { index: 1, qty: 2 });
        }
        assert_eq!(upper_bound::<Flattened, _>(&book, 9.99), LevelHit::NO_MATCH);
        assert_eq!(upper_bound::<Branchy, _>(&book, 1e9), LevelHit { index: 2, qty: 3 });
    }

    #[test]
    fn test_upper_bound_empty_book() {
        let book = AosBook::<Natural>::from_levels(&[]);
        assert!(book.is_empty());
        assert_eq!(upper_bound::<Flattened, _>(&book, 50.0), LevelHit::NO_MATCH);
    }

    #[test]
    fn test_upper_bound_duplicates_pick_highest_index() {
        let levels = vec![
            Level { price: 10.0, qty: 1, id: 0 },
            Level { price: 20.0, qty: 2, id: 1 },
            Level { price: 20.0, qty: 5, id: 2 },
            Level { price: 30.0, qty: 3, id: 3 },
        ];
        let book = AosBook::<Natural>::from_levels(&levels);
        assert_eq!(upper_bound::<Branchy, _>(&book, 25.0), LevelHit { index: 2, qty: 5 });
        assert_eq!(upper_bound::<Flattened, _>(&book, 20.0), LevelHit { index: 2, qty: 5 });
    }

    #[test]
    fn test_ladder_is_sorted() {
        let levels = ladder(1024);
        assert_eq!(levels.len(), 1024);
        assert!(levels.windows(2).all(|w| w[0].price < w[1].price));
        assert_eq!(levels[499].qty, 500);
        assert_eq!(levels[500].qty, 1);
    }
}
