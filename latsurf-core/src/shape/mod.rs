// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Code-generation policies.
//!
//! A [`CodeShape`] bundles the five configuration axes as compile-time
//! parameters. Kernels are generic over a shape, so one kernel body is
//! monomorphised into one variant per shape. Only the instruction-level
//! realisation differs between variants; results never do.
//!
//! The shape a binary measures is [`crate::config::ActiveShape`], fixed by
//! the build script. Tests and criterion benches instantiate any [`Shape`]
//! directly to compare variants inside a single build.

use std::marker::PhantomData;

pub mod align;
pub mod prefetch;
pub mod select;
pub mod unroll;

pub use align::{Align, Align128, Align16, Align32, Align64, Aligned, AlignedBuf, Natural};
pub use select::{Branchy, Flattened, Select, Selectable};

use crate::kernels::levels::{AosBook, LevelBook, SoaBook};
use crate::types::LayoutKind;

/// Memory layout of the level book.
pub trait Layout: 'static {
    const KIND: LayoutKind;

    /// Concrete book type for this layout at alignment `A`.
    type Book<A: Align>: LevelBook;
}

/// Array-of-structures layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aos;

impl Layout for Aos {
    const KIND: LayoutKind = LayoutKind::Aos;
    type Book<A: Align> = AosBook<A>;
}

/// Structure-of-arrays layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Soa;

impl Layout for Soa {
    const KIND: LayoutKind = LayoutKind::Soa;
    type Book<A: Align> = SoaBook<A>;
}

/// The full set of code-generation choices for one kernel variant.
pub trait CodeShape: 'static {
    /// Loop body replication factor, always at least 1.
    const UNROLL: usize;
    /// Prefetch distance in elements; 0 disables prefetching.
    const PREFETCH: usize;

    type Select: Select;
    type Layout: Layout;
    type Align: Align;
}

/// Generic [`CodeShape`] implementation.
///
/// An `UNROLL` of 0 is treated as 1.
pub struct Shape<
    const UNROLL: usize,
    const PREFETCH: usize,
    S = Branchy,
    L = Aos,
    A = Natural,
>(PhantomData<(S, L, A)>);

impl<const UNROLL: usize, const PREFETCH: usize, S, L, A> CodeShape
    for Shape<UNROLL, PREFETCH, S, L, A>
where
    S: Select,
    L: Layout,
    A: Align,
{
    const UNROLL: usize = if UNROLL == 0 { 1 } else { UNROLL };
    const PREFETCH: usize = PREFETCH;

    type Select = S;
    type Layout = L;
    type Align = A;
}

/// Defaults for every axis: no unrolling, no prefetch, branchy, AoS, natural.
pub type Baseline = Shape<1, 0>;

/// Level book type selected by a shape.
pub type BookOf<C> = <<C as CodeShape>::Layout as Layout>::Book<<C as CodeShape>::Align>;
