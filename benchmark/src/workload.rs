// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Fixed driver inputs, one per kernel.
//!
//! State is built once, outside the timed region. Each [`Workload::call`]
//! is a single kernel invocation under [`ActiveShape`] with its inputs and
//! result passed through `black_box`.

use std::fmt;
use std::hint::black_box;

use latsurf_core::kernels::levels::{find_level, ladder};
use latsurf_core::kernels::ring::{DRIVER_BATCH, DRIVER_CAPACITY};
use latsurf_core::kernels::scan::{sample_message, scan};
use latsurf_core::shape::{BookOf, CodeShape};
use latsurf_core::{ActiveShape, KernelKind, LevelBook, MessageView, Ring};

use crate::harness::BenchmarkHarness;

/// Bytes in the parser's message buffer.
pub const MESSAGE_LEN: usize = 256;
/// Levels in the order-book ladder.
pub const BOOK_DEPTH: usize = 1024;
/// Price the order-book lookup searches for.
pub const BOOK_TARGET: f32 = 123.4;
/// Value written into every ring slot.
pub const RING_FILL: u64 = 42;

type ActiveAlign = <ActiveShape as CodeShape>::Align;

/// Kernel state prepared for measurement.
pub enum Workload {
    Parser {
        message: Vec<u8>,
    },
    Ring {
        ring: Ring<u64, DRIVER_CAPACITY, ActiveAlign>,
        src: [u64; DRIVER_BATCH],
    },
    OrderBook {
        book: BookOf<ActiveShape>,
        target: f32,
    },
}

impl Workload {
    /// Build the driver state for `kind`.
    pub fn new(kind: KernelKind) -> Self {
        match kind {
            KernelKind::Parser => Workload::Parser {
                message: sample_message(MESSAGE_LEN),
            },
            KernelKind::Ring => Workload::Ring {
                ring: Ring::new(),
                src: [RING_FILL; DRIVER_BATCH],
            },
            KernelKind::OrderBook => Workload::OrderBook {
                book: <BookOf<ActiveShape> as LevelBook>::from_levels(&ladder(BOOK_DEPTH)),
                target: BOOK_TARGET,
            },
        }
    }

    pub fn kind(&self) -> KernelKind {
        match self {
            Workload::Parser { .. } => KernelKind::Parser,
            Workload::Ring { .. } => KernelKind::Ring,
            Workload::OrderBook { .. } => KernelKind::OrderBook,
        }
    }

    /// One kernel invocation.
    #[inline(always)]
    pub fn call(&mut self) {
        match self {
            Workload::Parser { message } => {
                let msg = MessageView::new(black_box(message.as_slice()));
                black_box(scan::<ActiveShape>(msg));
            }
            Workload::Ring { ring, src } => {
                ring.write::<ActiveShape>(black_box(&src[..]));
                black_box(ring.head());
            }
            Workload::OrderBook { book, target } => {
                black_box(find_level::<ActiveShape>(black_box(&*book), black_box(*target)));
            }
        }
    }

    /// Measure this workload with `harness`.
    pub fn measure(&mut self, harness: &BenchmarkHarness) -> Vec<u32> {
        harness.run(|| self.call())
    }
}

impl fmt::Debug for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Workload::Parser { message } => f
                .debug_struct("Parser")
                .field("len", &message.len())
                .finish(),
            Workload::Ring { ring, .. } => f.debug_struct("Ring").field("ring", ring).finish(),
            Workload::OrderBook { book, target } => f
                .debug_struct("OrderBook")
                .field("levels", &book.len())
                .field("target", target)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_input() {
        match Workload::new(KernelKind::Parser) {
            Workload::Parser { message } => {
                assert_eq!(message.len(), MESSAGE_LEN);
                assert_eq!(&message[..8], b"012345=|");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_ring_calls_advance_head() {
        let mut workload = Workload::new(KernelKind::Ring);
        for _ in 0..3 {
            workload.call();
        }
        match &workload {
            Workload::Ring { ring, .. } => {
                assert_eq!(ring.head(), 3 * DRIVER_BATCH);
                assert_eq!(ring.get(0), RING_FILL);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_order_book_input() {
        let workload = Workload::new(KernelKind::OrderBook);
        assert_eq!(workload.kind(), KernelKind::OrderBook);
        match &workload {
            Workload::OrderBook { book, target } => {
                assert_eq!(book.len(), BOOK_DEPTH);
                assert_eq!(*target, BOOK_TARGET);
                let hit = find_level::<ActiveShape>(book, *target);
                assert_eq!(hit.is_match(), cfg!(feature = "levels"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_measure_every_kernel() {
        let harness = BenchmarkHarness::new().warmup(10).batches(8).iters_per_batch(4);
        for kind in KernelKind::ALL {
            let mut workload = Workload::new(kind);
            assert_eq!(workload.kind(), kind);
            assert_eq!(workload.measure(&harness).len(), 8);
        }
    }
}
