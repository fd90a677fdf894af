// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Fixed-capacity ring with a published write cursor.
//!
//! Single-producer design: the writer copies a batch of elements into the
//! slots following the cursor (wrapping with `N - 1` as a mask), then
//! publishes the new cursor with `Release` ordering. A reader that loads the
//! cursor with `Acquire` is guaranteed to see every slot write made before
//! that publish. Cursors are logical and grow without bound; only slot
//! indices are masked.
//!
//! The ring is `Sync`, so readers on other threads can share it (for example
//! through an `Arc`) while the single producer writes.

use std::cell::UnsafeCell;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::shape::prefetch::prefetch_read;
use crate::shape::unroll::for_each_index;
use crate::shape::{Align, Aligned, CodeShape, Natural};

/// Driver ring capacity.
pub const DRIVER_CAPACITY: usize = 1 << 12;
/// Elements written per driver invocation.
pub const DRIVER_BATCH: usize = 32;

/// Lock-free ring of `N` slots of `T`, storage aligned to `A`.
pub struct Ring<T, const N: usize, A: Align = Natural> {
    slots: Box<Aligned<UnsafeCell<[T; N]>, A>>,
    /// Write cursor (owned by producer).
    head: AtomicUsize,
    /// Read cursor (owned by consumer).
    tail: AtomicUsize,
}

impl<T: Copy + Default, const N: usize, A: Align> Ring<T, N, A> {
    const CAPACITY_IS_POWER_OF_TWO: () = assert!(
        N.is_power_of_two(),
        "ring capacity must be a power of two"
    );

    /// Create an empty ring with every slot set to `T::default()`.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_IS_POWER_OF_TWO;

        Self {
            slots: Box::new(Aligned::new(UnsafeCell::new([T::default(); N]))),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Create a ring whose cursors both start at `cursor`.
    pub fn starting_at(cursor: usize) -> Self {
        let ring = Self::new();
        ring.head.store(cursor, Ordering::Relaxed);
        ring.tail.store(cursor, Ordering::Relaxed);
        ring
    }
}

// SAFETY: slot writes only happen in `write`, whose callers guarantee a single
// producer. Readers only copy `T` values out, and the Release/Acquire pair on
// `head` orders the published slots before any reader that observes them.
unsafe impl<T: Copy + Send, const N: usize, A: Align> Sync for Ring<T, N, A> {}

impl<T: Copy + Default, const N: usize, A: Align> Default for Ring<T, N, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize, A: Align> Ring<T, N, A> {
    pub const fn capacity(&self) -> usize {
        N
    }

    pub const fn mask(&self) -> usize {
        N - 1
    }

    /// Current published write cursor (acquire).
    pub fn head(&self) -> usize {
        self.head.load(Ordering::Acquire)
    }

    /// Current read cursor (acquire).
    pub fn tail(&self) -> usize {
        self.tail.load(Ordering::Acquire)
    }

    /// Elements published but not yet consumed, capped at capacity since
    /// older slots have been overwritten.
    pub fn readable(&self) -> usize {
        self.head().wrapping_sub(self.tail()).min(N)
    }

    #[inline(always)]
    fn base(&self) -> *mut T {
        self.slots.get().cast::<T>()
    }

    /// Slot holding logical position `pos`.
    ///
    /// The value is only meaningful for positions behind a cursor the caller
    /// loaded from [`head`](Self::head) and within the last `N` of them.
    #[inline]
    pub fn get(&self, pos: usize) -> T {
        // SAFETY: the masked index is in bounds. The producer only stores to
        // slots at or past the published head, so a slot inside the published
        // window is not being written.
        unsafe { ptr::read_volatile(self.base().add(pos & (N - 1))) }
    }

    /// Value at `pos` if it is published and not yet overwritten.
    pub fn read(&self, pos: usize) -> Option<T> {
        let behind = self.head().wrapping_sub(pos);
        (1..=N).contains(&behind).then(|| self.get(pos))
    }

    /// Advance the read cursor to `pos` (release), never past the head.
    pub fn consume_to(&self, pos: usize) {
        let head = self.head();
        let pos = if pos.wrapping_sub(self.tail()) > head.wrapping_sub(self.tail()) {
            head
        } else {
            pos
        };
        self.tail.store(pos, Ordering::Release);
    }

    /// Copy `src` into the slots after the cursor, then publish
    /// `cursor + src.len()` with release ordering.
    ///
    /// Only one thread may write at a time; readers may run concurrently.
    /// Writers never wait for readers: writing more than `N` elements ahead
    /// of the tail overwrites unread slots.
    #[inline]
    pub fn write<C: CodeShape>(&self, src: &[T]) {
        let h = self.head.load(Ordering::Relaxed);
        let mask = N - 1;
        let base = self.base();

        for_each_index(src.len(), C::UNROLL, |i| {
            let pos = h.wrapping_add(i);
            if C::PREFETCH != 0 {
                prefetch_read(base.cast_const().wrapping_add(pos.wrapping_add(C::PREFETCH) & mask));
            }
            // SAFETY: the masked index is in bounds and the single producer
            // is the only thread storing to slots.
            unsafe { base.add(pos & mask).write(src[i]) };
        });

        self.head
            .store(h.wrapping_add(src.len()), Ordering::Release);
    }
}

impl<T, const N: usize, A: Align> std::fmt::Debug for Ring<T, N, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ring")
            .field("capacity", &N)
            .field("align", &A::BYTES)
            .field("head", &self.head.load(Ordering::Relaxed))
            .field("tail", &self.tail.load(Ordering::Relaxed))
            .finish()
    }
}
