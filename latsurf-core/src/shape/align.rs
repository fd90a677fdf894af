// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Compile-time over-alignment of hot structures.
//!
//! `#[repr(align(N))]` needs a literal, so each supported alignment is its own
//! zero-sized marker type. [`Aligned<T, A>`] embeds a zero-length array of the
//! marker, which raises the wrapper's alignment to `max(align_of::<T>(), A)`
//! without adding any bytes beyond padding.

use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

/// Alignment marker. `BYTES == 0` means natural alignment.
pub trait Align: Copy + Default + Send + Sync + 'static {
    const BYTES: usize;
}

/// No over-alignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Natural;

impl Align for Natural {
    const BYTES: usize = 0;
}

macro_rules! align_marker {
    ($(#[$doc:meta] $name:ident = $bytes:literal),* $(,)?) => {
        $(
            #[$doc]
            #[derive(Debug, Clone, Copy, Default)]
            #[repr(align($bytes))]
            pub struct $name;

            impl Align for $name {
                const BYTES: usize = $bytes;
            }
        )*
    };
}

align_marker!(
    /// 16-byte alignment.
    Align16 = 16,
    /// 32-byte alignment.
    Align32 = 32,
    /// Cache-line alignment on most x86_64 and aarch64 parts.
    Align64 = 64,
    /// Adjacent-line-pair alignment.
    Align128 = 128,
);

/// `T` stored at an address aligned to at least `A::BYTES`.
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct Aligned<T, A: Align> {
    _align: [A; 0],
    value: T,
}

impl<T, A: Align> Aligned<T, A> {
    pub const fn new(value: T) -> Self {
        Self { _align: [], value }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T, A: Align> Deref for Aligned<T, A> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T, A: Align> DerefMut for Aligned<T, A> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: fmt::Debug, A: Align> fmt::Debug for Aligned<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aligned")
            .field("align", &A::BYTES)
            .field("value", &self.value)
            .finish()
    }
}

/// Heap slice of `T` whose first element is aligned to at least `A::BYTES`.
///
/// Used for structure-of-arrays columns, where padding every element would
/// change the stride. Elements keep their natural size.
pub struct AlignedBuf<T: Copy, A: Align> {
    ptr: NonNull<T>,
    len: usize,
    _marker: PhantomData<(Box<[T]>, A)>,
}

// SAFETY: AlignedBuf owns its allocation exclusively, like Box<[T]>.
unsafe impl<T: Copy + Send, A: Align> Send for AlignedBuf<T, A> {}
// SAFETY: shared access only hands out &[T].
unsafe impl<T: Copy + Sync, A: Align> Sync for AlignedBuf<T, A> {}

impl<T: Copy, A: Align> AlignedBuf<T, A> {
    /// Copy `items` into a freshly allocated, aligned buffer.
    pub fn from_slice(items: &[T]) -> Self {
        let len = items.len();
        let layout = Self::layout(len);
        if layout.size() == 0 {
            return Self {
                ptr: NonNull::dangling(),
                len,
                _marker: PhantomData,
            };
        }

        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc::alloc(layout) }.cast::<T>();
        let Some(ptr) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };
        // SAFETY: the new allocation holds `len` elements and cannot overlap `items`.
        unsafe {
            std::ptr::copy_nonoverlapping(items.as_ptr(), ptr.as_ptr(), len);
        }

        Self {
            ptr,
            len,
            _marker: PhantomData,
        }
    }

    fn layout(len: usize) -> Layout {
        let align = std::mem::align_of::<T>().max(A::BYTES);
        match Layout::array::<T>(len).and_then(|l| l.align_to(align)) {
            Ok(layout) => layout,
            Err(_) => panic!("aligned buffer of {len} elements overflows isize"),
        }
    }
}

impl<T: Copy, A: Align> Deref for AlignedBuf<T, A> {
    type Target = [T];

    #[inline(always)]
    fn deref(&self) -> &[T] {
        // SAFETY: ptr is valid for len initialised elements (or dangling with
        // len 0 / zero-sized T), and the allocation lives as long as self.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Copy, A: Align> Clone for AlignedBuf<T, A> {
    fn clone(&self) -> Self {
        Self::from_slice(self)
    }
}

impl<T: Copy, A: Align> Drop for AlignedBuf<T, A> {
    fn drop(&mut self) {
        let layout = Self::layout(self.len);
        if layout.size() != 0 {
            // SAFETY: allocated in from_slice with this exact layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout) };
        }
    }
}

impl<T: Copy + fmt::Debug, A: Align> fmt::Debug for AlignedBuf<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuf")
            .field("align", &A::BYTES)
            .field("items", &&**self)
            .finish()
    }
}
