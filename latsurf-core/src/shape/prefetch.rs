// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Read-intent prefetch hints.
//!
//! A prefetch is a hint: it never faults, even on an unmapped address, and
//! never changes program results. Kernels still clamp or mask the hinted
//! index so the address stays inside their own allocation.

/// Hint that the cache line holding `ptr` will be read soon (keep in all levels).
#[inline(always)]
pub fn prefetch_read<T>(ptr: *const T) {
    #[cfg(target_arch = "x86_64")]
    {
        use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
        // SAFETY: prefetcht0 does not dereference its operand architecturally
        // and cannot fault; SSE is part of the x86_64 baseline.
        #[allow(unused_unsafe)]
        unsafe {
            _mm_prefetch::<_MM_HINT_T0>(ptr.cast::<i8>());
        }
    }

    #[cfg(target_arch = "x86")]
    {
        #[cfg(target_feature = "sse")]
        {
            use std::arch::x86::{_mm_prefetch, _MM_HINT_T0};
            // SAFETY: as above, guarded by the sse target feature.
            #[allow(unused_unsafe)]
            unsafe {
                _mm_prefetch::<_MM_HINT_T0>(ptr.cast::<i8>());
            }
        }
        #[cfg(not(target_feature = "sse"))]
        let _ = ptr;
    }

    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: PRFM is a hint with no architectural memory access.
        unsafe {
            std::arch::asm!(
                "prfm pldl1keep, [{0}]",
                in(reg) ptr,
                options(nostack, preserves_flags, readonly)
            );
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64")))]
    let _ = ptr;
}

/// Prefetch `slice[i + distance]`, clamped to the last element.
///
/// Does nothing when `distance` is zero or the slice is empty, so a
/// zero-distance build emits no prefetch instructions at all.
#[inline(always)]
pub fn prefetch_ahead<T>(slice: &[T], i: usize, distance: usize) {
    if distance == 0 || slice.is_empty() {
        return;
    }
    let target = i.saturating_add(distance).min(slice.len() - 1);
    prefetch_read(slice.as_ptr().wrapping_add(target));
}
