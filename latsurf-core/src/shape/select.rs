// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Branchy vs. branch-flattened selection.
//!
//! `select(cond, a, b)` returns `a` when `cond` holds and `b` otherwise. The
//! [`Branchy`] policy writes it as an ordinary conditional; [`Flattened`]
//! computes `((a ^ b) & mask) ^ b` where `mask` is all ones for `true` and
//! zero for `false`, so no data-dependent branch is needed. Both agree for
//! every input, signed or unsigned.

/// Integers that can be chosen between without a branch.
pub trait Selectable: Copy {
    /// Bitwise select: `a` if `cond`, else `b`.
    fn mask_select(cond: bool, a: Self, b: Self) -> Self;
}

macro_rules! impl_selectable {
    ($($t:ty),* $(,)?) => {
        $(
            impl Selectable for $t {
                #[inline(always)]
                fn mask_select(cond: bool, a: Self, b: Self) -> Self {
                    // 1 -> all ones, 0 -> zero, for signed and unsigned alike.
                    let mask = (cond as $t).wrapping_neg();
                    ((a ^ b) & mask) ^ b
                }
            }
        )*
    };
}

impl_selectable!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// Selection strategy resolved at compile time.
pub trait Select: 'static {
    /// Short name recorded in build configuration.
    const NAME: &'static str;
    /// Whether this strategy avoids data-dependent branches.
    const FLATTENED: bool;

    fn select<T: Selectable>(cond: bool, a: T, b: T) -> T;
}

/// Plain `if cond { a } else { b }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Branchy;

impl Select for Branchy {
    const NAME: &'static str = "branchy";
    const FLATTENED: bool = false;

    #[inline(always)]
    fn select<T: Selectable>(cond: bool, a: T, b: T) -> T {
        if cond {
            a
        } else {
            b
        }
    }
}

/// Mask arithmetic select.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flattened;

impl Select for Flattened {
    const NAME: &'static str = "flattened";
    const FLATTENED: bool = true;

    #[inline(always)]
    fn select<T: Selectable>(cond: bool, a: T, b: T) -> T {
        T::mask_select(cond, a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agree<T: Selectable + PartialEq + std::fmt::Debug>(values: &[T]) {
        for &a in values {
            for &b in values {
                for cond in [false, true] {
                    let expected = if cond { a } else { b };
                    assert_eq!(Branchy::select(cond, a, b), expected);
                    assert_eq!(Flattened::select(cond, a, b), expected);
                }
            }
        }
    }

    #[test]
    fn test_unsigned_extremes() {
        agree(&[0u8, 1, 0x7f, 0x80, u8::MAX]);
        agree(&[0u32, 1, u32::MAX / 2, u32::MAX]);
        agree(&[0usize, 7, usize::MAX]);
    }

    #[test]
    fn test_signed_extremes() {
        agree(&[i32::MIN, -1, 0, 1, i32::MAX]);
        agree(&[i64::MIN, -42, 0, i64::MAX]);
        agree(&[i8::MIN, -1, 0, i8::MAX]);
    }

    #[test]
    fn test_equal_operands() {
        assert_eq!(Flattened::select(true, 5u32, 5u32), 5);
        assert_eq!(Flattened::select(false, -3i32, -3i32), -3);
    }

    #[test]
    fn test_names() {
        assert!(!Branchy::FLATTENED);
        assert!(Flattened::FLATTENED);
        assert_ne!(Branchy::NAME, Flattened::NAME);
    }
}
