// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Manual loop unrolling.
//!
//! Rust has no `unroll_count` pragma, so the body is replicated through an
//! inner loop with a constant trip count. After monomorphisation `factor` is a
//! compile-time constant and LLVM flattens the inner loop. Indices are visited
//! in ascending order regardless of the factor.

/// Call `body(i)` for every `i` in `0..len`, `factor` indices per step.
#[inline(always)]
pub fn for_each_index<F>(len: usize, factor: usize, mut body: F)
where
    F: FnMut(usize),
{
    let mut i = 0;
    if factor > 1 {
        while i + factor <= len {
            for k in 0..factor {
                body(i + k);
            }
            i += factor;
        }
    }
    while i < len {
        body(i);
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visits_in_order_for_every_factor() {
        for factor in [0, 1, 2, 3, 4, 8, 16, 64] {
            for len in [0, 1, 5, 8, 17, 100] {
                let mut seen = Vec::new();
                for_each_index(len, factor, |i| seen.push(i));
                assert_eq!(seen, (0..len).collect::<Vec<_>>(), "factor {factor} len {len}");
            }
        }
    }
}
