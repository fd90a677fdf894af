// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Message-field checksum scan.
//!
//! Walks a byte buffer front to back, adding every byte to a checksum and
//! adding digit bytes a second time, weighted by three. The walk stops at
//! [`MessageView::safe_end`], leaving room for a full [`SCAN_WINDOW`] at every
//! visited position, so no unroll factor or prefetch distance can read past
//! the buffer.

use crate::shape::prefetch::prefetch_ahead;
use crate::shape::unroll::for_each_index;
use crate::shape::{CodeShape, Select};

/// Bytes that must remain from a position for it to be scanned.
pub const SCAN_WINDOW: usize = 8;

/// Pattern the driver buffer cycles through.
pub const SAMPLE_PATTERN: &[u8; 8] = b"012345=|";

/// Bounds-checked view of a message buffer.
#[derive(Debug, Clone, Copy)]
pub struct MessageView<'a> {
    bytes: &'a [u8],
}

impl<'a> MessageView<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Exclusive end of the scanned prefix: `len - (SCAN_WINDOW - 1)`, or 0
    /// for buffers shorter than one window.
    pub fn safe_end(&self) -> usize {
        self.bytes.len().saturating_sub(SCAN_WINDOW - 1)
    }

    /// The bytes a scan visits.
    pub fn scanned(&self) -> &'a [u8] {
        &self.bytes[..self.safe_end()]
    }
}

impl<'a> From<&'a [u8]> for MessageView<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

/// Checksum `msg` using the unroll, prefetch and select policies of `C`.
#[inline]
pub fn scan<C: CodeShape>(msg: MessageView<'_>) -> u32 {
    let bytes = msg.scanned();
    let mut checksum = 0u32;

    for_each_index(bytes.len(), C::UNROLL, |i| {
        prefetch_ahead(bytes, i, C::PREFETCH);
        let c = bytes[i];
        checksum = checksum.wrapping_add(u32::from(c));

        let is_digit = c.is_ascii_digit();
        let val = C::Select::select(is_digit, c.wrapping_sub(b'0'), 0u8);
        checksum = checksum.wrapping_add(u32::from(val) * 3);
    });

    checksum
}

/// Driver workload: `len` bytes cycling through [`SAMPLE_PATTERN`].
pub fn sample_message(len: usize) -> Vec<u8> {
    SAMPLE_PATTERN.iter().copied().cycle().take(len).collect()
}
