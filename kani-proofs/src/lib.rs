// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Kani model checking proofs for guardstack layout and checksum primitives.
//!
//! This standalone crate extracts the buffer layout arithmetic and the
//! weighted checksum and proves the properties the stack relies on.
//!
//! Run with: `cargo kani`
//!
//! ## Verified Properties
//!
//! 1. **No overflow panics**: layout_len returns None instead of wrapping
//! 2. **Guard offsets in bounds**: both guard words fit inside the layout
//! 3. **Single-byte detection**: changing any one byte changes weighted_sum

/// Width of one guard word.
pub const GUARD_BYTES: usize = 8;

/// Width of one payload slot.
pub const SLOT_BYTES: usize = 4;

// ============================================================================
// LAYOUT (copied from src/buffer.rs)
// ============================================================================

/// Total byte length of a buffer with `capacity` slots, or `None` on overflow.
pub fn layout_len(capacity: usize, guarded: bool) -> Option<usize> {
    let padding = if guarded { 2 * GUARD_BYTES } else { 0 };
    capacity.checked_mul(SLOT_BYTES)?.checked_add(padding)
}

/// Byte offset of the right guard word in a guarded layout.
pub fn right_guard_offset(capacity: usize) -> Option<usize> {
    capacity.checked_mul(SLOT_BYTES)?.checked_add(GUARD_BYTES)
}

// ============================================================================
// CHECKSUM (copied from src/checksum.rs)
// ============================================================================

/// Weighted positional sum. An empty range sums to zero.
pub fn weighted_sum(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .zip(1u64..)
        .fold(0u64, |acc, (&byte, position)| {
            acc.wrapping_add(position.wrapping_mul(u64::from(byte)))
        })
}

// ============================================================================
// KANI MODEL CHECKING PROOFS
// ============================================================================

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// Verify layout_len never panics and is exact when it succeeds.
    #[kani::proof]
    fn verify_layout_len_no_overflow() {
        let capacity: usize = kani::any();
        let guarded: bool = kani::any();

        if let Some(len) = layout_len(capacity, guarded) {
            let padding = if guarded { 2 * GUARD_BYTES } else { 0 };
            kani::assert(len >= padding, "layout must include guard padding");
            kani::assert(
                (len - padding) / SLOT_BYTES == capacity,
                "payload region must hold exactly `capacity` slots",
            );
        }
    }

    /// Verify both guard words lie inside the allocated layout.
    #[kani::proof]
    fn verify_guard_offsets_in_bounds() {
        let capacity: usize = kani::any();

        if let Some(len) = layout_len(capacity, true) {
            let right = right_guard_offset(capacity);
            kani::assert(right.is_some(), "right guard offset must not overflow");
            if let Some(right) = right {
                kani::assert(right + GUARD_BYTES == len, "right guard must end the layout");
                kani::assert(GUARD_BYTES <= right, "payload must sit between the guards");
            }
        }
    }

    /// Verify any single-byte change in a small payload moves the checksum.
    #[kani::proof]
    #[kani::unwind(9)]
    fn verify_single_byte_change_detected() {
        let mut bytes: [u8; 8] = kani::any();
        let index: usize = kani::any_where(|&i| i < 8);
        let replacement: u8 = kani::any();
        kani::assume(replacement != bytes[index]);

        let before = weighted_sum(&bytes);
        bytes[index] = replacement;
        let after = weighted_sum(&bytes);

        kani::assert(before != after, "single byte change must change the checksum");
    }

    /// Verify the empty payload sums to zero.
    #[kani::proof]
    fn verify_empty_sum_is_zero() {
        kani::assert(weighted_sum(&[]) == 0, "empty payload must sum to zero");
    }
}
