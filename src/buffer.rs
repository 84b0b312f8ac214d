// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Owned payload buffer with explicit guard regions.
//!
//! Layout when guarded:
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────┬──────────────┐
//! │ left guard   │ payload: capacity × slot         │ right guard  │
//! │ 8 bytes      │ 4 bytes per slot, little-endian  │ 8 bytes      │
//! └──────────────┴──────────────────────────────────┴──────────────┘
//! ```
//!
//! Unguarded buffers are the payload alone. All offsets are derived from
//! [`GuardedBuffer::capacity`] in one place (`payload_range`), so no caller
//! computes a guard address by hand.
//!
//! Allocation goes through `Vec::try_reserve_exact`, which reports failure
//! instead of aborting. A failed [`reallocate`](GuardedBuffer::reallocate)
//! leaves the buffer exactly as it was.

use std::fmt;
use std::ops::Range;

use crate::error::AllocError;
use crate::integrity::GUARD;

/// The payload type stored in each slot.
pub type Element = i32;

/// Width of one guard word.
pub const GUARD_BYTES: usize = std::mem::size_of::<u64>();

/// Width of one payload slot.
pub const SLOT_BYTES: usize = std::mem::size_of::<Element>();

/// Total byte length of a buffer with `capacity` slots, or `None` on overflow.
pub fn layout_len(capacity: usize, guarded: bool) -> Option<usize> {
    let padding = if guarded { 2 * GUARD_BYTES } else { 0 };
    capacity.checked_mul(SLOT_BYTES)?.checked_add(padding)
}

#[derive(Clone, PartialEq, Eq)]
pub struct GuardedBuffer {
    bytes: Vec<u8>,
    capacity: usize,
    guarded: bool,
}

impl GuardedBuffer {
    /// Allocate `capacity` zeroed slots, with guard words written if `guarded`.
    pub fn allocate(capacity: usize, guarded: bool) -> Result<Self, AllocError> {
        let len = layout_len(capacity, guarded).ok_or(AllocError::Overflow { capacity })?;

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(len)
            .map_err(|_| AllocError::Refused { bytes: len })?;
        bytes.resize(len, 0);

        let mut buffer = Self {
            bytes,
            capacity,
            guarded,
        };
        buffer.write_guards(GUARD);
        Ok(buffer)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_guarded(&self) -> bool {
        self.guarded
    }

    /// Total allocated bytes including guard padding.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    fn payload_range(&self) -> Range<usize> {
        let start = if self.guarded { GUARD_BYTES } else { 0 };
        start..start + self.capacity * SLOT_BYTES
    }

    fn slot_range(&self, index: usize) -> Option<Range<usize>> {
        if index >= self.capacity {
            return None;
        }
        let start = self.payload_range().start + index * SLOT_BYTES;
        Some(start..start + SLOT_BYTES)
    }

    /// The payload bytes, guards excluded.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[self.payload_range()]
    }

    pub(crate) fn payload_mut(&mut self) -> &mut [u8] {
        let range = self.payload_range();
        &mut self.bytes[range]
    }

    fn read_word(&self, offset: usize) -> Option<u64> {
        let raw = self.bytes.get(offset..offset + GUARD_BYTES)?;
        let word: [u8; GUARD_BYTES] = raw.try_into().ok()?;
        Some(u64::from_le_bytes(word))
    }

    fn write_word(&mut self, offset: usize, value: u64) {
        if let Some(raw) = self.bytes.get_mut(offset..offset + GUARD_BYTES) {
            raw.copy_from_slice(&value.to_le_bytes());
        }
    }

    /// Guard word in front of the payload. `None` for unguarded buffers.
    pub fn left_guard(&self) -> Option<u64> {
        if !self.guarded {
            return None;
        }
        self.read_word(0)
    }

    /// Guard word behind the payload. `None` for unguarded buffers.
    pub fn right_guard(&self) -> Option<u64> {
        if !self.guarded {
            return None;
        }
        self.read_word(self.payload_range().end)
    }

    pub(crate) fn set_left_guard(&mut self, value: u64) {
        if self.guarded {
            self.write_word(0, value);
        }
    }

    pub(crate) fn set_right_guard(&mut self, value: u64) {
        if self.guarded {
            let end = self.payload_range().end;
            self.write_word(end, value);
        }
    }

    pub(crate) fn write_guards(&mut self, value: u64) {
        self.set_left_guard(value);
        self.set_right_guard(value);
    }

    pub fn slot(&self, index: usize) -> Option<Element> {
        let raw = self.bytes.get(self.slot_range(index)?)?;
        let word: [u8; SLOT_BYTES] = raw.try_into().ok()?;
        Some(Element::from_le_bytes(word))
    }

    /// Write one slot. Returns `false` if `index` is outside the payload.
    pub(crate) fn set_slot(&mut self, index: usize, value: Element) -> bool {
        let Some(range) = self.slot_range(index) else {
            return false;
        };
        self.bytes[range].copy_from_slice(&value.to_le_bytes());
        true
    }

    /// Write `value` into every slot of `range`, clamped to capacity.
    pub(crate) fn fill(&mut self, range: Range<usize>, value: Element) {
        let end = range.end.min(self.capacity);
        let encoded = value.to_le_bytes();
        let start = range.start.min(end);
        let payload = self.payload_mut();
        for slot in payload[start * SLOT_BYTES..end * SLOT_BYTES].chunks_exact_mut(SLOT_BYTES) {
            slot.copy_from_slice(&encoded);
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = Element> + '_ {
        self.payload().chunks_exact(SLOT_BYTES).map(|raw| {
            let mut word = [0u8; SLOT_BYTES];
            word.copy_from_slice(raw);
            Element::from_le_bytes(word)
        })
    }

    /// Resize the payload to `new_capacity` slots and rewrite both guards.
    ///
    /// Slots kept from the old payload keep their values. Newly exposed slots
    /// hold whatever bytes the old right guard or zero fill left there; the
    /// caller poisons them. On error nothing changes.
    pub(crate) fn reallocate(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        let new_len = layout_len(new_capacity, self.guarded).ok_or(AllocError::Overflow {
            capacity: new_capacity,
        })?;

        if new_len > self.bytes.len() {
            self.bytes
                .try_reserve_exact(new_len - self.bytes.len())
                .map_err(|_| AllocError::Refused { bytes: new_len })?;
            self.bytes.resize(new_len, 0);
        } else {
            self.bytes.truncate(new_len);
            self.bytes.shrink_to_fit();
        }

        self.capacity = new_capacity;
        self.write_guards(GUARD);
        Ok(())
    }
}

impl fmt::Debug for GuardedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedBuffer")
            .field("capacity", &self.capacity)
            .field("left_guard", &self.left_guard().map(|g| format!("{:#x}", g)))
            .field("right_guard", &self.right_guard().map(|g| format!("{:#x}", g)))
            .finish()
    }
}
