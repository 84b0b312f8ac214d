// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The integrity engine: sentinel constants, verification and rehashing.
//!
//! [`check`] evaluates independent conditions and ORs their flags together, so
//! one pass can report several problems. The order matters:
//!
//! 1. A missing buffer and the destroyed sentinels are looked at first. A
//!    destroyed stack's other fields are meaningless, so the check stops there.
//! 2. Cheap structural checks (size sign, capacity sign, ordering, buffer
//!    agreement) run next.
//! 3. Handle guards are compared whenever guards are enabled.
//! 4. Buffer guards and then checksums run only while everything before them
//!    came back clean. Probing a buffer through metadata already known to be
//!    bad would just produce noise.

use crate::buffer::Element;
use crate::dump::DiagnosticSink;
use crate::stack::GuardedStack;
use crate::status::{Corruption, Status};

/// Guard word written around the handle and around the payload.
pub const GUARD: u64 = 0xDEAD_B14D;

/// Sentinel written into every unused slot.
pub const POISON: Element = 0x0BAD_BABA;

/// Written into size and capacity on destroy. Negative, so never a live value.
pub const DESTROYED: i64 = -0xDEAD;

/// Written into guard words and checksums on destroy.
pub const DESTROYED_WORD: u64 = 0xDEAD;

// INVARIANT: the guard is distinguishable from zero, poison and destroyed words.
const _: () = {
    assert!(GUARD != 0);
    assert!(GUARD != POISON as u64);
    assert!(GUARD != DESTROYED_WORD);
    assert!(POISON as u64 != DESTROYED_WORD);
    assert!(DESTROYED < 0);
};

/// Width of the control record fed to the metadata checksum.
pub const CONTROL_BYTES: usize = 1 + 8 + 8 + 2;

/// Encode the control fields covered by the metadata checksum.
///
/// Buffer presence, size, capacity and status, little-endian. The checksums
/// themselves and the guard words are not part of the record.
pub fn control_record(has_buffer: bool, size: i64, capacity: i64, status: Status) -> [u8; CONTROL_BYTES] {
    let mut record = [0u8; CONTROL_BYTES];
    record[0] = u8::from(has_buffer);
    record[1..9].copy_from_slice(&size.to_le_bytes());
    record[9..17].copy_from_slice(&capacity.to_le_bytes());
    record[17..19].copy_from_slice(&status.bits().to_le_bytes());
    record
}

fn is_destroyed<S: DiagnosticSink>(stack: &GuardedStack<S>) -> bool {
    let config = stack.config();

    // Size and capacity are negative and struct guards are never 0xDEAD while
    // live. A live checksum can hash to 0xDEAD, so it only counts once the
    // buffer is gone too.
    let mut destroyed = stack.size == DESTROYED || stack.capacity == DESTROYED;
    if config.guards {
        destroyed |= stack.left_guard == DESTROYED_WORD || stack.right_guard == DESTROYED_WORD;
    }
    if config.checksums && stack.buffer.is_none() {
        destroyed |=
            stack.data_checksum == DESTROYED_WORD && stack.control_checksum == DESTROYED_WORD;
    }
    destroyed
}

/// Verify a stack without recording the result.
pub fn check<S: DiagnosticSink>(stack: &GuardedStack<S>) -> Status {
    let config = stack.config();
    let mut status = Status::CLEAN;

    if stack.buffer.is_none() {
        status |= Corruption::NullData;
    }

    if is_destroyed(stack) {
        return status | Corruption::DestroyedStack;
    }

    if stack.size < 0 {
        status |= Corruption::WrongPos;
    }
    if stack.capacity <= 0 {
        status |= Corruption::WrongSize;
    }
    if stack.size > stack.capacity {
        status |= Corruption::PosHigherSize;
    }
    if let Some(buffer) = &stack.buffer {
        // INVARIANT: the recorded capacity is the buffer's real slot count.
        if usize::try_from(stack.capacity).ok() != Some(buffer.capacity()) {
            status |= Corruption::WrongSize;
        }
    }

    if config.guards {
        if stack.left_guard != GUARD {
            status |= Corruption::LeftCanaryScreams;
        }
        if stack.right_guard != GUARD {
            status |= Corruption::RightCanaryScreams;
        }

        if status.is_clean() {
            if let Some(buffer) = &stack.buffer {
                if buffer.right_guard() != Some(GUARD) {
                    status |= Corruption::RightDataCanary;
                }
                if buffer.left_guard() != Some(GUARD) {
                    status |= Corruption::LeftDataCanary;
                }
            }
        }
    }

    if config.checksums && status.is_clean() {
        let kind = config.checksum_kind;
        if let Some(buffer) = &stack.buffer {
            if kind.digest(buffer.payload()) != stack.data_checksum {
                status |= Corruption::DataHashError;
            }
        }
        if kind.digest(&control_record_of(stack)) != stack.control_checksum {
            status |= Corruption::StructHashError;
        }
    }

    status
}

fn control_record_of<S: DiagnosticSink>(stack: &GuardedStack<S>) -> [u8; CONTROL_BYTES] {
    control_record(
        stack.buffer.is_some(),
        stack.size,
        stack.capacity,
        stack.status,
    )
}

/// Recompute both checksums. Only a clean stack is rehashed, so a corrupted
/// one keeps the checksums that expose it.
pub(crate) fn rehash<S: DiagnosticSink>(stack: &mut GuardedStack<S>) {
    let config = stack.config();
    if !config.checksums || !stack.status.is_clean() {
        return;
    }
    let kind = config.checksum_kind;

    if let Some(buffer) = &stack.buffer {
        stack.data_checksum = kind.digest(buffer.payload());
    }
    stack.control_checksum = kind.digest(&control_record_of(stack));
}
