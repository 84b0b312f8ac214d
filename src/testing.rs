// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fault injection shared across unit tests, integration tests, fuzz targets
//! and the CLI `tamper` command.
//!
//! This module is always compiled but hidden from documentation. Safe Rust
//! cannot write past a buffer, so each [`Tamper`] target stands in for the
//! stray write that would have landed on that word.

#![doc(hidden)]

use crate::buffer::Element;
use crate::config::StackConfig;
use crate::dump::DiagnosticSink;
use crate::integrity::DESTROYED;
use crate::stack::GuardedStack;

/// A single simulated corruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tamper {
    /// Overwrite the guard word in front of the handle.
    LeftStructGuard(u64),
    /// Overwrite the guard word behind the handle.
    RightStructGuard(u64),
    /// Overwrite the guard word in front of the payload.
    LeftDataGuard(u64),
    /// Overwrite the guard word behind the payload.
    RightDataGuard(u64),
    /// XOR one payload byte with a non-zero mask.
    PayloadByte { offset: usize, mask: u8 },
    /// Overwrite one slot.
    Slot { index: usize, value: Element },
    /// Overwrite the recorded element count.
    Size(i64),
    /// Overwrite the recorded capacity.
    Capacity(i64),
    /// Overwrite the stored data checksum.
    DataChecksum(u64),
    /// Overwrite the stored control checksum.
    ControlChecksum(u64),
    /// Stamp the destroyed sentinel into the size field only.
    DestroyedSize,
}

/// Apply `tamper` directly to the stack's memory, bypassing every check.
///
/// Targets that do not exist (a data guard on an unguarded buffer, a byte
/// past the payload) are ignored. Returns whether anything was written.
pub fn corrupt<S: DiagnosticSink>(stack: &mut GuardedStack<S>, tamper: Tamper) -> bool {
    match tamper {
        Tamper::LeftStructGuard(value) => stack.left_guard = value,
        Tamper::RightStructGuard(value) => stack.right_guard = value,
        Tamper::LeftDataGuard(value) => match stack.buffer.as_mut() {
            Some(buffer) if buffer.is_guarded() => buffer.set_left_guard(value),
            _ => return false,
        },
        Tamper::RightDataGuard(value) => match stack.buffer.as_mut() {
            Some(buffer) if buffer.is_guarded() => buffer.set_right_guard(value),
            _ => return false,
        },
        Tamper::PayloadByte { offset, mask } => {
            let Some(byte) = stack
                .buffer
                .as_mut()
                .and_then(|buffer| buffer.payload_mut().get_mut(offset))
            else {
                return false;
            };
            *byte ^= mask;
            return mask != 0;
        }
        Tamper::Slot { index, value } => {
            return stack
                .buffer
                .as_mut()
                .is_some_and(|buffer| buffer.set_slot(index, value));
        }
        Tamper::Size(value) => stack.size = value,
        Tamper::Capacity(value) => stack.capacity = value,
        Tamper::DataChecksum(value) => stack.data_checksum = value,
        Tamper::ControlChecksum(value) => stack.control_checksum = value,
        Tamper::DestroyedSize => stack.size = DESTROYED,
    }
    true
}

/// A stack with `values` pushed in order.
pub fn stack_with(config: StackConfig, values: &[Element]) -> GuardedStack {
    let mut stack = GuardedStack::new(config).unwrap_or_else(|err| panic!("invalid test config: {err}"));
    for &value in values {
        stack.push(value);
    }
    stack
}

/// Every combination of guard and checksum protection.
pub fn all_protection_configs() -> Vec<StackConfig> {
    let mut configs = Vec::new();
    for guards in [false, true] {
        for checksums in [false, true] {
            configs.push(
                StackConfig::default()
                    .with_name(format!("guards={guards},checksums={checksums}"))
                    .with_guards(guards)
                    .with_checksums(checksums),
            );
        }
    }
    configs
}
