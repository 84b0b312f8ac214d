// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for arbitrary push/pop/resize sequences.
//!
//! No sequence of legal operations may ever leave the stack dirty, lose an
//! element, or leave an unused slot unpoisoned.

#![no_main]

use arbitrary::Arbitrary;
use guardstack::contracts::check_well_formed;
use guardstack::{ChecksumKind, GuardedStack, StackConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Push(i32),
    Pop,
    Peek,
    Grow,
    Shrink,
}

#[derive(Debug, Arbitrary)]
struct Input {
    guards: bool,
    checksums: bool,
    crc32: bool,
    base_capacity: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let kind = if input.crc32 {
        ChecksumKind::Crc32
    } else {
        ChecksumKind::Weighted
    };
    let config = StackConfig::default()
        .with_guards(input.guards)
        .with_checksums(input.checksums)
        .with_checksum_kind(kind)
        .with_base_capacity(usize::from(input.base_capacity.max(1)))
        .with_max_capacity(1 << 16);
    let Ok(mut stack) = GuardedStack::new(config) else {
        return;
    };
    let mut model: Vec<i32> = Vec::new();

    for op in input.ops {
        let label = format!("{op:?}");
        match op {
            Op::Push(value) => {
                if stack.push(value).is_clean() {
                    model.push(value);
                }
            }
            Op::Pop => {
                let (value, status) = stack.pop();
                assert!(status.is_clean(), "pop on a healthy stack reported {status}");
                assert_eq!(value, model.pop());
            }
            Op::Peek => assert_eq!(stack.peek().0, model.last().copied()),
            Op::Grow => {
                stack.resize(2.0);
            }
            Op::Shrink => {
                stack.resize(0.5);
            }
        }

        // INVARIANT: legal operations never corrupt the stack
        if let Err(violation) = check_well_formed(&stack) {
            panic!("stack not well formed after {label}: {violation}");
        }
        assert_eq!(stack.to_vec(), model);
    }
});
