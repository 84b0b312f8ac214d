// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for corruption detection.
//!
//! Any guarded word overwritten with a different value must be reported, and
//! a stack that reports corruption must refuse to change.

#![no_main]

use arbitrary::Arbitrary;
use guardstack::testing::{corrupt, stack_with, Tamper};
use guardstack::{StackConfig, GUARD};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Target {
    LeftStructGuard(u64),
    RightStructGuard(u64),
    LeftDataGuard(u64),
    RightDataGuard(u64),
    PayloadByte { offset: u16, mask: u8 },
    Size(i64),
    ControlChecksum(u64),
}

#[derive(Debug, Arbitrary)]
struct Input {
    values: Vec<i32>,
    target: Target,
}

fuzz_target!(|input: Input| {
    let values: Vec<i32> = input.values.into_iter().take(256).collect();
    let mut stack = stack_with(StackConfig::default(), &values);
    let checksum_before = stack.checksums().1;

    let (tamper, must_detect) = match input.target {
        Target::LeftStructGuard(v) => (Tamper::LeftStructGuard(v), v != GUARD),
        Target::RightStructGuard(v) => (Tamper::RightStructGuard(v), v != GUARD),
        Target::LeftDataGuard(v) => (Tamper::LeftDataGuard(v), v != GUARD),
        Target::RightDataGuard(v) => (Tamper::RightDataGuard(v), v != GUARD),
        Target::PayloadByte { offset, mask } => (
            Tamper::PayloadByte {
                offset: usize::from(offset),
                mask,
            },
            mask != 0,
        ),
        Target::Size(v) => (Tamper::Size(v), v != values.len() as i64),
        Target::ControlChecksum(v) => (Tamper::ControlChecksum(v), v != checksum_before),
    };

    let applied = corrupt(&mut stack, tamper);
    let status = stack.verify();

    if applied && must_detect {
        assert!(!status.is_clean(), "{tamper:?} went unnoticed");
        let snapshot = stack.to_vec();
        assert!(!stack.push(0).is_clean());
        assert_eq!(stack.pop().0, None);
        assert_eq!(stack.to_vec(), snapshot);
    }
});
