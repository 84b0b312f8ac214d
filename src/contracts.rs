// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Precondition checks that run in every build.
//!
//! These replace assertions that vanish in release mode. Each check returns
//! a [`ContractViolation`] instead of panicking, so the caller decides
//! whether a violated precondition is fatal. The storage layer uses them to
//! refuse a bad resize; tests and auditing code use [`check_well_formed`] to
//! confirm the invariants that `verify` does not probe on its own (poison in
//! every unused slot).
//!
//! # Usage
//!
//! ```ignore
//! use guardstack::contracts::check_well_formed;
//!
//! check_well_formed(&stack)?;
//! ```

use crate::dump::DiagnosticSink;
use crate::error::ContractViolation;
use crate::integrity::POISON;
use crate::stack::GuardedStack;

/// A resize multiplier must be positive and finite.
#[inline]
pub fn check_multiplier(multiplier: f64) -> Result<(), ContractViolation> {
    // INVARIANT: capacity is only ever scaled by a positive finite factor.
    if multiplier.is_finite() && multiplier > 0.0 {
        Ok(())
    } else {
        Err(ContractViolation::InvalidMultiplier { multiplier })
    }
}

/// Compute `current * multiplier` and check it can hold `live` elements.
///
/// The product is truncated toward zero, so halving 7 slots gives 3.
#[inline]
pub fn target_capacity(
    current: usize,
    multiplier: f64,
    live: usize,
) -> Result<usize, ContractViolation> {
    check_multiplier(multiplier)?;

    // Float to int casts saturate, so an absurd product becomes usize::MAX
    // and fails later as an allocation overflow.
    let target = (current as f64 * multiplier) as usize;

    // INVARIANT: a live stack always has at least one slot.
    if target == 0 {
        return Err(ContractViolation::ZeroCapacity);
    }
    // INVARIANT: resizing never discards live elements.
    if target < live {
        return Err(ContractViolation::CapacityBelowSize { target, live });
    }
    Ok(target)
}

/// Every slot in `[size, capacity)` must hold the poison value.
pub fn check_poisoned<S: DiagnosticSink>(stack: &GuardedStack<S>) -> Result<(), ContractViolation> {
    let Some(buffer) = stack.buffer() else {
        return Ok(());
    };
    // INVARIANT: unused slots are poisoned.
    for (index, value) in buffer.slots().enumerate().skip(stack.len()) {
        if value != POISON {
            return Err(ContractViolation::UnpoisonedSlot { index, value });
        }
    }
    Ok(())
}

/// Full audit: a clean verification plus poisoned unused slots.
pub fn check_well_formed<S: DiagnosticSink>(
    stack: &GuardedStack<S>,
) -> Result<(), ContractViolation> {
    let status = stack.check().union(stack.status());
    if !status.is_clean() {
        return Err(ContractViolation::NotClean { status });
    }
    check_poisoned(stack)
}
