//! Shared test utilities and fixtures.

#![allow(dead_code)]

use guardstack::contracts::check_well_formed;
use guardstack::{DiagnosticSink, Element, GuardedStack, MemorySink, StackConfig};

// Re-export canonical test utilities from guardstack::testing
pub use guardstack::testing::{all_protection_configs, corrupt, stack_with, Tamper};

// ============================================================================
// BUILDERS
// ============================================================================

/// Default stack that records every dump in memory.
pub fn recording_stack(values: &[Element]) -> GuardedStack<MemorySink> {
    let config = StackConfig::default().with_name("recording").with_dump(true);
    let mut stack = GuardedStack::with_sink(config, MemorySink::new()).expect("valid config");
    for &value in values {
        stack.push(value);
    }
    stack
}

/// A config whose growth stops at `max` slots.
pub fn budgeted(max: usize) -> StackConfig {
    StackConfig::default().with_name("budgeted").with_max_capacity(max)
}

// ============================================================================
// ASSERTIONS
// ============================================================================

/// Assert every structural and integrity invariant holds.
pub fn assert_stack_well_formed<S: DiagnosticSink>(stack: &GuardedStack<S>) {
    if let Err(violation) = check_well_formed(stack) {
        panic!("stack {:?} not well formed: {violation}", stack.config().name);
    }
}

/// Assert the stack holds exactly `expected`, bottom first.
pub fn assert_contents<S: DiagnosticSink>(stack: &GuardedStack<S>, expected: &[Element]) {
    assert_eq!(stack.len(), expected.len(), "size mismatch");
    assert_eq!(stack.to_vec(), expected, "contents mismatch");
}

/// Whether `capacity` is `base` times a power of two.
pub fn is_power_of_two_multiple(capacity: usize, base: usize) -> bool {
    capacity >= base && capacity % base == 0 && (capacity / base).is_power_of_two()
}
