// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for JSON stack configuration.
//!
//! Untrusted config files must parse to a valid config or an error, never a
//! panic, and every accepted config must build a clean stack or fail its
//! allocation with `NullData`.

#![no_main]

use guardstack::{Corruption, GuardedStack, StackConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = StackConfig::from_json_str(text) else {
        return;
    };

    assert!(config.validate().is_ok());
    if config.base_capacity > 1 << 20 {
        return;
    }

    let stack = GuardedStack::new(config).expect("validated config must build");
    let status = stack.status();
    assert!(
        status.is_clean() || status.contains(Corruption::NullData),
        "fresh stack reported {status}"
    );
});
