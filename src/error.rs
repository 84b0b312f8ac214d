// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Errors for the plumbing around the stack.
//!
//! Corruption is not an error here: it travels as a [`Status`](crate::Status).
//! These types cover configuration, diagnostic sinks, allocation and
//! precondition checks, where a `Result` is the honest return type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A [`StackConfig`](crate::StackConfig) that cannot produce a valid stack.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("base capacity must be at least 1")]
    ZeroBaseCapacity,

    #[error("max capacity {max} is below base capacity {base}")]
    MaxBelowBase { base: usize, max: usize },

    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON")]
    Parse(#[from] serde_json::Error),
}

/// Failure to deliver a diagnostic report.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open diagnostic log {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write diagnostic report")]
    Write(#[from] io::Error),

    #[error("diagnostic sink is already closed")]
    Closed,
}

/// The allocator could not provide a buffer of the requested size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("capacity {capacity} overflows the addressable byte range")]
    Overflow { capacity: usize },

    #[error("allocator refused {bytes} bytes")]
    Refused { bytes: usize },

    #[error("capacity {requested} exceeds the configured budget of {budget}")]
    OverBudget { requested: usize, budget: usize },
}

/// A precondition that was checked and did not hold.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractViolation {
    #[error("resize multiplier {multiplier} is not a positive finite number")]
    InvalidMultiplier { multiplier: f64 },

    #[error("target capacity {target} cannot hold {live} live elements")]
    CapacityBelowSize { target: usize, live: usize },

    #[error("target capacity must be at least 1")]
    ZeroCapacity,

    #[error("unused slot {index} holds {value:#x} instead of the poison value")]
    UnpoisonedSlot { index: usize, value: i32 },

    #[error("stack status is not clean: {status}")]
    NotClean { status: crate::Status },
}
