// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The stack handle and its public operations.
//!
//! Every mutating call follows the same protocol: verify, optionally dump,
//! mutate only if clean, then rehash. A caller that ignores a non-clean
//! status keeps getting no-ops with the same (or a larger) status back.

use std::fmt;
use std::panic::Location;

use crate::buffer::{Element, GuardedBuffer};
use crate::config::StackConfig;
use crate::dump::{DiagnosticSink, DumpContext, NullSink, Report};
use crate::error::{ConfigError, SinkError};
use crate::integrity::{self, GUARD, POISON};
use crate::status::{Corruption, Status};

/// Multiplier applied to capacity when a push finds the buffer full.
pub const GROWTH_FACTOR: f64 = 2.0;

/// Multiplier applied to capacity when pops leave it mostly empty.
pub const SHRINK_FACTOR: f64 = 0.5;

/// A dynamic stack of [`Element`]s that checks itself before every mutation.
///
/// Field order mirrors the protected layout: a guard word, the control
/// fields, the checksums, and a closing guard word. Size and capacity are
/// kept as signed words so that a stray write producing a negative count is
/// representable and detectable.
pub struct GuardedStack<S: DiagnosticSink = NullSink> {
    pub(crate) left_guard: u64,
    pub(crate) buffer: Option<GuardedBuffer>,
    pub(crate) size: i64,
    pub(crate) capacity: i64,
    pub(crate) status: Status,
    pub(crate) data_checksum: u64,
    pub(crate) control_checksum: u64,
    pub(crate) right_guard: u64,
    pub(crate) config: StackConfig,
    pub(crate) sink: S,
}

impl GuardedStack<NullSink> {
    /// Build and initialise a stack that discards diagnostic dumps.
    ///
    /// An allocation failure does not return `Err`: the stack comes back with
    /// `NullData` set and refuses every operation.
    pub fn new(config: StackConfig) -> Result<Self, ConfigError> {
        Self::with_sink(config, NullSink)
    }
}

impl<S: DiagnosticSink> GuardedStack<S> {
    pub fn with_sink(config: StackConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut stack = Self {
            left_guard: GUARD,
            buffer: None,
            size: 0,
            capacity: 0,
            status: Status::CLEAN,
            data_checksum: 0,
            control_checksum: 0,
            right_guard: GUARD,
            config,
            sink,
        };
        stack.init();
        Ok(stack)
    }

    // ------------------------------------------------------------------------
    // Verification
    // ------------------------------------------------------------------------

    /// Verify the stack and fold the result into its recorded status.
    ///
    /// Recorded flags are sticky: restoring a clobbered word does not clear
    /// the flag it raised.
    pub fn verify(&mut self) -> Status {
        let found = integrity::check(self);
        let fresh = found.difference(self.status);
        if !fresh.is_clean() {
            tracing::warn!(stack = %self.config.name, detected = %fresh, "stack verification failed");
        }
        self.status |= found;
        self.status
    }

    /// Verify without recording anything.
    pub fn check(&self) -> Status {
        integrity::check(self)
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Push `value`, doubling capacity first if the buffer is full.
    ///
    /// If growth fails the value is not inserted and `WrongSize` is returned.
    /// The stack itself stays clean and keeps its previous buffer.
    #[track_caller]
    pub fn push(&mut self, value: Element) -> Status {
        let status = self.verify();
        self.observe("push", Location::caller());
        if !status.is_clean() {
            return status;
        }

        if self.size == self.capacity {
            if let Err(failure) = self.change_capacity(GROWTH_FACTOR) {
                return failure;
            }
        }

        let index = self.live_len();
        let written = self
            .buffer
            .as_mut()
            .is_some_and(|buffer| buffer.set_slot(index, value));
        if !written {
            return Status::from(Corruption::WrongSize);
        }

        self.size += 1;
        tracing::trace!(stack = %self.config.name, value, size = self.size, "push");
        integrity::rehash(self);
        self.status
    }

    /// Pop the top element.
    ///
    /// Returns `None` for an empty or non-clean stack; the status says which.
    /// When fewer than a quarter of the slots stay live and halving would not
    /// drop below the base capacity, the buffer is halved.
    #[track_caller]
    pub fn pop(&mut self) -> (Option<Element>, Status) {
        let status = self.verify();
        self.observe("pop", Location::caller());
        if !status.is_clean() || self.size == 0 {
            return (None, status);
        }

        let top = self.live_len() - 1;
        let Some(buffer) = self.buffer.as_mut() else {
            return (None, status);
        };
        let Some(value) = buffer.slot(top) else {
            return (None, status);
        };
        buffer.set_slot(top, POISON);
        self.size -= 1;
        tracing::trace!(stack = %self.config.name, value, size = self.size, "pop");

        if self.should_shrink() {
            // A failed shrink keeps the larger buffer, which is still valid.
            let _ = self.change_capacity(SHRINK_FACTOR);
        }

        integrity::rehash(self);
        (Some(value), self.status)
    }

    /// Read the top element after verifying.
    pub fn peek(&mut self) -> (Option<Element>, Status) {
        let status = self.verify();
        if !status.is_clean() || self.size == 0 {
            return (None, status);
        }
        let top = self.live_len() - 1;
        (self.buffer.as_ref().and_then(|b| b.slot(top)), status)
    }

    fn should_shrink(&self) -> bool {
        let base = self.config.base_capacity as f64;
        let capacity = self.capacity as f64;
        (self.size as f64) < capacity * SHRINK_FACTOR * SHRINK_FACTOR
            && capacity * SHRINK_FACTOR >= base
    }

    // ------------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------------

    /// Write a report of the current state to the sink.
    ///
    /// Sink failures are returned but never touch the stack's status.
    pub fn dump(&mut self, context: &DumpContext) -> Result<(), SinkError> {
        let report = Report::capture(self, context);
        self.sink.write_report(&report)
    }

    /// Snapshot without writing anywhere.
    pub fn report(&self, context: &DumpContext) -> Report {
        Report::capture(self, context)
    }

    /// Automatic pre-mutation dump, only when enabled in the config.
    fn observe(&mut self, operation: &str, caller: &Location<'_>) {
        if !self.config.dump {
            return;
        }
        let context = DumpContext::at(&self.config.name, operation, caller);
        if let Err(err) = self.dump(&context) {
            tracing::warn!(stack = %self.config.name, error = %err, "diagnostic dump failed");
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Live element count, zero if the recorded size is negative.
    pub fn len(&self) -> usize {
        self.live_len()
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Recorded slot count, zero if the recorded capacity is not positive.
    pub fn capacity(&self) -> usize {
        usize::try_from(self.capacity).unwrap_or(0)
    }

    /// The recorded status, as of the last operation.
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// The backing buffer, `None` once destroyed or if allocation failed.
    pub fn buffer(&self) -> Option<&GuardedBuffer> {
        self.buffer.as_ref()
    }

    /// Handle guard words as `(left, right)`.
    pub fn struct_guards(&self) -> (u64, u64) {
        (self.left_guard, self.right_guard)
    }

    /// Stored checksums as `(data, control)`.
    pub fn checksums(&self) -> (u64, u64) {
        (self.data_checksum, self.control_checksum)
    }

    /// Live elements bottom to top. Empty unless the recorded status is clean.
    pub fn to_vec(&self) -> Vec<Element> {
        match &self.buffer {
            Some(buffer) if self.status.is_clean() => {
                buffer.slots().take(self.live_len()).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Tear the stack down and hand back its sink, flushed.
    pub fn into_sink(mut self) -> Result<S, SinkError> {
        self.destroy();
        self.sink.flush()?;
        Ok(self.sink)
    }

    pub(crate) fn live_len(&self) -> usize {
        usize::try_from(self.size).unwrap_or(0)
    }
}

impl<S: DiagnosticSink> fmt::Debug for GuardedStack<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedStack")
            .field("name", &self.config.name)
            .field("size", &self.size)
            .field("capacity", &self.capacity)
            .field("status", &self.status)
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}
