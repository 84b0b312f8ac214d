// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The storage manager: allocation, resizing, poisoning and teardown.
//!
//! Resizing gives the strong guarantee. Either the buffer ends up at the new
//! capacity with both guards rewritten and every slot past the live count
//! poisoned, or nothing changed at all.

use crate::buffer::GuardedBuffer;
use crate::contracts;
use crate::dump::DiagnosticSink;
use crate::error::AllocError;
use crate::integrity::{self, DESTROYED, DESTROYED_WORD, GUARD, POISON};
use crate::stack::GuardedStack;
use crate::status::{Corruption, Status};

impl<S: DiagnosticSink> GuardedStack<S> {
    /// (Re)initialise: allocate the base capacity, poison every slot, write
    /// guards and checksums.
    ///
    /// Any previous contents are discarded. If the allocation fails the
    /// stack is left without a buffer and its status carries `NullData`.
    pub fn init(&mut self) -> Status {
        let base = self.config.base_capacity;

        self.left_guard = GUARD;
        self.right_guard = GUARD;
        self.size = 0;
        self.capacity = i64::try_from(base).unwrap_or(i64::MAX);
        self.status = Status::CLEAN;
        self.data_checksum = 0;
        self.control_checksum = 0;

        match GuardedBuffer::allocate(base, self.config.guards) {
            Ok(buffer) => self.buffer = Some(buffer),
            Err(err) => {
                tracing::error!(stack = %self.config.name, error = %err, "stack allocation failed");
                self.buffer = None;
                self.status = Status::from(Corruption::NullData);
                return self.status;
            }
        }

        self.poison_unused();
        integrity::rehash(self);
        tracing::debug!(stack = %self.config.name, capacity = base, "stack initialised");
        self.status
    }

    /// Scale capacity by `multiplier` (2.0 grows, 0.5 shrinks).
    ///
    /// A no-op returning the status if the stack is not clean. An invalid
    /// multiplier, a target below the live count or an allocation failure
    /// returns `WrongSize` and leaves the stack untouched and clean.
    pub fn resize(&mut self, multiplier: f64) -> Status {
        let status = self.verify();
        if !status.is_clean() {
            return status;
        }
        if let Err(failure) = self.change_capacity(multiplier) {
            return failure;
        }
        integrity::rehash(self);
        self.status
    }

    /// Reallocate without verifying or rehashing. Callers do both.
    pub(crate) fn change_capacity(&mut self, multiplier: f64) -> Result<(), Status> {
        let current = self.capacity();
        let refused = Status::from(Corruption::WrongSize);

        let target = match contracts::target_capacity(current, multiplier, self.live_len()) {
            Ok(target) => target,
            Err(violation) => {
                tracing::warn!(stack = %self.config.name, %violation, "resize refused");
                return Err(refused);
            }
        };

        if let Some(budget) = self.config.max_capacity {
            if target > budget {
                let err = AllocError::OverBudget {
                    requested: target,
                    budget,
                };
                tracing::error!(stack = %self.config.name, error = %err, "stack reallocation failed");
                return Err(refused);
            }
        }

        let Some(buffer) = self.buffer.as_mut() else {
            return Err(Status::from(Corruption::NullData));
        };
        if let Err(err) = buffer.reallocate(target) {
            tracing::error!(stack = %self.config.name, error = %err, "stack reallocation failed");
            return Err(refused);
        }

        self.capacity = i64::try_from(target).unwrap_or(i64::MAX);
        self.poison_unused();
        tracing::debug!(stack = %self.config.name, from = current, to = target, "stack resized");
        Ok(())
    }

    /// Write the poison value into every slot past the live count.
    pub(crate) fn poison_unused(&mut self) {
        let live = self.live_len();
        if let Some(buffer) = self.buffer.as_mut() {
            let capacity = buffer.capacity();
            buffer.fill(live..capacity, POISON);
        }
    }

    /// Release the buffer and stamp every control word with a destroyed
    /// sentinel.
    ///
    /// The recorded status becomes `DestroyedStack`, so `status`, `verify`
    /// and dumps report it at once. Push and pop are no-ops afterwards.
    /// Destroying twice is itself a no-op that returns `DestroyedStack`.
    pub fn destroy(&mut self) -> Status {
        if self.check().contains(Corruption::DestroyedStack) {
            return Status::from(Corruption::DestroyedStack);
        }

        self.buffer = None;
        self.size = DESTROYED;
        self.capacity = DESTROYED;
        self.left_guard = DESTROYED_WORD;
        self.right_guard = DESTROYED_WORD;
        self.data_checksum = DESTROYED_WORD;
        self.control_checksum = DESTROYED_WORD;
        self.status = Status::from(Corruption::DestroyedStack);

        tracing::debug!(stack = %self.config.name, "stack destroyed");
        Status::CLEAN
    }
}
