// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! A dynamic stack that detects corruption at the moment it happens.
//!
//! Three independent protection layers sit around an ordinary growable array:
//!
//! - **Poison**: every unused slot holds a recognizable sentinel.
//! - **Guards**: fixed words bracket the handle and the payload buffer, so an
//!   adjacent overwrite shows up as a changed guard.
//! - **Checksums**: one over the payload bytes and one over the control
//!   fields, recomputed after every successful mutation.
//!
//! Detection, not repair. Each operation verifies first and returns a
//! [`Status`]; if anything is wrong the operation does nothing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   verify    ┌───────────────┐   checksums  ┌─────────────┐
//! │  stack.rs    │────────────▶│ integrity.rs  │─────────────▶│ checksum.rs │
//! │ (push, pop,  │             │ (check,       │              │ (weighted,  │
//! │  peek, dump) │             │  rehash)      │              │  crc32)     │
//! └──────────────┘             └───────────────┘              └─────────────┘
//!        │ mutate                      │ guard words
//!        ▼                             ▼
//! ┌──────────────┐  reallocate ┌───────────────┐
//! │ storage.rs   │────────────▶│  buffer.rs    │
//! │ (init,resize,│             │ (guard region │
//! │  destroy)    │             │  + payload)   │
//! └──────────────┘             └───────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use guardstack::{Corruption, GuardedStack, StackConfig};
//!
//! let mut stack = GuardedStack::new(StackConfig::default()).unwrap();
//! for _ in 0..10 {
//!     assert!(stack.push(10).is_clean());
//! }
//! assert_eq!(stack.capacity(), 16);
//!
//! let (value, status) = stack.pop();
//! assert_eq!(value, Some(10));
//! assert!(status.is_clean());
//!
//! stack.destroy();
//! assert!(stack.verify().contains(Corruption::DestroyedStack));
//! ```

pub mod buffer;
pub mod checksum;
pub mod config;
pub mod contracts;
pub mod dump;
pub mod error;
pub mod integrity;
mod stack;
pub mod status;
mod storage;
pub mod testing;

pub use buffer::{Element, GuardedBuffer};
pub use checksum::ChecksumKind;
pub use config::{StackConfig, BASE_CAPACITY};
pub use dump::{DiagnosticSink, DumpContext, FileSink, MemorySink, NullSink, Report, TracingSink};
pub use error::{AllocError, ConfigError, ContractViolation, SinkError};
pub use integrity::{check, DESTROYED, DESTROYED_WORD, GUARD, POISON};
pub use stack::{GuardedStack, GROWTH_FACTOR, SHRINK_FACTOR};
pub use status::{Corruption, Status};
