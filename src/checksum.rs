// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Checksums used to detect silent changes to payload and metadata.
//!
//! Neither function is cryptographic. The goal is catching stray writes, not
//! resisting an adversary. The weighted sum multiplies each byte by its
//! 1-based position so that a changed byte shifts the sum by a multiple of
//! its position, and swapped bytes usually shift it too. CRC32 is offered for
//! callers that want burst-error detection as well.

use crc32fast::Hasher as Crc32Hasher;
use serde::{Deserialize, Serialize};

/// Which digest the integrity engine computes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumKind {
    /// `Σ i · byte[i-1]` over the byte range, wrapping at 64 bits.
    #[default]
    Weighted,
    /// CRC32 (IEEE) widened to 64 bits.
    Crc32,
}

impl ChecksumKind {
    pub fn digest(self, bytes: &[u8]) -> u64 {
        match self {
            ChecksumKind::Weighted => weighted_sum(bytes),
            ChecksumKind::Crc32 => crc32(bytes),
        }
    }
}

/// Weighted positional sum. An empty range sums to zero.
pub fn weighted_sum(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .zip(1u64..)
        .fold(0u64, |acc, (&byte, position)| {
            acc.wrapping_add(position.wrapping_mul(u64::from(byte)))
        })
}

pub fn crc32(bytes: &[u8]) -> u64 {
    let mut hasher = Crc32Hasher::new();
    hasher.update(bytes);
    u64::from(hasher.finalize())
}
