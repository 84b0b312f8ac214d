// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Corruption flags and the status bit-set every operation returns.
//!
//! A stack never throws on corruption. It hands back a [`Status`]: a set of
//! independently detected [`Corruption`] kinds. The empty set means clean.
//! Several flags can be set by a single verification pass, so callers should
//! test membership with [`Status::contains`] rather than compare for equality.
//!
//! The flag-to-message mapping lives on [`Corruption`] itself. There is no
//! separate lookup table indexed by bit position to drift out of sync.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::ser::{Serialize, SerializeSeq, Serializer};

/// One independently detectable kind of corruption or misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Corruption {
    /// The backing buffer is missing.
    NullData,
    /// The live element count is negative.
    WrongPos,
    /// Capacity is non-positive, disagrees with the buffer, or a reallocation failed.
    WrongSize,
    /// More live elements than allocated slots.
    PosHigherSize,
    /// The stack was torn down with `destroy`.
    DestroyedStack,
    /// The guard word in front of the stack handle was overwritten.
    LeftCanaryScreams,
    /// The guard word behind the stack handle was overwritten.
    RightCanaryScreams,
    /// The guard word behind the payload region was overwritten.
    RightDataCanary,
    /// The guard word in front of the payload region was overwritten.
    LeftDataCanary,
    /// The payload checksum no longer matches the buffer contents.
    DataHashError,
    /// The control checksum no longer matches size, capacity and status.
    StructHashError,
}

impl Corruption {
    /// Every flag, in bit order.
    pub const ALL: [Corruption; 11] = [
        Corruption::NullData,
        Corruption::WrongPos,
        Corruption::WrongSize,
        Corruption::PosHigherSize,
        Corruption::DestroyedStack,
        Corruption::LeftCanaryScreams,
        Corruption::RightCanaryScreams,
        Corruption::RightDataCanary,
        Corruption::LeftDataCanary,
        Corruption::DataHashError,
        Corruption::StructHashError,
    ];

    /// The single bit this flag occupies in a [`Status`].
    pub const fn bit(self) -> u16 {
        match self {
            Corruption::NullData => 1 << 0,
            Corruption::WrongPos => 1 << 1,
            Corruption::WrongSize => 1 << 2,
            Corruption::PosHigherSize => 1 << 3,
            Corruption::DestroyedStack => 1 << 4,
            Corruption::LeftCanaryScreams => 1 << 5,
            Corruption::RightCanaryScreams => 1 << 6,
            Corruption::RightDataCanary => 1 << 7,
            Corruption::LeftDataCanary => 1 << 8,
            Corruption::DataHashError => 1 << 9,
            Corruption::StructHashError => 1 << 10,
        }
    }

    /// Stable identifier used in reports and JSON output.
    pub const fn name(self) -> &'static str {
        match self {
            Corruption::NullData => "NullData",
            Corruption::WrongPos => "WrongPos",
            Corruption::WrongSize => "WrongSize",
            Corruption::PosHigherSize => "PosHigherSize",
            Corruption::DestroyedStack => "DestroyedStack",
            Corruption::LeftCanaryScreams => "LeftCanaryScreams",
            Corruption::RightCanaryScreams => "RightCanaryScreams",
            Corruption::RightDataCanary => "RightDataCanary",
            Corruption::LeftDataCanary => "LeftDataCanary",
            Corruption::DataHashError => "DataHashError",
            Corruption::StructHashError => "StructHashError",
        }
    }

    /// Human-readable explanation written into diagnostic dumps.
    pub const fn describe(self) -> &'static str {
        match self {
            Corruption::NullData => "data buffer is missing",
            Corruption::WrongPos => "element count is negative",
            Corruption::WrongSize => "capacity is invalid or a reallocation failed",
            Corruption::PosHigherSize => "element count exceeds capacity",
            Corruption::DestroyedStack => "stack has been destroyed",
            Corruption::LeftCanaryScreams => {
                "guard in front of the stack handle was overwritten"
            }
            Corruption::RightCanaryScreams => "guard behind the stack handle was overwritten",
            Corruption::RightDataCanary => "guard behind the data buffer was overwritten",
            Corruption::LeftDataCanary => "guard in front of the data buffer was overwritten",
            Corruption::DataHashError => "data checksum mismatch, buffer contents changed",
            Corruption::StructHashError => "control checksum mismatch, metadata changed",
        }
    }
}

impl fmt::Display for Corruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of [`Corruption`] flags. Empty means clean.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Status(u16);

impl Status {
    pub const CLEAN: Status = Status(0);

    const MASK: u16 = (1u16 << Corruption::ALL.len() as u32) - 1;

    /// Build a status from raw bits, dropping bits that map to no flag.
    pub const fn from_bits_truncate(bits: u16) -> Self {
        Self(bits & Self::MASK)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_clean(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, flag: Corruption) -> bool {
        self.0 & flag.bit() != 0
    }

    pub fn insert(&mut self, flag: Corruption) {
        self.0 |= flag.bit();
    }

    pub const fn with(self, flag: Corruption) -> Self {
        Self(self.0 | flag.bit())
    }

    pub const fn union(self, other: Status) -> Self {
        Self(self.0 | other.0)
    }

    /// Number of flags set.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// No flags set. Same as [`Status::is_clean`].
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Flags set in `self` but not in `other`.
    pub const fn difference(self, other: Status) -> Self {
        Self(self.0 & !other.0)
    }

    /// Iterate the set flags in bit order.
    pub fn iter(self) -> impl Iterator<Item = Corruption> {
        Corruption::ALL
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }
}

impl From<Corruption> for Status {
    fn from(flag: Corruption) -> Self {
        Status(flag.bit())
    }
}

impl FromIterator<Corruption> for Status {
    fn from_iter<I: IntoIterator<Item = Corruption>>(iter: I) -> Self {
        iter.into_iter().fold(Status::CLEAN, Status::with)
    }
}

impl BitOr for Status {
    type Output = Status;

    fn bitor(self, rhs: Status) -> Status {
        self.union(rhs)
    }
}

impl BitOr<Corruption> for Status {
    type Output = Status;

    fn bitor(self, rhs: Corruption) -> Status {
        self.with(rhs)
    }
}

impl BitOrAssign for Status {
    fn bitor_assign(&mut self, rhs: Status) {
        self.0 |= rhs.0;
    }
}

impl BitOrAssign<Corruption> for Status {
    fn bitor_assign(&mut self, rhs: Corruption) {
        self.insert(rhs);
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return f.write_str("clean");
        }
        for (i, flag) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            f.write_str(flag.name())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status({})", self)
    }
}

/// Serialized as the list of set flag names.
impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for flag in self.iter() {
            seq.serialize_element(flag.name())?;
        }
        seq.end()
    }
}
