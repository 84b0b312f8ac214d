// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Construction-time configuration.
//!
//! Every protection layer is a runtime switch fixed when the stack is built,
//! so all combinations can be exercised from one binary and one test run.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::checksum::ChecksumKind;
use crate::error::ConfigError;

/// Number of slots a fresh stack allocates.
pub const BASE_CAPACITY: usize = 8;

/// Which checks a stack runs and how it sizes its buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StackConfig {
    /// Label used in reports and log events.
    pub name: String,
    /// Guard words around the handle and around the payload.
    pub guards: bool,
    /// Checksums over payload and control metadata.
    pub checksums: bool,
    pub checksum_kind: ChecksumKind,
    /// Emit a diagnostic report before every push and pop.
    pub dump: bool,
    pub base_capacity: usize,
    /// Growth past this many slots fails as if the allocator refused.
    pub max_capacity: Option<usize>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            name: "stack".to_string(),
            guards: true,
            checksums: true,
            checksum_kind: ChecksumKind::Weighted,
            dump: false,
            base_capacity: BASE_CAPACITY,
            max_capacity: None,
        }
    }
}

impl StackConfig {
    /// Every protection layer on, dumping included.
    pub fn hardened() -> Self {
        Self {
            dump: true,
            ..Self::default()
        }
    }

    /// Poison slots and structural checks only.
    pub fn unprotected() -> Self {
        Self {
            guards: false,
            checksums: false,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_guards(mut self, enabled: bool) -> Self {
        self.guards = enabled;
        self
    }

    pub fn with_checksums(mut self, enabled: bool) -> Self {
        self.checksums = enabled;
        self
    }

    pub fn with_checksum_kind(mut self, kind: ChecksumKind) -> Self {
        self.checksum_kind = kind;
        self
    }

    pub fn with_dump(mut self, enabled: bool) -> Self {
        self.dump = enabled;
        self
    }

    pub fn with_base_capacity(mut self, capacity: usize) -> Self {
        self.base_capacity = capacity;
        self
    }

    pub fn with_max_capacity(mut self, capacity: usize) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_capacity == 0 {
            return Err(ConfigError::ZeroBaseCapacity);
        }
        if let Some(max) = self.max_capacity {
            if max < self.base_capacity {
                return Err(ConfigError::MaxBelowBase {
                    base: self.base_capacity,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: StackConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}
