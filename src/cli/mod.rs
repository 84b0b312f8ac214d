// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the guardstack command-line interface.
//!
//! Three subcommands: `demo` replays a push/pop workload with optional
//! dumping to a log file, `tamper` simulates one kind of corruption and shows
//! what verification catches, and `flags` prints the corruption table.

pub mod display;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "guardstack",
    about = "Self-verifying stack with poison, guards and checksums",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Push a value N times, pop everything, then destroy the stack
    Demo {
        /// Number of pushes (and pops)
        #[arg(short, long, default_value = "10")]
        count: usize,

        /// Value pushed each time
        #[arg(long, default_value = "10", allow_hyphen_values = true)]
        value: i32,

        /// JSON stack configuration (missing fields use defaults)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write a diagnostic dump before every push and pop to this file
        #[arg(long)]
        log: Option<PathBuf>,

        /// Print the final report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Simulate one corruption and show what verification reports
    Tamper {
        /// What to overwrite
        #[arg(value_enum)]
        target: TamperTarget,

        /// JSON stack configuration (missing fields use defaults)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Values pushed before tampering
        #[arg(short, long, default_value = "3")]
        count: usize,
    },

    /// List every corruption flag with its bit and message
    Flags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TamperTarget {
    /// Guard word in front of the handle
    LeftStructGuard,
    /// Guard word behind the handle
    RightStructGuard,
    /// Guard word in front of the payload
    LeftDataGuard,
    /// Guard word behind the payload
    RightDataGuard,
    /// One byte of the first slot
    PayloadByte,
    /// Size driven negative
    NegativeSize,
    /// Size driven past capacity
    OversizedSize,
    /// Control checksum overwritten
    ControlChecksum,
    /// Stack destroyed, then used
    Destroyed,
}
