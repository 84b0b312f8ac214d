// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Diagnostic dumps: a snapshot of the stack written to an explicit sink.
//!
//! The sink is owned by the stack (`GuardedStack<S>`), handed in at
//! construction and handed back by `into_sink`. Nothing here is global. A
//! [`FileSink`] flushes when closed and again when dropped, so a report that
//! was accepted is on disk no matter how the owner exits.
//!
//! Reports only print slot contents and guard words while the stack is
//! clean. Once metadata is suspect the dump sticks to what can be read
//! without trusting it.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use crate::buffer::Element;
use crate::error::SinkError;
use crate::integrity::POISON;
use crate::stack::GuardedStack;
use crate::status::Status;

// ============================================================================
// CONTEXT
// ============================================================================

/// Where and when a dump was requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpContext {
    /// Label of the stack or the expression that named it.
    pub name: String,
    pub file: String,
    pub line: u32,
    /// Module path or operation that requested the dump.
    pub function: String,
    pub timestamp: String,
}

impl DumpContext {
    pub fn new(name: impl Into<String>, file: &str, line: u32, function: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.to_string(),
            line,
            function: function.into(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Context for an automatic dump issued by `operation` on behalf of `caller`.
    pub fn at(name: &str, operation: &str, caller: &Location<'_>) -> Self {
        Self::new(name, caller.file(), caller.line(), operation)
    }
}

/// Build a [`DumpContext`] for the current source location.
///
/// ```ignore
/// stack.dump(&dump_context!("orders"))?;
/// ```
#[macro_export]
macro_rules! dump_context {
    ($name:expr) => {
        $crate::DumpContext::new($name, file!(), line!(), module_path!())
    };
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GuardWords {
    pub left_struct: u64,
    pub right_struct: u64,
    pub left_data: Option<u64>,
    pub right_data: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Checksums {
    pub data: u64,
    pub control: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotEntry {
    pub index: usize,
    pub value: Element,
    pub poisoned: bool,
}

/// Snapshot of a stack at dump time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub stack: String,
    pub context: DumpContext,
    pub size: i64,
    pub capacity: i64,
    pub status: Status,
    pub problems: Vec<&'static str>,
    pub guards: Option<GuardWords>,
    pub checksums: Option<Checksums>,
    pub slots: Vec<SlotEntry>,
}

impl Report {
    pub fn capture<S: DiagnosticSink>(stack: &GuardedStack<S>, context: &DumpContext) -> Self {
        let config = stack.config();
        let status = stack.status();
        let clean = status.is_clean();

        let guards = (config.guards && clean).then(|| GuardWords {
            left_struct: stack.left_guard,
            right_struct: stack.right_guard,
            left_data: stack.buffer.as_ref().and_then(|b| b.left_guard()),
            right_data: stack.buffer.as_ref().and_then(|b| b.right_guard()),
        });

        let checksums = config.checksums.then_some(Checksums {
            data: stack.data_checksum,
            control: stack.control_checksum,
        });

        let slots = match (&stack.buffer, clean) {
            (Some(buffer), true) => buffer
                .slots()
                .enumerate()
                .map(|(index, value)| SlotEntry {
                    index,
                    value,
                    poisoned: value == POISON,
                })
                .collect(),
            _ => Vec::new(),
        };

        Self {
            stack: config.name.clone(),
            context: context.clone(),
            size: stack.size,
            capacity: stack.capacity,
            status,
            problems: status.iter().map(|flag| flag.describe()).collect(),
            guards,
            checksums,
            slots,
        }
    }

    /// Human-readable rendering. Not a stable format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let ctx = &self.context;

        let _ = writeln!(out, "[{}]", ctx.timestamp);
        let _ = writeln!(
            out,
            "stack \"{}\" ({}) from line[{}], func[{}], file[{}]",
            self.stack, ctx.name, ctx.line, ctx.function, ctx.file
        );
        let _ = writeln!(out, "{{");
        let _ = writeln!(out, "    size = {}", self.size);
        let _ = writeln!(out, "    capacity = {}", self.capacity);
        let _ = writeln!(out, "    status = {} ({})", self.status.bits(), self.status);
        let _ = writeln!(out);

        if self.problems.is_empty() {
            let _ = writeln!(out, "    no errors.");
        }
        for problem in &self.problems {
            let _ = writeln!(out, "    *error: {}", problem);
        }
        let _ = writeln!(out);

        if let Some(guards) = &self.guards {
            let _ = writeln!(out, "    left struct guard  = {:#x}", guards.left_struct);
            let _ = writeln!(out, "    right struct guard = {:#x}", guards.right_struct);
            if let (Some(left), Some(right)) = (guards.left_data, guards.right_data) {
                let _ = writeln!(out, "    left data guard    = {:#x}", left);
                let _ = writeln!(out, "    right data guard   = {:#x}", right);
            }
            let _ = writeln!(out);
        }

        if let Some(sums) = &self.checksums {
            let _ = writeln!(out, "    control checksum = {}", sums.control);
            let _ = writeln!(out, "    data checksum    = {}", sums.data);
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "    {{");
        for slot in &self.slots {
            if slot.poisoned {
                let _ = writeln!(out, "        [{}] = {:#x} (PoisonVal)", slot.index, slot.value);
            } else {
                let _ = writeln!(out, "        [{}] = {}", slot.index, slot.value);
            }
        }
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "}}");
        out
    }
}

// ============================================================================
// SINKS
// ============================================================================

/// Destination for diagnostic reports.
pub trait DiagnosticSink {
    fn write_report(&mut self, report: &Report) -> Result<(), SinkError>;

    /// Push buffered output to its destination.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn write_report(&mut self, _report: &Report) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Keeps reports in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    reports: Vec<Report>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn into_reports(self) -> Vec<Report> {
        self.reports
    }
}

impl DiagnosticSink for MemorySink {
    fn write_report(&mut self, report: &Report) -> Result<(), SinkError> {
        self.reports.push(report.clone());
        Ok(())
    }
}

/// Forwards every rendered line to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn write_report(&mut self, report: &Report) -> Result<(), SinkError> {
        for line in report.render().lines() {
            tracing::debug!(target: "guardstack::dump", stack = %report.stack, "{}", line);
        }
        Ok(())
    }
}

/// Appends rendered reports to a log file.
///
/// The file is created (truncated) on [`FileSink::create`] and flushed on
/// [`FileSink::close`] or drop.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| SinkError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and release the file. Later writes fail with [`SinkError::Closed`].
    pub fn close(&mut self) -> Result<(), SinkError> {
        match self.writer.take() {
            Some(mut writer) => {
                writer.flush()?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl DiagnosticSink for FileSink {
    fn write_report(&mut self, report: &Report) -> Result<(), SinkError> {
        let writer = self.writer.as_mut().ok_or(SinkError::Closed)?;
        writer.write_all(report.render().as_bytes())?;
        writeln!(writer)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        let writer = self.writer.as_mut().ok_or(SinkError::Closed)?;
        writer.flush()?;
        Ok(())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to flush diagnostic log");
        }
    }
}
