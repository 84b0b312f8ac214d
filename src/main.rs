// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use guardstack::testing::{corrupt, Tamper};
use guardstack::{
    dump_context, Corruption, DiagnosticSink, FileSink, GuardedStack, Report, StackConfig, Status,
    GUARD,
};

mod cli;
use cli::display::{
    flag_line, row, section_bot, section_mid, section_top, status_badge, themed, word, GRAY,
};
use cli::{Cli, Commands, TamperTarget};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            count,
            value,
            config,
            log,
            json,
        } => {
            let config = load_config(config.as_deref())?;
            match log {
                Some(path) => {
                    let sink = FileSink::create(&path)?;
                    let stack = GuardedStack::with_sink(config.with_dump(true), sink)?;
                    let report = run_demo(stack, count, value)?;
                    print_report(&report, json)?;
                    eprintln!("dumps written to {}", path.display());
                }
                None => {
                    let stack = GuardedStack::new(config)?;
                    let report = run_demo(stack, count, value)?;
                    print_report(&report, json)?;
                }
            }
        }
        Commands::Tamper {
            target,
            config,
            count,
        } => {
            let config = load_config(config.as_deref())?;
            run_tamper(config, target, count)?;
        }
        Commands::Flags => print_flags(Status::CLEAN),
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<StackConfig> {
    let Some(path) = path else {
        return Ok(StackConfig::default());
    };
    StackConfig::from_json_file(path)
        .with_context(|| format!("loading stack config from {}", path.display()))
}

/// Push `count` copies of `value`, pop them all back, then destroy.
///
/// Returns the report taken after the last pop, before teardown.
fn run_demo<S: DiagnosticSink>(
    mut stack: GuardedStack<S>,
    count: usize,
    value: i32,
) -> Result<Report> {
    tracing::info!(stack = %stack.config().name, count, value, "demo started");

    for _ in 0..count {
        let status = stack.push(value);
        anyhow::ensure!(status.is_clean(), "push failed: {status}");
    }
    tracing::info!(size = stack.len(), capacity = stack.capacity(), "pushed");

    for _ in 0..count {
        let (popped, status) = stack.pop();
        anyhow::ensure!(status.is_clean(), "pop failed: {status}");
        anyhow::ensure!(popped == Some(value), "popped {popped:?}, expected {value}");
    }
    tracing::info!(size = stack.len(), capacity = stack.capacity(), "popped");

    let report = stack.report(&dump_context!("demo"));
    stack.into_sink()?;
    Ok(report)
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    section_top("STACK");
    row(&format!(" name      {}", report.stack));
    row(&format!(" size      {}", report.size));
    row(&format!(" capacity  {}", report.capacity));
    row(&format!(" status    {}", status_badge(report.status)));
    if let Some(guards) = report.guards {
        section_mid("GUARDS");
        row(&format!(" struct    {}  {}", word(guards.left_struct, GUARD), word(guards.right_struct, GUARD)));
        if let (Some(left), Some(right)) = (guards.left_data, guards.right_data) {
            row(&format!(" data      {}  {}", word(left, GUARD), word(right, GUARD)));
        }
    }
    if let Some(checksums) = report.checksums {
        section_mid("CHECKSUMS");
        row(&format!(" data      {:#018x}", checksums.data));
        row(&format!(" control   {:#018x}", checksums.control));
    }
    section_bot();
    Ok(())
}

fn run_tamper(config: StackConfig, target: TamperTarget, count: usize) -> Result<()> {
    let mut stack = GuardedStack::new(config)?;
    for value in 1..=count {
        let value = i32::try_from(value).context("push count exceeds element range")?;
        stack.push(value);
    }
    let before = stack.verify();
    anyhow::ensure!(before.is_clean(), "stack was not clean before tampering: {before}");

    let applied = match target {
        TamperTarget::LeftStructGuard => corrupt(&mut stack, Tamper::LeftStructGuard(0)),
        TamperTarget::RightStructGuard => corrupt(&mut stack, Tamper::RightStructGuard(0)),
        TamperTarget::LeftDataGuard => corrupt(&mut stack, Tamper::LeftDataGuard(0)),
        TamperTarget::RightDataGuard => corrupt(&mut stack, Tamper::RightDataGuard(0)),
        TamperTarget::PayloadByte => {
            corrupt(&mut stack, Tamper::PayloadByte { offset: 0, mask: 0x01 })
        }
        TamperTarget::NegativeSize => corrupt(&mut stack, Tamper::Size(-1)),
        TamperTarget::OversizedSize => {
            let past = i64::try_from(stack.capacity()).unwrap_or(i64::MAX).saturating_add(1);
            corrupt(&mut stack, Tamper::Size(past))
        }
        TamperTarget::ControlChecksum => corrupt(&mut stack, Tamper::ControlChecksum(0)),
        TamperTarget::Destroyed => stack.destroy().is_clean(),
    };

    if !applied {
        println!(
            "{}",
            themed(GRAY, &[], "target not present in this configuration, nothing written")
        );
    }

    let status = stack.verify();
    tracing::info!(?target, %status, "verification after tamper");
    let (_, pop_status) = stack.pop();

    section_top("TAMPER");
    row(&format!(" target    {target:?}"));
    row(&format!(" verify    {}", status_badge(status)));
    row(&format!(" pop       {}", status_badge(pop_status)));
    section_bot();
    print_flags(status);
    Ok(())
}

fn print_flags(set: Status) {
    section_top("FLAGS");
    for flag in Corruption::ALL {
        row(&flag_line(flag, set.contains(flag)));
    }
    section_bot();
}
