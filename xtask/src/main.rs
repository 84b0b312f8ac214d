//! Custom cargo commands for guardstack.
//!
//! Usage:
//!   cargo xtask verify    - Run full verification suite
//!   cargo xtask test      - Run all tests
//!   cargo xtask check     - Quick check (check + test + clippy)
//!   cargo xtask kani      - Run Kani proofs
//!   cargo xtask fuzz      - Run every fuzz target briefly
//!   cargo xtask bench     - Run benchmarks

use anyhow::{bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Functions copied verbatim into the Kani crate, with their source file.
const PROVED_COPIES: &[(&str, &str)] = &[
    ("src/buffer.rs", "layout_len"),
    ("src/checksum.rs", "weighted_sum"),
];

const FUZZ_TARGETS: &[&str] = &["stack_operations", "tamper_detection", "config_parsing"];

fn main() -> Result<()> {
    let task = env::args().nth(1);
    match task.as_deref() {
        Some("verify") => verify()?,
        Some("test") => test()?,
        Some("check") => check()?,
        Some("kani") => kani()?,
        Some("fuzz") => fuzz()?,
        Some("bench") => bench()?,
        _ => print_help(),
    }
    Ok(())
}

fn print_help() {
    eprintln!(
        r#"
cargo xtask <COMMAND>

Commands:
  verify    Run full verification suite (markers + tests + clippy + proof copies)
  test      Run all Rust tests
  check     Quick check (cargo check + test + clippy)
  kani      Run Kani proofs in kani-proofs/
  fuzz      Run each fuzz target for 60 seconds (needs cargo-fuzz, nightly)
  bench     Run benchmarks
"#
    );
}

/// Full verification suite
fn verify() -> Result<()> {
    println!("==========================================");
    println!("guardstack Verification Suite");
    println!("==========================================\n");

    println!("[1/4] Checking invariant markers...");
    check_invariant_markers()?;
    println!("✓ Invariant markers present\n");

    println!("[2/4] Running Rust tests...");
    run_cargo(&["test", "--quiet"])?;
    println!("✓ All Rust tests passed\n");

    println!("[3/4] Running clippy...");
    run_cargo(&["clippy", "--quiet", "--", "-D", "warnings"])?;
    println!("✓ Clippy passed\n");

    println!("[4/4] Comparing proved copies with the library...");
    verify_proof_copies()?;
    println!("✓ Kani copies match\n");

    println!("==========================================");
    println!("✓ ALL VERIFICATION CHECKS PASSED");
    println!("==========================================");

    Ok(())
}

/// Run all tests
fn test() -> Result<()> {
    run_cargo(&["test"])
}

/// Quick check
fn check() -> Result<()> {
    println!("Running quick checks...\n");

    println!("[1/3] cargo check...");
    run_cargo(&["check"])?;

    println!("[2/3] cargo test...");
    run_cargo(&["test", "--quiet"])?;

    println!("[3/3] cargo clippy...");
    run_cargo(&["clippy", "--quiet", "--", "-D", "warnings"])?;

    println!("\n✓ Quick checks passed");
    Ok(())
}

/// Run Kani proofs
fn kani() -> Result<()> {
    let dir = project_root()?.join("kani-proofs");
    run_cargo_in(&dir, &["kani"])
}

/// Run every fuzz target for a short, fixed time
fn fuzz() -> Result<()> {
    let root = project_root()?;
    for target in FUZZ_TARGETS {
        println!("fuzzing {target}...");
        run_cargo_in(
            &root,
            &["+nightly", "fuzz", "run", target, "--", "-max_total_time=60"],
        )?;
    }
    Ok(())
}

/// Run benchmarks
fn bench() -> Result<()> {
    run_cargo(&["bench"])
}

// ============================================================================
// Helper functions
// ============================================================================

fn project_root() -> Result<PathBuf> {
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => env::current_dir().context("Failed to read current directory")?,
    };

    // xtask is in project_root/xtask, so go up one level
    let root = manifest_dir.parent().unwrap_or(&manifest_dir);
    Ok(root.to_path_buf())
}

fn run_cargo(args: &[&str]) -> Result<()> {
    run_cargo_in(&project_root()?, args)
}

fn run_cargo_in(dir: &Path, args: &[&str]) -> Result<()> {
    let status = Command::new("cargo")
        .args(args)
        .current_dir(dir)
        .status()
        .with_context(|| format!("Failed to run cargo {:?}", args))?;

    if !status.success() {
        bail!("cargo {:?} failed", args);
    }

    Ok(())
}

fn check_invariant_markers() -> Result<()> {
    let root = project_root()?;
    let src_dir = root.join("src");

    let output = Command::new("grep")
        .args(["-r", "INVARIANT:", "--include=*.rs"])
        .current_dir(&src_dir)
        .output()
        .context("Failed to run grep")?;

    let count = output.stdout.split(|&b| b == b'\n').filter(|l| !l.is_empty()).count();

    if count < 5 {
        bail!(
            "Expected at least 5 INVARIANT markers, found {}. Someone may have removed safety comments!",
            count
        );
    }

    Ok(())
}

/// The Kani crate proves copies of library functions. A copy that drifted
/// proves nothing, so compare the bodies.
fn verify_proof_copies() -> Result<()> {
    let root = project_root()?;
    let proofs = std::fs::read_to_string(root.join("kani-proofs/src/lib.rs"))
        .context("Failed to read kani-proofs/src/lib.rs")?;

    for (file, function) in PROVED_COPIES {
        let source = std::fs::read_to_string(root.join(file))
            .with_context(|| format!("Failed to read {file}"))?;

        let Some(original) = extract_fn(&source, function) else {
            bail!("{function} not found in {file}");
        };
        let Some(copy) = extract_fn(&proofs, function) else {
            bail!("{function} not found in kani-proofs");
        };
        if original != copy {
            bail!("{function} in kani-proofs has drifted from {file}");
        }
    }

    Ok(())
}

/// Source text of `pub fn name` up to its closing brace at column zero.
fn extract_fn(content: &str, name: &str) -> Option<String> {
    let header = format!("pub fn {name}(");
    let start = content.find(&header)?;
    let body = &content[start..];
    let end = body.find("\n}")?;
    Some(
        body[..end + 2]
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n"),
    )
}
