#![forbid(unsafe_code)]

//! CLI binary: add source file paths to a JUnit XML report.
//!
//! ```text
//! gotestsum --junitfile junit.xml ./...
//! junit-enhancer --input junit.xml --repo-root . --verbose
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use junit_enhancer::config::EnhanceConfig;
use junit_enhancer::logging::{self, LogSettings};
use junit_enhancer::{build_index, enhance, junit};

#[derive(Debug, Parser)]
#[command(name = "junit-enhancer", version)]
#[command(about = "Add Go test file locations to a JUnit XML report")]
struct Args {
    /// Path to JUnit XML file.
    #[arg(long, env = "JUNIT_ENHANCER_INPUT")]
    input: PathBuf,

    /// Path to output JUnit XML file (defaults to the input file).
    #[arg(long, env = "JUNIT_ENHANCER_OUTPUT")]
    output: Option<PathBuf>,

    /// Path to repository root.
    #[arg(long, default_value = ".", env = "JUNIT_ENHANCER_REPO_ROOT")]
    repo_root: PathBuf,

    /// JSON config file; CLI flags override its values.
    #[arg(long, env = "JUNIT_ENHANCER_CONFIG")]
    config: Option<PathBuf>,

    /// Additional directory name to skip while scanning (repeatable).
    #[arg(
        long = "exclude",
        value_name = "DIR",
        env = "JUNIT_ENHANCER_EXCLUDE",
        value_delimiter = ','
    )]
    exclude: Vec<String>,

    /// Treat inexact names as unmatched instead of guessing by substring.
    #[arg(long, env = "JUNIT_ENHANCER_NO_SUBSTRING_FALLBACK")]
    no_substring_fallback: bool,

    /// Exit non-zero when any test case stays without a file.
    #[arg(long, env = "JUNIT_ENHANCER_FAIL_ON_UNMATCHED")]
    fail_on_unmatched: bool,

    /// Enable verbose output for debugging.
    #[arg(long, short, env = "JUNIT_ENHANCER_VERBOSE")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(LogSettings::detect(args.verbose));

    let config = load_config(&args)?;
    let output = args.output.clone().unwrap_or_else(|| args.input.clone());

    let mut report = junit::read_report(&args.input)
        .with_context(|| format!("reading JUnit report from {}", args.input.display()))?;

    let index = build_index(&args.repo_root, &config).with_context(|| {
        format!("building test index under {}", args.repo_root.display())
    })?;

    tracing::debug!("Built test map with {} entries", index.len());
    for (key, file) in index.iter() {
        tracing::debug!("  {key} -> {file}");
    }
    tracing::debug!(
        "Built import-path map with {} entries",
        index.iter_qualified().count()
    );
    for (key, file) in index.iter_qualified() {
        tracing::debug!("  {key} -> {file}");
    }

    let summary = enhance(&mut report, &index, &config);

    junit::write_report(&output, &report)
        .with_context(|| format!("writing JUnit report to {}", output.display()))?;

    println!(
        "Successfully enhanced JUnit XML file: {} ({}/{} test cases matched)",
        output.display(),
        summary.matched,
        summary.total
    );

    if args.fail_on_unmatched && !summary.all_matched() {
        bail!(
            "{} test case(s) could not be matched to a source file",
            summary.unmatched_count()
        );
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<EnhanceConfig> {
    let mut config = match &args.config {
        Some(path) => EnhanceConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EnhanceConfig::default(),
    };
    config.extend_excludes(args.exclude.iter().cloned());
    if args.no_substring_fallback {
        config.substring_fallback = false;
    }
    config.validate().context("validating configuration")?;
    Ok(config)
}
