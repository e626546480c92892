//! Per-field locking benchmark runner
//!
//! This binary:
//! 1. Loads one command file per worker (not timed)
//! 2. Builds a single shared record
//! 3. Runs every worker concurrently and reports the execution time
//!
//! It can also generate command files for the built-in scenarios.
//!
//! Environment:
//! - `FIELDLOCK_FIELDS` - number of fields in the shared record (default 2)
//! - `FIELDLOCK_SEED` - seed for `gen`, for reproducible files
//! - `RUST_LOG` - log filter (logs go to stderr)

mod args;

use std::path::PathBuf;

use args::{Invocation, Mode, parse_args};
use fieldlock::generate::write_command_files;
use fieldlock::{FileSource, Harness, HarnessConfig, Report, Scenario, load_scripts};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Environment variable holding the generator seed.
const SEED_ENV: &str = "FIELDLOCK_SEED";

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fieldlock=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    match parse_args(&args)? {
        Invocation::Usage => print_usage(),
        Invocation::Run { mode, files } => run(mode, &files)?,
        Invocation::Gen {
            scenario,
            count,
            prefix,
            threads,
        } => generate(scenario, count, prefix, threads)?,
    }

    Ok(())
}

fn run(mode: Mode, files: &[PathBuf]) -> eyre::Result<()> {
    let config = HarnessConfig::from_env();
    info!(?mode, threads = files.len(), fields = config.field_count, "Starting run");

    let sources: Vec<FileSource> = files.iter().map(FileSource::new).collect();
    let scripts = load_scripts(&sources);
    for (worker, script) in scripts.iter().enumerate() {
        print_loaded(worker, script.len());
    }

    let report = Harness::new(config).run(&scripts)?;
    debug!(snapshot = %report.final_snapshot, "final record");

    print_report(&report);
    Ok(())
}

fn generate(scenario: Scenario, count: usize, prefix: PathBuf, threads: usize) -> eyre::Result<()> {
    let mut rng = match std::env::var(SEED_ENV).ok().and_then(|s| s.parse().ok()) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    info!(%scenario, count, threads, "Generating command files");
    let paths = write_command_files(scenario, count, &prefix, threads, &mut rng)?;

    print_generated(&paths);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_usage() {
    println!("Usage:");
    println!("  fieldlock mode threads file1 [file2 file3]");
    println!("  fieldlock gen scenario num_cmds out_prefix [threads]");
    println!("mode: single | multi");
    println!("threads: number of threads to spawn (1,2,3). For single mode, use 1");
    println!("scenario: variant | uniform | skewed");
}

#[allow(clippy::print_stdout)]
fn print_loaded(worker: usize, commands: usize) {
    println!("Thread {worker} commands: {commands}");
}

#[allow(clippy::print_stdout)]
fn print_report(report: &Report) {
    println!("Execution time (microseconds): {}", report.elapsed_micros());
}

#[allow(clippy::print_stdout)]
fn print_generated(paths: &[PathBuf]) {
    let names: Vec<_> = paths.iter().map(|p| p.display().to_string()).collect();
    println!("Generated files: {names:?}");
}
