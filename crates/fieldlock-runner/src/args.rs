//! Positional argument parsing.
//!
//! ```text
//! fieldlock <single|multi> <threads> <file1> [file2 ...]
//! fieldlock gen <variant|uniform|skewed> <num_cmds> <out_prefix> [threads]
//! ```

use std::path::PathBuf;

use eyre::{WrapErr, bail};
use fieldlock::Scenario;
use fieldlock::generate::DEFAULT_GEN_THREADS;
use thiserror::Error;
use tracing::warn;

/// Command-line errors, raised before any file is loaded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgsError {
    /// A thread was requested but no command file was supplied for it.
    #[error("missing filename for thread {worker}")]
    MissingInput { worker: usize },

    /// The thread count argument was not a positive integer.
    #[error("invalid thread count: {0:?} (expected a positive integer)")]
    InvalidThreadCount(String),
}

/// How the benchmark was asked to run. Both map to "run N workers".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Single,
    Multi,
}

/// A fully resolved invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    /// Too few arguments: print usage and exit successfully.
    Usage,
    /// Run one worker per command file.
    Run { mode: Mode, files: Vec<PathBuf> },
    /// Write generated command files.
    Gen {
        scenario: Scenario,
        count: usize,
        prefix: PathBuf,
        threads: usize,
    },
}

/// Parse arguments (without the program name).
///
/// A run needs exactly one file per requested thread; a missing file is a
/// configuration error raised here, before anything is loaded or spawned.
pub fn parse_args(args: &[String]) -> eyre::Result<Invocation> {
    let [mode, rest @ ..] = args else {
        return Ok(Invocation::Usage);
    };

    if mode == "gen" {
        return parse_gen(rest);
    }

    let mode = match mode.as_str() {
        "single" => Mode::Single,
        "multi" => Mode::Multi,
        other => bail!("unknown mode {other:?} (expected single, multi or gen)"),
    };

    let Some((threads, files)) = rest.split_first() else {
        return Ok(Invocation::Usage);
    };
    let threads = parse_thread_count(threads)?;

    if mode == Mode::Single && threads != 1 {
        warn!(threads, "single mode normally runs one thread");
    }

    if files.len() < threads {
        return Err(ArgsError::MissingInput {
            worker: files.len(),
        }
        .into());
    }
    if files.len() > threads {
        warn!(
            ignored = files.len() - threads,
            "more files than threads, ignoring the extras"
        );
    }

    Ok(Invocation::Run {
        mode,
        files: files[..threads].iter().map(PathBuf::from).collect(),
    })
}

fn parse_thread_count(arg: &str) -> Result<usize, ArgsError> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ArgsError::InvalidThreadCount(arg.to_owned())),
    }
}

fn parse_gen(args: &[String]) -> eyre::Result<Invocation> {
    let [scenario, count, prefix, rest @ ..] = args else {
        return Ok(Invocation::Usage);
    };

    let scenario: Scenario = scenario.parse()?;
    let count = count
        .parse()
        .wrap_err_with(|| format!("invalid command count: {count:?}"))?;
    let threads = match rest.first() {
        Some(arg) => parse_thread_count(arg)?,
        None => DEFAULT_GEN_THREADS,
    };

    Ok(Invocation::Gen {
        scenario,
        count,
        prefix: PathBuf::from(prefix),
        threads,
    })
}
