//! Workload generator for command files.
//!
//! Each scenario is a weighting over five command kinds. Written values are
//! drawn uniformly from `0..=1000`.
//!
//! | scenario | read 0 | write 0 | read 1 | write 1 | string |
//! |----------|--------|---------|--------|---------|--------|
//! | variant  | 20     | 5       | 20     | 5       | 50     |
//! | uniform  | 20     | 20      | 20     | 20      | 20     |
//! | skewed   | 5      | 60      | 5      | 5       | 25     |

use core::fmt;
use core::str::FromStr;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use tracing::debug;

use crate::command::Command;
use crate::error::{GenerateError, GenerateResult};

/// Number of per-worker files written when no count is given.
pub const DEFAULT_GEN_THREADS: usize = 3;

/// Largest value a generated write stores.
pub const MAX_WRITE_VALUE: i64 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Read0,
    Write0,
    Read1,
    Write1,
    Snapshot,
}

const KINDS: [Kind; 5] = [
    Kind::Read0,
    Kind::Write0,
    Kind::Read1,
    Kind::Write1,
    Kind::Snapshot,
];

/// A named command mix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Read- and snapshot-heavy.
    Variant,
    /// Every kind equally likely.
    Uniform,
    /// Dominated by writes to field 0.
    Skewed,
}

impl Scenario {
    pub const ALL: [Self; 3] = [Self::Variant, Self::Uniform, Self::Skewed];

    /// Weights in [`KINDS`] order.
    const fn weights(self) -> [u32; 5] {
        match self {
            Self::Variant => [20, 5, 20, 5, 50],
            Self::Uniform => [20, 20, 20, 20, 20],
            Self::Skewed => [5, 60, 5, 5, 25],
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Variant => "variant",
            Self::Uniform => "uniform",
            Self::Skewed => "skewed",
        }
    }
}

impl FromStr for Scenario {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| GenerateError::UnknownScenario(s.to_owned()))
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Draw `count` commands for one worker.
pub fn generate_commands<R: Rng + ?Sized>(
    scenario: Scenario,
    count: usize,
    rng: &mut R,
) -> GenerateResult<Vec<Command>> {
    let dist = WeightedIndex::new(scenario.weights())?;

    Ok((0..count)
        .map(|_| match KINDS[dist.sample(rng)] {
            Kind::Read0 => Command::Read { field: 0 },
            Kind::Read1 => Command::Read { field: 1 },
            Kind::Write0 => Command::Write {
                field: 0,
                value: rng.gen_range(0..=MAX_WRITE_VALUE),
            },
            Kind::Write1 => Command::Write {
                field: 1,
                value: rng.gen_range(0..=MAX_WRITE_VALUE),
            },
            Kind::Snapshot => Command::SnapshotAll,
        })
        .collect())
}

/// Render commands one per line.
#[must_use]
pub fn render_commands(commands: &[Command]) -> String {
    let mut out = String::with_capacity(commands.len() * 12);
    for command in commands {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{command}");
    }
    out
}

/// Path of the command file for worker `thread` under `prefix`.
#[must_use]
pub fn thread_file(prefix: &Path, thread: usize) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(format!("_thread{thread}.txt"));
    PathBuf::from(name)
}

/// Write `<prefix>_thread<t>.txt` for each of `threads` workers, returning the
/// paths written.
pub fn write_command_files<R: Rng + ?Sized>(
    scenario: Scenario,
    count: usize,
    prefix: &Path,
    threads: usize,
    rng: &mut R,
) -> GenerateResult<Vec<PathBuf>> {
    (0..threads)
        .map(|thread| {
            let path = thread_file(prefix, thread);
            let commands = generate_commands(scenario, count, rng)?;
            std::fs::write(&path, render_commands(&commands)).map_err(|source| {
                GenerateError::Io {
                    path: path.clone(),
                    source,
                }
            })?;
            debug!(path = %path.display(), count, %scenario, "wrote command file");
            Ok(path)
        })
        .collect()
}
