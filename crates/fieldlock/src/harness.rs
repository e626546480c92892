//! Spawns one worker per script against a single shared record and times the
//! concurrent phase.
//!
//! ```text
//!   load scripts (untimed)
//!          │
//!          ▼
//!   spawn N workers ──► all wait on barrier
//!          │
//!   barrier released ─── each worker stamps its own start
//!          │   workers execute concurrently
//!   join all ─────────── t1      elapsed = t1 - earliest start
//! ```
//!
//! Starts are taken by the workers themselves: the last thread to reach the
//! barrier runs on immediately, before the spawning thread is rescheduled.

use std::sync::Barrier;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::command::Script;
use crate::error::{HarnessError, HarnessResult};
use crate::executor::{ExecStats, Executor};
use crate::record::{DEFAULT_FIELD_COUNT, SharedRecord, Snapshot};
use crate::source::CommandSource;

/// Environment variable overriding the record's field count.
pub const FIELDS_ENV: &str = "FIELDLOCK_FIELDS";

/// Harness configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Number of fields in the shared record.
    pub field_count: usize,
}

impl HarnessConfig {
    /// Read the configuration from the environment, falling back to defaults
    /// for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let field_count = std::env::var(FIELDS_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_FIELD_COUNT);

        Self { field_count }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            field_count: DEFAULT_FIELD_COUNT,
        }
    }
}

/// Outcome of one run.
#[derive(Clone, Debug)]
pub struct Report {
    /// Commands loaded per worker, in worker order.
    pub commands_loaded: Vec<usize>,
    /// Operations executed per worker, in worker order.
    pub stats: Vec<ExecStats>,
    /// Wall-clock time of the concurrent phase only, from the earliest
    /// worker start to the last join.
    pub elapsed: Duration,
    /// Time each worker spent executing its own script, in worker order.
    pub worker_elapsed: Vec<Duration>,
    /// Record contents after every worker joined.
    pub final_snapshot: Snapshot,
}

impl Report {
    #[must_use]
    pub fn workers(&self) -> usize {
        self.commands_loaded.len()
    }

    #[must_use]
    pub fn elapsed_micros(&self) -> u128 {
        self.elapsed.as_micros()
    }
}

/// Materialize every source before anything is timed.
pub fn load_scripts<S: CommandSource>(sources: &[S]) -> Vec<Script> {
    sources.iter().map(|source| source.load()).collect()
}

/// Runs worker scripts concurrently against one shared record.
#[derive(Clone, Copy, Debug, Default)]
pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    #[must_use]
    pub const fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Build a fresh record and run one worker per script against it.
    pub fn run(&self, scripts: &[Script]) -> HarnessResult<Report> {
        let record = SharedRecord::new(self.config.field_count)?;
        self.run_on(&record, scripts)
    }

    /// Run one worker per script against an existing record.
    ///
    /// Every script is checked against the record before any worker starts.
    /// Workers are released together and the timer covers only the span from
    /// the first worker starting to the last join.
    pub fn run_on(&self, record: &SharedRecord, scripts: &[Script]) -> HarnessResult<Report> {
        if scripts.is_empty() {
            return Err(HarnessError::NoWorkers);
        }

        let field_count = record.field_count();
        for (worker, script) in scripts.iter().enumerate() {
            script
                .validate(field_count)
                .map_err(|field| HarnessError::FieldOutOfRange {
                    worker,
                    field,
                    field_count,
                })?;
        }

        let workers = scripts.len();
        let start_line = Barrier::new(workers + 1);
        debug!(workers, field_count, "spawning workers");

        let (results, joined) = thread::scope(|s| {
            let handles: Vec<_> = scripts
                .iter()
                .map(|script| {
                    let start_line = &start_line;
                    s.spawn(move || {
                        start_line.wait();
                        let started = Instant::now();
                        let stats = Executor.execute(record, script);
                        (started, stats, started.elapsed())
                    })
                })
                .collect();

            start_line.wait();

            let results: Vec<_> = handles.into_iter().map(|h| h.join()).collect();
            (results, Instant::now())
        });

        let mut starts = Vec::with_capacity(workers);
        let mut stats = Vec::with_capacity(workers);
        let mut worker_elapsed = Vec::with_capacity(workers);
        for (worker, result) in results.into_iter().enumerate() {
            match result {
                Ok((started, worker_stats, busy)) => {
                    starts.push(started);
                    stats.push(worker_stats);
                    worker_elapsed.push(busy);
                }
                Err(_) => {
                    warn!(worker, "worker panicked");
                    return Err(HarnessError::WorkerPanicked { worker });
                }
            }
        }

        let elapsed = execution_span(&starts, joined);

        debug!(elapsed_us = elapsed.as_micros(), "all workers joined");

        Ok(Report {
            commands_loaded: scripts.iter().map(Script::len).collect(),
            stats,
            elapsed,
            worker_elapsed,
            final_snapshot: record.snapshot_all(),
        })
    }
}

/// Span from the earliest worker start to `end`.
fn execution_span(starts: &[Instant], end: Instant) -> Duration {
    starts
        .iter()
        .min()
        .map_or(Duration::ZERO, |first| end.saturating_duration_since(*first))
}
