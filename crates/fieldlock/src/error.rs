//! Error types for the harness and the workload generator.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while constructing a [`SharedRecord`](crate::SharedRecord).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// A record needs at least one field.
    #[error("a shared record needs at least one field")]
    NoFields,
}

/// Configuration and execution errors of a harness run.
///
/// Every variant except [`HarnessError::WorkerPanicked`] is detected before
/// any worker thread is spawned.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// At least one worker is required.
    #[error("thread count must be at least 1")]
    NoWorkers,

    /// A script addresses a field the record does not have.
    #[error("thread {worker} addresses field {field}, but the record has {field_count} fields")]
    FieldOutOfRange {
        worker: usize,
        field: usize,
        field_count: usize,
    },

    /// The record could not be built.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// A worker thread panicked while executing its script.
    #[error("thread {worker} panicked during execution")]
    WorkerPanicked { worker: usize },
}

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors raised by the workload generator.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The scenario name is not one of `variant`, `uniform`, `skewed`.
    #[error("unknown scenario: {0:?}")]
    UnknownScenario(String),

    /// A scenario's weights cannot form a distribution.
    #[error("invalid scenario weights: {0}")]
    Weights(#[from] rand::distributions::WeightedError),

    /// Writing a generated command file failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for generator operations.
pub type GenerateResult<T> = Result<T, GenerateError>;
