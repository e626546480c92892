//! Fine-grained locking benchmark.
//!
//! A [`SharedRecord`] holds a small fixed set of integer fields, each behind
//! its own reader/writer lock. Worker threads replay command scripts against a
//! single shared record so the cost of per-field locking can be compared with
//! whole-record snapshots.
//!
//! # Key Concepts
//!
//! - **Field**: one integer slot, independently lockable
//! - **Command**: `read`, `write` or `string` (snapshot of every field)
//! - **Script**: a worker's fully loaded command sequence
//! - **Harness**: starts every worker together and times only execution
//!
//! # Lock Ordering
//!
//! Single-field operations hold one lock. Anything that holds more than one
//! lock acquires them in ascending field index, which rules out lock cycles.
//!
//! # Usage
//!
//! ```
//! use fieldlock::{Harness, SharedRecord, parse_commands};
//!
//! let record = SharedRecord::default();
//! let scripts = vec![parse_commands("write 0 5\nwrite 1 9\nstring")];
//!
//! let report = Harness::default().run_on(&record, &scripts).unwrap();
//! assert_eq!(report.final_snapshot.to_string(), "Field0=5; Field1=9");
//! assert_eq!(record.get(1), 9);
//! ```

mod command;
mod error;
mod executor;
pub mod generate;
mod harness;
mod record;
mod source;

pub use command::{Command, Script};
pub use error::{GenerateError, GenerateResult, HarnessError, HarnessResult, RecordError};
pub use executor::{ExecStats, Executor};
pub use generate::Scenario;
pub use harness::{FIELDS_ENV, Harness, HarnessConfig, Report, load_scripts};
pub use record::{DEFAULT_FIELD_COUNT, SharedRecord, Snapshot};
pub use source::{CommandSource, FileSource, TextSource, parse_commands};

