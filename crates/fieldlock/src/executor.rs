//! Per-worker command loop.

use std::hint::black_box;

use crate::command::Command;
use crate::record::SharedRecord;

/// Counts of the operations one worker performed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecStats {
    pub reads: usize,
    pub writes: usize,
    pub snapshots: usize,
}

impl ExecStats {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.reads + self.writes + self.snapshots
    }
}

/// Applies commands to a shared record in order.
///
/// Holds no state between commands; every command is a self-contained
/// operation on the record. Results of reads and snapshots are observed only
/// through [`black_box`] so the lock traffic is not optimized away.
#[derive(Clone, Copy, Debug, Default)]
pub struct Executor;

impl Executor {
    /// Run `commands` against `record`, strictly in sequence.
    ///
    /// # Panics
    ///
    /// Panics if a command addresses a field the record does not have.
    pub fn execute<'a>(
        &self,
        record: &SharedRecord,
        commands: impl IntoIterator<Item = &'a Command>,
    ) -> ExecStats {
        let mut stats = ExecStats::default();

        for command in commands {
            match *command {
                Command::Read { field } => {
                    black_box(record.get(field));
                    stats.reads += 1;
                }
                Command::Write { field, value } => {
                    record.set(field, value);
                    stats.writes += 1;
                }
                Command::SnapshotAll => {
                    black_box(record.snapshot_all().to_string());
                    stats.snapshots += 1;
                }
            }
        }

        stats
    }
}
