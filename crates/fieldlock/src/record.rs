//! Shared record with one reader/writer lock per field.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │  SharedRecord                                 │
//! │    fields[0]: RwLock<i64>   get / set         │
//! │    fields[1]: RwLock<i64>   get / set         │
//! │    ...                                        │
//! │  snapshot_all: read-lock 0, 1, .. m-1 in order│
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Single-field operations hold exactly one lock. The only operation that holds
//! several locks at once is [`SharedRecord::snapshot_all`], and it always
//! requests them in ascending index order. Any future multi-field operation
//! must use the same order.
//!
//! # Fairness
//!
//! The locks are `parking_lot::RwLock`, which is task-fair with eventual
//! fairness: a reader blocks while a writer is queued on the same field, so a
//! steady stream of `get` calls cannot starve `set`. Which of several queued
//! writers wins is not specified.

use core::fmt;

use parking_lot::{RwLock, RwLockReadGuard};
use smallvec::SmallVec;

use crate::error::RecordError;

/// Field count used by the benchmark when none is configured.
pub const DEFAULT_FIELD_COUNT: usize = 2;

/// Inline capacity for snapshots; records wider than this spill to the heap.
const INLINE_FIELDS: usize = 4;

/// A fixed set of integer fields, each behind its own reader/writer lock.
///
/// Shared by every worker for the length of a run (wrap it in an `Arc`).
pub struct SharedRecord {
    fields: Box<[RwLock<i64>]>,
}

impl SharedRecord {
    /// Create a record with `field_count` fields, all initialized to zero.
    pub fn new(field_count: usize) -> Result<Self, RecordError> {
        if field_count == 0 {
            return Err(RecordError::NoFields);
        }

        let fields = (0..field_count).map(|_| RwLock::new(0)).collect();
        Ok(Self { fields })
    }

    /// Number of fields in this record.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Read one field under a shared lock.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.field_count()`.
    #[inline]
    #[must_use]
    pub fn get(&self, idx: usize) -> i64 {
        *self.fields[idx].read()
    }

    /// Write one field under an exclusive lock.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.field_count()`.
    #[inline]
    pub fn set(&self, idx: usize, value: i64) {
        *self.fields[idx].write() = value;
    }

    /// Read every field as one consistent point-in-time view.
    ///
    /// Shared locks are taken on fields `0, 1, .., m - 1` in that order and are
    /// all held until every value has been copied out.
    #[must_use]
    pub fn snapshot_all(&self) -> Snapshot {
        let guards: SmallVec<[RwLockReadGuard<'_, i64>; INLINE_FIELDS]> =
            self.fields.iter().map(|lock| lock.read()).collect();

        let values = guards.iter().map(|guard| **guard).collect();
        drop(guards);

        Snapshot { values }
    }
}

impl Default for SharedRecord {
    fn default() -> Self {
        Self {
            fields: (0..DEFAULT_FIELD_COUNT).map(|_| RwLock::new(0)).collect(),
        }
    }
}

impl fmt::Debug for SharedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRecord")
            .field("field_count", &self.fields.len())
            .finish()
    }
}

/// Values of every field, captured together by [`SharedRecord::snapshot_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    values: SmallVec<[i64; INLINE_FIELDS]>,
}

impl Snapshot {
    /// Field values in index order.
    #[must_use]
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Value of one field, if the index is in range.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<i64> {
        self.values.get(idx).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Renders as `Field0=5; Field1=9`.
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, value) in self.values.iter().enumerate() {
            if idx > 0 {
                write!(f, "; ")?;
            }
            write!(f, "Field{idx}={value}")?;
        }
        Ok(())
    }
}
