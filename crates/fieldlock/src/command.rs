//! Commands executed against a [`SharedRecord`](crate::SharedRecord).

use core::fmt;

/// One operation of a worker script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Read a single field.
    Read { field: usize },
    /// Overwrite a single field.
    Write { field: usize, value: i64 },
    /// Read every field under simultaneous shared locks.
    SnapshotAll,
}

impl Command {
    /// Field addressed by a single-field command.
    #[must_use]
    pub const fn field(&self) -> Option<usize> {
        match self {
            Self::Read { field } | Self::Write { field, .. } => Some(*field),
            Self::SnapshotAll => None,
        }
    }
}

/// Formats in the command-file syntax, so a script can be written back out.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { field } => write!(f, "read {field}"),
            Self::Write { field, value } => write!(f, "write {field} {value}"),
            Self::SnapshotAll => write!(f, "string"),
        }
    }
}

/// The fully materialized command sequence of one worker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Script {
    commands: Vec<Command>,
}

impl Script {
    #[must_use]
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Highest field index any command addresses.
    #[must_use]
    pub fn max_field(&self) -> Option<usize> {
        self.commands.iter().filter_map(Command::field).max()
    }

    /// Check that every addressed field exists in a record of `field_count`
    /// fields. On failure returns the highest index addressed.
    pub fn validate(&self, field_count: usize) -> Result<(), usize> {
        match self.max_field() {
            Some(field) if field >= field_count => Err(field),
            _ => Ok(()),
        }
    }
}

impl From<Vec<Command>> for Script {
    fn from(commands: Vec<Command>) -> Self {
        Self::new(commands)
    }
}

impl FromIterator<Command> for Script {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Script {
    type Item = &'a Command;
    type IntoIter = core::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
