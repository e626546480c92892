//! Command sources and the command-file tokenizer.
//!
//! # Format
//!
//! ```text
//! read <field>             // Command::Read
//! write <field> <value>    // Command::Write
//! string                   // Command::SnapshotAll
//! ```
//!
//! Tokens are whitespace separated and a command may continue on the next
//! line. An unknown keyword, or an operand that is not an integer, discards
//! the rest of the line it appears on. Nothing in a command file is ever an
//! error.

use std::path::{Path, PathBuf};

use tracing::{trace, warn};

use crate::command::{Command, Script};

/// Something that yields a worker's script.
///
/// Loading is finite and repeatable: calling [`load`](Self::load) twice on the
/// same source yields equal scripts. It always happens before timing starts.
pub trait CommandSource {
    fn load(&self) -> Script;
}

impl CommandSource for Script {
    fn load(&self) -> Script {
        self.clone()
    }
}

impl CommandSource for Vec<Command> {
    fn load(&self) -> Script {
        Script::new(self.clone())
    }
}

/// A command file on disk.
///
/// A file that cannot be read yields an empty script and a warning; the run
/// continues with that worker idle.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CommandSource for FileSource {
    fn load(&self) -> Script {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => parse_commands(&text),
            Err(e) => {
                warn!("Cannot open file: {} ({})", self.path.display(), e);
                Script::default()
            }
        }
    }
}

/// Command text held in memory.
#[derive(Clone, Debug)]
pub struct TextSource(pub String);

impl CommandSource for TextSource {
    fn load(&self) -> Script {
        parse_commands(&self.0)
    }
}

/// A token and the (zero-based) line it came from.
type Token<'a> = (usize, &'a str);

struct Tokens<I: Iterator> {
    inner: core::iter::Peekable<I>,
}

/// Split `text` into tokens tagged with their line.
fn tokenize(text: &str) -> Tokens<impl Iterator<Item = Token<'_>>> {
    Tokens::new(
        text.lines()
            .enumerate()
            .flat_map(|(line, content)| content.split_whitespace().map(move |t| (line, t))),
    )
}

impl<'a, I: Iterator<Item = Token<'a>>> Tokens<I> {
    fn new(tokens: I) -> Self {
        Self {
            inner: tokens.peekable(),
        }
    }

    fn next_token(&mut self) -> Option<Token<'a>> {
        self.inner.next()
    }

    /// Drop every remaining token on `line`.
    fn skip_line(&mut self, line: usize) {
        while self.inner.next_if(|&(l, _)| l == line).is_some() {}
    }

    /// Next token parsed as `T`. On a parse failure the rest of the operand's
    /// line is discarded.
    fn operand<T: core::str::FromStr>(&mut self) -> Operand<T> {
        let Some((line, token)) = self.next_token() else {
            return Operand::Eof;
        };
        match token.parse() {
            Ok(value) => Operand::Value(value),
            Err(_) => {
                trace!(line = line + 1, token, "skipping malformed operand");
                self.skip_line(line);
                Operand::Malformed
            }
        }
    }
}

enum Operand<T> {
    Value(T),
    Malformed,
    Eof,
}

/// Parse command-file text into a script.
pub fn parse_commands(text: &str) -> Script {
    let mut tokens = tokenize(text);
    let mut commands = Vec::new();

    while let Some((line, op)) = tokens.next_token() {
        match op {
            "read" => match tokens.operand() {
                Operand::Value(field) => commands.push(Command::Read { field }),
                Operand::Malformed => {}
                Operand::Eof => break,
            },
            "write" => {
                let field = match tokens.operand() {
                    Operand::Value(field) => field,
                    Operand::Malformed => continue,
                    Operand::Eof => break,
                };
                match tokens.operand() {
                    Operand::Value(value) => commands.push(Command::Write { field, value }),
                    Operand::Malformed => {}
                    Operand::Eof => break,
                }
            }
            "string" => commands.push(Command::SnapshotAll),
            other => {
                trace!(line = line + 1, token = other, "skipping unknown command");
                tokens.skip_line(line);
            }
        }
    }

    Script::new(commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_kinds() {
        let script = parse_commands("read 0\nwrite 1 42\nstring\n");
        assert_eq!(
            script.commands(),
            &[
                Command::Read { field: 0 },
                Command::Write {
                    field: 1,
                    value: 42
                },
                Command::SnapshotAll,
            ]
        );
    }

    #[test]
    fn test_unknown_line_is_skipped() {
        let script = parse_commands("foo bar baz\nread 0\n");
        assert_eq!(script.commands(), &[Command::Read { field: 0 }]);
    }

    #[test]
    fn test_unknown_token_skips_only_its_line() {
        let script = parse_commands("string\nnope read 1 write 0 3\nwrite 0 7");
        assert_eq!(
            script.commands(),
            &[Command::SnapshotAll, Command::Write { field: 0, value: 7 }]
        );
    }

    #[test]
    fn test_command_may_span_lines() {
        let script = parse_commands("write\n  1\n\t-5\nread\n0");
        assert_eq!(
            script.commands(),
            &[
                Command::Write {
                    field: 1,
                    value: -5
                },
                Command::Read { field: 0 },
            ]
        );
    }

    #[test]
    fn test_several_commands_on_one_line() {
        let script = parse_commands("read 0 read 1 string");
        assert_eq!(script.len(), 3);
    }

    #[test]
    fn test_malformed_operand_skips_line() {
        let script = parse_commands("read x string\nwrite 0 nine\nwrite -1 4\nread 1");
        assert_eq!(script.commands(), &[Command::Read { field: 1 }]);
    }

    #[test]
    fn test_truncated_command_is_dropped() {
        assert!(parse_commands("write 0").is_empty());
        assert!(parse_commands("read").is_empty());
        assert_eq!(parse_commands("string write 1").len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_commands("").is_empty());
        assert!(parse_commands("\n\n   \n").is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let script = parse_commands("read 0\r\nbogus\r\nwrite 1 2\r\n");
        assert_eq!(script.len(), 2);
    }

    #[test]
    fn test_text_source_is_restartable() {
        let source = TextSource("write 0 1\nstring".to_owned());
        assert_eq!(source.load(), source.load());
        assert_eq!(source.load().len(), 2);
    }

    #[test]
    fn test_missing_file_yields_empty_script() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("does-not-exist.txt"));
        assert!(source.load().is_empty());
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thread0.txt");
        std::fs::write(&path, "write 0 5\nwrite 1 9\nstring\n").unwrap();

        let script = FileSource::new(&path).load();
        assert_eq!(script.len(), 3);
        assert_eq!(script.commands()[2], Command::SnapshotAll);
    }

    #[test]
    fn test_tokens_over_any_iterator() {
        let mut tokens =
            Tokens::new([(0, "write"), (0, "x"), (0, "9"), (1, "read"), (1, "1")].into_iter());

        assert_eq!(tokens.next_token(), Some((0, "write")));
        assert!(matches!(tokens.operand::<usize>(), Operand::Malformed));
        assert_eq!(tokens.next_token(), Some((1, "read")));
        assert!(matches!(tokens.operand::<usize>(), Operand::Value(1)));
        assert!(matches!(tokens.operand::<usize>(), Operand::Eof));
    }
}
