//! Per-instruction trace events and the debug table built from them.

use std::fmt;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

/// What one instruction did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MovedRight { to: usize },
    MovedLeft { to: usize },
    Incremented { cell: usize, from: u8, to: u8 },
    Decremented { cell: usize, from: u8, to: u8 },
    Output { byte: u8 },
    /// `byte` is `None` when the input stream was exhausted.
    Input { byte: Option<u8>, stored: u8 },
    SkippedLoop { to: usize },
    EnteredLoop,
    RepeatedLoop { to: usize },
    ExitedLoop,
    NoOp,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Action::MovedRight { to } | Action::MovedLeft { to } => {
                write!(f, "Moved pointer head to index {to}")
            }
            Action::Incremented { cell, from, to } => {
                write!(f, "Increment cell[{cell}] from {from} to {to}")
            }
            Action::Decremented { cell, from, to } => {
                write!(f, "Decrement cell[{cell}] from {from} to {to}")
            }
            Action::Output { byte } => write!(f, "Output byte {byte} ({})", printable(byte)),
            Action::Input { byte: Some(b), .. } => write!(f, "Read byte from input -> {b}"),
            Action::Input { byte: None, stored } => {
                write!(f, "Read byte from input -> EOF (set cell to {stored})")
            }
            Action::SkippedLoop { to } => {
                write!(f, "Cell is 0; jump forward to matching ']' at IP {to}")
            }
            Action::EnteredLoop => write!(f, "Enter loop (cell != 0)"),
            Action::RepeatedLoop { to } => {
                write!(f, "Cell != 0; jump back to matching '[' at IP {to}")
            }
            Action::ExitedLoop => write!(f, "Exit loop (cell is 0)"),
            Action::NoOp => write!(f, "No-op"),
        }
    }
}

/// Snapshot handed to an observer once an instruction has taken effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    pub step: usize,
    /// Where the instruction was fetched from, before any loop jump.
    pub ip: usize,
    pub instruction: u8,
    pub data_pointer: usize,
    pub cell: u8,
    pub action: Action,
}

pub const TABLE_HEADER: &str = "STEP | IP  | PTR | CELL | INSTR | ACTION";
pub const TABLE_RULE: &str =
    "-----+-----+-----+------+-------+------------------------------------------------";

/// Render one table row for `event`.
pub fn render_row(event: &TraceEvent) -> String {
    format!(
        "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
        event.step,
        event.ip,
        event.data_pointer,
        event.cell,
        printable(event.instruction),
        event.action
    )
}

fn printable(b: u8) -> char {
    if b.is_ascii_graphic() { b as char } else { '?' }
}

/// Writes the debug table to the diagnostic stream as events arrive.
pub struct TraceTable<W: Write> {
    out: W,
    delay: Option<Duration>,
    header_written: bool,
}

impl TraceTable<io::Stderr> {
    pub fn stderr(delay: Option<Duration>) -> Self {
        Self::new(io::stderr(), delay)
    }
}

impl<W: Write> TraceTable<W> {
    pub fn new(out: W, delay: Option<Duration>) -> Self {
        Self {
            out,
            delay,
            header_written: false,
        }
    }

    /// Observer entry point. Write failures on the diagnostic stream are ignored.
    pub fn record(&mut self, event: &TraceEvent) {
        if !self.header_written {
            let _ = writeln!(self.out, "{TABLE_HEADER}");
            let _ = writeln!(self.out, "{TABLE_RULE}");
            self.header_written = true;
        }
        let _ = writeln!(self.out, "{}", render_row(event));
        let _ = self.out.flush();

        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(action: Action) -> TraceEvent {
        TraceEvent {
            step: 0,
            ip: 0,
            instruction: b'>',
            data_pointer: 1,
            cell: 0,
            action,
        }
    }

    #[test]
    fn row_mentions_the_action() {
        let row = render_row(&event(Action::MovedRight { to: 1 }));
        assert!(row.contains("Moved pointer head to index 1"), "{row}");
        assert!(row.contains(" > "), "{row}");
    }

    #[test]
    fn eof_action_names_the_stored_value() {
        let text = Action::Input { byte: None, stored: 0 }.to_string();
        assert_eq!(text, "Read byte from input -> EOF (set cell to 0)");
    }

    #[test]
    fn table_writes_header_once() {
        let mut table = TraceTable::new(Vec::new(), None);
        table.record(&event(Action::MovedRight { to: 1 }));
        table.record(&event(Action::NoOp));
        let text = String::from_utf8(table.into_inner()).unwrap();
        assert_eq!(text.matches("STEP | IP").count(), 1);
        assert_eq!(text.lines().count(), 4);
    }
}
