use std::io::{self, IsTerminal, Write};

use crate::error::InterpreterError;
use crate::theme::catppuccin::Mocha;

/// Show a short window around the position for context.
const WINDOW: usize = 32;

/// Print `err` to stderr, prefixed with `program`, with a caret under the
/// offending instruction when the error points at one.
pub fn print_error(program: &str, code: &[u8], err: &InterpreterError) {
    let mut stderr = io::stderr();
    let color = stderr.is_terminal();
    let _ = stderr.write_all(render_error(program, code, err, color).as_bytes());
    let _ = stderr.flush();
}

/// Build the diagnostic text for `err`, one line per entry.
pub fn render_error(program: &str, code: &[u8], err: &InterpreterError, color: bool) -> String {
    let label = if color {
        Mocha::RED.bold().paint("error").to_string()
    } else {
        "error".to_string()
    };

    let mut out = format!("{program}: {label}: {err}\n");
    if let Some(pos) = err.instruction() {
        out.push_str(&context_window(code, pos, color));
    }
    out
}

/// The program bytes around `pos` on one line, and a caret under `pos`.
///
/// Bytes that would break the line (newlines, tabs, non-ASCII) are shown as
/// spaces so the caret column stays equal to the byte offset.
fn context_window(code: &[u8], pos: usize, color: bool) -> String {
    let start = pos.saturating_sub(WINDOW);
    let end = pos.saturating_add(WINDOW + 1).min(code.len());
    if start >= end {
        return String::new();
    }

    let slice: String = code[start..end]
        .iter()
        .map(|&b| if b.is_ascii_graphic() { b as char } else { ' ' })
        .collect();

    let caret = format!("{}^", " ".repeat(pos - start));
    let caret = if color {
        Mocha::PEACH.paint(caret).to_string()
    } else {
        caret
    };
    format!("  {slice}\n  {caret}\n")
}
