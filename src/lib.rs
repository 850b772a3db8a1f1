//! A direct-execution Brainfuck interpreter over a bounded tape.
//!
//! Features and behaviors:
//! - The program is stored verbatim, up to a configurable capacity (65,535
//!   bytes by default); bytes outside `><+-.,[]` are no-ops.
//! - Memory tape of configurable length (65,535 cells by default), initialized to 0.
//! - Strict pointer bounds: moving left from cell 0 or right past the last cell
//!   returns an error instead of wrapping. Cell values do wrap.
//! - Loops are matched at run time by a depth-counted scan; a scan that runs
//!   off the program is reported as an unmatched bracket.
//! - Input `,` reads a single byte; on EOF the current cell is set to 0 unless
//!   another [`EofBehavior`] is chosen.
//! - Output `.` streams the current cell as a byte by default, or collects it
//!   in a bounded in-memory buffer after [`Interpreter::buffer_output`].
//!
//! Quick start:
//!
//! ```no_run
//! use bf_tape::{Interpreter, Program};
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
//! let program = Program::from_bytes(code, 65_535).expect("program fits");
//! let mut bf = Interpreter::new(program).expect("tape fits in memory");
//! bf.run().expect("program should run");
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod logging;
pub mod pointer;
pub mod program;
pub mod theme;
pub mod trace;

pub use config::Config;
pub use error::{BracketKind, InterpreterError};
pub use interpreter::{EofBehavior, Interpreter, RunSummary};
pub use program::Program;
pub use trace::{Action, TraceEvent};
