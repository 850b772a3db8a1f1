//! The execution engine.
//!
//! An [`Interpreter`] owns everything a run touches: the program, the tape,
//! the instruction and data pointers, and the I/O endpoints. Every call to
//! [`Interpreter::run`] starts from a zeroed tape (plus any seeded cells) with
//! both pointers at 0; nothing is shared between interpreters.
//!
//! Behaviors:
//! - Cells are bytes with wrapping arithmetic.
//! - Pointers never wrap: moving the data pointer off either end of the tape,
//!   or scanning for a bracket partner off either end of the program, aborts.
//! - Loops are matched at run time by a depth-counted scan. After a forward
//!   skip the pointer sits on the matching `]`, after a backward jump on the
//!   matching `[`; the regular advance then moves past it either way.
//! - Bytes outside `><+-.,[]` are no-ops.

use std::io::{self, Read, Write};

use crate::config::{Config, DEFAULT_TAPE_CAPACITY};
use crate::error::InterpreterError;
use crate::pointer::{guarded_decrement, guarded_increment};
use crate::program::Program;
use crate::trace::{Action, TraceEvent};

/// What `,` stores when the input stream is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum EofBehavior {
    /// Store 0.
    #[default]
    #[value(alias = "0")]
    Zero,
    /// Leave the cell as it was.
    #[value(alias = "keep")]
    Unchanged,
    /// Store 255.
    #[value(alias = "255")]
    Max,
}

/// Where `.` sends bytes.
enum Output {
    /// Written and flushed one byte at a time.
    Stream(Box<dyn Write>),
    /// Accumulated in memory up to `capacity`; the rest is counted and dropped.
    Buffer {
        bytes: Vec<u8>,
        capacity: usize,
        dropped: usize,
    },
}

/// How a completed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Instructions executed, no-ops included.
    pub steps: usize,
    /// Output bytes that did not fit in the output buffer.
    pub dropped_output: usize,
}

type Observer = Box<dyn FnMut(&TraceEvent)>;

pub struct Interpreter {
    program: Program,
    tape: Vec<u8>,
    seed: Vec<u8>,
    data_ptr: usize,
    ip: usize,
    steps: usize,
    max_steps: Option<usize>,
    eof: EofBehavior,
    input: Box<dyn Read>,
    output: Output,
    observer: Option<Observer>,
}

impl Interpreter {
    /// Create an interpreter over a tape of the default size, reading stdin
    /// and streaming to stdout.
    pub fn new(program: Program) -> Result<Self, InterpreterError> {
        Self::with_tape(program, DEFAULT_TAPE_CAPACITY)
    }

    /// Create an interpreter with a custom tape size. A size of 0 is raised
    /// to 1 so the data pointer always addresses a cell.
    pub fn with_tape(program: Program, tape_size: usize) -> Result<Self, InterpreterError> {
        Ok(Self {
            program,
            tape: zeroed_tape(tape_size.max(1))?,
            seed: Vec::new(),
            data_ptr: 0,
            ip: 0,
            steps: 0,
            max_steps: None,
            eof: EofBehavior::default(),
            input: Box::new(io::stdin()),
            output: Output::Stream(Box::new(io::stdout())),
            observer: None,
        })
    }

    /// Create an interpreter from resolved configuration.
    pub fn with_config(program: Program, config: &Config) -> Result<Self, InterpreterError> {
        let mut interpreter = Self::with_tape(program, config.tape_capacity)?;
        interpreter.max_steps = config.max_steps;
        interpreter.eof = config.eof;
        Ok(interpreter)
    }

    /// Read `,` bytes from `input` instead of stdin.
    pub fn set_input<R: Read + 'static>(&mut self, input: R) {
        self.input = Box::new(input);
    }

    /// Stream `.` bytes to `output` instead of stdout.
    pub fn set_output<W: Write + 'static>(&mut self, output: W) {
        self.output = Output::Stream(Box::new(output));
    }

    /// Collect `.` bytes in memory, keeping at most `capacity` of them.
    pub fn buffer_output(&mut self, capacity: usize) {
        self.output = Output::Buffer {
            bytes: Vec::new(),
            capacity,
            dropped: 0,
        };
    }

    /// Called after every instruction takes effect. Execution does not
    /// depend on it.
    pub fn set_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&TraceEvent) + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn set_eof_behavior(&mut self, eof: EofBehavior) {
        self.eof = eof;
    }

    pub fn set_max_steps(&mut self, max_steps: Option<usize>) {
        self.max_steps = max_steps;
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn tape(&self) -> &[u8] {
        &self.tape
    }

    /// Cells written onto the zeroed tape at the start of every run,
    /// starting at cell 0. Cells past the end of the tape are ignored.
    pub fn seed_tape(&mut self, cells: &[u8]) {
        self.seed = cells.to_vec();
    }

    pub fn data_pointer(&self) -> usize {
        self.data_ptr
    }

    pub fn instruction_pointer(&self) -> usize {
        self.ip
    }

    /// Bytes collected so far in buffered mode; empty when streaming.
    pub fn buffered_output(&self) -> &[u8] {
        match &self.output {
            Output::Buffer { bytes, .. } => bytes.as_slice(),
            Output::Stream(_) => &[],
        }
    }

    /// Take the collected bytes out of the buffer, leaving it empty.
    pub fn take_output(&mut self) -> Vec<u8> {
        match &mut self.output {
            Output::Buffer { bytes, .. } => std::mem::take(bytes),
            Output::Stream(_) => Vec::new(),
        }
    }

    /// Execute the program from its first instruction until the
    /// instruction pointer passes the end, or an error aborts the run.
    pub fn run(&mut self) -> Result<RunSummary, InterpreterError> {
        self.reset();
        tracing::debug!(
            program_len = self.program.len(),
            tape_len = self.tape.len(),
            "starting run"
        );

        while self.ip < self.program.len() {
            if let Some(limit) = self.max_steps {
                if self.steps >= limit {
                    return Err(InterpreterError::StepLimitExceeded { limit });
                }
            }
            self.step()?;
        }

        let dropped_output = match &self.output {
            Output::Buffer { dropped, .. } => *dropped,
            Output::Stream(_) => 0,
        };
        tracing::debug!(steps = self.steps, "program completed");
        Ok(RunSummary {
            steps: self.steps,
            dropped_output,
        })
    }

    /// Put the machine back into its start state: zeroed tape with the seed
    /// applied, both pointers at 0, an empty output buffer.
    fn reset(&mut self) {
        self.tape.fill(0);
        let n = self.seed.len().min(self.tape.len());
        self.tape[..n].copy_from_slice(&self.seed[..n]);
        self.data_ptr = 0;
        self.ip = 0;
        self.steps = 0;
        if let Output::Buffer { bytes, dropped, .. } = &mut self.output {
            bytes.clear();
            *dropped = 0;
        }
    }

    /// Execute the instruction at the instruction pointer and advance past it.
    fn step(&mut self) -> Result<(), InterpreterError> {
        let ip = self.ip;
        let instr = self.program.as_bytes()[ip];

        let action = match instr {
            b'+' => {
                let from = self.tape[self.data_ptr];
                let to = from.wrapping_add(1);
                self.tape[self.data_ptr] = to;
                Action::Incremented { cell: self.data_ptr, from, to }
            }
            b'-' => {
                let from = self.tape[self.data_ptr];
                let to = from.wrapping_sub(1);
                self.tape[self.data_ptr] = to;
                Action::Decremented { cell: self.data_ptr, from, to }
            }
            b'>' => {
                let bound = self.tape.len();
                guarded_increment(&mut self.data_ptr, bound).map_err(|_| {
                    InterpreterError::DataPointerOverflow { ip, ptr: self.data_ptr, bound }
                })?;
                Action::MovedRight { to: self.data_ptr }
            }
            b'<' => {
                guarded_decrement(&mut self.data_ptr)
                    .map_err(|_| InterpreterError::DataPointerUnderflow { ip })?;
                Action::MovedLeft { to: self.data_ptr }
            }
            b'.' => {
                let byte = self.tape[self.data_ptr];
                self.emit(byte).map_err(|source| InterpreterError::Io { ip, source })?;
                Action::Output { byte }
            }
            b',' => {
                let byte = self.read_byte().map_err(|source| InterpreterError::Io { ip, source })?;
                let stored = match (byte, self.eof) {
                    (Some(b), _) => b,
                    (None, EofBehavior::Zero) => 0,
                    (None, EofBehavior::Unchanged) => self.tape[self.data_ptr],
                    (None, EofBehavior::Max) => u8::MAX,
                };
                self.tape[self.data_ptr] = stored;
                Action::Input { byte, stored }
            }
            b'[' => {
                if self.tape[self.data_ptr] == 0 {
                    let to = scan_forward(self.program.as_bytes(), ip)?;
                    self.ip = to;
                    Action::SkippedLoop { to }
                } else {
                    Action::EnteredLoop
                }
            }
            b']' => {
                if self.tape[self.data_ptr] != 0 {
                    let to = scan_backward(self.program.as_bytes(), ip)?;
                    self.ip = to;
                    Action::RepeatedLoop { to }
                } else {
                    Action::ExitedLoop
                }
            }
            _ => Action::NoOp,
        };

        if let Some(observer) = self.observer.as_mut() {
            observer(&TraceEvent {
                step: self.steps,
                ip,
                instruction: instr,
                data_pointer: self.data_ptr,
                cell: self.tape[self.data_ptr],
                action,
            });
        }

        self.steps += 1;
        // `ip` is at most len - 1 here, so this lands on len at the latest.
        self.ip += 1;
        Ok(())
    }

    fn emit(&mut self, byte: u8) -> io::Result<()> {
        match &mut self.output {
            Output::Stream(out) => {
                out.write_all(&[byte])?;
                out.flush()
            }
            Output::Buffer { bytes, capacity, dropped } => {
                if bytes.len() < *capacity {
                    bytes.push(byte);
                } else {
                    if *dropped == 0 {
                        tracing::warn!(capacity = *capacity, "output buffer full; dropping further output");
                    }
                    *dropped += 1;
                }
                Ok(())
            }
        }
    }

    /// One byte from the input, or `None` at end of input.
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

fn zeroed_tape(cells: usize) -> Result<Vec<u8>, InterpreterError> {
    let mut tape = Vec::new();
    tape.try_reserve_exact(cells)
        .map_err(|_| InterpreterError::TapeAllocation { cells })?;
    tape.resize(cells, 0);
    Ok(tape)
}

/// Find the `]` matching the `[` at `open`.
fn scan_forward(code: &[u8], open: usize) -> Result<usize, InterpreterError> {
    let mut idx = open;
    let mut depth = 1usize;
    while depth > 0 {
        guarded_increment(&mut idx, code.len()).map_err(|_| {
            InterpreterError::InstructionPointerOverflow { ip: open, bound: code.len() }
        })?;
        match code[idx] {
            b'[' => depth += 1,
            b']' => depth -= 1,
            _ => {}
        }
    }
    Ok(idx)
}

/// Find the `[` matching the `]` at `close`.
fn scan_backward(code: &[u8], close: usize) -> Result<usize, InterpreterError> {
    let mut idx = close;
    let mut depth = 1usize;
    while depth > 0 {
        guarded_decrement(&mut idx)
            .map_err(|_| InterpreterError::InstructionPointerUnderflow { ip: close })?;
        match code[idx] {
            b'[' => depth -= 1,
            b']' => depth += 1,
            _ => {}
        }
    }
    Ok(idx)
}
