use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::cli_util::print_error;
use crate::config::Config;
use crate::error::InterpreterError;
use crate::interpreter::{EofBehavior, Interpreter};
use crate::program::Program;
use crate::theme::catppuccin::Mocha;
use crate::trace::TraceTable;

#[derive(Parser, Debug)]
#[command(name = "bf", disable_help_flag = true)]
pub struct RunArgs {
    /// Trace every instruction to stderr and print program output once at the end
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Check that every bracket has a partner before running
    #[arg(long = "check")]
    pub check: bool,

    /// Maximum program size in bytes (fallback BF_PROGRAM_SIZE; default 65535)
    #[arg(long = "program-size", value_name = "N")]
    pub program_size: Option<usize>,

    /// Number of tape cells (fallback BF_TAPE_SIZE; default 65535)
    #[arg(long = "tape-size", value_name = "N")]
    pub tape_size: Option<usize>,

    /// Debug-mode output buffer size in bytes (fallback BF_OUTPUT_SIZE; default 8192)
    #[arg(long = "output-size", value_name = "N")]
    pub output_size: Option<usize>,

    /// Maximum interpreter steps before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<usize>,

    /// What `,` stores at end of input (fallback BF_EOF; default zero)
    #[arg(long = "eof", value_enum, value_name = "MODE")]
    pub eof: Option<EofBehavior>,

    /// Pause after each traced instruction in debug mode
    #[arg(long = "trace-delay", value_name = "MS")]
    pub trace_delay_ms: Option<u64>,

    /// Source file to run
    #[arg(value_name = "SOURCE")]
    pub sources: Vec<PathBuf>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

impl RunArgs {
    /// Lay the command-line flags over `config`.
    fn apply_to(&self, config: &mut Config) {
        if let Some(n) = self.program_size {
            config.program_capacity = n;
        }
        if let Some(n) = self.tape_size {
            config.tape_capacity = n;
        }
        if let Some(n) = self.output_size {
            config.output_capacity = n;
        }
        if let Some(n) = self.max_steps {
            config.max_steps = Some(n);
        }
        if let Some(eof) = self.eof {
            config.eof = eof;
        }
    }
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    // Exactly one source path; anything else is a usage error before any I/O.
    let [source] = args.sources.as_slice() else {
        usage_and_exit(program, 2);
    };

    let mut config = Config::load();
    args.apply_to(&mut config);
    tracing::debug!(?config, "resolved configuration");

    let code = match Program::load(source, config.program_capacity) {
        Ok(code) => code,
        Err(err) => {
            print_error(program, &[], &err);
            return 1;
        }
    };

    if args.check {
        if let Err(err) = code.check_brackets() {
            print_error(program, code.as_bytes(), &err);
            return 1;
        }
    }

    let mut bf = match Interpreter::with_config(code, &config) {
        Ok(bf) => bf,
        Err(err) => {
            print_error(program, &[], &err);
            return 1;
        }
    };
    if args.debug {
        bf.buffer_output(config.output_capacity);
        let mut table = TraceTable::stderr(args.trace_delay_ms.map(Duration::from_millis));
        bf.set_observer(move |event| table.record(event));
    }

    let mut result = bf.run();

    if args.debug {
        // Buffered output goes out as one block, even when the run aborted.
        let out = bf.take_output();
        let mut stdout = io::stdout();
        if let Err(source) = stdout.write_all(&out).and_then(|()| stdout.flush()) {
            // A runtime error takes precedence; it happened first.
            if result.is_ok() {
                result = Err(InterpreterError::OutputWrite { source });
            }
        }
    }

    match result {
        Ok(summary) => {
            if args.debug {
                let mut line = format!("Completed in {} steps", summary.steps);
                if summary.dropped_output > 0 {
                    line.push_str(&format!(
                        "; {} output bytes dropped (buffer holds {})",
                        summary.dropped_output, config.output_capacity
                    ));
                }
                if io::stderr().is_terminal() {
                    line = Mocha::SURFACE2.paint(line).to_string();
                }
                eprintln!("{line}");
            }
            0
        }
        Err(err) => {
            print_error(program, bf.program().as_bytes(), &err);
            1
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} [-d] [OPTIONS] <SOURCE>

Options:
  --debug, -d          Trace every instruction to stderr; print program output once at the end
  --check              Check that every bracket has a partner before running
  --program-size <N>   Maximum program size in bytes (default 65535)
  --tape-size <N>      Number of tape cells (default 65535)
  --output-size <N>    Debug-mode output buffer size in bytes (default 8192)
  --max-steps <N>      Abort after N instructions (default unlimited)
  --eof <MODE>         What `,` stores at end of input: zero, unchanged, max (default zero)
  --trace-delay <MS>   Pause after each traced instruction in debug mode
  --help, -h           Show this help

Notes:
- Every byte of SOURCE is kept; bytes outside ><+-.,[] do nothing.
- Input (`,`) reads a single byte from stdin.
- Defaults can be set in the [interpreter] section of $BF_CONFIG or ~/.config/bf.toml,
  or with BF_PROGRAM_SIZE, BF_TAPE_SIZE, BF_OUTPUT_SIZE, BF_MAX_STEPS, BF_EOF.

Examples:
- Run a program:
    {0} ./hello.bf
- Feed a file to `,`:
    {0} ./cat.bf < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
