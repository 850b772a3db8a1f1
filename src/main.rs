use bf_tape::commands::run::{self, RunArgs};
use bf_tape::logging::init_logging;
use clap::Parser;
use std::env;

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bf"));

    let args = RunArgs::parse();
    init_logging();

    std::process::exit(run::run(&program, args));
}
