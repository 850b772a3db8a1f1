use std::fmt;

/// Errors that can occur while loading or interpreting a Brainfuck program.
///
/// Every variant is fatal for the run that produced it.
#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    /// The source could not be opened or read.
    #[error("failed to read source '{origin}': {source}")]
    SourceUnreadable {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    /// The source holds more bytes than the program store can take.
    #[error("program exceeds maximum size of {capacity} bytes")]
    CapacityExceeded { capacity: usize },

    /// The tape could not be allocated at the requested size.
    #[error("cannot allocate a tape of {cells} cells")]
    TapeAllocation { cells: usize },

    /// `>` on the last cell of the tape.
    #[error("data pointer overflow at instruction {ip} (ptr={ptr}, bound={bound})")]
    DataPointerOverflow { ip: usize, ptr: usize, bound: usize },

    /// `<` on cell 0.
    #[error("data pointer underflow at instruction {ip} (ptr=0)")]
    DataPointerUnderflow { ip: usize },

    /// A forward scan from `[` ran past the end of the program.
    #[error("instruction pointer overflow scanning for ']' from instruction {ip} (bound={bound})")]
    InstructionPointerOverflow { ip: usize, bound: usize },

    /// A backward scan from `]` ran past the start of the program.
    #[error("instruction pointer underflow scanning for '[' from instruction {ip}")]
    InstructionPointerUnderflow { ip: usize },

    /// Found by the static bracket check before anything runs.
    #[error("unmatched bracket {kind} at instruction {ip}")]
    UnmatchedBracket { ip: usize, kind: BracketKind },

    /// Reading program input or writing program output failed.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    /// Buffered program output could not be written out after the run.
    #[error("failed to write program output: {source}")]
    OutputWrite {
        #[source]
        source: std::io::Error,
    },

    /// Execution aborted due to step limit.
    #[error("execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },
}

impl InterpreterError {
    /// Whether this error means the program has a bracket without a partner,
    /// either found statically or by a scan running off the program.
    pub fn is_unmatched_bracket(&self) -> bool {
        matches!(
            self,
            Self::UnmatchedBracket { .. }
                | Self::InstructionPointerOverflow { .. }
                | Self::InstructionPointerUnderflow { .. }
        )
    }

    /// The instruction index the error points at, if it has one.
    pub fn instruction(&self) -> Option<usize> {
        match self {
            Self::DataPointerOverflow { ip, .. }
            | Self::DataPointerUnderflow { ip }
            | Self::InstructionPointerOverflow { ip, .. }
            | Self::InstructionPointerUnderflow { ip }
            | Self::UnmatchedBracket { ip, .. }
            | Self::Io { ip, .. } => Some(*ip),
            Self::SourceUnreadable { .. }
            | Self::CapacityExceeded { .. }
            | Self::TapeAllocation { .. }
            | Self::OutputWrite { .. }
            | Self::StepLimitExceeded { .. } => None,
        }
    }
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Open,
    Close,
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketKind::Open => write!(f, "'['"),
            BracketKind::Close => write!(f, "']'"),
        }
    }
}
