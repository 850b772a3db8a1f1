//! The program store: a bounded, read-only byte sequence of instructions.
//!
//! Bytes are kept verbatim. Anything that is not one of `><+-.,[]` stays in
//! the buffer and executes as a no-op.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{BracketKind, InterpreterError};

/// Loaded program bytes plus the capacity they were loaded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    code: Vec<u8>,
    capacity: usize,
}

impl Program {
    /// An empty program store that accepts up to `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            code: Vec::new(),
            capacity,
        }
    }

    /// Build a program from bytes already in memory.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, capacity: usize) -> Result<Self, InterpreterError> {
        let code = bytes.into();
        if code.len() > capacity {
            return Err(InterpreterError::CapacityExceeded { capacity });
        }
        Ok(Self { code, capacity })
    }

    /// Open `path` and load its bytes.
    pub fn load(path: impl AsRef<Path>, capacity: usize) -> Result<Self, InterpreterError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let file = File::open(path).map_err(|source| InterpreterError::SourceUnreadable {
            origin: origin.clone(),
            source,
        })?;

        let mut program = Self::with_capacity(capacity);
        program.reload_from(BufReader::new(file), &origin)?;
        Ok(program)
    }

    /// Replace the contents with the bytes of `reader`.
    ///
    /// The previous contents are cleared first, so on error the store is
    /// left empty. `origin` names the source in error messages.
    pub fn reload_from<R: Read>(&mut self, reader: R, origin: &str) -> Result<(), InterpreterError> {
        self.code.clear();

        // One byte past capacity is enough to tell an oversized source apart.
        let limit = (self.capacity as u64).saturating_add(1);
        let mut buf = Vec::new();
        reader
            .take(limit)
            .read_to_end(&mut buf)
            .map_err(|source| InterpreterError::SourceUnreadable {
                origin: origin.to_string(),
                source,
            })?;

        if buf.len() > self.capacity {
            return Err(InterpreterError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        self.code = buf;
        tracing::debug!(origin, bytes = self.code.len(), capacity = self.capacity, "loaded program");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.code
    }

    /// Verify every bracket has a partner without running anything.
    ///
    /// Reports the first stray `]`, or else the innermost `[` left open.
    pub fn check_brackets(&self) -> Result<(), InterpreterError> {
        let mut open: Vec<usize> = Vec::new();
        for (i, &b) in self.code.iter().enumerate() {
            match b {
                b'[' => open.push(i),
                b']' => {
                    if open.pop().is_none() {
                        return Err(InterpreterError::UnmatchedBracket {
                            ip: i,
                            kind: BracketKind::Close,
                        });
                    }
                }
                _ => {}
            }
        }

        match open.last() {
            Some(&ip) => Err(InterpreterError::UnmatchedBracket {
                ip,
                kind: BracketKind::Open,
            }),
            None => Ok(()),
        }
    }
}
