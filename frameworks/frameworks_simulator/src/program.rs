//! Program Loader
//!
//! Reads program text into opcode sequences. A program file holds one
//! opcode per line; surrounding whitespace and blank lines are ignored and
//! opcodes match case-insensitively.

use std::path::Path;

use entities_process::{Opcode, Process, ProcessId};

/// A loaded program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// Where the program came from
    pub source: String,
    pub opcodes: Vec<Opcode>,
}

impl Program {
    /// Parse program text
    ///
    /// # Arguments
    /// * `source` - Name reported in errors
    /// * `text` - Program text, one opcode per line
    pub fn parse(source: &str, text: &str) -> Result<Self, ProgramError> {
        let mut opcodes = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let op = line.parse::<Opcode>().map_err(|_| ProgramError::UnknownOpcode {
                source: source.to_string(),
                line: index + 1,
                text: line.to_string(),
            })?;
            opcodes.push(op);
        }
        Ok(Self {
            source: source.to_string(),
            opcodes,
        })
    }

    /// Load and parse a program file
    pub fn load(path: &Path) -> Result<Self, ProgramError> {
        let text = std::fs::read_to_string(path).map_err(|e| ProgramError::IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&path.display().to_string(), &text)
    }

    /// Get number of instructions
    pub fn len(&self) -> usize {
        self.opcodes.len()
    }

    /// Check if the program has no instructions
    pub fn is_empty(&self) -> bool {
        self.opcodes.is_empty()
    }

    /// Build a READY process running this program
    pub fn to_process(&self, pid: ProcessId) -> Process {
        Process::new(pid, self.opcodes.iter().copied())
    }
}

/// Program loading error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramError {
    /// File could not be read
    IoError { path: String, message: String },
    /// Line is not COMPUTE, INPUT or OUTPUT
    UnknownOpcode {
        source: String,
        line: usize,
        text: String,
    },
}

impl std::fmt::Display for ProgramError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgramError::IoError { path, message } => {
                write!(f, "Failed to read program {}: {}", path, message)
            }
            ProgramError::UnknownOpcode { source, line, text } => {
                write!(f, "{}:{}: unknown opcode '{}'", source, line, text)
            }
        }
    }
}

impl std::error::Error for ProgramError {}
