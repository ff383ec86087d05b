//! Instructions and Events
//!
//! A program is an ordered list of opcodes. Each opcode class has a fixed
//! service time; I/O opcodes additionally name the event that must be raised
//! before the process can continue.

use std::fmt;
use std::str::FromStr;

use crate::process::ProcessError;

/// Service ticks required by a COMPUTE instruction
pub const COMPUTE_TICKS: u32 = 5;
/// Service ticks required by an INPUT instruction
pub const INPUT_TICKS: u32 = 1;
/// Service ticks required by an OUTPUT instruction
pub const OUTPUT_TICKS: u32 = 1;

/// Instruction opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// CPU-bound work
    Compute,
    /// Read from a device; blocks until an [`IoEvent::Input`] interrupt
    Input,
    /// Write to a device; blocks until an [`IoEvent::Output`] interrupt
    Output,
}

impl Opcode {
    /// Total service time of one instruction of this class
    pub fn service_ticks(self) -> u32 {
        match self {
            Opcode::Compute => COMPUTE_TICKS,
            Opcode::Input => INPUT_TICKS,
            Opcode::Output => OUTPUT_TICKS,
        }
    }

    /// Event the instruction waits on, or `None` for COMPUTE
    pub fn io_event(self) -> Option<IoEvent> {
        match self {
            Opcode::Compute => None,
            Opcode::Input => Some(IoEvent::Input),
            Opcode::Output => Some(IoEvent::Output),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Compute => write!(f, "COMPUTE"),
            Opcode::Input => write!(f, "INPUT"),
            Opcode::Output => write!(f, "OUTPUT"),
        }
    }
}

impl FromStr for Opcode {
    type Err = ProcessError;

    /// Parses an opcode name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("COMPUTE") {
            Ok(Opcode::Compute)
        } else if name.eq_ignore_ascii_case("INPUT") {
            Ok(Opcode::Input)
        } else if name.eq_ignore_ascii_case("OUTPUT") {
            Ok(Opcode::Output)
        } else {
            Err(ProcessError::UnknownOpcode(name.to_string()))
        }
    }
}

/// Synthetic I/O completion events
///
/// The numeric codes are what an operator types (`interrupt 1`) and what
/// process listings show in the event column (0 meaning "not waiting").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoEvent {
    /// An INPUT request finished
    Input = 1,
    /// An OUTPUT request finished
    Output = 2,
}

impl IoEvent {
    /// Numeric event code: 1 INPUT, 2 OUTPUT
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for IoEvent {
    type Error = ProcessError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(IoEvent::Input),
            2 => Ok(IoEvent::Output),
            other => Err(ProcessError::UnknownEvent(other)),
        }
    }
}

impl fmt::Display for IoEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoEvent::Input => write!(f, "INPUT"),
            IoEvent::Output => write!(f, "OUTPUT"),
        }
    }
}
