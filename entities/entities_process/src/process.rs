//! Process Entity
//!
//! Provides the Process struct and related types for the simulated kernel.
//!
//! A process owns its pending instruction list and the bookkeeping counters
//! the scheduler updates while stepping it. Status changes go through
//! [`Process::transition`], which only accepts edges of the lifecycle graph:
//!
//! ```text
//! READY -> RUNNING -> READY | BLOCKED | COMPLETED
//! BLOCKED -> READY
//! ```

use std::collections::VecDeque;
use std::fmt;

use crate::instruction::{IoEvent, Opcode};

/// Process ID type
pub type ProcessId = u64;

/// Process lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessStatus {
    /// Waiting in the ready queue
    Ready,
    /// Occupying the scheduler's current slot
    Running,
    /// Waiting in the blocked queue for an I/O event
    Blocked,
    /// Instruction list exhausted
    Completed,
}

impl ProcessStatus {
    /// Whether the lifecycle graph has an edge from `self` to `next`
    pub fn can_transition_to(self, next: ProcessStatus) -> bool {
        use ProcessStatus::*;
        matches!(
            (self, next),
            (Ready, Running)
                | (Running, Ready)
                | (Running, Blocked)
                | (Running, Completed)
                | (Blocked, Ready)
        )
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessStatus::Ready => write!(f, "READY"),
            ProcessStatus::Running => write!(f, "RUNNING"),
            ProcessStatus::Blocked => write!(f, "BLOCKED"),
            ProcessStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Process-level errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// A status change outside the lifecycle graph
    IllegalTransition {
        pid: ProcessId,
        from: ProcessStatus,
        to: ProcessStatus,
    },
    /// COMPLETED requested while instructions remain
    InstructionsRemaining { pid: ProcessId, remaining: usize },
    /// Opcode name not recognised
    UnknownOpcode(String),
    /// Event code not recognised
    UnknownEvent(u8),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::IllegalTransition { pid, from, to } => {
                write!(f, "Process {} cannot move from {} to {}", pid, from, to)
            }
            ProcessError::InstructionsRemaining { pid, remaining } => write!(
                f,
                "Process {} cannot complete with {} instructions remaining",
                pid, remaining
            ),
            ProcessError::UnknownOpcode(name) => write!(f, "Unknown opcode '{}'", name),
            ProcessError::UnknownEvent(code) => write!(f, "Unknown event {}", code),
        }
    }
}

impl std::error::Error for ProcessError {}

/// Read-only view of a process, as shown in queue listings
///
/// Fields are `[pid, remaining instructions, status, pc, cpu ticks, event]`;
/// the event column is 0 when the process is not waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSnapshot {
    pub pid: ProcessId,
    pub remaining_instructions: usize,
    pub status: ProcessStatus,
    pub program_counter: usize,
    pub cpu_ticks: u64,
    pub event_waiting: u8,
}

impl fmt::Display for ProcessSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}, {}, {}]",
            self.pid,
            self.remaining_instructions,
            self.status,
            self.program_counter,
            self.cpu_ticks,
            self.event_waiting
        )
    }
}

/// Process control block
///
/// `size` is the memory footprint and equals the initial instruction count.
/// A process built from an empty program starts out COMPLETED, so that
/// "no instructions left" and COMPLETED always coincide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    /// Process identifier
    pid: ProcessId,
    /// Pending instructions, front first
    instructions: VecDeque<Opcode>,
    /// Lifecycle status
    status: ProcessStatus,
    /// Number of instructions that have finished service
    program_counter: usize,
    /// Dispatches charged to the CPU
    cpu_ticks: u64,
    /// Ticks spent servicing released I/O on a device
    io_ticks: u64,
    /// Memory footprint in slots
    size: usize,
    remaining_compute_ticks: u32,
    remaining_input_ticks: u32,
    remaining_output_ticks: u32,
    /// Event the process is blocked on
    event_waiting: Option<IoEvent>,
    /// The I/O instruction at the front has had its event delivered
    io_released: bool,
}

impl Process {
    /// Create a new process from a program
    ///
    /// # Arguments
    /// * `pid` - Process identifier
    /// * `instructions` - Program opcodes in execution order
    pub fn new(pid: ProcessId, instructions: impl IntoIterator<Item = Opcode>) -> Self {
        let instructions: VecDeque<Opcode> = instructions.into_iter().collect();
        let status = if instructions.is_empty() {
            ProcessStatus::Completed
        } else {
            ProcessStatus::Ready
        };

        Self {
            pid,
            size: instructions.len(),
            instructions,
            status,
            program_counter: 0,
            cpu_ticks: 0,
            io_ticks: 0,
            remaining_compute_ticks: Opcode::Compute.service_ticks(),
            remaining_input_ticks: Opcode::Input.service_ticks(),
            remaining_output_ticks: Opcode::Output.service_ticks(),
            event_waiting: None,
            io_released: false,
        }
    }

    /// Get process ID
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Get pending instructions, front first
    pub fn instructions(&self) -> &VecDeque<Opcode> {
        &self.instructions
    }

    /// Instruction that will be examined on the next dispatch
    pub fn front(&self) -> Option<Opcode> {
        self.instructions.front().copied()
    }

    /// Get number of pending instructions
    pub fn remaining_instructions(&self) -> usize {
        self.instructions.len()
    }

    /// Check if any instruction is still pending
    pub fn has_instructions(&self) -> bool {
        !self.instructions.is_empty()
    }

    /// Get lifecycle status
    pub fn status(&self) -> ProcessStatus {
        self.status
    }

    /// Get number of retired instructions
    pub fn program_counter(&self) -> usize {
        self.program_counter
    }

    /// Get CPU ticks charged so far
    pub fn cpu_ticks(&self) -> u64 {
        self.cpu_ticks
    }

    /// Get device ticks spent servicing released I/O
    pub fn io_ticks(&self) -> u64 {
        self.io_ticks
    }

    /// Get memory footprint in slots
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the event the process is blocked on
    pub fn event_waiting(&self) -> Option<IoEvent> {
        self.event_waiting
    }

    /// Event code as displayed: 0 none, 1 INPUT, 2 OUTPUT
    pub fn event_code(&self) -> u8 {
        self.event_waiting.map_or(0, IoEvent::code)
    }

    /// Check if the front I/O instruction has had its event delivered
    pub fn is_io_released(&self) -> bool {
        self.io_released
    }

    /// Service ticks still owed by the current instruction of class `op`
    pub fn remaining_ticks(&self, op: Opcode) -> u32 {
        match op {
            Opcode::Compute => self.remaining_compute_ticks,
            Opcode::Input => self.remaining_input_ticks,
            Opcode::Output => self.remaining_output_ticks,
        }
    }

    fn remaining_ticks_mut(&mut self, op: Opcode) -> &mut u32 {
        match op {
            Opcode::Compute => &mut self.remaining_compute_ticks,
            Opcode::Input => &mut self.remaining_input_ticks,
            Opcode::Output => &mut self.remaining_output_ticks,
        }
    }

    /// Move to `next` along the lifecycle graph
    ///
    /// # Errors
    /// Returns [`ProcessError::IllegalTransition`] for an edge outside the
    /// graph and [`ProcessError::InstructionsRemaining`] when COMPLETED is
    /// requested for a process that still has work.
    pub fn transition(&mut self, next: ProcessStatus) -> Result<(), ProcessError> {
        if !self.status.can_transition_to(next) {
            return Err(ProcessError::IllegalTransition {
                pid: self.pid,
                from: self.status,
                to: next,
            });
        }
        if next == ProcessStatus::Completed && self.has_instructions() {
            return Err(ProcessError::InstructionsRemaining {
                pid: self.pid,
                remaining: self.instructions.len(),
            });
        }
        self.status = next;
        Ok(())
    }

    /// Charge one dispatch to the CPU
    pub fn charge_cpu_tick(&mut self) {
        self.cpu_ticks += 1;
    }

    /// Charge one tick of device service
    pub fn charge_io_tick(&mut self) {
        self.io_ticks += 1;
    }

    /// Pay `quantum` ticks off the front instruction without finishing it
    pub fn preempt(&mut self, op: Opcode, quantum: u32) {
        let remaining = self.remaining_ticks_mut(op);
        *remaining = remaining.saturating_sub(quantum);
    }

    /// Retire the front instruction
    ///
    /// Advances the program counter and resets the countdown of the retired
    /// opcode class to its full service time.
    pub fn finish_front(&mut self) -> Option<Opcode> {
        let op = self.instructions.pop_front()?;
        self.program_counter += 1;
        *self.remaining_ticks_mut(op) = op.service_ticks();
        self.io_released = false;
        Some(op)
    }

    /// Block on `event`, leaving the I/O instruction at the front
    pub fn block_on(&mut self, event: IoEvent) -> Result<(), ProcessError> {
        self.transition(ProcessStatus::Blocked)?;
        self.event_waiting = Some(event);
        Ok(())
    }

    /// Deliver `event` to a blocked process
    ///
    /// Returns `Ok(false)` without touching the process when it waits on a
    /// different event or on none.
    pub fn release(&mut self, event: IoEvent) -> Result<bool, ProcessError> {
        if self.event_waiting != Some(event) {
            return Ok(false);
        }
        self.transition(ProcessStatus::Ready)?;
        self.event_waiting = None;
        self.io_released = true;
        Ok(true)
    }

    /// Take a read-only snapshot for queue listings
    pub fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot {
            pid: self.pid,
            remaining_instructions: self.instructions.len(),
            status: self.status,
            program_counter: self.program_counter,
            cpu_ticks: self.cpu_ticks,
            event_waiting: self.event_code(),
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instructions: Vec<String> = self.instructions.iter().map(Opcode::to_string).collect();
        write!(
            f,
            "Process ID {}, Instructions=[{}], Status={}, PC={}, CPU ticks={}, Event Waiting={}, Process Size={}",
            self.pid,
            instructions.join(", "),
            self.status,
            self.program_counter,
            self.cpu_ticks,
            self.event_code(),
            self.size
        )
    }
}
