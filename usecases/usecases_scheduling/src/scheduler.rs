//! Scheduler Functions
//!
//! Drives processes through their lifecycle one instruction-step per tick.
//!
//! Each dispatch takes the head of the ready queue, examines its front
//! instruction and moves the process on to exactly one place:
//!
//! - COMPUTE, and I/O whose event has already been delivered, is serviced.
//!   An instruction owing more than one quantum pays a quantum off and goes
//!   back to the ready queue unfinished; otherwise it retires and the process
//!   is requeued, or completes if nothing is left.
//! - I/O that has not been released blocks the process on its event.
//!
//! The current slot is therefore empty between dispatches unless a step
//! failed. A completion is
//! reported through a [`CompletionSignal`] carrying the pid, so the caller
//! can return the process's memory; [`Scheduler::run_ticks`] and
//! [`Scheduler::deliver_interrupt`] do that through a [`MemoryOwner`].

use std::fmt;

use entities_process::{IoEvent, MemoryOwner, Process, ProcessError, ProcessId, ProcessStatus};
use log::{debug, info, warn};

use crate::run_queue::{BlockedQueue, ReadyQueue, RunQueueInfo};

/// Scheduler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Ticks paid off an instruction per dispatch
    quantum: u32,
}

impl SchedulerConfig {
    /// # Errors
    /// Returns [`ScheduleError::InvalidQuantum`] for a quantum of 0, which
    /// would never let an instruction finish.
    pub fn new(quantum: u32) -> Result<Self, ScheduleError> {
        if quantum == 0 {
            return Err(ScheduleError::InvalidQuantum);
        }
        Ok(Self { quantum })
    }

    /// Get the dispatch quantum in ticks
    pub fn quantum(&self) -> u32 {
        self.quantum
    }
}

/// Outcome of one dispatch
#[must_use = "a completed process's memory must be released"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSignal {
    /// Nothing was ready to run
    Idle,
    /// The process ran and was requeued or blocked
    Yielded(ProcessId),
    /// The process ran out of instructions
    Completed(ProcessId),
}

impl CompletionSignal {
    /// Pid of the completed process, if this dispatch completed one
    pub fn completed_pid(self) -> Option<ProcessId> {
        match self {
            CompletionSignal::Completed(pid) => Some(pid),
            _ => None,
        }
    }
}

/// Result of delivering one interrupt
#[must_use = "completed processes' memory must be released"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptReport {
    pub event: IoEvent,
    /// Processes moved from blocked to ready, in release order
    pub released: Vec<ProcessId>,
    /// Processes that completed during the follow-up dispatches
    pub completed: Vec<ProcessId>,
}

impl InterruptReport {
    fn new(event: IoEvent) -> Self {
        Self {
            event,
            released: Vec::new(),
            completed: Vec::new(),
        }
    }
}

/// Result of a run of ticks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Ticks that actually elapsed
    pub ticks: usize,
    /// Processes that completed, in completion order
    pub completed: Vec<ProcessId>,
}

/// How a step left the dispatched process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Instruction unfinished after paying a quantum
    Preempted,
    /// Instruction retired, more remain
    Requeued,
    /// I/O issued
    Blocked(IoEvent),
    /// Instruction list exhausted
    Completed,
}

/// Single-CPU process scheduler
///
/// Every process the scheduler holds is in exactly one of the ready queue,
/// the blocked queue, the current slot or the completed list, and its status
/// agrees with where it is.
#[derive(Debug)]
pub struct Scheduler {
    config: SchedulerConfig,
    ready: ReadyQueue,
    blocked: BlockedQueue,
    current: Option<Process>,
    completed: Vec<Process>,
}

impl Scheduler {
    /// Create a scheduler with empty queues
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            ready: ReadyQueue::new(),
            blocked: BlockedQueue::new(),
            current: None,
            completed: Vec::new(),
        }
    }

    /// Get the scheduler configuration
    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// Get the dispatch quantum in ticks
    pub fn quantum(&self) -> u32 {
        self.config.quantum()
    }

    /// Admit a process to the ready queue
    ///
    /// # Errors
    /// * [`ScheduleError::EmptyProgramRejected`] - the process has no
    ///   instructions; it is never scheduled
    /// * [`ScheduleError::NotReady`] - the process is not in READY status
    /// * [`ScheduleError::DuplicateProcess`] - the pid is already scheduled
    pub fn admit(&mut self, process: Process) -> Result<(), ScheduleError> {
        let pid = process.pid();
        if !process.has_instructions() {
            warn!("Process {} has no instructions and was not admitted", pid);
            return Err(ScheduleError::EmptyProgramRejected(pid));
        }
        if process.status() != ProcessStatus::Ready {
            return Err(ScheduleError::NotReady {
                pid,
                status: process.status(),
            });
        }
        if self.find(pid).is_some() {
            return Err(ScheduleError::DuplicateProcess(pid));
        }

        self.ready.enqueue(process);
        info!("Process {} admitted to the ready queue", pid);
        Ok(())
    }

    /// Advance simulated time by one tick
    pub fn advance_one_tick(&mut self) -> Result<CompletionSignal, ScheduleError> {
        self.dispatch()
    }

    /// Dispatch once on behalf of an interrupt
    ///
    /// Performs the same step as a tick, so a process released by an
    /// interrupt can make progress immediately instead of waiting for the
    /// next tick. A released I/O instruction is serviced rather than
    /// blocking again.
    pub fn handle_interrupt_event(&mut self) -> Result<CompletionSignal, ScheduleError> {
        self.dispatch()
    }

    /// Release every blocked process waiting on `event`
    ///
    /// Matches are released in blocked-queue order. After each release the
    /// scheduler dispatches once through [`handle_interrupt_event`]. A
    /// process that blocks on `event` during one of those dispatches waits
    /// for the next interrupt.
    ///
    /// [`handle_interrupt_event`]: Scheduler::handle_interrupt_event
    pub fn raise_interrupt(&mut self, event: IoEvent) -> Result<InterruptReport, ScheduleError> {
        let mut report = InterruptReport::new(event);
        self.release_waiting(&mut report)?;
        Ok(report)
    }

    /// Release processes waiting on `report.event`, recording progress in
    /// `report` as it goes
    ///
    /// On error, `report` still lists every release and completion that
    /// happened before the failure.
    fn release_waiting(&mut self, report: &mut InterruptReport) -> Result<(), ScheduleError> {
        let event = report.event;
        for pid in self.blocked.waiting_on(event) {
            let Some(mut process) = self.blocked.remove(pid) else {
                continue;
            };
            if let Err(e) = process.release(event) {
                self.blocked.enqueue(process);
                return Err(e.into());
            }
            info!(
                "Process {} moved to ready queue due to interrupt {}",
                pid,
                event.code()
            );
            self.ready.enqueue(process);
            report.released.push(pid);

            if let Some(done) = self.handle_interrupt_event()?.completed_pid() {
                report.completed.push(done);
            }
        }

        if report.released.is_empty() {
            debug!("Interrupt {} released no processes", event.code());
        }
        Ok(())
    }

    /// Advance up to `ticks` ticks, releasing memory of completed processes
    ///
    /// Stops early once a completion leaves nothing ready, blocked or
    /// running.
    pub fn run_ticks(
        &mut self,
        ticks: usize,
        memory: &mut dyn MemoryOwner,
    ) -> Result<TickReport, ScheduleError> {
        let mut report = TickReport::default();
        for _ in 0..ticks {
            let signal = self.advance_one_tick()?;
            report.ticks += 1;
            if let Some(pid) = signal.completed_pid() {
                memory.release(pid);
                info!("Process {} has completed and memory deallocated", pid);
                report.completed.push(pid);
                if self.all_processes_complete() {
                    info!("All processes are completed");
                    break;
                }
            }
        }
        Ok(report)
    }

    /// Raise `event` and release memory of processes it lets complete
    ///
    /// Memory of every process that completed is released even when a
    /// later release fails and the error is returned.
    pub fn deliver_interrupt(
        &mut self,
        event: IoEvent,
        memory: &mut dyn MemoryOwner,
    ) -> Result<InterruptReport, ScheduleError> {
        let mut report = InterruptReport::new(event);
        let result = self.release_waiting(&mut report);
        for &pid in &report.completed {
            memory.release(pid);
            info!("Process {} has completed and memory deallocated", pid);
        }
        result.map(|()| report)
    }

    /// True when nothing is ready, blocked or running
    pub fn all_processes_complete(&self) -> bool {
        self.ready.is_empty() && self.blocked.is_empty() && self.current.is_none()
    }

    /// Iterate the ready queue, head first
    pub fn ready_queue(&self) -> impl Iterator<Item = &Process> {
        self.ready.iter()
    }

    /// Iterate the blocked queue in blocking order
    pub fn blocked_queue(&self) -> impl Iterator<Item = &Process> {
        self.blocked.iter()
    }

    /// Process left in the current slot
    ///
    /// The slot is occupied only while a step runs, so this is `None`
    /// between calls unless the last step failed; a failed step leaves its
    /// process here and the next dispatch retries it.
    pub fn current(&self) -> Option<&Process> {
        self.current.as_ref()
    }

    /// Get completed processes in completion order
    pub fn completed(&self) -> &[Process] {
        &self.completed
    }

    /// Get ready queue statistics
    pub fn ready_queue_info(&self) -> RunQueueInfo {
        self.ready.info()
    }

    /// Look a process up wherever the scheduler holds it
    pub fn find(&self, pid: ProcessId) -> Option<&Process> {
        self.current
            .as_ref()
            .filter(|process| process.pid() == pid)
            .or_else(|| self.ready.find(pid))
            .or_else(|| self.blocked.find(pid))
            .or_else(|| self.completed.iter().find(|process| process.pid() == pid))
    }

    fn dispatch(&mut self) -> Result<CompletionSignal, ScheduleError> {
        if self.current.is_none() {
            if let Some(mut process) = self.ready.dequeue() {
                if let Err(e) = process.transition(ProcessStatus::Running) {
                    self.ready.enqueue(process);
                    return Err(e.into());
                }
                debug!("Process {} is now running", process.pid());
                self.current = Some(process);
            }
        }

        let Some(mut process) = self.current.take() else {
            return Ok(CompletionSignal::Idle);
        };
        let pid = process.pid();

        let step = match self.step(&mut process) {
            Ok(step) => step,
            Err(e) => {
                self.current = Some(process);
                return Err(e.into());
            }
        };

        match step {
            Step::Preempted | Step::Requeued => {
                debug!(
                    "Process {} back to ready queue ({:?}, pc={})",
                    pid,
                    step,
                    process.program_counter()
                );
                self.ready.enqueue(process);
                Ok(CompletionSignal::Yielded(pid))
            }
            Step::Blocked(event) => {
                info!("Process {} is blocked waiting on {}", pid, event);
                self.blocked.enqueue(process);
                Ok(CompletionSignal::Yielded(pid))
            }
            Step::Completed => {
                info!("Process {} completed", pid);
                self.completed.push(process);
                Ok(CompletionSignal::Completed(pid))
            }
        }
    }

    /// Execute one instruction-step of a RUNNING process
    fn step(&self, process: &mut Process) -> Result<Step, ProcessError> {
        let Some(op) = process.front() else {
            process.transition(ProcessStatus::Completed)?;
            return Ok(Step::Completed);
        };

        match op.io_event() {
            Some(event) if !process.is_io_released() => {
                process.charge_cpu_tick();
                process.block_on(event)?;
                return Ok(Step::Blocked(event));
            }
            Some(_) => process.charge_io_tick(),
            None => process.charge_cpu_tick(),
        }

        let quantum = self.config.quantum();
        if process.remaining_ticks(op) > quantum {
            process.preempt(op, quantum);
            process.transition(ProcessStatus::Ready)?;
            return Ok(Step::Preempted);
        }

        process.finish_front();
        if process.has_instructions() {
            process.transition(ProcessStatus::Ready)?;
            Ok(Step::Requeued)
        } else {
            process.transition(ProcessStatus::Completed)?;
            Ok(Step::Completed)
        }
    }
}

/// Scheduler error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Process has no instructions and cannot be scheduled
    EmptyProgramRejected(ProcessId),
    /// Process is not READY
    NotReady {
        pid: ProcessId,
        status: ProcessStatus,
    },
    /// Process is already held by the scheduler
    DuplicateProcess(ProcessId),
    /// Quantum of zero
    InvalidQuantum,
    /// A process rejected a state change
    Process(ProcessError),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::EmptyProgramRejected(pid) => {
                write!(f, "Process {} has no instructions", pid)
            }
            ScheduleError::NotReady { pid, status } => {
                write!(f, "Process {} is {} and cannot be admitted", pid, status)
            }
            ScheduleError::DuplicateProcess(pid) => {
                write!(f, "Process {} is already scheduled", pid)
            }
            ScheduleError::InvalidQuantum => write!(f, "Quantum must be at least one tick"),
            ScheduleError::Process(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ScheduleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScheduleError::Process(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProcessError> for ScheduleError {
    fn from(e: ProcessError) -> Self {
        ScheduleError::Process(e)
    }
}
