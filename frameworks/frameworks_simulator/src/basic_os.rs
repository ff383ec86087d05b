//! Simulator Orchestration
//!
//! [`BasicOs`] pairs a [`Scheduler`] with a [`MemoryManager`] and drives
//! them on behalf of the operator. Loaded programs wait in a job table as
//! READY processes until admitted. Admission allocates memory first and
//! only then hands the process to the scheduler; completed processes give
//! their memory back as ticks and interrupts run.

use std::fmt;
use std::io::{self, Write};

use entities_process::{IoEvent, Process, ProcessId};
use log::{info, warn};
use usecases_memory_management::{AllocationError, MemoryManager, Placement};
use usecases_scheduling::{InterruptReport, ScheduleError, Scheduler, TickReport};

use crate::command::{AdmitTarget, Command, MENU};
use crate::config::{ConfigError, SimulatorConfig};
use crate::program::{Program, ProgramError};

/// Entry in the job table
#[derive(Debug, Clone)]
pub struct Job {
    /// Operator-facing name, `job <n>`
    pub name: String,
    pub pid: ProcessId,
    /// The process while it waits for admission
    process: Option<Process>,
    placement: Option<Placement>,
}

impl Job {
    fn new(index: usize, program: &Program) -> Self {
        let pid = index as ProcessId;
        Self {
            name: format!("job {}", index),
            pid,
            process: Some(program.to_process(pid)),
            placement: None,
        }
    }

    /// Check if the job has been handed to the scheduler
    pub fn is_admitted(&self) -> bool {
        self.process.is_none()
    }

    /// Where the job was placed in user memory
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }
}

/// Whether the command loop keeps going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Simulator orchestrator
#[derive(Debug)]
pub struct BasicOs {
    config: SimulatorConfig,
    memory: MemoryManager,
    scheduler: Scheduler,
    jobs: Vec<Job>,
    /// Ticks elapsed since startup
    clock: u64,
}

impl BasicOs {
    /// Build the simulator from already loaded programs
    pub fn new(config: SimulatorConfig, programs: &[Program]) -> Self {
        let memory = MemoryManager::new(config.os_memory, config.user_memory, config.strategy);
        let scheduler = Scheduler::new(config.scheduler);
        let jobs = programs
            .iter()
            .enumerate()
            .map(|(index, program)| Job::new(index, program))
            .collect();

        Self {
            config,
            memory,
            scheduler,
            jobs,
            clock: 0,
        }
    }

    /// Load every configured program file and build the simulator
    pub fn boot(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        let programs = config
            .programs
            .iter()
            .map(|path| Program::load(path))
            .collect::<Result<Vec<_>, _>>()?;
        info!("{} processes have been loaded", programs.len());
        Ok(Self::new(config, &programs))
    }

    /// Get the simulator settings
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Get the memory manager
    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    /// Get the scheduler
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Get the job table
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Get ticks elapsed since startup
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Current state of a job's process, wherever it is held
    pub fn job_process(&self, index: usize) -> Option<&Process> {
        let job = self.jobs.get(index)?;
        job.process
            .as_ref()
            .or_else(|| self.scheduler.find(job.pid))
    }

    /// Allocate memory for job `index` and admit it to the ready queue
    ///
    /// If the scheduler rejects the process its memory is returned and the
    /// job stays in the table.
    pub fn admit_job(&mut self, index: usize) -> Result<Placement, SimulatorError> {
        let job = self
            .jobs
            .get_mut(index)
            .ok_or(SimulatorError::UnknownJob(index))?;
        let process = job
            .process
            .as_ref()
            .ok_or(SimulatorError::AlreadyAdmitted(index))?;

        let placement = self.memory.allocate(job.pid, process.size())?;
        if let Err(e) = self.scheduler.admit(process.clone()) {
            self.memory.deallocate(job.pid);
            return Err(e.into());
        }

        job.process = None;
        job.placement = Some(placement);
        Ok(placement)
    }

    /// Admit every job not yet admitted, in table order
    ///
    /// Failures do not stop the remaining admissions.
    pub fn admit_all(&mut self) -> Vec<(usize, Result<Placement, SimulatorError>)> {
        let pending: Vec<usize> = self
            .jobs
            .iter()
            .enumerate()
            .filter(|(_, job)| !job.is_admitted())
            .map(|(index, _)| index)
            .collect();

        pending
            .into_iter()
            .map(|index| {
                let result = self.admit_job(index);
                if let Err(e) = &result {
                    warn!("job {} was not admitted: {}", index, e);
                }
                (index, result)
            })
            .collect()
    }

    /// Run up to `n` ticks
    pub fn tick(&mut self, n: usize) -> Result<TickReport, SimulatorError> {
        let report = self.scheduler.run_ticks(n, &mut self.memory)?;
        self.clock += report.ticks as u64;
        Ok(report)
    }

    /// Deliver event `event` to the blocked queue
    pub fn interrupt(&mut self, event: IoEvent) -> Result<InterruptReport, SimulatorError> {
        Ok(self.scheduler.deliver_interrupt(event, &mut self.memory)?)
    }

    /// Execute one operator command, writing its output to `out`
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow, SimulatorError> {
        match command {
            Command::Stop => {
                self.write_summary(out)?;
                return Ok(Flow::Stop);
            }
            Command::Help => write_menu(out)?,
            Command::ShowJobs => self.write_jobs(out)?,
            Command::ShowQueues => self.write_queues(out)?,
            Command::ShowMemory => self.write_memory(out)?,
            Command::Tick(n) => {
                let report = self.tick(n)?;
                for pid in &report.completed {
                    writeln!(out, "Process {} has completed and memory deallocated.", pid)?;
                }
                if !report.completed.is_empty() && self.scheduler.all_processes_complete() {
                    writeln!(out, "All processes are completed.")?;
                }
            }
            Command::Admit(AdmitTarget::Job(index)) => {
                let placement = self.admit_job(index)?;
                writeln!(
                    out,
                    "Process {} admitted to the ready queue at position {}.",
                    placement.pid, placement.start
                )?;
            }
            Command::Admit(AdmitTarget::All) => {
                for (index, result) in self.admit_all() {
                    match result {
                        Ok(placement) => writeln!(
                            out,
                            "Process {} admitted to the ready queue at position {}.",
                            placement.pid, placement.start
                        )?,
                        Err(e) => writeln!(out, "job {}: {}", index, e)?,
                    }
                }
            }
            Command::Interrupt(event) => {
                let report = self.interrupt(event)?;
                for pid in &report.released {
                    writeln!(
                        out,
                        "Process {} moved to ready queue due to interrupt {}.",
                        pid,
                        event.code()
                    )?;
                }
                for pid in &report.completed {
                    writeln!(out, "Process {} has completed and memory deallocated.", pid)?;
                }
                if !report.completed.is_empty() && self.scheduler.all_processes_complete() {
                    writeln!(out, "All processes are completed.")?;
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Write every job with its process state (`show jobs`)
    pub fn write_jobs<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (index, job) in self.jobs.iter().enumerate() {
            match self.job_process(index) {
                Some(process) => writeln!(out, "{}: {}", job.name, process)?,
                None => writeln!(out, "{}: unavailable", job.name)?,
            }
        }
        Ok(())
    }

    /// Write ready, blocked and completed queue rows (`show queues`)
    pub fn write_queues<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let rows = |processes: Vec<&Process>| -> String {
            let rows: Vec<String> = processes
                .into_iter()
                .map(|process| process.snapshot().to_string())
                .collect();
            format!("[{}]", rows.join(", "))
        };
        writeln!(out, "Ready Queue: {}", rows(self.scheduler.ready_queue().collect()))?;
        writeln!(out, "Blocked Queue: {}", rows(self.scheduler.blocked_queue().collect()))?;
        writeln!(out, "Completed Queue: {}", rows(self.scheduler.completed().iter().collect()))
    }

    /// Write the memory map and each job's start (`show memory`)
    pub fn write_memory<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self.memory)?;
        for job in self.jobs.iter() {
            if let Some(region) = self.memory.region_of(job.pid) {
                writeln!(out, "{} starts at {}", job.name, region.start)?;
            }
        }
        Ok(())
    }

    /// Write summary statistics (`stop`)
    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let config = &self.config;
        writeln!(out, "SUMMARY STATISTICS")?;
        writeln!(out, "The amount of RAM reserved for the OS: {}", config.os_memory)?;
        writeln!(
            out,
            "The amount of memory available for user processes: {}",
            config.user_memory
        )?;
        writeln!(out, "The degree of multiprogramming: {}", config.degree)?;
        writeln!(
            out,
            "The number of ticks per dispatch (quantum): {}",
            config.quantum()
        )?;
        writeln!(out, "Memory allocation strategy: {}", config.strategy)?;
        writeln!(out, "Number of jobs completed: {}", self.scheduler.completed().len())?;
        writeln!(out, "Total ticks elapsed: {}", self.clock)?;
        for process in self.scheduler.completed() {
            writeln!(
                out,
                "Process {}: CPU ticks={}, I/O ticks={}",
                process.pid(),
                process.cpu_ticks(),
                process.io_ticks()
            )?;
        }
        Ok(())
    }
}

/// Write the command menu (`help`)
pub fn write_menu<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "SIMULATOR COMMANDS")?;
    for (name, description) in MENU {
        writeln!(out, "{}: {}", name, description)?;
    }
    Ok(())
}

/// Simulator errors
#[derive(Debug)]
pub enum SimulatorError {
    Config(ConfigError),
    Program(ProgramError),
    Allocation(AllocationError),
    Schedule(ScheduleError),
    UnknownJob(usize),
    AlreadyAdmitted(usize),
    Io(io::Error),
}

impl fmt::Display for SimulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulatorError::Config(e) => write!(f, "Configuration error: {}", e),
            SimulatorError::Program(e) => write!(f, "Program error: {}", e),
            SimulatorError::Allocation(e) => write!(f, "Allocation error: {}", e),
            SimulatorError::Schedule(e) => write!(f, "Scheduling error: {}", e),
            SimulatorError::UnknownJob(index) => write!(f, "No such job: job {}", index),
            SimulatorError::AlreadyAdmitted(index) => {
                write!(f, "job {} has already been admitted", index)
            }
            SimulatorError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for SimulatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulatorError::Config(e) => Some(e),
            SimulatorError::Program(e) => Some(e),
            SimulatorError::Allocation(e) => Some(e),
            SimulatorError::Schedule(e) => Some(e),
            SimulatorError::Io(e) => Some(e),
            SimulatorError::UnknownJob(_) | SimulatorError::AlreadyAdmitted(_) => None,
        }
    }
}

impl From<ConfigError> for SimulatorError {
    fn from(e: ConfigError) -> Self {
        SimulatorError::Config(e)
    }
}

impl From<ProgramError> for SimulatorError {
    fn from(e: ProgramError) -> Self {
        SimulatorError::Program(e)
    }
}

impl From<AllocationError> for SimulatorError {
    fn from(e: AllocationError) -> Self {
        SimulatorError::Allocation(e)
    }
}

impl From<ScheduleError> for SimulatorError {
    fn from(e: ScheduleError) -> Self {
        SimulatorError::Schedule(e)
    }
}

impl From<io::Error> for SimulatorError {
    fn from(e: io::Error) -> Self {
        SimulatorError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entities_process::{Opcode, ProcessStatus};
    use usecases_memory_management::AllocationStrategy;
    use usecases_scheduling::SchedulerConfig;

    fn config(user_memory: usize, quantum: u32, strategy: AllocationStrategy) -> SimulatorConfig {
        SimulatorConfig {
            os_memory: 64,
            user_memory,
            degree: 0,
            scheduler: SchedulerConfig::new(quantum).unwrap(),
            strategy,
            programs: Vec::new(),
        }
    }

    fn program(opcodes: &[Opcode]) -> Program {
        Program {
            source: "test".to_string(),
            opcodes: opcodes.to_vec(),
        }
    }

    fn output(os: &mut BasicOs, command: &str) -> String {
        let mut out = Vec::new();
        os.execute(command.parse().unwrap(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_job_table_names_are_zero_based() {
        let os = BasicOs::new(
            config(10, 5, AllocationStrategy::FirstFit),
            &[program(&[Opcode::Compute]), program(&[Opcode::Input])],
        );
        let names: Vec<&str> = os.jobs().iter().map(|job| job.name.as_str()).collect();
        assert_eq!(names, vec!["job 0", "job 1"]);
        assert_eq!(os.jobs()[1].pid, 1);
        assert!(!os.jobs()[0].is_admitted());
        assert_eq!(os.job_process(0).unwrap().status(), ProcessStatus::Ready);
    }

    #[test]
    fn test_admit_allocates_then_schedules() {
        let mut os = BasicOs::new(
            config(10, 5, AllocationStrategy::FirstFit),
            &[program(&[Opcode::Compute, Opcode::Output])],
        );
        let placement = os.admit_job(0).unwrap();
        assert_eq!(placement, Placement { pid: 0, start: 0, size: 2 });
        assert!(os.jobs()[0].is_admitted());
        assert_eq!(os.jobs()[0].placement(), Some(placement));
        assert_eq!(os.memory().free_slots(), 8);
        assert_eq!(os.scheduler().ready_queue().count(), 1);

        assert!(matches!(os.admit_job(0), Err(SimulatorError::AlreadyAdmitted(0))));
        assert!(matches!(os.admit_job(5), Err(SimulatorError::UnknownJob(5))));
    }

    #[test]
    fn test_failed_allocation_leaves_job_pending() {
        let mut os = BasicOs::new(
            config(3, 5, AllocationStrategy::BestFit),
            &[
                program(&[Opcode::Compute, Opcode::Compute]),
                program(&[Opcode::Compute, Opcode::Compute]),
            ],
        );
        let results = os.admit_all();
        assert!(results[0].1.is_ok());
        assert!(matches!(
            results[1].1,
            Err(SimulatorError::Allocation(AllocationError::NoSpace { pid: 1, size: 2 }))
        ));
        assert!(!os.jobs()[1].is_admitted());

        // Memory frees up once job 0 completes, then job 1 fits
        let _ = os.tick(2).unwrap();
        assert_eq!(os.admit_job(1).unwrap().start, 0);
    }

    #[test]
    fn test_empty_program_is_rejected_and_memory_returned() {
        let mut os = BasicOs::new(config(4, 5, AllocationStrategy::FirstFit), &[program(&[])]);
        assert!(matches!(
            os.admit_job(0),
            Err(SimulatorError::Schedule(ScheduleError::EmptyProgramRejected(0)))
        ));
        assert!(!os.jobs()[0].is_admitted());
        assert_eq!(os.memory().free_slots(), 4);
    }

    #[test]
    fn test_tick_advances_clock_and_frees_memory() {
        let mut os = BasicOs::new(
            config(10, 5, AllocationStrategy::NextFit),
            &[program(&[Opcode::Compute])],
        );
        os.admit_job(0).unwrap();
        let text = output(&mut os, "tick 10");
        assert!(text.contains("Process 0 has completed and memory deallocated."));
        assert!(text.contains("All processes are completed."));
        assert_eq!(os.clock(), 1);
        assert_eq!(os.memory().free_slots(), 10);
    }

    #[test]
    fn test_interrupt_command_output() {
        let mut os = BasicOs::new(
            config(10, 5, AllocationStrategy::FirstFit),
            &[program(&[Opcode::Output])],
        );
        os.admit_job(0).unwrap();
        let _ = os.tick(1).unwrap();
        let text = output(&mut os, "interrupt 2");
        assert!(text.contains("Process 0 moved to ready queue due to interrupt 2."));
        assert!(text.contains("Process 0 has completed and memory deallocated."));
    }

    #[test]
    fn test_show_queues_rows() {
        let mut os = BasicOs::new(
            config(10, 5, AllocationStrategy::FirstFit),
            &[program(&[Opcode::Input, Opcode::Compute]), program(&[Opcode::Compute])],
        );
        let _ = os.admit_all();
        let _ = os.tick(1).unwrap();
        let text = output(&mut os, "show queues");
        assert!(text.contains("Ready Queue: [[1, 1, READY, 0, 0, 0]]"));
        assert!(text.contains("Blocked Queue: [[0, 2, BLOCKED, 0, 1, 1]]"));
        assert!(text.contains("Completed Queue: []"));
    }

    #[test]
    fn test_show_memory_lists_job_starts() {
        let mut os = BasicOs::new(
            config(10, 5, AllocationStrategy::FirstFit),
            &[program(&[Opcode::Compute; 3]), program(&[Opcode::Compute; 2])],
        );
        let _ = os.admit_all();
        let text = output(&mut os, "show memory");
        assert!(text.starts_with("OS Memory: 64, User Memory: 10"));
        assert!(text.contains("job 0 starts at 0"));
        assert!(text.contains("job 1 starts at 3"));
    }

    #[test]
    fn test_stop_prints_summary() {
        let mut os = BasicOs::new(
            config(10, 2, AllocationStrategy::BestFit),
            &[program(&[Opcode::Compute])],
        );
        os.admit_job(0).unwrap();
        let _ = os.tick(5).unwrap();

        let mut out = Vec::new();
        assert_eq!(os.execute(Command::Stop, &mut out).unwrap(), Flow::Stop);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("SUMMARY STATISTICS"));
        assert!(text.contains("Memory allocation strategy: Best Fit"));
        assert!(text.contains("Number of jobs completed: 1"));
        assert!(text.contains("Total ticks elapsed: 3"));
        assert!(text.contains("Process 0: CPU ticks=3, I/O ticks=0"));
    }

    #[test]
    fn test_help_prints_menu() {
        let mut os = BasicOs::new(config(1, 1, AllocationStrategy::FirstFit), &[]);
        let text = output(&mut os, "help");
        assert!(text.starts_with("SIMULATOR COMMANDS"));
        assert!(text.contains("admit all:"));
    }
}
