//! Use Cases Layer: Process Scheduling
//!
//! Provides process scheduling for the simulated kernel. This crate
//! implements the ready and blocked queues, tick-driven dispatch with
//! quantum preemption, and I/O interrupt delivery.
//!
//! ## Overview
//!
//! The `usecases_scheduling` crate is part of the use cases layer. A
//! [`Scheduler`] owns every admitted process and moves it between the ready
//! queue, the current slot, the blocked queue and the completed list. Each
//! tick performs one instruction-step on the head of the ready queue.
//!
//! ## Modules
//!
//! - **[`run_queue`](run_queue/index.html)**: FIFO ready queue with enqueue
//!   statistics, and the blocked queue searched by event
//!
//! - **[`scheduler`](scheduler/index.html)**: Dispatch step, interrupt
//!   delivery and completion reporting
//!
//! ## Architecture
//!
//! This crate depends on:
//! - `entities_process` for the Process control block and the
//!   [`MemoryOwner`](entities_process::MemoryOwner) seam through which
//!   completed processes hand their memory back
//!
//! The scheduler never names the memory manager; callers pass any
//! `MemoryOwner` to [`Scheduler::run_ticks`] and
//! [`Scheduler::deliver_interrupt`].
//!
//! ## Examples
//!
//! ```rust
//! use entities_process::{Opcode, Process};
//! use usecases_scheduling::{CompletionSignal, Scheduler, SchedulerConfig};
//!
//! let mut scheduler = Scheduler::new(SchedulerConfig::new(5).unwrap());
//! scheduler.admit(Process::new(1, [Opcode::Compute])).unwrap();
//! assert_eq!(scheduler.advance_one_tick().unwrap(), CompletionSignal::Completed(1));
//! assert!(scheduler.all_processes_complete());
//! ```
//!
//! ## See Also
//!
//! - [`entities_process`](../../entities/entities_process/index.html): Process entity layer
//! - [`usecases_memory_management`](../usecases_memory_management/index.html): Memory placement

pub mod run_queue;
pub mod scheduler;

pub use run_queue::{BlockedQueue, ReadyQueue, RunQueueInfo};
pub use scheduler::{
    CompletionSignal, InterruptReport, ScheduleError, Scheduler, SchedulerConfig, TickReport,
};
