//! Entities Layer: Process Management
//!
//! Provides the process entities shared by the scheduler and the memory
//! manager.
//!
//! ## Modules
//!
//! - **[`process`](process/index.html)**: the [`Process`] control block, its
//!   lifecycle [`ProcessStatus`] and read-only [`ProcessSnapshot`]s
//! - **[`instruction`](instruction/index.html)**: [`Opcode`]s and the
//!   [`IoEvent`]s that release blocked processes
//! - **[`memory_owner`](memory_owner/index.html)**: the [`MemoryOwner`]
//!   capability the scheduler uses to release a completed process's memory
//!
//! A process is a plain value. The scheduler moves it between its queues by
//! ownership, so a process can never sit in two queues at once.

pub mod instruction;
pub mod memory_owner;
pub mod process;

// Re-export main types for convenience
pub use instruction::{IoEvent, Opcode};
pub use memory_owner::MemoryOwner;
pub use process::{Process, ProcessError, ProcessId, ProcessSnapshot, ProcessStatus};
