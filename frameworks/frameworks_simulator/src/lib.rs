//! Frameworks Layer: Simulator Orchestration
//!
//! Wraps the scheduling and memory management use cases for an operator.
//!
//! ## Overview
//!
//! The `frameworks_simulator` crate is the outermost layer. It turns
//! command-line settings into a validated configuration, loads program
//! files into a job table and executes operator commands against a
//! [`BasicOs`] that pairs a scheduler with a memory manager.
//!
//! ## Modules
//!
//! - **[`args`](args/index.html)**: Command-line arguments (clap)
//!
//! - **[`config`](config/index.html)**: Validated simulator settings
//!
//! - **[`program`](program/index.html)**: Program file loading, one opcode per line
//!
//! - **[`command`](command/index.html)**: Operator command parsing and the command menu
//!
//! - **[`basic_os`](basic_os/index.html)**: Job table, admission, ticks,
//!   interrupts and reports
//!
//! ## See Also
//!
//! - [`usecases_scheduling`](../../usecases/usecases_scheduling/index.html): Scheduling use cases
//! - [`usecases_memory_management`](../../usecases/usecases_memory_management/index.html): Memory placement

pub mod args;
pub mod basic_os;
pub mod command;
pub mod config;
pub mod program;

pub use args::SimulatorArgs;
pub use basic_os::{write_menu, BasicOs, Flow, Job, SimulatorError};
pub use command::{AdmitTarget, Command, CommandError};
pub use config::{ConfigError, SimulatorConfig};
pub use program::{Program, ProgramError};
