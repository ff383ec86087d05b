//! Command-Line Argument Parsing Module
//!
//! Collects the simulator settings from the command line.
//! Uses clap for type-safe argument parsing.

use std::path::PathBuf;

use clap::Parser;

/// Simulator command-line arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "basic_os")]
#[command(about = "Basic OS Simulator: process scheduling and memory placement")]
pub struct SimulatorArgs {
    /// Amount of RAM reserved for the OS (e.g. 64)
    #[arg(long, default_value_t = 64)]
    pub os_memory: usize,

    /// Amount of memory available for user processes (e.g. 128)
    #[arg(long, default_value_t = 128)]
    pub user_memory: usize,

    /// Degree of multiprogramming; defaults to the number of program files
    #[arg(long)]
    pub degree: Option<usize>,

    /// Ticks paid off an instruction each time a process is dispatched
    #[arg(long, default_value_t = 5)]
    pub quantum: u32,

    /// Memory allocation strategy: First Fit (FF), Best Fit (BF) or Next Fit (NF)
    #[arg(long, default_value = "First Fit")]
    pub strategy: String,

    /// Program files, one opcode (COMPUTE, INPUT, OUTPUT) per line
    #[arg(required = true)]
    pub programs: Vec<PathBuf>,
}

impl SimulatorArgs {
    /// Degree of multiprogramming after applying the default
    pub fn degree(&self) -> usize {
        self.degree.unwrap_or(self.programs.len())
    }
}
