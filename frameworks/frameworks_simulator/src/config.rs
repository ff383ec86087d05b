//! Simulator Configuration
//!
//! Validated settings consumed at startup and handed to the core at
//! construction.

use std::fmt;
use std::path::PathBuf;

use usecases_memory_management::AllocationStrategy;
use usecases_scheduling::SchedulerConfig;

use crate::args::SimulatorArgs;

/// Validated simulator settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    pub os_memory: usize,
    pub user_memory: usize,
    /// Degree of multiprogramming
    pub degree: usize,
    pub scheduler: SchedulerConfig,
    pub strategy: AllocationStrategy,
    pub programs: Vec<PathBuf>,
}

impl SimulatorConfig {
    /// Validate parsed arguments
    ///
    /// # Errors
    /// * [`ConfigError::NoUserMemory`] - user memory of 0
    /// * [`ConfigError::InvalidQuantum`] - quantum of 0
    /// * [`ConfigError::UnknownStrategy`] - strategy name not recognised
    /// * [`ConfigError::DegreeMismatch`] - degree differs from the number of
    ///   program files
    pub fn from_args(args: &SimulatorArgs) -> Result<Self, ConfigError> {
        if args.user_memory == 0 {
            return Err(ConfigError::NoUserMemory);
        }
        let scheduler = SchedulerConfig::new(args.quantum)
            .map_err(|_| ConfigError::InvalidQuantum(args.quantum))?;
        let strategy: AllocationStrategy = args
            .strategy
            .parse()
            .map_err(|_| ConfigError::UnknownStrategy(args.strategy.clone()))?;
        let degree = args.degree();
        if degree != args.programs.len() {
            return Err(ConfigError::DegreeMismatch {
                degree,
                programs: args.programs.len(),
            });
        }

        Ok(Self {
            os_memory: args.os_memory,
            user_memory: args.user_memory,
            degree,
            scheduler,
            strategy,
            programs: args.programs.clone(),
        })
    }

    /// Get the dispatch quantum in ticks
    pub fn quantum(&self) -> u32 {
        self.scheduler.quantum()
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NoUserMemory,
    InvalidQuantum(u32),
    UnknownStrategy(String),
    DegreeMismatch { degree: usize, programs: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoUserMemory => write!(f, "User memory must be at least one slot"),
            ConfigError::InvalidQuantum(q) => {
                write!(f, "Invalid quantum {}: must be at least one tick", q)
            }
            ConfigError::UnknownStrategy(name) => write!(
                f,
                "Unknown allocation strategy '{}' (expected First Fit, Best Fit or Next Fit)",
                name
            ),
            ConfigError::DegreeMismatch { degree, programs } => write!(
                f,
                "Degree of multiprogramming is {} but {} program files were given",
                degree, programs
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
