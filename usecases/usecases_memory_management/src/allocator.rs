//! Allocator Trait and Types
//!
//! Defines the placement interface shared by the allocation strategies.
//!
//! A strategy only *chooses* where a request goes; the
//! [`MemoryManager`](crate::MemoryManager) validates the request beforehand
//! and writes the owner into the chosen slots afterwards. Strategies see the
//! slot array read-only, so a failed search can never leave memory half
//! written.
//!
//! ## Allocation Strategies
//!
//! - **FirstFit**: lowest window that fits
//! - **BestFit**: smallest free run that fits
//! - **NextFit**: first fit, resuming where the last allocation ended
//!
//! ## Examples
//!
//! ```rust
//! use usecases_memory_management::{AllocationStrategy, MemoryManager};
//!
//! let strategy: AllocationStrategy = "Best Fit".parse().unwrap();
//! let mut memory = MemoryManager::new(64, 10, strategy);
//! let placement = memory.allocate(1, 4).unwrap();
//! assert_eq!(placement.start, 0);
//! memory.deallocate(1);
//! ```

use std::fmt;
use std::str::FromStr;

use entities_process::ProcessId;

use crate::bestfit::BestFit;
use crate::firstfit::FirstFit;
use crate::nextfit::NextFit;

/// One unit of user memory: free, or owned by a process
pub type Slot = Option<ProcessId>;

/// Allocation strategy types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationStrategy {
    /// First-fit allocation strategy
    FirstFit,
    /// Best-fit allocation strategy
    BestFit,
    /// Next-fit allocation strategy
    NextFit,
}

impl AllocationStrategy {
    /// Build a fresh placement policy for this strategy
    pub fn policy(self) -> Box<dyn PlacementPolicy + Send> {
        match self {
            AllocationStrategy::FirstFit => Box::new(FirstFit),
            AllocationStrategy::BestFit => Box::new(BestFit),
            AllocationStrategy::NextFit => Box::new(NextFit::new()),
        }
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationStrategy::FirstFit => write!(f, "First Fit"),
            AllocationStrategy::BestFit => write!(f, "Best Fit"),
            AllocationStrategy::NextFit => write!(f, "Next Fit"),
        }
    }
}

impl FromStr for AllocationStrategy {
    type Err = AllocationError;

    /// Accepts the long names (`First Fit`) and the abbreviations (`FF`),
    /// ignoring case, surrounding whitespace and the separator between words.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "firstfit" | "ff" => Ok(AllocationStrategy::FirstFit),
            "bestfit" | "bf" => Ok(AllocationStrategy::BestFit),
            "nextfit" | "nf" => Ok(AllocationStrategy::NextFit),
            _ => Err(AllocationError::UnknownStrategy(s.trim().to_string())),
        }
    }
}

/// Allocation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// No free window of the requested size under the active strategy
    NoSpace { pid: ProcessId, size: usize },
    /// Requested size exceeds user memory
    InvalidSize { size: usize, capacity: usize },
    /// The strategy's first free candidate window runs past the end of memory
    OutOfRange {
        pid: ProcessId,
        start: usize,
        size: usize,
    },
    /// The process already owns a region
    AlreadyAllocated(ProcessId),
    /// Strategy name not recognised
    UnknownStrategy(String),
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationError::NoSpace { pid, size } => {
                write!(f, "Process {} could not be allocated {} slots of memory", pid, size)
            }
            AllocationError::InvalidSize { size, capacity } => write!(
                f,
                "Requested {} slots but user memory holds only {}",
                size, capacity
            ),
            AllocationError::OutOfRange { pid, start, size } => write!(
                f,
                "Process {} could not be allocated memory: {} slots at position {} run past the end of memory",
                pid, size, start
            ),
            AllocationError::AlreadyAllocated(pid) => {
                write!(f, "Process {} already owns memory", pid)
            }
            AllocationError::UnknownStrategy(name) => {
                write!(f, "Unknown allocation strategy '{}'", name)
            }
        }
    }
}

impl std::error::Error for AllocationError {}

/// Why a placement search chose no window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFailure {
    /// No free window of the requested size exists for this strategy
    NoFit,
    /// The search stopped at a candidate that runs past the last slot
    OutOfRange { start: usize },
}

/// Placement search over a slot array
///
/// Implementations are called only with `0 < size <= slots.len()`. Returning
/// `Ok(start)` promises that `slots[start..start + size]` is free and
/// commits the choice: the manager writes the region immediately, so a
/// stateful policy may update its own bookkeeping before returning. A
/// failed search must leave the policy's bookkeeping untouched.
pub trait PlacementPolicy {
    /// Choose the start index of a free window of `size` slots
    fn find(&mut self, slots: &[Slot], size: usize) -> Result<usize, SearchFailure>;

    /// Strategy this policy implements
    fn strategy(&self) -> AllocationStrategy;
}

/// Whether `slots[start..start + size]` lies in bounds and is entirely free
pub(crate) fn window_is_free(slots: &[Slot], start: usize, size: usize) -> bool {
    match slots.get(start..start + size) {
        Some(window) => window.iter().all(Option::is_none),
        None => false,
    }
}

/// Maximal runs of free slots as `(start, len)`, in address order
pub(crate) fn free_runs(slots: &[Slot]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < slots.len() {
        if slots[i].is_some() {
            i += 1;
            continue;
        }
        let start = i;
        while i < slots.len() && slots[i].is_none() {
            i += 1;
        }
        runs.push((start, i - start));
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse_names() {
        for name in ["First Fit", "FF", "first-fit", " firstfit "] {
            assert_eq!(name.parse::<AllocationStrategy>(), Ok(AllocationStrategy::FirstFit), "{}", name);
        }
        for name in ["Best Fit", "BF", "best_fit"] {
            assert_eq!(name.parse::<AllocationStrategy>(), Ok(AllocationStrategy::BestFit), "{}", name);
        }
        for name in ["Next Fit", "nf", "NEXT FIT"] {
            assert_eq!(name.parse::<AllocationStrategy>(), Ok(AllocationStrategy::NextFit), "{}", name);
        }
        assert_eq!(
            "Worst Fit".parse::<AllocationStrategy>(),
            Err(AllocationError::UnknownStrategy("Worst Fit".to_string()))
        );
    }

    #[test]
    fn test_strategy_display_parses_back() {
        for strategy in [
            AllocationStrategy::FirstFit,
            AllocationStrategy::BestFit,
            AllocationStrategy::NextFit,
        ] {
            assert_eq!(strategy.to_string().parse::<AllocationStrategy>(), Ok(strategy));
            assert_eq!(strategy.policy().strategy(), strategy);
        }
    }

    #[test]
    fn test_window_is_free() {
        let slots = [None, Some(1), None, None];
        assert!(window_is_free(&slots, 2, 2));
        assert!(!window_is_free(&slots, 0, 2));
        assert!(!window_is_free(&slots, 3, 2));
        assert!(window_is_free(&slots, 4, 0));
    }

    #[test]
    fn test_free_runs() {
        let slots = [None, Some(1), Some(1), None, None, Some(2), None];
        assert_eq!(free_runs(&slots), vec![(0, 1), (3, 2), (6, 1)]);
        assert_eq!(free_runs(&[Some(1), Some(2)]), Vec::new());
        assert_eq!(free_runs(&[None, None]), vec![(0, 2)]);
    }

    #[test]
    fn test_allocation_error_display() {
        assert_eq!(
            AllocationError::NoSpace { pid: 3, size: 4 }.to_string(),
            "Process 3 could not be allocated 4 slots of memory"
        );
        assert_eq!(
            AllocationError::InvalidSize { size: 11, capacity: 10 }.to_string(),
            "Requested 11 slots but user memory holds only 10"
        );
        assert_eq!(
            AllocationError::OutOfRange { pid: 3, start: 8, size: 3 }.to_string(),
            "Process 3 could not be allocated memory: 3 slots at position 8 run past the end of memory"
        );
        assert_eq!(
            AllocationError::AlreadyAllocated(2).to_string(),
            "Process 2 already owns memory"
        );
    }
}
