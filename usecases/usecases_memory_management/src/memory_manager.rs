//! Memory Manager
//!
//! Owns the flat user memory array and commits placements chosen by the
//! configured [`PlacementPolicy`]. The strategy is fixed at construction.
//!
//! All failures leave memory untouched; there is no retry. A search that
//! fails keeps failing until a deallocation changes the layout.

use std::fmt;

use entities_process::{MemoryOwner, ProcessId};
use log::{debug, info};

use crate::allocator::{AllocationError, AllocationStrategy, PlacementPolicy, SearchFailure, Slot};

/// A committed allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub pid: ProcessId,
    /// First slot of the region
    pub start: usize,
    /// Number of slots in the region
    pub size: usize,
}

/// A maximal run of slots with the same owner, as shown in memory maps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: usize,
    pub len: usize,
    /// `None` for a free run
    pub owner: Slot,
}

impl Region {
    /// One past the last slot of the region
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Memory manager for user memory
///
/// Memory reserved for the OS is recorded for reporting only; placements
/// address user memory slots `0..user_memory_size`.
pub struct MemoryManager {
    os_memory_size: usize,
    user_memory_size: usize,
    strategy: AllocationStrategy,
    policy: Box<dyn PlacementPolicy + Send>,
    memory: Vec<Slot>,
}

impl MemoryManager {
    /// Create a memory manager with every user slot free
    ///
    /// # Arguments
    /// * `os_memory_size` - Memory reserved for the OS
    /// * `user_memory_size` - Number of user memory slots
    /// * `strategy` - Placement strategy used for every allocation
    pub fn new(os_memory_size: usize, user_memory_size: usize, strategy: AllocationStrategy) -> Self {
        Self {
            os_memory_size,
            user_memory_size,
            strategy,
            policy: strategy.policy(),
            memory: vec![None; user_memory_size],
        }
    }

    /// Get memory reserved for the OS
    pub fn os_memory_size(&self) -> usize {
        self.os_memory_size
    }

    /// Get number of user memory slots
    pub fn user_memory_size(&self) -> usize {
        self.user_memory_size
    }

    /// Get the placement strategy
    pub fn strategy(&self) -> AllocationStrategy {
        self.strategy
    }

    /// Slot-to-owner map of user memory
    pub fn slots(&self) -> &[Slot] {
        &self.memory
    }

    /// Count free user memory slots
    pub fn free_slots(&self) -> usize {
        self.memory.iter().filter(|slot| slot.is_none()).count()
    }

    /// Check if `pid` owns any slot
    pub fn owns(&self, pid: ProcessId) -> bool {
        self.memory.contains(&Some(pid))
    }

    /// Region owned by `pid`, if any
    pub fn region_of(&self, pid: ProcessId) -> Option<Region> {
        let start = self.memory.iter().position(|slot| *slot == Some(pid))?;
        let len = self.memory[start..]
            .iter()
            .take_while(|slot| **slot == Some(pid))
            .count();
        Some(Region {
            start,
            len,
            owner: Some(pid),
        })
    }

    /// Place `size` contiguous slots for `pid`
    ///
    /// A zero-size request always succeeds and claims no slots.
    ///
    /// # Errors
    /// * [`AllocationError::InvalidSize`] - `size` exceeds user memory
    /// * [`AllocationError::AlreadyAllocated`] - `pid` already owns a region
    /// * [`AllocationError::NoSpace`] - the strategy found no free window
    /// * [`AllocationError::OutOfRange`] - the strategy stopped at a window
    ///   that runs past the end of memory (Next-Fit)
    pub fn allocate(&mut self, pid: ProcessId, size: usize) -> Result<Placement, AllocationError> {
        if size > self.user_memory_size {
            return Err(AllocationError::InvalidSize {
                size,
                capacity: self.user_memory_size,
            });
        }
        if self.owns(pid) {
            return Err(AllocationError::AlreadyAllocated(pid));
        }
        if size == 0 {
            debug!("Process {} needs no memory", pid);
            return Ok(Placement { pid, start: 0, size: 0 });
        }

        let start = self
            .policy
            .find(&self.memory, size)
            .map_err(|failure| match failure {
                SearchFailure::NoFit => AllocationError::NoSpace { pid, size },
                SearchFailure::OutOfRange { start } => {
                    AllocationError::OutOfRange { pid, start, size }
                }
            })?;
        debug_assert!(self.memory[start..start + size].iter().all(Option::is_none));

        for slot in &mut self.memory[start..start + size] {
            *slot = Some(pid);
        }
        info!(
            "Process {} allocated {} slots at position {} using {}",
            pid, size, start, self.strategy
        );
        Ok(Placement { pid, start, size })
    }

    /// Free every slot owned by `pid`
    ///
    /// Returns the number of slots freed; zero when `pid` owned nothing.
    pub fn deallocate(&mut self, pid: ProcessId) -> usize {
        let mut freed = 0;
        for slot in self.memory.iter_mut().filter(|slot| **slot == Some(pid)) {
            *slot = None;
            freed += 1;
        }
        if freed > 0 {
            info!("Process {} released {} slots", pid, freed);
        }
        freed
    }

    /// Memory map as maximal same-owner runs, in address order
    pub fn regions(&self) -> Vec<Region> {
        let mut regions: Vec<Region> = Vec::new();
        for (index, owner) in self.memory.iter().enumerate() {
            match regions.last_mut() {
                Some(region) if region.owner == *owner => region.len += 1,
                _ => regions.push(Region {
                    start: index,
                    len: 1,
                    owner: *owner,
                }),
            }
        }
        regions
    }
}

impl MemoryOwner for MemoryManager {
    fn release(&mut self, pid: ProcessId) {
        self.deallocate(pid);
    }
}

impl fmt::Debug for MemoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryManager")
            .field("os_memory_size", &self.os_memory_size)
            .field("user_memory_size", &self.user_memory_size)
            .field("strategy", &self.strategy)
            .field("memory", &self.memory)
            .finish()
    }
}

impl fmt::Display for MemoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "OS Memory: {}, User Memory: {}",
            self.os_memory_size, self.user_memory_size
        )?;
        for region in self.regions() {
            match region.owner {
                Some(pid) => writeln!(
                    f,
                    "  {:>5}..{:<5} Process {} ({} slots)",
                    region.start,
                    region.end(),
                    pid,
                    region.len
                )?,
                None => writeln!(
                    f,
                    "  {:>5}..{:<5} free ({} slots)",
                    region.start,
                    region.end(),
                    region.len
                )?,
            }
        }
        Ok(())
    }
}
