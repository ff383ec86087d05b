//! First-Fit Placement
//!
//! First-fit scans memory from the lowest address and takes the first window
//! of free slots that is large enough. It is fast, but small holes tend to
//! accumulate near the start of memory over time.

use super::allocator::{window_is_free, AllocationStrategy, PlacementPolicy, SearchFailure, Slot};

/// First-fit placement policy
///
/// Stateless: every search starts at slot 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFit;

impl PlacementPolicy for FirstFit {
    fn find(&mut self, slots: &[Slot], size: usize) -> Result<usize, SearchFailure> {
        let last_start = slots.len().checked_sub(size).ok_or(SearchFailure::NoFit)?;
        (0..=last_start)
            .find(|&start| window_is_free(slots, start, size))
            .ok_or(SearchFailure::NoFit)
    }

    fn strategy(&self) -> AllocationStrategy {
        AllocationStrategy::FirstFit
    }
}
