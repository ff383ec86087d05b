//! Best-Fit Placement
//!
//! Best-fit partitions memory into maximal free runs and places the request
//! at the start of the smallest run that can hold it. This keeps large holes
//! intact for large requests, at the cost of leaving many small fragments.

use super::allocator::{free_runs, AllocationStrategy, PlacementPolicy, SearchFailure, Slot};

/// Best-fit placement policy
///
/// Among equally small runs the lowest-addressed one wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestFit;

impl PlacementPolicy for BestFit {
    fn find(&mut self, slots: &[Slot], size: usize) -> Result<usize, SearchFailure> {
        // min_by_key keeps the first of several equal minima, and runs come
        // back in address order
        free_runs(slots)
            .into_iter()
            .filter(|&(_, len)| len >= size)
            .min_by_key(|&(_, len)| len)
            .map(|(start, _)| start)
            .ok_or(SearchFailure::NoFit)
    }

    fn strategy(&self) -> AllocationStrategy {
        AllocationStrategy::BestFit
    }
}
