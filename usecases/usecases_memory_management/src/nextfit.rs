//! Next-Fit Placement
//!
//! Next-fit behaves like first-fit but resumes the search just past the
//! previous allocation instead of at slot 0, spreading allocations across
//! memory.
//!
//! Wrap semantics: starting at the cursor, each start position is tried at
//! most once, in circular order. A region is contiguous in the flat address
//! space and never wraps. The search stops at the first candidate whose
//! slots are free from its start up to `min(start + size, end of memory)`:
//!
//! - if the window fits before the end of memory it is chosen;
//! - if it runs past the end the search fails with
//!   [`SearchFailure::OutOfRange`], even when a hole further round the
//!   circle could have held the request.
//!
//! The search fails with [`SearchFailure::NoFit`] once every start position
//! has been tried. A failed search leaves the cursor where it was.

use super::allocator::{AllocationStrategy, PlacementPolicy, SearchFailure, Slot};

/// Next-fit placement policy
#[derive(Debug, Clone, Copy, Default)]
pub struct NextFit {
    /// Where the next search begins
    cursor: usize,
}

impl NextFit {
    /// Create a policy whose first search starts at slot 0
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    /// Position the next search will start from
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl PlacementPolicy for NextFit {
    fn find(&mut self, slots: &[Slot], size: usize) -> Result<usize, SearchFailure> {
        let capacity = slots.len();
        if capacity == 0 {
            return Err(SearchFailure::NoFit);
        }
        let origin = self.cursor % capacity;

        for offset in 0..capacity {
            let start = (origin + offset) % capacity;
            let end = (start + size).min(capacity);
            if !slots[start..end].iter().all(Option::is_none) {
                continue;
            }
            if start + size > capacity {
                return Err(SearchFailure::OutOfRange { start });
            }
            self.cursor = (start + size) % capacity;
            return Ok(start);
        }
        Err(SearchFailure::NoFit)
    }

    fn strategy(&self) -> AllocationStrategy {
        AllocationStrategy::NextFit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(slots: &mut [Slot], pid: u64, start: usize, size: usize) {
        for slot in &mut slots[start..start + size] {
            *slot = Some(pid);
        }
    }

    #[test]
    fn test_nextfit_advances_cursor() {
        let mut slots = vec![None; 10];
        let mut policy = NextFit::new();

        let a = policy.find(&slots, 3).unwrap();
        commit(&mut slots, 1, a, 3);
        assert_eq!(a, 0);
        assert_eq!(policy.cursor(), 3);

        let b = policy.find(&slots, 2).unwrap();
        assert_eq!(b, 3);
        assert_eq!(policy.cursor(), 5);
    }

    #[test]
    fn test_nextfit_cursor_wraps_to_zero_on_exact_end() {
        let slots = vec![None; 4];
        let mut policy = NextFit { cursor: 1 };
        assert_eq!(policy.find(&slots, 3), Ok(1));
        assert_eq!(policy.cursor(), 0);
    }

    #[test]
    fn test_nextfit_window_running_past_end_fails() {
        // Free tail [8..10) is too short for 3; the hole at 0 is not reached
        let mut slots = vec![Some(9); 10];
        slots[0] = None;
        slots[1] = None;
        slots[2] = None;
        slots[8] = None;
        slots[9] = None;
        let mut policy = NextFit { cursor: 8 };
        assert_eq!(policy.find(&slots, 3), Err(SearchFailure::OutOfRange { start: 8 }));
        assert_eq!(policy.cursor(), 8);
    }

    #[test]
    fn test_nextfit_occupied_tail_is_skipped() {
        // [8..10) starts free but slot 9 is taken, so the scan moves on
        let mut slots = vec![Some(9); 10];
        slots[0] = None;
        slots[1] = None;
        slots[8] = None;
        let mut policy = NextFit { cursor: 8 };
        assert_eq!(policy.find(&slots, 2), Ok(0));
        assert_eq!(policy.cursor(), 2);
    }

    #[test]
    fn test_nextfit_finds_hole_just_before_cursor() {
        // Only hole is [2..4); cursor at 4 must go all the way around.
        let mut slots = vec![Some(9); 6];
        slots[2] = None;
        slots[3] = None;
        let mut policy = NextFit { cursor: 4 };
        assert_eq!(policy.find(&slots, 2), Ok(2));
        assert_eq!(policy.cursor(), 4);
    }

    #[test]
    fn test_nextfit_no_fit_keeps_cursor() {
        let slots = vec![None, Some(1), None, Some(2), Some(2)];
        let mut policy = NextFit { cursor: 3 };
        assert_eq!(policy.find(&slots, 2), Err(SearchFailure::NoFit));
        assert_eq!(policy.cursor(), 3);
    }

    #[test]
    fn test_nextfit_whole_memory_from_nonzero_cursor() {
        let slots = vec![None; 5];
        let mut policy = NextFit { cursor: 2 };
        // The first candidate at 2 is free to the end but too short
        assert_eq!(policy.find(&slots, 5), Err(SearchFailure::OutOfRange { start: 2 }));
        assert_eq!(policy.cursor(), 2);

        let mut policy = NextFit::new();
        assert_eq!(policy.find(&slots, 5), Ok(0));
        assert_eq!(policy.cursor(), 0);
    }
}
