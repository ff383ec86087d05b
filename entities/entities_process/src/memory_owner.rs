//! Memory Owner Trait
//!
//! Defines the capability the scheduler uses to give back a completed
//! process's memory without depending on the memory manager crate. The
//! memory manager implements this trait and the scheduler calls it at the
//! moment it observes a process's instruction sequence run empty.

use crate::ProcessId;

/// Something that holds memory on behalf of processes
pub trait MemoryOwner {
    /// Release every region owned by `pid`
    ///
    /// Releasing a pid that owns nothing must be a no-op.
    fn release(&mut self, pid: ProcessId);
}

impl<T: MemoryOwner + ?Sized> MemoryOwner for &mut T {
    fn release(&mut self, pid: ProcessId) {
        (**self).release(pid);
    }
}
